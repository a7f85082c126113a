/*!
 * Test Support
 * In-memory stand-ins for the RPC runtime, the collector and the naming directory
 */

#![allow(dead_code)]

use orb_monitor::addressing::encode_ior;
use orb_monitor::config::MonitorConfig;
use orb_monitor::core::{CaptureError, DirectoryError, TransportError};
use orb_monitor::delivery::{EventSink, Transport};
use orb_monitor::events::TrafficEvent;
use orb_monitor::interceptor::{
    CaptureSettings, ClientRequestInfo, InterceptorContext, RequestInfo, ServerRequestInfo,
    TypeKind, WireValue,
};
use orb_monitor::correlation::TimingCorrelator;
use orb_monitor::topology::{
    Binding, BindingIterator, BindingKind, DirectoryConnector, Listing, NameComponent,
    NamingContext, ObjectRef,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// RPC RUNTIME
// =============================================================================

/// Runtime value with a fixed kind
#[derive(Debug, Clone, PartialEq)]
pub enum FakeValue {
    Bool(bool),
    Long(i64),
    Text(String),
    Void,
    Struct { name: String, id: String },
    /// Reading the kind fails
    Broken,
}

impl FakeValue {
    fn mismatch(&self, expected: &'static str) -> CaptureError {
        CaptureError::TypeMismatch {
            expected,
            found: self.kind().map(TypeKind::value).unwrap_or(0),
        }
    }
}

impl WireValue for FakeValue {
    fn kind(&self) -> Result<TypeKind, CaptureError> {
        match self {
            FakeValue::Bool(_) => Ok(TypeKind::Boolean),
            FakeValue::Long(_) => Ok(TypeKind::Long),
            FakeValue::Text(_) => Ok(TypeKind::String),
            FakeValue::Void => Ok(TypeKind::Void),
            FakeValue::Struct { .. } => Ok(TypeKind::Struct),
            FakeValue::Broken => Err(CaptureError::Runtime("BAD_PARAM".to_string())),
        }
    }
    fn type_name(&self) -> Result<String, CaptureError> {
        match self {
            FakeValue::Struct { name, .. } => Ok(name.clone()),
            _ => Ok(String::new()),
        }
    }
    fn type_id(&self) -> Result<String, CaptureError> {
        match self {
            FakeValue::Struct { id, .. } => Ok(id.clone()),
            _ => Ok(String::new()),
        }
    }
    fn read_bool(&self) -> Result<bool, CaptureError> {
        match self {
            FakeValue::Bool(b) => Ok(*b),
            _ => Err(self.mismatch("boolean")),
        }
    }
    fn read_char(&self) -> Result<char, CaptureError> {
        Err(self.mismatch("char"))
    }
    fn read_signed(&self) -> Result<i64, CaptureError> {
        match self {
            FakeValue::Long(n) => Ok(*n),
            _ => Err(self.mismatch("long")),
        }
    }
    fn read_unsigned(&self) -> Result<u64, CaptureError> {
        Err(self.mismatch("unsigned long"))
    }
    fn read_float(&self) -> Result<f64, CaptureError> {
        Err(self.mismatch("double"))
    }
    fn read_string(&self) -> Result<String, CaptureError> {
        match self {
            FakeValue::Text(s) => Ok(s.clone()),
            _ => Err(self.mismatch("string")),
        }
    }
    fn read_enum_member(&self) -> Result<String, CaptureError> {
        Err(self.mismatch("enum"))
    }
}

/// One call as seen at an interception point, usable on either side
#[derive(Debug, Clone, Default)]
pub struct FakeCall {
    pub request_id: Vec<u8>,
    pub operation: String,
    pub type_ids: Vec<String>,
    pub target: Option<String>,
    /// `None` means not available at this point
    pub arguments: Option<Vec<FakeValue>>,
    /// `None` means not available at this point
    pub result: Option<FakeValue>,
    pub exception_id: Option<String>,
    pub object_id: Vec<u8>,
    pub contexts: Vec<(u32, usize)>,
    /// Accessors panic instead of answering
    pub explode: bool,
}

impl FakeCall {
    pub fn new(request_id: &[u8], operation: &str) -> Self {
        Self {
            request_id: request_id.to_vec(),
            operation: operation.to_string(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_id: &str) -> Self {
        self.type_ids.push(type_id.to_string());
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_arguments(mut self, arguments: Vec<FakeValue>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn with_result(mut self, result: FakeValue) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_exception(mut self, exception_id: &str) -> Self {
        self.exception_id = Some(exception_id.to_string());
        self
    }

    pub fn with_object_id(mut self, object_id: &[u8]) -> Self {
        self.object_id = object_id.to_vec();
        self
    }

    pub fn with_context(mut self, id: u32, len: usize) -> Self {
        self.contexts.push((id, len));
        self
    }

    pub fn exploding(mut self) -> Self {
        self.explode = true;
        self
    }

    fn check(&self) {
        if self.explode {
            panic!("runtime adapter failure");
        }
    }
}

impl RequestInfo for FakeCall {
    type Value = FakeValue;

    fn request_id(&self) -> Vec<u8> {
        self.request_id.clone()
    }
    fn operation(&self) -> Result<String, CaptureError> {
        self.check();
        Ok(self.operation.clone())
    }
    fn service_context_len(&self, context_id: u32) -> Option<usize> {
        self.contexts
            .iter()
            .find(|(id, _)| *id == context_id)
            .map(|(_, len)| *len)
    }
    fn arguments(&self) -> Result<Vec<FakeValue>, CaptureError> {
        self.arguments
            .clone()
            .ok_or(CaptureError::NotAvailable("arguments"))
    }
    fn result(&self) -> Result<Option<FakeValue>, CaptureError> {
        self.result
            .clone()
            .map(Some)
            .ok_or(CaptureError::NotAvailable("result"))
    }
}

impl ClientRequestInfo for FakeCall {
    fn target_type_ids(&self) -> Result<Vec<String>, CaptureError> {
        Ok(self.type_ids.clone())
    }
    fn effective_target(&self) -> Result<String, CaptureError> {
        self.target
            .clone()
            .ok_or(CaptureError::NotAvailable("effective_target"))
    }
    fn received_exception_id(&self) -> Result<String, CaptureError> {
        self.exception_id
            .clone()
            .ok_or(CaptureError::NotAvailable("received_exception"))
    }
}

impl ServerRequestInfo for FakeCall {
    fn object_id(&self) -> Result<Vec<u8>, CaptureError> {
        Ok(self.object_id.clone())
    }
    fn target_most_derived_interface(&self) -> Result<String, CaptureError> {
        self.type_ids
            .first()
            .cloned()
            .ok_or(CaptureError::NotAvailable("target_most_derived_interface"))
    }
    fn sending_exception_id(&self) -> Result<String, CaptureError> {
        self.exception_id
            .clone()
            .ok_or(CaptureError::NotAvailable("sending_exception"))
    }
}

// =============================================================================
// EVENT SINK AND COLLECTOR
// =============================================================================

/// Sink that keeps every event
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<TrafficEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<TrafficEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn last(&self) -> TrafficEvent {
        self.events
            .lock()
            .last()
            .cloned()
            .expect("no event captured")
    }
}

impl EventSink for CollectingSink {
    fn submit(&self, event: TrafficEvent) {
        self.events.lock().push(event);
    }
}

/// Interceptor context over a collecting sink
pub fn capture_context(settings: CaptureSettings) -> (Arc<InterceptorContext>, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::default());
    let ctx = InterceptorContext::new(
        TimingCorrelator::new(),
        Arc::clone(&sink) as Arc<dyn EventSink>,
        settings,
        "10.1.1.1",
    );
    (Arc::new(ctx), sink)
}

pub fn capture_all() -> CaptureSettings {
    CaptureSettings {
        request_data: true,
        response_data: true,
        max_payload_bytes: 65_536,
    }
}

/// A POST the recording transport received
#[derive(Debug, Clone)]
pub struct Posted {
    pub url: String,
    pub body: serde_json::Value,
}

/// Collector stand-in answering with a fixed status
pub struct RecordingTransport {
    status: u16,
    posts: Mutex<Vec<Posted>>,
    gets: AtomicUsize,
}

impl RecordingTransport {
    pub fn answering(status: u16) -> Arc<Self> {
        Arc::new(Self {
            status,
            posts: Mutex::new(Vec::new()),
            gets: AtomicUsize::new(0),
        })
    }

    pub fn posts(&self) -> Vec<Posted> {
        self.posts.lock().clone()
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl Transport for RecordingTransport {
    fn post_json(&self, url: &str, body: Vec<u8>) -> Result<u16, TransportError> {
        let body = serde_json::from_slice(&body).map_err(|e| TransportError::Request { url: url.to_string(), reason: e.to_string() })?;
        self.posts.lock().push(Posted {
            url: url.to_string(),
            body,
        });
        Ok(self.status)
    }

    fn get(&self, _url: &str, _timeout: Duration) -> Result<u16, TransportError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.status)
    }
}

/// Defaults with small, test-friendly sizes and intervals
pub fn test_config() -> MonitorConfig {
    let mut config = MonitorConfig::defaults();
    config.api_base_url = "http://collector.test/api".to_string();
    config.http_pool_size = 2;
    config.flush_interval = Duration::from_millis(20);
    config.scan_interval = Duration::from_secs(60);
    config
}

// =============================================================================
// NAMING DIRECTORY
// =============================================================================

/// Leaf object in the fake directory
pub struct FakeObject {
    ior: String,
    probe: Result<bool, DirectoryError>,
}

impl FakeObject {
    pub fn at(host: &str, port: u16) -> Arc<Self> {
        Arc::new(Self {
            ior: encode_ior("IDL:FleetManagement/VehicleTracker:1.0", &[(host, port)]),
            probe: Ok(false),
        })
    }

    pub fn gone(host: &str, port: u16) -> Arc<Self> {
        Arc::new(Self {
            ior: encode_ior("IDL:FleetManagement/VehicleTracker:1.0", &[(host, port)]),
            probe: Ok(true),
        })
    }

    pub fn unreachable(host: &str, port: u16) -> Arc<Self> {
        Arc::new(Self {
            ior: encode_ior("IDL:FleetManagement/VehicleTracker:1.0", &[(host, port)]),
            probe: Err(DirectoryError::CallFailed("COMM_FAILURE".to_string())),
        })
    }
}

impl ObjectRef for FakeObject {
    fn to_portable_string(&self) -> Result<String, DirectoryError> {
        Ok(self.ior.clone())
    }
    fn non_existent(&self) -> Result<bool, DirectoryError> {
        self.probe.clone()
    }
}

/// What a name is bound to
pub enum FakeNode {
    Context(Arc<FakeContext>),
    Object(Arc<FakeObject>),
    /// Listed as an object but resolution fails
    Unresolvable,
    /// Listed as a context but resolution fails
    BrokenContext,
}

/// Directory node with an optional forced page size
#[derive(Default)]
pub struct FakeContext {
    children: Vec<(NameComponent, FakeNode)>,
    page_limit: Option<usize>,
    list_fails: AtomicBool,
    pub destroyed_iterators: Arc<AtomicUsize>,
}

impl FakeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(mut self, id: &str, child: FakeContext) -> Self {
        self.children
            .push((NameComponent::new(id, ""), FakeNode::Context(Arc::new(child))));
        self
    }

    pub fn object(mut self, id: &str, kind: &str, object: Arc<FakeObject>) -> Self {
        self.children
            .push((NameComponent::new(id, kind), FakeNode::Object(object)));
        self
    }

    pub fn unresolvable(mut self, id: &str) -> Self {
        self.children
            .push((NameComponent::new(id, ""), FakeNode::Unresolvable));
        self
    }

    pub fn broken_context(mut self, id: &str) -> Self {
        self.children
            .push((NameComponent::new(id, ""), FakeNode::BrokenContext));
        self
    }

    /// Return at most `limit` bindings in the first page
    pub fn paged(mut self, limit: usize) -> Self {
        self.page_limit = Some(limit);
        self
    }

    pub fn fail_listing(&self, fail: bool) {
        self.list_fails.store(fail, Ordering::SeqCst);
    }

    fn find(&self, name: &[NameComponent]) -> Result<&FakeNode, DirectoryError> {
        let wanted = name
            .first()
            .ok_or_else(|| DirectoryError::NotFound(String::new()))?;
        self.children
            .iter()
            .find(|(component, _)| component == wanted)
            .map(|(_, node)| node)
            .ok_or_else(|| DirectoryError::NotFound(wanted.id.clone()))
    }
}

struct FakeIterator {
    rest: VecDeque<Binding>,
    destroyed: Arc<AtomicUsize>,
}

impl BindingIterator for FakeIterator {
    fn next_one(&mut self) -> Result<Option<Binding>, DirectoryError> {
        Ok(self.rest.pop_front())
    }
    fn destroy(&mut self) {
        self.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

impl NamingContext for FakeContext {
    fn list(&self, how_many: u32) -> Result<Listing, DirectoryError> {
        if self.list_fails.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("connection reset".to_string()));
        }
        let mut bindings: VecDeque<Binding> = self
            .children
            .iter()
            .map(|(component, node)| Binding {
                name: vec![component.clone()],
                kind: match node {
                    FakeNode::Context(_) | FakeNode::BrokenContext => BindingKind::Context,
                    FakeNode::Object(_) | FakeNode::Unresolvable => BindingKind::Object,
                },
            })
            .collect();

        let first = self
            .page_limit
            .unwrap_or(usize::MAX)
            .min(how_many as usize)
            .min(bindings.len());
        let page: Vec<Binding> = bindings.drain(..first).collect();
        let rest = if bindings.is_empty() {
            None
        } else {
            Some(Box::new(FakeIterator {
                rest: bindings,
                destroyed: Arc::clone(&self.destroyed_iterators),
            }) as Box<dyn BindingIterator>)
        };
        Ok((page, rest))
    }

    fn resolve_context(&self, name: &[NameComponent]) -> Result<Arc<dyn NamingContext>, DirectoryError> {
        match self.find(name)? {
            FakeNode::Context(ctx) => Ok(Arc::clone(ctx) as Arc<dyn NamingContext>),
            FakeNode::BrokenContext => Err(DirectoryError::CallFailed("TRANSIENT".to_string())),
            _ => Err(DirectoryError::NotAContext(name[0].id.clone())),
        }
    }

    fn resolve_object(&self, name: &[NameComponent]) -> Result<Arc<dyn ObjectRef>, DirectoryError> {
        match self.find(name)? {
            FakeNode::Object(object) => Ok(Arc::clone(object) as Arc<dyn ObjectRef>),
            FakeNode::Unresolvable => Err(DirectoryError::CallFailed(format!(
                "OBJECT_NOT_EXIST resolving {}",
                name[0].id
            ))),
            _ => Err(DirectoryError::NotFound(name[0].id.clone())),
        }
    }
}

/// Connector whose strategies can be made to fail
pub struct FakeConnector {
    root: Arc<FakeContext>,
    pub initial_fails: AtomicBool,
    pub fallback_fails: AtomicBool,
    pub initial_calls: AtomicUsize,
    pub fallback_calls: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(root: Arc<FakeContext>) -> Arc<Self> {
        Arc::new(Self {
            root,
            initial_fails: AtomicBool::new(false),
            fallback_fails: AtomicBool::new(false),
            initial_calls: AtomicUsize::new(0),
            fallback_calls: Mutex::new(Vec::new()),
        })
    }
}

impl DirectoryConnector for FakeConnector {
    fn resolve_initial(&self) -> Result<Arc<dyn NamingContext>, DirectoryError> {
        self.initial_calls.fetch_add(1, Ordering::SeqCst);
        if self.initial_fails.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("no initial reference".to_string()));
        }
        Ok(Arc::clone(&self.root) as Arc<dyn NamingContext>)
    }

    fn resolve_str(&self, reference: &str) -> Result<Arc<dyn NamingContext>, DirectoryError> {
        self.fallback_calls.lock().push(reference.to_string());
        if self.fallback_fails.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable(reference.to_string()));
        }
        Ok(Arc::clone(&self.root) as Arc<dyn NamingContext>)
    }
}

/// `root -> {ctxA -> {obj1, obj2 (fails to resolve)}, obj3}`
pub fn fleet_directory() -> Arc<FakeContext> {
    Arc::new(
        FakeContext::new()
            .context(
                "ctxA",
                FakeContext::new()
                    .object("obj1", "", FakeObject::at("10.0.0.5", 2809))
                    .unresolvable("obj2"),
            )
            .object("obj3", "", FakeObject::at("10.0.0.6", 9001)),
    )
}
