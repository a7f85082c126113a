/*!
 * Naming Directory Access
 *
 * The directory service as seen by the scanner. The RPC runtime adapter
 * implements these traits; every call may fail with a `DirectoryError`.
 */

use crate::core::DirectoryError;
use std::sync::Arc;

/// One component of a binding name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameComponent {
    pub id: String,
    /// Optional qualifier; empty when unused
    pub kind: String,
}

impl NameComponent {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }

    /// `id` or `id.kind` when the kind is non-empty
    pub fn segment(&self) -> String {
        if self.kind.is_empty() {
            self.id.clone()
        } else {
            format!("{}.{}", self.id, self.kind)
        }
    }
}

/// Whether a binding names a sub-context or a leaf object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Context,
    Object,
}

/// A listed name and what it is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: Vec<NameComponent>,
    pub kind: BindingKind,
}

/// Resolved leaf object
pub trait ObjectRef: Send + Sync {
    /// Portable string form (stringified IOR)
    fn to_portable_string(&self) -> Result<String, DirectoryError>;
    /// Liveness probe; `Ok(true)` means the object is gone
    fn non_existent(&self) -> Result<bool, DirectoryError>;
}

/// Continuation of a listing beyond the first page
pub trait BindingIterator: Send {
    /// `Ok(None)` when exhausted
    fn next_one(&mut self) -> Result<Option<Binding>, DirectoryError>;
    /// Release the server-side iterator
    fn destroy(&mut self);
}

/// Page of bindings plus an optional continuation
pub type Listing = (Vec<Binding>, Option<Box<dyn BindingIterator>>);

/// A directory node
pub trait NamingContext: Send + Sync {
    /// First `how_many` bindings; the rest through the iterator
    fn list(&self, how_many: u32) -> Result<Listing, DirectoryError>;
    fn resolve_context(&self, name: &[NameComponent]) -> Result<Arc<dyn NamingContext>, DirectoryError>;
    fn resolve_object(&self, name: &[NameComponent]) -> Result<Arc<dyn ObjectRef>, DirectoryError>;
}

/// Obtains the directory root
pub trait DirectoryConnector: Send + Sync {
    /// The runtime's configured initial reference
    fn resolve_initial(&self) -> Result<Arc<dyn NamingContext>, DirectoryError>;
    /// Resolve a `corbaloc:` URL
    fn resolve_str(&self, reference: &str) -> Result<Arc<dyn NamingContext>, DirectoryError>;
}
