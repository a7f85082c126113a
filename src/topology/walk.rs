/*!
 * Directory Walk
 *
 * Pre-order traversal over an explicit frame stack. Each frame owns one
 * context's remaining first-page bindings and its overflow iterator, so a
 * failure below a context only loses that subtree.
 */

use super::directory::{Binding, BindingIterator, BindingKind, NameComponent, NamingContext};
use super::entry::NamingEntry;
use crate::addressing::{parse_endpoint, Ior};
use crate::core::limits::{LIST_PAGE_SIZE, MAX_WALK_DEPTH};
use crate::core::DirectoryError;
use std::sync::Arc;
use tracing::debug;

struct Frame {
    context: Arc<dyn NamingContext>,
    path: String,
    depth: usize,
    page: std::vec::IntoIter<Binding>,
    rest: Option<Box<dyn BindingIterator>>,
}

impl Frame {
    fn open(context: Arc<dyn NamingContext>, path: String, depth: usize) -> Result<Self, DirectoryError> {
        let (page, rest) = context.list(LIST_PAGE_SIZE)?;
        Ok(Self {
            context,
            path,
            depth,
            page: page.into_iter(),
            rest,
        })
    }

    fn next_binding(&mut self) -> Option<Binding> {
        if let Some(binding) = self.page.next() {
            return Some(binding);
        }
        let result = self.rest.as_mut()?.next_one();
        match result {
            Ok(Some(binding)) => Some(binding),
            Ok(None) => {
                self.close();
                None
            }
            Err(e) => {
                debug!(path = %self.path, error = %e, "Binding iterator failed");
                self.close();
                None
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut rest) = self.rest.take() {
            rest.destroy();
        }
    }

    fn child_path(&self, component: &NameComponent) -> String {
        if self.path.is_empty() {
            component.segment()
        } else {
            format!("{}/{}", self.path, component.segment())
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.close();
    }
}

/// Walk the whole tree under `root`
///
/// Only a failure to list the root itself is an error; failures below it are
/// logged and the affected branch is skipped.
pub fn walk(root: Arc<dyn NamingContext>) -> Result<Vec<NamingEntry>, DirectoryError> {
    let mut entries = Vec::new();
    let mut stack = vec![Frame::open(root, String::new(), 0)?];

    while let Some(frame) = stack.last_mut() {
        let Some(binding) = frame.next_binding() else {
            stack.pop();
            continue;
        };
        let Some(component) = binding.name.first() else {
            continue;
        };
        let name = std::slice::from_ref(component);
        let path = frame.child_path(component);

        match binding.kind {
            BindingKind::Context => {
                entries.push(NamingEntry::context(path.clone(), &component.id, &component.kind));

                let depth = frame.depth + 1;
                if depth > MAX_WALK_DEPTH {
                    debug!(path = %path, "Maximum walk depth reached, not descending");
                    continue;
                }
                let child = frame
                    .context
                    .resolve_context(name)
                    .and_then(|context| Frame::open(context, path.clone(), depth));
                match child {
                    Ok(child) => stack.push(child),
                    Err(e) => debug!(path = %path, error = %e, "Cannot descend into context"),
                }
            }
            BindingKind::Object => {
                entries.push(inspect_object(frame.context.as_ref(), path, component));
            }
        }
    }

    Ok(entries)
}

/// Resolve a leaf binding and probe it; failures are recorded on the entry
fn inspect_object(context: &dyn NamingContext, path: String, component: &NameComponent) -> NamingEntry {
    let mut entry = NamingEntry::object(path, &component.id, &component.kind);

    let object = match context.resolve_object(std::slice::from_ref(component)) {
        Ok(object) => object,
        Err(e) => {
            entry.failed(e);
            return entry;
        }
    };

    let ior = match object.to_portable_string() {
        Ok(ior) => ior,
        Err(e) => {
            entry.failed(e);
            return entry;
        }
    };
    if let Some(endpoint) = parse_endpoint(&ior) {
        entry.host = Some(endpoint.host);
        entry.port = endpoint.port;
    }
    entry.ior_length = Ior::parse(&ior).map(|parsed| parsed.byte_len);
    entry.ior = Some(ior);

    match object.non_existent() {
        Ok(gone) => entry.is_alive = Some(!gone),
        Err(e) => entry.failed(e),
    }
    entry
}
