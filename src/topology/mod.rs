/*!
 * Directory Topology
 *
 * Discovers the naming directory tree and reports it to the collector.
 * Independent of the traffic path apart from the shared transport.
 */

mod directory;
mod entry;
mod scanner;
mod walk;

pub use directory::{
    Binding, BindingIterator, BindingKind, DirectoryConnector, Listing, NameComponent,
    NamingContext, ObjectRef,
};
pub use entry::{EntryType, NamingEntry, NamingReport};
pub use scanner::TopologyScanner;
pub use walk::walk;
