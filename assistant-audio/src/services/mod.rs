//! Pipeline collaborators: traversal, analysis backend, tag storage and
//! reconciliation

pub mod backend_client;
pub mod ignore_rules;
pub mod path_enumerator;
pub mod reconciler;
pub mod tag_store;

pub use backend_client::{AudioAnalyzer, BackendClient};
pub use ignore_rules::IgnoreRules;
pub use path_enumerator::{Entries, PathEnumerator, PathFilter};
pub use reconciler::{ReconcilePolicy, Reconciler};
pub use tag_store::{LoftyTagStore, TagStore, WriteReport};
