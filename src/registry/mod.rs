pub mod doc_store;
pub mod pattern_cache;
pub mod session_registry;

pub use doc_store::*;
pub use pattern_cache::*;
pub use session_registry::*;
