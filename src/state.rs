use crate::config::Config;
use crate::registry::{DocumentStore, PatternCache, SessionRegistry};

/// Process-wide state handed to every connection routine and HTTP handler.
#[derive(Debug)]
pub struct AppState {
    pub documents: DocumentStore,
    pub sessions: SessionRegistry,
    pub patterns: PatternCache,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            documents: DocumentStore::with_max_length(config.max_document_length),
            sessions: SessionRegistry::new(),
            patterns: PatternCache::new(config.pattern_cache_capacity),
        }
    }
}
