use moka::sync::Cache;
use regex::Regex;
use tracing::debug;

use crate::models::StoreError;

/// Compiled replace patterns, shared by every connection.
#[derive(Clone)]
pub struct PatternCache {
    cache: Cache<String, Regex>,
}

impl PatternCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            cache: Cache::builder().max_capacity(capacity).build(),
        }
    }

    pub fn get_or_compile(&self, pattern: &str) -> Result<Regex, StoreError> {
        if let Some(regex) = self.cache.get(pattern) {
            return Ok(regex);
        }
        debug!("Pattern cache miss for {:?}", pattern);
        let regex = Regex::new(pattern).map_err(|e| StoreError::InvalidPattern(e.to_string()))?;
        self.cache.insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
