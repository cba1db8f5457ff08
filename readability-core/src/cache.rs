//! Per-file score cache keyed by exact code text
//!
//! Keys are exact, whitespace-sensitive text: two textually identical scopes
//! anywhere in the file collide and share one entry. There is no eviction
//! policy beyond wholesale replacement after each rating pass — entries not
//! re-keyed in the new pass are simply dropped. Keys are never normalized;
//! the cache-hit properties depend on exact-text semantics.

use std::collections::HashMap;

use crate::score::ScoreResult;

/// Mapping from exact code text to the last computed score for one file
#[derive(Debug, Clone, Default)]
pub struct ScoreCache {
    entries: HashMap<String, ScoreResult>,
}

impl ScoreCache {
    pub fn new() -> Self {
        ScoreCache::default()
    }

    pub fn get(&self, code: &str) -> Option<&ScoreResult> {
        self.entries.get(code)
    }

    pub fn insert(&mut self, code: String, result: ScoreResult) {
        self.entries.insert(code, result);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
