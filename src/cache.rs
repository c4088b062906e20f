//! Single-slot holder for the latest route result.
//!
//! Each invalidation advances a generation counter. Results are only stored
//! when tagged with the current generation, so a response to a request issued
//! before the last invalidation can never land in the cache.

use crate::model::RouteResult;

#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    result: Option<RouteResult>,
    generation: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<&RouteResult> {
        self.result.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_none()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drop the cached result and start a new generation.
    pub fn invalidate(&mut self) -> u64 {
        self.result = None;
        self.advance()
    }

    /// Start a new generation, keeping the current result.
    pub fn advance(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Store `result` if `generation` is still current.
    pub fn store(&mut self, generation: u64, result: RouteResult) -> bool {
        if generation != self.generation {
            return false;
        }
        self.result = Some(result);
        true
    }
}
