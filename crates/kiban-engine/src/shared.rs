//! Shared engine handle for multi-client use.
//!
//! The engine itself is single-threaded and synchronous. For a production
//! multi-client environment, every mutating operation must run under one
//! mutual-exclusion boundary per tree instance, while pure reads may run
//! concurrently with each other. `SharedEngine` provides exactly that:
//! `write()` serializes mutations, `read()` shares the lock. Each tree is
//! independent — no cross-tree coordination exists.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::engine::BlockEngine;

/// Cloneable thread-safe handle to one tree engine.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<RwLock<BlockEngine>>,
}

impl SharedEngine {
    /// Wrap an engine for shared use.
    pub fn new(engine: BlockEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Run a pure read under the shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&BlockEngine) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run a mutation under the exclusive lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut BlockEngine) -> R) -> R {
        f(&mut self.inner.write())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CreateBlock;
    use kiban_types::{BlockVariant, JsonMap};
    use serde_json::json;

    fn text_params(content: &str) -> CreateBlock {
        let mut data = JsonMap::new();
        data.insert("content".to_string(), json!(content));
        CreateBlock {
            variant: BlockVariant::Text,
            data,
            ..Default::default()
        }
    }

    #[test]
    fn test_read_and_write() {
        let shared = SharedEngine::new(BlockEngine::with_builtin_schemas());
        let block = shared.write(|e| e.create(text_params("hello")).unwrap());
        let found = shared.read(|e| e.get(&block.id).cloned());
        assert_eq!(found.unwrap().id, block.id);
    }

    #[test]
    fn test_clones_share_one_tree() {
        let shared = SharedEngine::new(BlockEngine::with_builtin_schemas());
        let other = shared.clone();
        other.write(|e| e.create(text_params("from clone")).unwrap());
        assert_eq!(shared.read(|e| e.count()), 1);
    }

    #[test]
    fn test_concurrent_writers_serialize() {
        let shared = SharedEngine::new(BlockEngine::with_builtin_schemas());
        let mut handles = Vec::new();
        for t in 0..4 {
            let shared = shared.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    shared.write(|e| e.create(text_params(&format!("t{t}-{i}"))).unwrap());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.read(|e| e.count()), 100);
    }
}
