//! Memoized type resolution
//!
//! Resolved types are cached by the exact spec string the caller used.
//! No lock is held while a type is being built, so a builder may resolve
//! other specs through the same cache. Two threads missing the same key at
//! once may both build; the first insert wins and both get that instance.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::Result;
use crate::spec::TypeSpec;
use crate::types::Type;

/// Concurrent spec-string to type cache
#[derive(Debug, Default)]
pub struct TypeCache {
    entries: DashMap<String, Type>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Type> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Return the cached type for `key`, building and storing it on a miss
    ///
    /// Failed builds are not cached.
    pub fn fetch_or_build<F>(&self, key: &str, build: F) -> Result<Type>
    where
        F: FnOnce() -> Result<Type>,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }

        tracing::debug!(key, "type cache miss");
        let built = build()?;

        // Another caller may have stored a result while we were building.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(existing) => Ok(existing.get().clone()),
            Entry::Vacant(slot) => Ok(slot.insert(built).value().clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry whose spec uses `name` as a registry key
    pub fn invalidate(&self, name: &str) {
        self.entries.retain(|key, _| {
            !TypeSpec::parse(key).map_or(key == name, |spec| spec.mentions(name))
        });
    }

    /// Drop every cached type
    pub fn clear(&self) {
        self.entries.clear();
    }
}
