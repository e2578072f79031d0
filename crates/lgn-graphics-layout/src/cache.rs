use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};

use crate::{Error, Field, LayoutStrategy, Result, StandardLayout, StructDefinition, StructLayout};

struct CacheEntry {
    fields: Vec<Field>,
    layout: Arc<StructLayout>,
}

/// Layouts computed once per definition key.
pub struct LayoutCache<L = StandardLayout> {
    strategy: L,
    entries: HashMap<String, CacheEntry>,
}

impl LayoutCache<StandardLayout> {
    pub fn new() -> Self {
        Self::with_strategy(StandardLayout)
    }
}

impl Default for LayoutCache<StandardLayout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: LayoutStrategy> LayoutCache<L> {
    pub fn with_strategy(strategy: L) -> Self {
        Self {
            strategy,
            entries: HashMap::new(),
        }
    }

    /// Returns the cached layout for `definition.key()`, computing it on
    /// first use.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyConflict` if the key is already cached for a
    /// different field list.
    pub fn get_or_compute(&mut self, definition: &StructDefinition) -> Result<Arc<StructLayout>> {
        if let Some(entry) = self.entries.get(definition.key()) {
            if entry.fields != definition.fields() {
                return Err(Error::KeyConflict {
                    key: definition.key().to_owned(),
                });
            }
            trace!("struct layout '{}' served from cache", definition.key());
            return Ok(entry.layout.clone());
        }

        let layout = Arc::new(self.strategy.compute_layout(definition));
        debug!("caching struct layout '{}'", definition.key());
        self.entries.insert(
            definition.key().to_owned(),
            CacheEntry {
                fields: definition.fields().to_vec(),
                layout: layout.clone(),
            },
        );
        Ok(layout)
    }

    pub fn get(&self, key: &str) -> Option<Arc<StructLayout>> {
        self.entries.get(key).map(|entry| entry.layout.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
