//! Word-level transliteration cache shared by the per-word backends

use parking_lot::RwLock;
use std::collections::HashMap;

use gu_xlit_core::Language;

/// Bounded word cache
///
/// Eviction clears half the entries when full; order is arbitrary.
pub(crate) struct WordCache {
    entries: RwLock<HashMap<(Language, String), String>>,
    max_size: usize,
}

impl WordCache {
    pub(crate) fn new(max_size: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_size,
        }
    }

    pub(crate) fn get(&self, word: &str, language: Language) -> Option<String> {
        if self.max_size == 0 {
            return None;
        }
        self.entries
            .read()
            .get(&(language, word.to_lowercase()))
            .cloned()
    }

    pub(crate) fn insert(&self, word: &str, language: Language, native: String) {
        if self.max_size == 0 {
            return;
        }

        let mut entries = self.entries.write();
        if entries.len() >= self.max_size {
            let keys_to_remove: Vec<_> = entries
                .keys()
                .take((self.max_size / 2).max(1))
                .cloned()
                .collect();
            for key in keys_to_remove {
                entries.remove(&key);
            }
        }
        entries.insert((language, word.to_lowercase()), native);
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}
