//! Invalidation Module
//!
//! Bulk removal of entries whose keys match a pattern, for use after a
//! mutation makes cached reads stale.

use regex::Regex;
use tracing::debug;

use crate::cache::CacheMaintenance;
use crate::error::Result;

// == Key Pattern ==
/// Selects keys to invalidate.
#[derive(Debug, Clone)]
pub enum KeyPattern {
    /// Key contains this literal substring
    Substring(String),
    /// Regex finds a match anywhere in the key
    Regex(Regex),
}

impl KeyPattern {
    /// Compiles a regex pattern.
    pub fn regex(pattern: &str) -> Result<Self> {
        Ok(Self::Regex(Regex::new(pattern)?))
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyPattern::Substring(needle) => key.contains(needle.as_str()),
            KeyPattern::Regex(re) => re.is_match(key),
        }
    }
}

impl From<&str> for KeyPattern {
    fn from(needle: &str) -> Self {
        Self::Substring(needle.to_string())
    }
}

impl From<String> for KeyPattern {
    fn from(needle: String) -> Self {
        Self::Substring(needle)
    }
}

impl From<Regex> for KeyPattern {
    fn from(re: Regex) -> Self {
        Self::Regex(re)
    }
}

// == Invalidate ==
/// Deletes every key matching `pattern` and returns how many were removed.
///
/// Goes through the store's regular `delete`, so each removal is persisted.
pub fn invalidate_cache<S>(pattern: impl Into<KeyPattern>, store: &mut S) -> usize
where
    S: CacheMaintenance + ?Sized,
{
    let pattern = pattern.into();
    let matching: Vec<String> = store
        .stats()
        .entries
        .into_iter()
        .map(|entry| entry.key)
        .filter(|key| pattern.matches(key))
        .collect();

    let removed = matching.iter().filter(|key| store.delete(key)).count();
    debug!(
        "Invalidated {} entries in '{}' matching {:?}",
        removed,
        store.namespace(),
        pattern
    );
    removed
}
