//! Ephemeral storage medium: process-lifetime string slots.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::StorageMedium;
use crate::error::{CacheError, Result};

/// In-memory slots keyed by namespace, with an optional total byte quota.
#[derive(Debug, Default)]
pub struct MemoryMedium {
    slots: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryMedium {
    pub fn new() -> Self {
        Self::default()
    }

    /// A medium refusing writes that would push total usage past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: RwLock::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently held across all namespaces.
    pub fn used_bytes(&self) -> usize {
        self.slots
            .read()
            .iter()
            .map(|(ns, payload)| ns.len() + payload.len())
            .sum()
    }
}

impl StorageMedium for MemoryMedium {
    fn read(&self, namespace: &str) -> Result<Option<String>> {
        Ok(self.slots.read().get(namespace).cloned())
    }

    fn write(&self, namespace: &str, payload: &str) -> Result<()> {
        let mut slots = self.slots.write();

        if let Some(quota) = self.quota_bytes {
            let others: usize = slots
                .iter()
                .filter(|(ns, _)| ns.as_str() != namespace)
                .map(|(ns, p)| ns.len() + p.len())
                .sum();
            let needed = others + namespace.len() + payload.len();
            if needed > quota {
                return Err(CacheError::QuotaExceeded { needed, quota });
            }
        }

        slots.insert(namespace.to_string(), payload.to_string());
        Ok(())
    }
}
