//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::Utc;
use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Serialized as `{"data", "createdAt", "ttlMs"}`, the record shape used by
/// the persistence backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The stored value
    pub data: T,
    /// Creation timestamp (Unix milliseconds), never mutated
    pub created_at: u64,
    /// Milliseconds this entry stays valid after `created_at`
    pub ttl_ms: u64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    pub fn new(data: T, ttl_ms: u64) -> Self {
        Self {
            data,
            created_at: current_timestamp_ms(),
            ttl_ms,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry expires once strictly more than `ttl_ms` milliseconds have
    /// passed since creation; at exactly `ttl_ms` it is still valid.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Expiry check against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.age_ms_at(now_ms) > self.ttl_ms
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was created.
    pub fn age_ms(&self) -> u64 {
        self.age_ms_at(current_timestamp_ms())
    }

    pub fn age_ms_at(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }

    // == Time To Live ==
    /// Returns remaining validity in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms())
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("test_value".to_string(), 60_000);

        assert_eq!(entry.data, "test_value");
        assert_eq!(entry.ttl_ms, 60_000);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(1u32, 50);

        assert!(!entry.is_expired());

        sleep(Duration::from_millis(100));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry {
            data: "test",
            created_at: 1_000,
            ttl_ms: 100,
        };

        // Exactly ttl_ms old is still valid
        assert!(!entry.is_expired_at(1_100));
        assert!(entry.is_expired_at(1_101));
    }

    #[test]
    fn test_zero_ttl_expires_after_one_ms() {
        let entry = CacheEntry {
            data: (),
            created_at: 500,
            ttl_ms: 0,
        };

        assert!(!entry.is_expired_at(500));
        assert!(entry.is_expired_at(501));
    }

    #[test]
    fn test_clock_skew_does_not_underflow() {
        let entry = CacheEntry {
            data: (),
            created_at: 10_000,
            ttl_ms: 10,
        };

        // Clock went backwards; treat as age 0
        assert_eq!(entry.age_ms_at(5_000), 0);
        assert!(!entry.is_expired_at(5_000));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new("v", 10_000);

        let remaining = entry.ttl_remaining_ms();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_serialized_record_shape() {
        let entry = CacheEntry {
            data: vec![1, 2],
            created_at: 42,
            ttl_ms: 7,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["ttlMs"], 7);
    }
}
