//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::KeyPattern;
use crate::error::{CacheError, Result};

/// Request body for POST /caches/:name/invalidate
///
/// # Fields
/// - `pattern`: Substring, or regex when `regex` is true
/// - `regex`: Interpret `pattern` as a regular expression (default: false)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub pattern: String,
    #[serde(default)]
    pub regex: bool,
}

impl InvalidateRequest {
    /// Builds the key pattern, rejecting empty or malformed input.
    pub fn key_pattern(&self) -> Result<KeyPattern> {
        if self.pattern.is_empty() {
            // An empty substring would match every key
            return Err(CacheError::InvalidRequest(
                "Pattern cannot be empty; use DELETE /caches/:name to clear".to_string(),
            ));
        }
        if self.regex {
            KeyPattern::regex(&self.pattern)
        } else {
            Ok(KeyPattern::from(self.pattern.as_str()))
        }
    }
}
