//! Persistence Module
//!
//! Storage media a store can mirror itself into, and the best-effort
//! load/save boundary between a store and its medium.
//!
//! A store's full entry list is persisted as one JSON array of
//! `[key, {"data", "createdAt", "ttlMs"}]` pairs under its namespace.

mod file;
mod memory;

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

pub use file::FileMedium;
pub use memory::MemoryMedium;

// == Backend Kind ==
/// Where a store's entries survive to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Memory only; nothing outlives the store
    #[default]
    None,
    /// Survives store reconstruction for the lifetime of the process
    Ephemeral,
    /// Survives process restarts
    Durable,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::None => "none",
            BackendKind::Ephemeral => "ephemeral",
            BackendKind::Durable => "durable",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "memory" => Ok(BackendKind::None),
            "ephemeral" | "session" => Ok(BackendKind::Ephemeral),
            "durable" | "local" => Ok(BackendKind::Durable),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown backend kind '{}'",
                other
            ))),
        }
    }
}

// == Storage Medium ==
/// Raw string slots keyed by namespace.
pub trait StorageMedium: Send + Sync + fmt::Debug {
    /// Returns the payload stored under `namespace`, if any.
    fn read(&self, namespace: &str) -> Result<Option<String>>;

    /// Replaces the payload stored under `namespace`.
    fn write(&self, namespace: &str, payload: &str) -> Result<()>;

    /// Identifies the physical slot backing `namespace`. Namespaces that
    /// resolve to the same slot share storage.
    fn slot_for(&self, namespace: &str) -> String {
        namespace.to_string()
    }
}

// == Backends ==
/// The storage media available to stores created in one context.
///
/// Stores built from the same `Backends` share its ephemeral medium, the
/// way tabs share nothing but pages within a tab share session storage.
#[derive(Debug, Clone)]
pub struct Backends {
    ephemeral: Option<Arc<MemoryMedium>>,
    durable: Option<Arc<FileMedium>>,
    claims: Arc<Mutex<HashSet<String>>>,
}

impl Backends {
    /// Builds backends with an in-process ephemeral medium and, when a
    /// directory is given, a file-backed durable medium.
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self {
            ephemeral: Some(Arc::new(MemoryMedium::new())),
            durable: cache_dir.map(|dir| Arc::new(FileMedium::new(dir))),
            claims: Arc::default(),
        }
    }

    /// Backends for a non-interactive context: every kind is a no-op.
    pub fn detached() -> Self {
        Self {
            ephemeral: None,
            durable: None,
            claims: Arc::default(),
        }
    }

    /// Replaces the ephemeral medium, e.g. with a quota-limited one.
    pub fn with_ephemeral(mut self, medium: MemoryMedium) -> Self {
        self.ephemeral = Some(Arc::new(medium));
        self
    }

    pub fn ephemeral(&self) -> Option<&MemoryMedium> {
        self.ephemeral.as_deref()
    }

    // == Attach ==
    /// Binds a namespace to the medium for `kind`.
    ///
    /// Fails with `NamespaceInUse` while another live store persists to the
    /// same slot of the same medium, even under a different namespace.
    pub fn attach(&self, kind: BackendKind, namespace: &str) -> Result<Persistence> {
        let medium: Option<Arc<dyn StorageMedium>> = match kind {
            BackendKind::None => None,
            BackendKind::Ephemeral => self
                .ephemeral
                .clone()
                .map(|m| m as Arc<dyn StorageMedium>),
            BackendKind::Durable => self.durable.clone().map(|m| m as Arc<dyn StorageMedium>),
        };

        let Some(medium) = medium else {
            if kind != BackendKind::None {
                debug!(
                    "No {} medium available, '{}' will not be persisted",
                    kind, namespace
                );
            }
            return Ok(Persistence::detached(namespace, kind));
        };

        let slot = medium.slot_for(namespace);
        let claim = NamespaceClaim::acquire(&self.claims, format!("{}:{}", kind, slot))
            .map_err(|_| {
                CacheError::NamespaceInUse(if slot == namespace {
                    format!("{}:{}", kind, namespace)
                } else {
                    format!("{}:{} (stored as '{}')", kind, namespace, slot)
                })
            })?;

        Ok(Persistence {
            namespace: namespace.to_string(),
            kind,
            medium: Some(medium),
            _claim: Some(claim),
        })
    }
}

// == Namespace Claim ==
/// Reservation of one `kind:namespace` slot, released on drop.
#[derive(Debug)]
struct NamespaceClaim {
    claims: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl NamespaceClaim {
    fn acquire(claims: &Arc<Mutex<HashSet<String>>>, key: String) -> Result<Self> {
        if !claims.lock().insert(key.clone()) {
            return Err(CacheError::NamespaceInUse(key));
        }
        Ok(Self {
            claims: Arc::clone(claims),
            key,
        })
    }
}

impl Drop for NamespaceClaim {
    fn drop(&mut self) {
        self.claims.lock().remove(&self.key);
    }
}

// == Persistence ==
/// A store's handle on its medium.
///
/// Both directions are best-effort: failures are logged, never returned.
#[derive(Debug)]
pub struct Persistence {
    namespace: String,
    kind: BackendKind,
    medium: Option<Arc<dyn StorageMedium>>,
    _claim: Option<NamespaceClaim>,
}

impl Persistence {
    /// A handle that loads nothing and saves nowhere.
    pub fn detached(namespace: &str, kind: BackendKind) -> Self {
        Self {
            namespace: namespace.to_string(),
            kind,
            medium: None,
            _claim: None,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Configured kind, even when no medium backs it.
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn is_attached(&self) -> bool {
        self.medium.is_some()
    }

    // == Load ==
    /// Reads the persisted entry list. Unreadable data counts as none.
    pub fn load<T: DeserializeOwned>(&self) -> Vec<(String, CacheEntry<T>)> {
        let Some(medium) = &self.medium else {
            return Vec::new();
        };

        let raw = match medium.read(&self.namespace) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read cache '{}': {}", self.namespace, e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Discarding unreadable cache data for '{}': {}", self.namespace, e);
                Vec::new()
            }
        }
    }

    // == Save ==
    /// Replaces the persisted entry list with `records`.
    pub fn save<S: Serialize + ?Sized>(&self, records: &S) {
        let Some(medium) = &self.medium else {
            return;
        };

        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize cache '{}': {}", self.namespace, e);
                return;
            }
        };

        if let Err(e) = medium.write(&self.namespace, &payload) {
            warn!("Failed to persist cache '{}': {}", self.namespace, e);
        }
    }
}
