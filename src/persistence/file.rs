//! Durable storage medium: one JSON file per namespace.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::StorageMedium;
use crate::error::Result;

/// Files inside `dir`, named after the namespace.
#[derive(Debug, Clone)]
pub struct FileMedium {
    dir: PathBuf,
}

impl FileMedium {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path backing `namespace`. Characters unsafe in file names become `_`,
    /// so distinct namespaces can map to one file; see `slot_for`.
    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.dir.join(file_name(namespace))
    }
}

fn file_name(namespace: &str) -> String {
    let stem: String = namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.json", stem)
}

impl StorageMedium for FileMedium {
    fn read(&self, namespace: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(namespace)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, namespace: &str, payload: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so readers never see a torn file
        let path = self.path_for(namespace);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn slot_for(&self, namespace: &str) -> String {
        file_name(namespace)
    }
}
