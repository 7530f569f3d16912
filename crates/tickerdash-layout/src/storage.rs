//! Key/value storage for persisted UI state.
//!
//! `MemoryStorage` lives as long as the process (session scope);
//! `FileStorage` keeps a JSON object on disk (local scope).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::LayoutResult;

/// Grid layout, JSON array of layout entries.
pub const LAYOUT_KEY: &str = "dashboardLayout";
/// Selected auto-update interval.
pub const AUTO_UPDATE_INTERVAL_KEY: &str = "autoUpdateInterval";
/// Active theme name.
pub const THEME_KEY: &str = "theme";

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> LayoutResult<()>;
    fn remove(&self, key: &str) -> LayoutResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> LayoutResult<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> LayoutResult<()> {
        self.values.write().remove(key);
        Ok(())
    }
}

/// File-backed storage. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open `path`, creating parent directories. An unreadable or corrupt
    /// file starts empty and is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> LayoutResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Corrupt storage file, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = values.len(), "Opened storage file");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> LayoutResult<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> LayoutResult<()> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> LayoutResult<()> {
        let mut values = self.values.lock();
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}
