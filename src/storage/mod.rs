//! Storage disks
//!
//! Named output backends for persisted documents. A `DiskRegistry` resolves
//! a disk by name, falling back to the configured default when a sink call
//! does not name one. Backend failures propagate unmodified inside
//! `RenderError::Storage`.

mod local;
mod s3;

pub use local::LocalDisk;
pub use s3::S3Disk;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{RenderError, Result};

/// A write-only storage backend
#[async_trait]
pub trait Disk: Send + Sync {
    /// Write `bytes` at `path`, creating intermediate structure as needed
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()>;
}

/// Named disks plus a default
pub struct DiskRegistry {
    disks: HashMap<String, Arc<dyn Disk>>,
    default: String,
}

impl DiskRegistry {
    pub fn new(default_disk: impl Into<String>) -> Self {
        Self {
            disks: HashMap::new(),
            default: default_disk.into(),
        }
    }

    /// Build the registry the server uses: always a local disk, plus an S3
    /// disk when a bucket is configured.
    pub async fn from_config(config: &Config) -> Self {
        let mut registry = Self::new(&config.storage.default_disk);
        registry.register(
            "local",
            Arc::new(LocalDisk::new(config.storage.local_root.clone())),
        );
        if let Some(s3) = &config.storage.s3 {
            registry.register("s3", Arc::new(S3Disk::from_config(s3).await));
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, disk: Arc<dyn Disk>) {
        self.disks.insert(name.into(), disk);
    }

    pub fn default_disk(&self) -> &str {
        &self.default
    }

    /// Resolve a disk by name, or the default when none is given
    pub fn resolve(&self, name: Option<&str>) -> Result<(&str, Arc<dyn Disk>)> {
        let name = name.unwrap_or(&self.default);
        match self.disks.get_key_value(name) {
            Some((key, disk)) => Ok((key.as_str(), Arc::clone(disk))),
            None => Err(RenderError::Storage(format!("unknown disk `{name}`"))),
        }
    }

    /// Resolve and write in one step
    pub async fn put(&self, name: Option<&str>, path: &str, bytes: &[u8]) -> Result<()> {
        let (_, disk) = self.resolve(name)?;
        disk.put(path, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryDisk {
        writes: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl Disk for MemoryDisk {
        async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
            self.writes
                .lock()
                .unwrap()
                .push((path.to_string(), bytes.len()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_named_disk_resolution() {
        let mut registry = DiskRegistry::new("a");
        registry.register("a", Arc::new(MemoryDisk::default()));
        registry.register("b", Arc::new(MemoryDisk::default()));

        let (name, _) = registry.resolve(Some("b")).unwrap();
        assert_eq!(name, "b");
    }

    #[tokio::test]
    async fn test_default_disk_fallback() {
        let disk = Arc::new(MemoryDisk::default());
        let mut registry = DiskRegistry::new("a");
        registry.register("a", disk.clone());

        let (name, _) = registry.resolve(None).unwrap();
        assert_eq!(name, "a");

        registry.put(None, "out.pdf", b"pdf").await.unwrap();
        assert_eq!(
            disk.writes.lock().unwrap().as_slice(),
            &[("out.pdf".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn test_unknown_disk_is_a_storage_error() {
        let registry = DiskRegistry::new("a");
        let err = registry.resolve(Some("missing"));
        assert!(matches!(err, Err(RenderError::Storage(_))));
    }
}
