//! Filesystem-backed disk

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{RenderError, Result};
use crate::storage::Disk;

/// Disk rooted at a local directory
pub struct LocalDisk {
    root: PathBuf,
}

impl LocalDisk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn destination(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Disk for LocalDisk {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let dest = self.destination(path);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RenderError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&dest, bytes)
            .await
            .map_err(|e| RenderError::Storage(format!("{}: {}", dest.display(), e)))?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let disk = LocalDisk::new(dir.path());

        disk.put("invoices/2024/jan.pdf", b"%PDF").await.unwrap();

        let written = std::fs::read(dir.path().join("invoices/2024/jan.pdf")).unwrap();
        assert_eq!(written, b"%PDF");
    }

    #[tokio::test]
    async fn test_leading_slash_stays_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let disk = LocalDisk::new(dir.path());

        disk.put("/out.pdf", b"%PDF").await.unwrap();
        assert!(dir.path().join("out.pdf").exists());
    }
}
