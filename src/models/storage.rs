use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use rocket::tokio::fs;
use tracing::debug;

/// Outcome of [`FileStorage::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    /// Nothing was stored at that location.
    Missing,
}

/// Byte storage for uploaded attachments.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `bytes` under `name` and returns the location handle to
    /// persist.
    async fn store(&self, bytes: &[u8], name: &str) -> io::Result<String>;

    async fn remove(&self, location: &str) -> io::Result<Removal>;

    async fn exists(&self, location: &str) -> io::Result<bool>;
}

/// Files in a local directory, published as `public_prefix + file name`.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
    public_prefix: String,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Creates the upload directory if needed.
    pub async fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Only the last path component is used, both when storing and when
    /// resolving a location, so nothing escapes `root`.
    fn path_of(&self, name: &str) -> io::Result<PathBuf> {
        Path::new(name)
            .file_name()
            .map(|file| self.root.join(file))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid file name {name:?}"),
                )
            })
    }
}

#[async_trait]
impl FileStorage for DiskStorage {
    async fn store(&self, bytes: &[u8], name: &str) -> io::Result<String> {
        let path = self.path_of(name)?;
        fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "file stored");

        let file = path.file_name().unwrap_or_default().to_string_lossy();
        Ok(format!("{}{}", self.public_prefix, file))
    }

    async fn remove(&self, location: &str) -> io::Result<Removal> {
        let path = self.path_of(location)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "file removed");
                Ok(Removal::Removed)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removal::Missing),
            Err(e) => Err(e),
        }
    }

    async fn exists(&self, location: &str) -> io::Result<bool> {
        match fs::metadata(self.path_of(location)?).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn store_then_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path(), "/media/");

        let location = storage.store(b"image", "cat.png").await.unwrap();
        assert_eq!(location, "/media/cat.png");
        assert_eq!(std::fs::read(dir.path().join("cat.png")).unwrap(), b"image");
        assert!(storage.exists(&location).await.unwrap());

        assert_eq!(storage.remove(&location).await.unwrap(), Removal::Removed);
        assert!(!storage.exists(&location).await.unwrap());
        assert_eq!(storage.remove(&location).await.unwrap(), Removal::Missing);
    }

    #[rocket::async_test]
    async fn names_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DiskStorage::new(dir.path().join("uploads"), "/media/");
        storage.prepare().await.unwrap();

        let location = storage.store(b"x", "../../etc/evil.txt").await.unwrap();
        assert_eq!(location, "/media/evil.txt");
        assert!(dir.path().join("uploads/evil.txt").exists());

        assert!(storage.store(b"x", "..").await.is_err());
    }
}
