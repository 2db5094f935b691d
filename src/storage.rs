// src/storage.rs
//
// Bucket de arquivos dos documentos. Em produção o bucket é um diretório
// montado (volume/objeto), servido externamente em `STORAGE_PUBLIC_URL`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::common::error::AppError;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Copia `source` para o bucket com a chave `key` e devolve a URL pública.
    async fn upload(&self, source: &Path, key: &str) -> Result<String, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

pub struct LocalBucketStorage {
    root: PathBuf,
    public_url: String,
}

impl LocalBucketStorage {
    pub fn new(root: impl Into<PathBuf>, public_url: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        // chaves são geradas pelo serviço, mas nunca saem do bucket
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(AppError::StorageError(format!("Chave de objeto inválida: {key}")));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStorage for LocalBucketStorage {
    async fn upload(&self, source: &Path, key: &str) -> Result<String, AppError> {
        let target = self.path_for(key)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::StorageError(e.to_string()))?;
        }
        tokio::fs::copy(source, &target)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        Ok(format!("{}/{}", self.public_url, key))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let target = self.path_for(key)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::StorageError(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_copies_the_file_and_returns_its_public_url() {
        let bucket = tempfile::tempdir().unwrap();
        let source = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(source.path(), b"pdf bytes").unwrap();

        let storage = LocalBucketStorage::new(bucket.path(), "http://localhost:3000/files/");
        let url = storage.upload(source.path(), "documents/abc-rg.pdf").await.unwrap();

        assert_eq!(url, "http://localhost:3000/files/documents/abc-rg.pdf");
        let stored = std::fs::read(bucket.path().join("documents/abc-rg.pdf")).unwrap();
        assert_eq!(stored, b"pdf bytes");

        storage.delete("documents/abc-rg.pdf").await.unwrap();
        storage.delete("documents/abc-rg.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn keys_cannot_escape_the_bucket() {
        let bucket = tempfile::tempdir().unwrap();
        let storage = LocalBucketStorage::new(bucket.path(), "http://x");
        let err = storage.upload(Path::new("/etc/hosts"), "../hosts").await.unwrap_err();
        assert!(matches!(err, AppError::StorageError(_)));
    }
}
