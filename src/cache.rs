// src/cache.rs
//
// Cache de leitura/escrita na frente do banco. Os valores são JSON e as
// chaves seguem `modulo` (coleção) e `modulo:id` (registro).

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    common::error::AppError,
    models::{
        document::{Document, DocumentRequirement},
        party::Party,
    },
};

pub mod memory;
pub mod redis_store;
pub mod service;

pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;
pub use service::{CacheService, CacheUpdate};

/// Armazenamento chave/valor; TTL e expulsão são responsabilidade de cada implementação.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: String) -> Result<(), AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

/// Entidades que podem ir para o cache.
pub trait Cacheable: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn cache_id(&self) -> i32;
}

impl Cacheable for Party {
    fn cache_id(&self) -> i32 {
        self.id
    }
}

impl Cacheable for Document {
    fn cache_id(&self) -> i32 {
        self.id
    }
}

impl Cacheable for DocumentRequirement {
    fn cache_id(&self) -> i32 {
        self.id
    }
}
