// src/cache/redis_store.rs

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use super::CacheStore;
use crate::common::error::AppError;

/// Cache compartilhado entre instâncias. Toda chave ganha o prefixo da aplicação.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
    prefix: String,
    ttl_secs: u64,
}

impl RedisCacheStore {
    pub async fn connect(url: &str, prefix: &str, ttl_secs: u64) -> Result<Self, AppError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("✅ Cache Redis conectado.");
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
            ttl_secs,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(self.key(key), value, self.ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(self.key(key)).await?;
        Ok(())
    }
}
