// src/cache/service.rs

use std::sync::Arc;

use super::{CacheStore, Cacheable};
use crate::common::error::AppError;

/// O que uma escrita deixa no cache: o registro alterado e/ou a coleção inteira.
pub struct CacheUpdate<'a, T> {
    pub module_name: &'a str,
    pub created_or_updated: Option<&'a T>,
    pub all_entities: Option<Vec<T>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CacheHit<T> {
    One(T),
    All(Vec<T>),
}

#[derive(Clone)]
pub struct CacheService {
    store: Arc<dyn CacheStore>,
}

impl CacheService {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn insert_or_update_cache<T: Cacheable>(&self, update: CacheUpdate<'_, T>) -> Result<(), AppError> {
        if let Some(entity) = update.created_or_updated {
            let key = entity_key(update.module_name, entity.cache_id());
            self.store.set(&key, encode(entity)?).await?;
        }

        if let Some(mut all) = update.all_entities {
            all.sort_by_key(|e| e.cache_id());
            self.store.set(update.module_name, encode(&all)?).await?;
        }

        Ok(())
    }

    /// Com `id` busca o registro, sem `id` a coleção. `None` é miss.
    pub async fn get_from_cache<T: Cacheable>(
        &self,
        module_name: &str,
        id: Option<i32>,
    ) -> Result<Option<CacheHit<T>>, AppError> {
        Ok(match id {
            Some(id) => self.read(&entity_key(module_name, id)).await?.map(CacheHit::One),
            None => self.read(module_name).await?.map(CacheHit::All),
        })
    }

    pub async fn get_one<T: Cacheable>(&self, module_name: &str, id: i32) -> Result<Option<T>, AppError> {
        match self.get_from_cache(module_name, Some(id)).await? {
            Some(CacheHit::One(entity)) => Ok(Some(entity)),
            _ => Ok(None),
        }
    }

    pub async fn get_all<T: Cacheable>(&self, module_name: &str) -> Result<Option<Vec<T>>, AppError> {
        match self.get_from_cache(module_name, None).await? {
            Some(CacheHit::All(all)) => Ok(Some(all)),
            _ => Ok(None),
        }
    }

    /// Apaga o registro e a coleção; a próxima listagem relê o banco.
    pub async fn remove_from_cache(&self, module_name: &str, id: i32) -> Result<(), AppError> {
        self.store.delete(&entity_key(module_name, id)).await?;
        self.store.delete(module_name).await
    }

    async fn read<V: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<V>, AppError> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // entrada incompatível (ex: versão anterior do modelo): vira miss
                tracing::warn!(key, error = %e, "Entrada de cache ilegível descartada");
                self.store.delete(key).await?;
                Ok(None)
            }
        }
    }
}

fn entity_key(module_name: &str, id: i32) -> String {
    format!("{module_name}:{id}")
}

fn encode<V: serde::Serialize + ?Sized>(value: &V) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|e| AppError::CacheError(e.to_string()))
}
