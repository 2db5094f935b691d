// src/services/document_requirement_service.rs

use std::sync::Arc;

use crate::{
    cache::{CacheService, CacheUpdate},
    common::{
        error::{AppError, LogOnError},
        validation::validate_payload,
    },
    db::{DocumentRequirementRepository, DocumentTypeRepository},
    models::{
        document::{CreateDocumentRequirementPayload, DocumentRequirement, UpdateDocumentRequirementPayload},
        party::OwnerType,
    },
    services::document_type_service,
};

const MODULE_NAME: &str = "documentRequirement";

#[derive(Clone)]
pub struct DocumentRequirementService {
    repo: Arc<dyn DocumentRequirementRepository>,
    types: Arc<dyn DocumentTypeRepository>,
    cache: CacheService,
}

impl DocumentRequirementService {
    pub fn new(
        repo: Arc<dyn DocumentRequirementRepository>,
        types: Arc<dyn DocumentTypeRepository>,
        cache: CacheService,
    ) -> Self {
        Self { repo, types, cache }
    }

    pub async fn create(&self, payload: CreateDocumentRequirementPayload) -> Result<DocumentRequirement, AppError> {
        async {
            validate_payload(&payload)?;
            self.types
                .find_by_id(payload.document_type_id)
                .await?
                .ok_or_else(|| document_type_service::not_found(payload.document_type_id))?;

            let created = self.repo.create(&payload).await?;
            self.refresh_cache(&created).await?;
            Ok::<_, AppError>(created)
        }
        .await
        .log_on_error("createDocumentRequirement", &payload)
    }

    pub async fn find(&self, id: i32) -> Result<DocumentRequirement, AppError> {
        async {
            if let Some(hit) = self.cache.get_one::<DocumentRequirement>(MODULE_NAME, id).await? {
                return Ok(hit);
            }
            let found = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
            self.cache
                .insert_or_update_cache(CacheUpdate {
                    module_name: MODULE_NAME,
                    created_or_updated: Some(&found),
                    all_entities: None,
                })
                .await?;
            Ok::<_, AppError>(found)
        }
        .await
        .log_on_error("documentRequirement", &id)
    }

    pub async fn list(&self) -> Result<Vec<DocumentRequirement>, AppError> {
        async {
            if let Some(hit) = self.cache.get_all::<DocumentRequirement>(MODULE_NAME).await? {
                return Ok(hit);
            }
            let all = self.repo.list().await?;
            self.cache
                .insert_or_update_cache::<DocumentRequirement>(CacheUpdate {
                    module_name: MODULE_NAME,
                    created_or_updated: None,
                    all_entities: Some(all.clone()),
                })
                .await?;
            Ok::<_, AppError>(all)
        }
        .await
        .log_on_error("documentRequirements", &())
    }

    /// Requisitos obrigatórios de um papel.
    pub async fn required_for(&self, role: OwnerType) -> Result<Vec<DocumentRequirement>, AppError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.role == role && r.is_required)
            .collect())
    }

    pub async fn update(
        &self,
        id: i32,
        payload: UpdateDocumentRequirementPayload,
    ) -> Result<DocumentRequirement, AppError> {
        async {
            validate_payload(&payload)?;
            let updated = self.repo.update(id, &payload).await?.ok_or_else(|| not_found(id))?;
            self.refresh_cache(&updated).await?;
            Ok::<_, AppError>(updated)
        }
        .await
        .log_on_error("updateDocumentRequirement", &(id, &payload))
    }

    pub async fn remove(&self, id: i32) -> Result<DocumentRequirement, AppError> {
        async {
            let current = self.find(id).await?;
            self.repo.delete(id).await?;
            self.cache.remove_from_cache(MODULE_NAME, id).await?;
            Ok::<_, AppError>(current)
        }
        .await
        .log_on_error("removeDocumentRequirement", &id)
    }

    /// Ids dos requisitos de um tipo, lidos do banco.
    pub async fn ids_for_type(&self, document_type_id: i32) -> Result<Vec<i32>, AppError> {
        Ok(self
            .repo
            .list()
            .await?
            .into_iter()
            .filter(|r| r.document_type_id == document_type_id)
            .map(|r| r.id)
            .collect())
    }

    /// Tira do cache requisitos apagados em cascata junto com o tipo.
    pub async fn evict(&self, ids: &[i32]) -> Result<(), AppError> {
        for id in ids {
            self.cache.remove_from_cache(MODULE_NAME, *id).await?;
        }
        Ok(())
    }

    async fn refresh_cache(&self, entity: &DocumentRequirement) -> Result<(), AppError> {
        let all = self.repo.list().await?;
        self.cache
            .insert_or_update_cache(CacheUpdate {
                module_name: MODULE_NAME,
                created_or_updated: Some(entity),
                all_entities: Some(all),
            })
            .await
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Document requirement with id {id} not found."))
}
