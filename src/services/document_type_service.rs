// src/services/document_type_service.rs

use std::sync::Arc;

use crate::{
    common::{
        error::{AppError, LogOnError},
        validation::validate_payload,
    },
    db::DocumentTypeRepository,
    models::document::{CreateDocumentTypePayload, DocumentType, UpdateDocumentTypePayload},
    services::document_requirement_service::DocumentRequirementService,
};

#[derive(Clone)]
pub struct DocumentTypeService {
    repo: Arc<dyn DocumentTypeRepository>,
    requirements: DocumentRequirementService,
}

impl DocumentTypeService {
    pub fn new(repo: Arc<dyn DocumentTypeRepository>, requirements: DocumentRequirementService) -> Self {
        Self { repo, requirements }
    }

    pub async fn create(&self, payload: CreateDocumentTypePayload) -> Result<DocumentType, AppError> {
        async {
            validate_payload(&payload)?;
            self.repo.create(&payload).await
        }
        .await
        .log_on_error("createDocumentType", &payload)
    }

    pub async fn find(&self, id: i32) -> Result<DocumentType, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .and_then(|found| found.ok_or_else(|| not_found(id)))
            .log_on_error("documentType", &id)
    }

    pub async fn list(&self) -> Result<Vec<DocumentType>, AppError> {
        self.repo.list().await.log_on_error("documentTypes", &())
    }

    pub async fn update(&self, id: i32, payload: UpdateDocumentTypePayload) -> Result<DocumentType, AppError> {
        async {
            validate_payload(&payload)?;
            self.repo.update(id, &payload).await?.ok_or_else(|| not_found(id))
        }
        .await
        .log_on_error("updateDocumentType", &(id, &payload))
    }

    pub async fn remove(&self, id: i32) -> Result<DocumentType, AppError> {
        async {
            let found = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
            // os requisitos do tipo somem junto (ON DELETE CASCADE)
            let cascaded = self.requirements.ids_for_type(id).await?;
            self.repo.delete(id).await?;
            self.requirements.evict(&cascaded).await?;
            Ok::<_, AppError>(found)
        }
        .await
        .log_on_error("removeDocumentType", &id)
    }
}

pub(crate) fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Document type with id {id} not found."))
}
