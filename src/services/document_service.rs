// src/services/document_service.rs
//
// Upload assíncrono: a requisição só valida e enfileira; o worker sobe o
// arquivo e chama `persist_uploaded`.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    cache::{CacheService, CacheUpdate},
    common::{
        error::{AppError, FieldViolation, LogOnError},
        validation::{validate_payload, violation},
    },
    db::{DocumentRepository, DocumentTypeRepository, PartyRepository},
    jobs::{DocumentJob, DocumentQueue},
    models::{
        document::{
            Document, DocumentOwnerFilter, DocumentStatus, DocumentType, DocumentUploadAccepted, NewDocument,
            UpdateDocumentPayload,
        },
        auth::ClientScope,
        party::{OwnerType, Party},
    },
    services::{document_requirement_service::DocumentRequirementService, document_type_service},
    storage::ObjectStorage,
};

const MODULE_NAME: &str = "document";

/// Limite do arquivo enviado (1 MiB).
pub const MAX_FILE_SIZE: usize = 1024 * 1024;

/// Arquivo recebido pela API, ainda em memória.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub document_type_id: i32,
    pub owner_type: OwnerType,
    pub owner_id: i32,
    pub observation: Option<String>,
}

#[derive(Clone)]
pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    types: Arc<dyn DocumentTypeRepository>,
    tenants: Arc<dyn PartyRepository>,
    landlords: Arc<dyn PartyRepository>,
    requirements: DocumentRequirementService,
    queue: DocumentQueue,
    storage: Arc<dyn ObjectStorage>,
    cache: CacheService,
}

impl DocumentService {
    pub fn new(
        repo: Arc<dyn DocumentRepository>,
        types: Arc<dyn DocumentTypeRepository>,
        tenants: Arc<dyn PartyRepository>,
        landlords: Arc<dyn PartyRepository>,
        requirements: DocumentRequirementService,
        queue: DocumentQueue,
        storage: Arc<dyn ObjectStorage>,
        cache: CacheService,
    ) -> Self {
        Self { repo, types, tenants, landlords, requirements, queue, storage, cache }
    }

    /// Valida o upload, grava um arquivo temporário e enfileira o job.
    /// Dono fora do escopo do chamador é tratado como inexistente.
    pub async fn enqueue_upload(
        &self,
        upload: DocumentUpload,
        scope: ClientScope,
    ) -> Result<DocumentUploadAccepted, AppError> {
        let input = (&upload.file_name, upload.bytes.len(), upload.document_type_id, upload.owner_type, upload.owner_id);
        async {
            validate_upload(&upload)?;
            self.find_type(upload.document_type_id).await?;
            self.find_visible_owner(upload.owner_type, upload.owner_id, scope).await?;

            let DocumentUpload { file_name, bytes, document_type_id, owner_type, owner_id, observation } =
                upload.clone();

            // ≤ 1 MiB, mas ainda é IO de disco: fora do runtime
            let temp_file = tokio::task::spawn_blocking(move || -> std::io::Result<tempfile::TempPath> {
                let mut file = tempfile::NamedTempFile::new()?;
                file.write_all(&bytes)?;
                file.flush()?;
                Ok(file.into_temp_path())
            })
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task do arquivo temporário: {}", e))?
            .map_err(|e| AppError::StorageError(e.to_string()))?;

            let job_id = self
                .queue
                .enqueue(DocumentJob {
                    id: Uuid::new_v4(),
                    temp_file,
                    file_name: sanitize_file_name(&file_name),
                    document_type_id,
                    owner_type,
                    owner_id,
                    observation,
                })
                .await?;

            Ok::<_, AppError>(DocumentUploadAccepted { job_id, status: "queued" })
        }
        .await
        .log_on_error("createDocument", &input)
    }

    /// Chamado pelo worker depois que o arquivo já está no bucket.
    pub async fn persist_uploaded(&self, document: NewDocument) -> Result<Document, AppError> {
        async {
            let created = self.repo.create(&document).await?;
            // a linha já existe: propagar aqui faria o worker gravar outra
            if let Err(e) = self.refresh_cache(&created).await {
                tracing::warn!(document_id = created.id, error = %e, "Cache de documentos não atualizado");
                if let Err(e) = self.cache.remove_from_cache(MODULE_NAME, created.id).await {
                    tracing::error!(
                        document_id = created.id,
                        error = %e,
                        "Cache de documentos pode estar desatualizado"
                    );
                }
            }
            Ok::<_, AppError>(created)
        }
        .await
        .log_on_error("persistDocument", &document)
    }

    pub async fn find(&self, id: i32) -> Result<Document, AppError> {
        async {
            if let Some(hit) = self.cache.get_one::<Document>(MODULE_NAME, id).await? {
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
        .log_on_error("document", &id)
    }

    pub async fn list(&self, filter: DocumentOwnerFilter) -> Result<Vec<Document>, AppError> {
        async {
            if let (Some(owner_type), Some(owner_id)) = (filter.owner_type, filter.owner_id) {
                return self.repo.list_by_owner(owner_type, owner_id).await;
            }

            let all = match self.cache.get_all::<Document>(MODULE_NAME).await? {
                Some(hit) => hit,
                None => {
                    let all = self.repo.list().await?;
                    self.cache
                        .insert_or_update_cache::<Document>(CacheUpdate {
                            module_name: MODULE_NAME,
                            created_or_updated: None,
                            all_entities: Some(all.clone()),
                        })
                        .await?;
                    all
                }
            };

            Ok::<_, AppError>(
                all.into_iter()
                    .filter(|d| filter.owner_type.is_none_or(|t| d.owner_type == t))
                    .filter(|d| filter.owner_id.is_none_or(|id| d.owner_id == id))
                    .collect(),
            )
        }
        .await
        .log_on_error("documents", &filter)
    }

    pub async fn find_visible(&self, id: i32, scope: ClientScope) -> Result<Document, AppError> {
        let found = self.find(id).await?;
        if scope == ClientScope::All {
            return Ok(found);
        }
        let owner = self.find_owner(found.owner_type, found.owner_id).await?;
        if scope.allows(owner.client_id) {
            Ok(found)
        } else {
            Err(not_found(id))
        }
    }

    pub async fn list_visible(
        &self,
        filter: DocumentOwnerFilter,
        scope: ClientScope,
    ) -> Result<Vec<Document>, AppError> {
        let all = self.list(filter).await?;
        match scope {
            ClientScope::All => Ok(all),
            ClientScope::Nothing => Ok(Vec::new()),
            ClientScope::Client(_) => {
                let mut owners = HashSet::new();
                for (owner_type, repo) in [(OwnerType::Tenant, &self.tenants), (OwnerType::Landlord, &self.landlords)] {
                    owners.extend(
                        repo.list()
                            .await?
                            .into_iter()
                            .filter(|p| scope.allows(p.client_id))
                            .map(|p| (owner_type, p.id)),
                    );
                }
                Ok(all.into_iter().filter(|d| owners.contains(&(d.owner_type, d.owner_id))).collect())
            }
        }
    }

    pub async fn update(&self, id: i32, payload: UpdateDocumentPayload) -> Result<Document, AppError> {
        async {
            validate_payload(&payload)?;
            let updated = self.repo.update(id, &payload).await?.ok_or_else(|| not_found(id))?;
            self.refresh_cache(&updated).await?;
            Ok::<_, AppError>(updated)
        }
        .await
        .log_on_error("updateDocument", &(id, &payload))
    }

    pub async fn remove(&self, id: i32) -> Result<Document, AppError> {
        async {
            let current = self.find(id).await?;
            self.repo.delete(id).await?;
            self.cache.remove_from_cache(MODULE_NAME, id).await?;
            // registro já apagado: arquivo órfão no bucket só gera aviso
            if let Err(e) = self.storage.delete(&current.object_key).await {
                tracing::warn!(
                    document_id = id,
                    object_key = %current.object_key,
                    error = %e,
                    "Arquivo do documento não removido do bucket"
                );
            }
            Ok::<_, AppError>(current)
        }
        .await
        .log_on_error("removeDocument", &id)
    }

    /// Tipos obrigatórios para o papel, aplicáveis ao tipo jurídico do dono,
    /// sem documento enviado (um documento rejeitado não conta).
    pub async fn pending_documents(
        &self,
        owner_type: OwnerType,
        owner_id: i32,
        scope: ClientScope,
    ) -> Result<Vec<DocumentType>, AppError> {
        async {
            let owner = self.find_visible_owner(owner_type, owner_id, scope).await?;
            let delivered: HashSet<i32> = self
                .repo
                .list_by_owner(owner_type, owner_id)
                .await?
                .into_iter()
                .filter(|d| d.status != DocumentStatus::Rejected)
                .map(|d| d.document_type_id)
                .collect();

            let mut pending = Vec::new();
            for requirement in self.requirements.required_for(owner_type).await? {
                if delivered.contains(&requirement.document_type_id) {
                    continue;
                }
                if let Some(document_type) = self.types.find_by_id(requirement.document_type_id).await? {
                    if document_type.applicable_to.applies_to(owner.legal_type) {
                        pending.push(document_type);
                    }
                }
            }
            pending.sort_by_key(|t| t.id);
            Ok::<_, AppError>(pending)
        }
        .await
        .log_on_error("pendingDocuments", &(owner_type, owner_id))
    }

    async fn find_type(&self, id: i32) -> Result<DocumentType, AppError> {
        self.types
            .find_by_id(id)
            .await?
            .ok_or_else(|| document_type_service::not_found(id))
    }

    async fn find_owner(&self, owner_type: OwnerType, owner_id: i32) -> Result<Party, AppError> {
        let repo = match owner_type {
            OwnerType::Tenant => &self.tenants,
            OwnerType::Landlord => &self.landlords,
        };
        repo.find_by_id(owner_id).await?.ok_or_else(|| owner_not_found(owner_type, owner_id))
    }

    async fn find_visible_owner(
        &self,
        owner_type: OwnerType,
        owner_id: i32,
        scope: ClientScope,
    ) -> Result<Party, AppError> {
        let owner = self.find_owner(owner_type, owner_id).await?;
        if scope.allows(owner.client_id) {
            Ok(owner)
        } else {
            Err(owner_not_found(owner_type, owner_id))
        }
    }

    async fn refresh_cache(&self, entity: &Document) -> Result<(), AppError> {
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
    AppError::NotFound(format!("Document with id {id} not found."))
}

fn owner_not_found(owner_type: OwnerType, owner_id: i32) -> AppError {
    AppError::NotFound(format!("{} with id {owner_id} not found.", owner_type.label()))
}

fn validate_upload(upload: &DocumentUpload) -> Result<(), AppError> {
    let mut violations = Vec::new();
    if upload.bytes.is_empty() {
        violations.push(violation("file", "isNotEmpty", "The \"file\" must not be empty."));
    } else if upload.bytes.len() > MAX_FILE_SIZE {
        violations.push(violation("file", "maxSize", "The \"file\" must be at most 1 MiB."));
    }
    if sanitize_file_name(&upload.file_name).is_empty() {
        violations.push(violation("file", "fileName", "The \"file\" must have a name."));
    }
    if upload.observation.as_ref().is_some_and(|o| o.chars().count() > 500) {
        violations.push(violation(
            "observation",
            "maxLength",
            "The \"observation\" field must have at most 500 characters.",
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(merge_by_property(violations)))
    }
}

// Mesma propriedade, uma só entrada com todas as regras
fn merge_by_property(violations: Vec<FieldViolation>) -> Vec<FieldViolation> {
    let mut merged: Vec<FieldViolation> = Vec::new();
    for v in violations {
        match merged.iter_mut().find(|m| m.property == v.property) {
            Some(existing) => existing.constraints.extend(v.constraints),
            None => merged.push(v),
        }
    }
    merged
}

/// Mantém só o nome final do arquivo, com caracteres seguros para chave de objeto.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    base.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}
