// src/db/document_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{map_foreign_key_violation, map_unique_violation},
    models::{
        document::{
            CreateDocumentRequirementPayload, CreateDocumentTypePayload, Document,
            DocumentRequirement, DocumentType, NewDocument, UpdateDocumentPayload,
            UpdateDocumentRequirementPayload, UpdateDocumentTypePayload,
        },
        party::OwnerType,
    },
};

// =========================================================================
//  TIPOS DE DOCUMENTO
// =========================================================================

#[async_trait]
pub trait DocumentTypeRepository: Send + Sync {
    async fn create(&self, input: &CreateDocumentTypePayload) -> Result<DocumentType, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<DocumentType>, AppError>;
    async fn list(&self) -> Result<Vec<DocumentType>, AppError>;
    async fn update(&self, id: i32, patch: &UpdateDocumentTypePayload) -> Result<Option<DocumentType>, AppError>;
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgDocumentTypeRepository {
    pool: PgPool,
}

impl PgDocumentTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentTypeRepository for PgDocumentTypeRepository {
    async fn create(&self, input: &CreateDocumentTypePayload) -> Result<DocumentType, AppError> {
        sqlx::query_as::<_, DocumentType>(
            "INSERT INTO document_types (name, applicable_to) VALUES ($1, $2) RETURNING *",
        )
        .bind(&input.name)
        .bind(input.applicable_to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "A document type with this name already exists."))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<DocumentType>, AppError> {
        let document_type = sqlx::query_as::<_, DocumentType>("SELECT * FROM document_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document_type)
    }

    async fn list(&self) -> Result<Vec<DocumentType>, AppError> {
        let document_types = sqlx::query_as::<_, DocumentType>("SELECT * FROM document_types ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(document_types)
    }

    async fn update(&self, id: i32, patch: &UpdateDocumentTypePayload) -> Result<Option<DocumentType>, AppError> {
        sqlx::query_as::<_, DocumentType>(
            r#"
            UPDATE document_types SET
                name = COALESCE($2, name),
                applicable_to = COALESCE($3, applicable_to),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(patch.applicable_to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "A document type with this name already exists."))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM document_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, "Document type is still used by documents."))?;

        Ok(result.rows_affected() > 0)
    }
}

// =========================================================================
//  EXIGÊNCIAS DE DOCUMENTO
// =========================================================================

#[async_trait]
pub trait DocumentRequirementRepository: Send + Sync {
    async fn create(&self, input: &CreateDocumentRequirementPayload) -> Result<DocumentRequirement, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<DocumentRequirement>, AppError>;
    async fn list(&self) -> Result<Vec<DocumentRequirement>, AppError>;
    async fn update(
        &self,
        id: i32,
        patch: &UpdateDocumentRequirementPayload,
    ) -> Result<Option<DocumentRequirement>, AppError>;
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgDocumentRequirementRepository {
    pool: PgPool,
}

impl PgDocumentRequirementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRequirementRepository for PgDocumentRequirementRepository {
    async fn create(&self, input: &CreateDocumentRequirementPayload) -> Result<DocumentRequirement, AppError> {
        sqlx::query_as::<_, DocumentRequirement>(
            r#"
            INSERT INTO document_requirements (document_type_id, role, is_required)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(input.document_type_id)
        .bind(input.role)
        .bind(input.is_required)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "This document type is already configured for this role."))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<DocumentRequirement>, AppError> {
        let requirement =
            sqlx::query_as::<_, DocumentRequirement>("SELECT * FROM document_requirements WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(requirement)
    }

    async fn list(&self) -> Result<Vec<DocumentRequirement>, AppError> {
        let requirements =
            sqlx::query_as::<_, DocumentRequirement>("SELECT * FROM document_requirements ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(requirements)
    }

    async fn update(
        &self,
        id: i32,
        patch: &UpdateDocumentRequirementPayload,
    ) -> Result<Option<DocumentRequirement>, AppError> {
        let requirement = sqlx::query_as::<_, DocumentRequirement>(
            r#"
            UPDATE document_requirements SET
                is_required = COALESCE($2, is_required),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.is_required)
        .fetch_optional(&self.pool)
        .await?;

        Ok(requirement)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM document_requirements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =========================================================================
//  DOCUMENTOS
// =========================================================================

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, input: &NewDocument) -> Result<Document, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Document>, AppError>;
    async fn list(&self) -> Result<Vec<Document>, AppError>;
    async fn list_by_owner(&self, owner_type: OwnerType, owner_id: i32) -> Result<Vec<Document>, AppError>;
    async fn update(&self, id: i32, patch: &UpdateDocumentPayload) -> Result<Option<Document>, AppError>;
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn create(&self, input: &NewDocument) -> Result<Document, AppError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (document_type_id, owner_type, owner_id, url, object_key, file_name, observation)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.document_type_id)
        .bind(input.owner_type)
        .bind(input.owner_id)
        .bind(&input.url)
        .bind(&input.object_key)
        .bind(&input.file_name)
        .bind(&input.observation)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    async fn list(&self) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>("SELECT * FROM documents ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(documents)
    }

    async fn list_by_owner(&self, owner_type: OwnerType, owner_id: i32) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE owner_type = $1 AND owner_id = $2 ORDER BY id ASC",
        )
        .bind(owner_type)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    async fn update(&self, id: i32, patch: &UpdateDocumentPayload) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents SET
                status = COALESCE($2, status),
                observation = COALESCE($3, observation),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.status)
        .bind(&patch.observation)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
