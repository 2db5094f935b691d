// src/models/document.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::not_blank;
use crate::models::party::{LegalType, OwnerType};

// A qual tipo de pessoa o documento se aplica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "legal_applicability", rename_all = "lowercase")]
pub enum LegalApplicability {
    Natural,
    Legal,
    #[default]
    Both,
}

impl LegalApplicability {
    pub fn applies_to(self, legal_type: LegalType) -> bool {
        match self {
            LegalApplicability::Both => true,
            LegalApplicability::Natural => legal_type == LegalType::Natural,
            LegalApplicability::Legal => legal_type == LegalType::Legal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    pub id: i32,

    #[schema(example = "RG")]
    pub name: String,

    pub applicable_to: LegalApplicability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentTypePayload {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Comprovante de renda")]
    pub name: String,

    #[serde(default)]
    pub applicable_to: LegalApplicability,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentTypePayload {
    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"name\" field must not be empty."))]
    pub name: Option<String>,

    pub applicable_to: Option<LegalApplicability>,
}

/// Quais papéis precisam entregar qual tipo de documento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequirement {
    pub id: i32,
    pub document_type_id: i32,
    pub role: OwnerType,
    pub is_required: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequirementPayload {
    pub document_type_id: i32,
    pub role: OwnerType,

    #[serde(default = "default_required")]
    pub is_required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequirementPayload {
    pub is_required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i32,
    pub document_type_id: i32,
    pub owner_type: OwnerType,
    pub owner_id: i32,
    pub status: DocumentStatus,

    #[schema(example = "http://localhost:3000/files/documents/tenant/1/rg.pdf")]
    pub url: String,

    // chave no bucket, usada para apagar o arquivo junto com o registro
    #[schema(example = "documents/6f1c2d3e-rg.pdf")]
    pub object_key: String,

    pub file_name: String,
    pub observation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que o consumidor da fila grava depois do upload para o bucket
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub document_type_id: i32,
    pub owner_type: OwnerType,
    pub owner_id: i32,
    pub url: String,
    pub object_key: String,
    pub file_name: String,
    pub observation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentPayload {
    pub status: Option<DocumentStatus>,

    #[validate(length(max = 500, code = "maxLength", message = "The \"observation\" field must have at most 500 characters."))]
    pub observation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOwnerFilter {
    pub owner_type: Option<OwnerType>,
    pub owner_id: Option<i32>,
}

/// Resposta do upload: o documento ainda será gravado pela fila.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploadAccepted {
    pub job_id: Uuid,

    #[schema(example = "queued")]
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applicability_filters_by_legal_type() {
        assert!(LegalApplicability::Both.applies_to(LegalType::Natural));
        assert!(LegalApplicability::Both.applies_to(LegalType::Legal));
        assert!(LegalApplicability::Natural.applies_to(LegalType::Natural));
        assert!(!LegalApplicability::Natural.applies_to(LegalType::Legal));
        assert!(!LegalApplicability::Legal.applies_to(LegalType::Natural));
    }

    #[test]
    fn requirements_default_to_required() {
        let payload: CreateDocumentRequirementPayload =
            serde_json::from_str(r#"{"documentTypeId": 2, "role": "Tenant"}"#).unwrap();
        assert!(payload.is_required);
        assert_eq!(payload.role, OwnerType::Tenant);
    }
}
