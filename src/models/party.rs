// src/models/party.rs
//
// Inquilinos (tenants) e proprietários (landlords) têm exatamente o mesmo
// formato; a tabela e o nome do módulo saem de `OwnerType`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::{
    error::AppError,
    validation::{not_blank, violation, CNPJ_RE, CPF_RE, PHONE_RE},
};

// Mapeia o CREATE TYPE owner_type do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "owner_type", rename_all = "lowercase")]
pub enum OwnerType {
    Tenant,
    Landlord,
}

impl OwnerType {
    /// Nome do módulo, usado também como prefixo das chaves de cache.
    pub fn module_name(self) -> &'static str {
        match self {
            OwnerType::Tenant => "tenant",
            OwnerType::Landlord => "landlord",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            OwnerType::Tenant => "tenants",
            OwnerType::Landlord => "landlords",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OwnerType::Tenant => "Tenant",
            OwnerType::Landlord => "Landlord",
        }
    }
}

// Pessoa física (CPF) ou jurídica (CNPJ), fixada na criação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "legal_type", rename_all = "lowercase")]
pub enum LegalType {
    Natural,
    Legal,
}

impl LegalType {
    /// Deriva o tipo a partir dos documentos: exatamente um dos dois deve vir.
    pub fn from_documents(cpf: Option<&str>, cnpj: Option<&str>) -> Result<Self, AppError> {
        match (cpf, cnpj) {
            (Some(_), None) => Ok(LegalType::Natural),
            (None, Some(_)) => Ok(LegalType::Legal),
            (Some(_), Some(_)) => Err(AppError::ValidationError(vec![violation(
                "cnpj",
                "cpfXorCnpj",
                "Provide either \"cpf\" or \"cnpj\", not both.",
            )])),
            (None, None) => Err(AppError::ValidationError(vec![violation(
                "cpf",
                "cpfXorCnpj",
                "One of \"cpf\" or \"cnpj\" must be provided.",
            )])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: i32,

    #[schema(example = "Maria das Graças")]
    pub name: String,

    #[schema(example = "12345678901")]
    pub cpf: Option<String>,

    pub cnpj: Option<String>,

    #[serde(rename = "type")]
    pub legal_type: LegalType,

    #[schema(example = "maria@email.com")]
    pub email: String,

    #[schema(example = "31988887777")]
    pub phone: String,

    pub is_active: bool,
    pub annotations: Option<String>,
    pub client_id: i32,
    pub address_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyPayload {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(regex(path = *CPF_RE, code = "matches", message = "The \"cpf\" field must contain exactly 11 digits."))]
    pub cpf: Option<String>,

    #[validate(regex(path = *CNPJ_RE, code = "matches", message = "The \"cnpj\" field must contain exactly 14 digits."))]
    pub cnpj: Option<String>,

    #[validate(email(code = "isEmail", message = "The \"email\" field must be a valid e-mail."))]
    pub email: String,

    #[validate(regex(path = *PHONE_RE, code = "matches", message = "The \"phone\" field must contain 10 or 11 digits."))]
    pub phone: String,

    pub annotations: Option<String>,
    pub client_id: i32,
    pub address_id: i32,
}

impl CreatePartyPayload {
    // CPF/CNPJ vazios contam como ausentes
    pub fn normalized(mut self) -> Self {
        self.cpf = self.cpf.filter(|v| !v.is_empty());
        self.cnpj = self.cnpj.filter(|v| !v.is_empty());
        self
    }
}

// Campos desconhecidos são rejeitados: a reativação precisa ser exatamente {id, isActive}
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePartyPayload {
    pub id: Option<i32>,

    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"name\" field must not be empty."))]
    pub name: Option<String>,

    #[validate(regex(path = *CPF_RE, code = "matches", message = "The \"cpf\" field must contain exactly 11 digits."))]
    pub cpf: Option<String>,

    #[validate(regex(path = *CNPJ_RE, code = "matches", message = "The \"cnpj\" field must contain exactly 14 digits."))]
    pub cnpj: Option<String>,

    #[validate(email(code = "isEmail", message = "The \"email\" field must be a valid e-mail."))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_RE, code = "matches", message = "The \"phone\" field must contain 10 or 11 digits."))]
    pub phone: Option<String>,

    pub is_active: Option<bool>,
    pub annotations: Option<String>,
    pub client_id: Option<i32>,
    pub address_id: Option<i32>,
}

impl UpdatePartyPayload {
    pub fn normalized(mut self) -> Self {
        self.cpf = self.cpf.filter(|v| !v.is_empty());
        self.cnpj = self.cnpj.filter(|v| !v.is_empty());
        self
    }

    /// `{id, isActive: true}` e nada mais; o id do corpo é obrigatório: a única mudança aceita num registro inativo.
    pub fn is_reactivation_only(&self) -> bool {
        self.id.is_some()
            && self.is_active == Some(true)
            && self.name.is_none()
            && self.cpf.is_none()
            && self.cnpj.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.annotations.is_none()
            && self.client_id.is_none()
            && self.address_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_type_is_derived_from_the_single_document() {
        assert_eq!(LegalType::from_documents(Some("12345678901"), None).unwrap(), LegalType::Natural);
        assert_eq!(LegalType::from_documents(None, Some("12345678000199")).unwrap(), LegalType::Legal);
    }

    #[test]
    fn both_or_no_documents_are_rejected() {
        assert!(matches!(
            LegalType::from_documents(Some("12345678901"), Some("12345678000199")),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            LegalType::from_documents(None, None),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn reactivation_payload_must_carry_nothing_else() {
        let only = UpdatePartyPayload { id: Some(1), is_active: Some(true), ..Default::default() };
        assert!(only.is_reactivation_only());

        let without_id = UpdatePartyPayload { is_active: Some(true), ..Default::default() };
        assert!(!without_id.is_reactivation_only());

        let with_phone = UpdatePartyPayload {
            id: Some(1),
            is_active: Some(true),
            phone: Some("31988887777".into()),
            ..Default::default()
        };
        assert!(!with_phone.is_reactivation_only());

        let deactivate = UpdatePartyPayload { is_active: Some(false), ..Default::default() };
        assert!(!deactivate.is_reactivation_only());
    }

    #[test]
    fn unknown_keys_are_refused_on_update() {
        let parsed: Result<UpdatePartyPayload, _> =
            serde_json::from_str(r#"{"id": 1, "isActive": true, "nickname": "x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn empty_documents_count_as_absent() {
        let payload = UpdatePartyPayload { cnpj: Some(String::new()), ..Default::default() }.normalized();
        assert!(payload.cnpj.is_none());
    }
}
