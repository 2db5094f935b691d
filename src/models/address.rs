// src/models/address.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::{not_blank, POSTAL_CODE_RE, STATE_RE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[schema(example = 1)]
    pub id: i32,

    #[schema(example = "Rua Pernambuco")]
    pub street: String,

    #[schema(example = "1000")]
    pub number: String,

    #[schema(example = "Apto 301")]
    pub complement: Option<String>,

    #[schema(example = "Savassi")]
    pub neighborhood: String,

    #[schema(example = "Belo Horizonte")]
    pub city: String,

    #[schema(example = "MG")]
    pub state: String,

    #[schema(example = "30130150")]
    pub postal_code: String,

    pub additional_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Quem detém a referência exclusiva a um endereço.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressOwner {
    Tenant(i32),
    Landlord(i32),
    Client(i32),
}

// Endereço com as referências de volta dos três tipos de dono
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AddressWithOwners {
    #[sqlx(flatten)]
    pub address: Address,
    pub tenant_id: Option<i32>,
    pub landlord_id: Option<i32>,
    pub client_id: Option<i32>,
}

impl AddressWithOwners {
    pub fn is_associated(&self) -> bool {
        self.owner().is_some()
    }

    pub fn owner(&self) -> Option<AddressOwner> {
        self.tenant_id
            .map(AddressOwner::Tenant)
            .or(self.landlord_id.map(AddressOwner::Landlord))
            .or(self.client_id.map(AddressOwner::Client))
    }

    /// Verdadeiro quando o endereço já pertence a alguém que não é `owner`.
    pub fn is_associated_to_other_than(&self, owner: Option<AddressOwner>) -> bool {
        match self.owner() {
            None => false,
            Some(current) => Some(current) != owner,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressPayload {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Rua Pernambuco")]
    pub street: String,

    #[validate(length(min = 1, max = 10, code = "length", message = "The \"number\" field must have between 1 and 10 characters."))]
    #[schema(example = "1000")]
    pub number: String,

    pub complement: Option<String>,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Savassi")]
    pub neighborhood: String,

    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Belo Horizonte")]
    pub city: String,

    #[validate(regex(path = *STATE_RE, code = "matches", message = "The \"state\" field must be a 2-letter uppercase abbreviation."))]
    #[schema(example = "MG")]
    pub state: String,

    #[validate(regex(path = *POSTAL_CODE_RE, code = "matches", message = "The \"postalCode\" field must be in the format 00000000."))]
    #[schema(example = "30130150")]
    pub postal_code: String,

    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressPayload {
    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"street\" field must not be empty."))]
    pub street: Option<String>,

    #[validate(length(min = 1, max = 10, code = "length", message = "The \"number\" field must have between 1 and 10 characters."))]
    pub number: Option<String>,

    pub complement: Option<String>,

    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"neighborhood\" field must not be empty."))]
    pub neighborhood: Option<String>,

    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"city\" field must not be empty."))]
    pub city: Option<String>,

    #[validate(regex(path = *STATE_RE, code = "matches", message = "The \"state\" field must be a 2-letter uppercase abbreviation."))]
    pub state: Option<String>,

    #[validate(regex(path = *POSTAL_CODE_RE, code = "matches", message = "The \"postalCode\" field must be in the format 00000000."))]
    pub postal_code: Option<String>,

    pub additional_info: Option<String>,
}
