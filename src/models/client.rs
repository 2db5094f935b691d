// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::validation::{not_blank, CNPJ_RE, PHONE_RE};

// A imobiliária: a empresa dona dos inquilinos, proprietários e usuários
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i32,

    #[schema(example = "Imobiliária Horizonte")]
    pub name: String,

    #[schema(example = "12345678000199")]
    pub cnpj: String,

    #[schema(example = "31999998888")]
    pub phone: String,

    #[schema(example = "contato@horizonte.com.br")]
    pub email: String,

    #[schema(example = "https://horizonte.com.br")]
    pub site: Option<String>,

    pub is_active: bool,
    pub address_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    #[validate(regex(path = *CNPJ_RE, code = "matches", message = "The \"cnpj\" field must contain exactly 14 digits."))]
    pub cnpj: String,

    #[validate(regex(path = *PHONE_RE, code = "matches", message = "The \"phone\" field must contain 10 or 11 digits."))]
    pub phone: String,

    #[validate(email(code = "isEmail", message = "The \"email\" field must be a valid e-mail."))]
    pub email: String,

    #[validate(url(code = "isUrl", message = "The \"site\" field must be a valid URL."))]
    pub site: Option<String>,

    pub address_id: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"name\" field must not be empty."))]
    pub name: Option<String>,

    #[validate(regex(path = *CNPJ_RE, code = "matches", message = "The \"cnpj\" field must contain exactly 14 digits."))]
    pub cnpj: Option<String>,

    #[validate(regex(path = *PHONE_RE, code = "matches", message = "The \"phone\" field must contain 10 or 11 digits."))]
    pub phone: Option<String>,

    #[validate(email(code = "isEmail", message = "The \"email\" field must be a valid e-mail."))]
    pub email: Option<String>,

    #[validate(url(code = "isUrl", message = "The \"site\" field must be a valid URL."))]
    pub site: Option<String>,

    pub is_active: Option<bool>,
    pub address_id: Option<i32>,
}
