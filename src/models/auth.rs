// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Tenant,
    Landlord,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,

    #[schema(example = "corretor.ana")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub client_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usuário pronto para inserir, com a senha já em hash
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: Role,
    pub client_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub client_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 50, code = "length", message = "The \"username\" field must have between 3 and 50 characters."))]
    pub username: String,

    #[validate(length(min = 8, code = "minLength", message = "The \"password\" field must have at least 8 characters."))]
    pub password: String,

    #[validate(email(code = "isEmail", message = "The \"email\" field must be a valid e-mail."))]
    pub email: String,

    pub role: Role,
    pub client_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 8, code = "minLength", message = "The \"password\" field must have at least 8 characters."))]
    pub password: Option<String>,

    #[validate(email(code = "isEmail", message = "The \"email\" field must be a valid e-mail."))]
    pub email: Option<String>,

    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub client_id: Option<i32>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"username\" field must not be empty."))]
    pub username: String,

    #[validate(length(min = 1, code = "isNotEmpty", message = "The \"password\" field must not be empty."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub client: Option<i32>,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

/// Quais imobiliárias (clientes) o chamador enxerga.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientScope {
    All,
    Client(i32),
    Nothing,
}

impl ClientScope {
    pub fn allows(self, client_id: i32) -> bool {
        match self {
            ClientScope::All => true,
            ClientScope::Client(own) => own == client_id,
            ClientScope::Nothing => false,
        }
    }
}

impl Claims {
    /// Superadmin e admin sem cliente veem tudo; os demais, só o próprio cliente.
    pub fn client_scope(&self) -> ClientScope {
        match (self.role, self.client) {
            (Role::Superadmin, _) => ClientScope::All,
            (_, Some(client_id)) => ClientScope::Client(client_id),
            (Role::Admin, None) => ClientScope::All,
            (_, None) => ClientScope::Nothing,
        }
    }
}
