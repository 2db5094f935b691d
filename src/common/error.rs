use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Debug;
use thiserror::Error;
use utoipa::ToSchema;

/// Todas as regras violadas de um único campo, reportadas juntas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    #[schema(example = "postalCode")]
    pub property: String,

    // regra -> mensagem (ex: "matches" -> "The \"postalCode\" field ...")
    pub constraints: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(Vec<FieldViolation>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotAcceptable(String),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("Invalid or missing authentication token.")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Queue error: {0}")]
    QueueError(String),

    // `anyhow::Error` guarda o contexto de falhas inesperadas
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(crate::common::validation::collect_violations(&errors))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::DatabaseError(_)
            | AppError::CacheError(_)
            | AppError::StorageError(_)
            | AppError::QueueError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");

        let message = match &self {
            AppError::ValidationError(violations) => json!(violations),
            e if e.is_server_error() => {
                // O detalhe fica no log, o cliente recebe só a mensagem genérica.
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!("An unexpected error occurred.")
            }
            e => json!(e.to_string()),
        };

        let body = Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "error": reason,
        }));
        (status, body).into_response()
    }
}

/// Loga a falha de uma operação de serviço com contexto e devolve o erro intacto.
pub trait LogOnError<T> {
    fn log_on_error(self, operation: &'static str, input: &dyn Debug) -> Result<T, AppError>;
}

impl<T> LogOnError<T> for Result<T, AppError> {
    fn log_on_error(self, operation: &'static str, input: &dyn Debug) -> Result<T, AppError> {
        if let Err(e) = &self {
            if e.is_server_error() {
                tracing::error!(operation, input = ?input, error = %e, "Falha na operação");
            } else {
                tracing::warn!(operation, input = ?input, error = %e, "Operação rejeitada");
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_are_returned_as_a_single_bad_request() {
        let violation = FieldViolation {
            property: "state".into(),
            constraints: BTreeMap::from([("matches".to_string(), "bad".to_string())]),
        };
        let (status, body) = body_json(AppError::ValidationError(vec![violation])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["message"][0]["property"], "state");
        assert_eq!(body["message"][0]["constraints"]["matches"], "bad");
    }

    #[tokio::test]
    async fn server_errors_hide_their_details() {
        let (status, body) =
            body_json(AppError::CacheError("connection refused".into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An unexpected error occurred.");
    }

    #[test]
    fn client_errors_map_to_their_status() {
        assert_eq!(AppError::NotAcceptable("x".into()).status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert!(!AppError::NotFound("x".into()).is_server_error());
    }
}
