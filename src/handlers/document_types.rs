// src/handlers/document_types.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, json::ApiJson},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ensure_role, ADMINS, ALL_ROLES},
    },
    models::document::{DocumentType, CreateDocumentTypePayload, UpdateDocumentTypePayload},
};

// POST /api/document-types
#[utoipa::path(
    post,
    path = "/api/document-types",
    tag = "Document Types",
    request_body = CreateDocumentTypePayload,
    responses(
        (status = 201, description = "Tipo de documento criado", body = DocumentType),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document_type(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<CreateDocumentTypePayload>,
) -> Result<impl IntoResponse, AppError> {
    ensure_role(&user, ADMINS)?;
    let created = app_state.document_type_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/document-types
#[utoipa::path(
    get,
    path = "/api/document-types",
    tag = "Document Types",
    responses(
        (status = 200, description = "Lista de tipos de documento", body = Vec<DocumentType>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_document_types(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DocumentType>>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    Ok(Json(app_state.document_type_service.list().await?))
}

// GET /api/document-types/{id}
#[utoipa::path(
    get,
    path = "/api/document-types/{id}",
    tag = "Document Types",
    params(("id" = i32, Path, description = "ID do tipo de documento")),
    responses(
        (status = 200, description = "Tipo de documento encontrado", body = DocumentType),
        (status = 404, description = "Tipo de documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document_type(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<DocumentType>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    Ok(Json(app_state.document_type_service.find(id).await?))
}

// PATCH /api/document-types/{id}
#[utoipa::path(
    patch,
    path = "/api/document-types/{id}",
    tag = "Document Types",
    params(("id" = i32, Path, description = "ID do tipo de documento")),
    request_body = UpdateDocumentTypePayload,
    responses(
        (status = 200, description = "Tipo de documento atualizado", body = DocumentType),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Tipo de documento não encontrado"),
        (status = 409, description = "Nome já utilizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_document_type(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdateDocumentTypePayload>,
) -> Result<Json<DocumentType>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.document_type_service.update(id, payload).await?))
}

// DELETE /api/document-types/{id}
#[utoipa::path(
    delete,
    path = "/api/document-types/{id}",
    tag = "Document Types",
    params(("id" = i32, Path, description = "ID do tipo de documento")),
    responses(
        (status = 200, description = "Tipo de documento removido", body = DocumentType),
        (status = 404, description = "Tipo de documento não encontrado"),
        (status = 409, description = "Tipo em uso por documentos")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_document_type(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<DocumentType>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.document_type_service.remove(id).await?))
}
