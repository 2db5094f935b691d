// src/handlers/document_requirements.rs

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
    models::document::{DocumentRequirement, CreateDocumentRequirementPayload, UpdateDocumentRequirementPayload},
};

// POST /api/document-requirements
#[utoipa::path(
    post,
    path = "/api/document-requirements",
    tag = "Document Requirements",
    request_body = CreateDocumentRequirementPayload,
    responses(
        (status = 201, description = "Requisito criado", body = DocumentRequirement),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document_requirement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<CreateDocumentRequirementPayload>,
) -> Result<impl IntoResponse, AppError> {
    ensure_role(&user, ADMINS)?;
    let created = app_state.document_requirement_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/document-requirements
#[utoipa::path(
    get,
    path = "/api/document-requirements",
    tag = "Document Requirements",
    responses(
        (status = 200, description = "Lista de requisitos", body = Vec<DocumentRequirement>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_document_requirements(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DocumentRequirement>>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    Ok(Json(app_state.document_requirement_service.list().await?))
}

// GET /api/document-requirements/{id}
#[utoipa::path(
    get,
    path = "/api/document-requirements/{id}",
    tag = "Document Requirements",
    params(("id" = i32, Path, description = "ID do requisito")),
    responses(
        (status = 200, description = "Requisito encontrado", body = DocumentRequirement),
        (status = 404, description = "Requisito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document_requirement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<DocumentRequirement>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    Ok(Json(app_state.document_requirement_service.find(id).await?))
}

// PATCH /api/document-requirements/{id}
#[utoipa::path(
    patch,
    path = "/api/document-requirements/{id}",
    tag = "Document Requirements",
    params(("id" = i32, Path, description = "ID do requisito")),
    request_body = UpdateDocumentRequirementPayload,
    responses(
        (status = 200, description = "Requisito atualizado", body = DocumentRequirement),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Requisito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_document_requirement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdateDocumentRequirementPayload>,
) -> Result<Json<DocumentRequirement>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.document_requirement_service.update(id, payload).await?))
}

// DELETE /api/document-requirements/{id}
#[utoipa::path(
    delete,
    path = "/api/document-requirements/{id}",
    tag = "Document Requirements",
    params(("id" = i32, Path, description = "ID do requisito")),
    responses(
        (status = 200, description = "Requisito removido", body = DocumentRequirement),
        (status = 404, description = "Requisito não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_document_requirement(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<DocumentRequirement>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.document_requirement_service.remove(id).await?))
}
