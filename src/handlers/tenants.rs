// src/handlers/tenants.rs

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
        roles::{ensure_client, ensure_role, ADMINS, ALL_ROLES},
    },
    models::{
        document::DocumentType,
        party::{CreatePartyPayload, OwnerType, Party, UpdatePartyPayload},
    },
};

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenants",
    request_body = CreatePartyPayload,
    responses(
        (status = 201, description = "Inquilino criado", body = Party),
        (status = 400, description = "Dados inválidos ou endereço já associado"),
        (status = 404, description = "Cliente ou endereço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<CreatePartyPayload>,
) -> Result<impl IntoResponse, AppError> {
    ensure_role(&user, ADMINS)?;
    ensure_client(&user, payload.client_id)?;
    let created = app_state.tenant_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenants",
    responses(
        (status = 200, description = "Lista de inquilinos", body = Vec<Party>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Party>>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    let visible = app_state.tenant_service.list_visible(user.0.client_scope()).await?;
    Ok(Json(visible))
}

// GET /api/tenants/{id}
#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = i32, Path, description = "ID do inquilino")),
    responses(
        (status = 200, description = "Inquilino encontrado", body = Party),
        (status = 404, description = "Inquilino não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_tenant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Party>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    Ok(Json(app_state.tenant_service.find_visible(id, user.0.client_scope()).await?))
}

// PATCH /api/tenants/{id}
#[utoipa::path(
    patch,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = i32, Path, description = "ID do inquilino")),
    request_body = UpdatePartyPayload,
    responses(
        (status = 200, description = "Inquilino atualizado", body = Party),
        (status = 400, description = "Dados inválidos ou endereço já associado"),
        (status = 404, description = "Inquilino não encontrado"),
        (status = 406, description = "Inquilino inativo: apenas {id, isActive: true} é aceito"),
        (status = 409, description = "Tentativa de trocar o tipo jurídico")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_tenant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdatePartyPayload>,
) -> Result<Json<Party>, AppError> {
    ensure_role(&user, ADMINS)?;
    app_state.tenant_service.find_visible(id, user.0.client_scope()).await?;
    if let Some(client_id) = payload.client_id {
        ensure_client(&user, client_id)?;
    }
    Ok(Json(app_state.tenant_service.update(id, payload).await?))
}

// DELETE /api/tenants/{id}
#[utoipa::path(
    delete,
    path = "/api/tenants/{id}",
    tag = "Tenants",
    params(("id" = i32, Path, description = "ID do inquilino")),
    responses(
        (status = 200, description = "Inquilino removido", body = Party),
        (status = 404, description = "Inquilino não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_tenant(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Party>, AppError> {
    ensure_role(&user, ADMINS)?;
    app_state.tenant_service.find_visible(id, user.0.client_scope()).await?;
    Ok(Json(app_state.tenant_service.remove(id).await?))
}

// GET /api/tenants/{id}/pending-documents
#[utoipa::path(
    get,
    path = "/api/tenants/{id}/pending-documents",
    tag = "Tenants",
    params(("id" = i32, Path, description = "ID do inquilino")),
    responses(
        (status = 200, description = "Tipos de documento obrigatórios ainda não enviados", body = Vec<DocumentType>),
        (status = 404, description = "Inquilino não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn tenant_pending_documents(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<DocumentType>>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    let pending = app_state
        .document_service
        .pending_documents(OwnerType::Tenant, id, user.0.client_scope())
        .await?;
    Ok(Json(pending))
}
