// src/handlers/landlords.rs

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

// POST /api/landlords
#[utoipa::path(
    post,
    path = "/api/landlords",
    tag = "Landlords",
    request_body = CreatePartyPayload,
    responses(
        (status = 201, description = "Proprietário criado", body = Party),
        (status = 400, description = "Dados inválidos ou endereço já associado"),
        (status = 404, description = "Cliente ou endereço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_landlord(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<CreatePartyPayload>,
) -> Result<impl IntoResponse, AppError> {
    ensure_role(&user, ADMINS)?;
    ensure_client(&user, payload.client_id)?;
    let created = app_state.landlord_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/landlords
#[utoipa::path(
    get,
    path = "/api/landlords",
    tag = "Landlords",
    responses(
        (status = 200, description = "Lista de proprietários", body = Vec<Party>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_landlords(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Party>>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    let visible = app_state.landlord_service.list_visible(user.0.client_scope()).await?;
    Ok(Json(visible))
}

// GET /api/landlords/{id}
#[utoipa::path(
    get,
    path = "/api/landlords/{id}",
    tag = "Landlords",
    params(("id" = i32, Path, description = "ID do proprietário")),
    responses(
        (status = 200, description = "Proprietário encontrado", body = Party),
        (status = 404, description = "Proprietário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_landlord(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Party>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    Ok(Json(app_state.landlord_service.find_visible(id, user.0.client_scope()).await?))
}

// PATCH /api/landlords/{id}
#[utoipa::path(
    patch,
    path = "/api/landlords/{id}",
    tag = "Landlords",
    params(("id" = i32, Path, description = "ID do proprietário")),
    request_body = UpdatePartyPayload,
    responses(
        (status = 200, description = "Proprietário atualizado", body = Party),
        (status = 400, description = "Dados inválidos ou endereço já associado"),
        (status = 404, description = "Proprietário não encontrado"),
        (status = 406, description = "Proprietário inativo: apenas {id, isActive: true} é aceito"),
        (status = 409, description = "Tentativa de trocar o tipo jurídico")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_landlord(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdatePartyPayload>,
) -> Result<Json<Party>, AppError> {
    ensure_role(&user, ADMINS)?;
    app_state.landlord_service.find_visible(id, user.0.client_scope()).await?;
    if let Some(client_id) = payload.client_id {
        ensure_client(&user, client_id)?;
    }
    Ok(Json(app_state.landlord_service.update(id, payload).await?))
}

// DELETE /api/landlords/{id}
#[utoipa::path(
    delete,
    path = "/api/landlords/{id}",
    tag = "Landlords",
    params(("id" = i32, Path, description = "ID do proprietário")),
    responses(
        (status = 200, description = "Proprietário removido", body = Party),
        (status = 404, description = "Proprietário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_landlord(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Party>, AppError> {
    ensure_role(&user, ADMINS)?;
    app_state.landlord_service.find_visible(id, user.0.client_scope()).await?;
    Ok(Json(app_state.landlord_service.remove(id).await?))
}

// GET /api/landlords/{id}/pending-documents
#[utoipa::path(
    get,
    path = "/api/landlords/{id}/pending-documents",
    tag = "Landlords",
    params(("id" = i32, Path, description = "ID do proprietário")),
    responses(
        (status = 200, description = "Tipos de documento obrigatórios ainda não enviados", body = Vec<DocumentType>),
        (status = 404, description = "Proprietário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn landlord_pending_documents(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Vec<DocumentType>>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    let pending = app_state
        .document_service
        .pending_documents(OwnerType::Landlord, id, user.0.client_scope())
        .await?;
    Ok(Json(pending))
}
