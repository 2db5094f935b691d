// src/handlers/addresses.rs

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
        roles::{ensure_role, ADMINS},
    },
    models::address::{Address, CreateAddressPayload, UpdateAddressPayload},
};

// POST /api/addresses
#[utoipa::path(
    post,
    path = "/api/addresses",
    tag = "Addresses",
    request_body = CreateAddressPayload,
    responses(
        (status = 201, description = "Endereço criado", body = Address),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_address(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<CreateAddressPayload>,
) -> Result<impl IntoResponse, AppError> {
    ensure_role(&user, ADMINS)?;
    let created = app_state.address_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/addresses
#[utoipa::path(
    get,
    path = "/api/addresses",
    tag = "Addresses",
    responses(
        (status = 200, description = "Lista de endereços", body = Vec<Address>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_addresses(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Address>>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.address_service.list().await?))
}

// GET /api/addresses/{id}
#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    tag = "Addresses",
    params(("id" = i32, Path, description = "ID do endereço")),
    responses(
        (status = 200, description = "Endereço encontrado", body = Address),
        (status = 404, description = "Endereço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_address(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Address>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.address_service.find(id).await?))
}

// PATCH /api/addresses/{id}
#[utoipa::path(
    patch,
    path = "/api/addresses/{id}",
    tag = "Addresses",
    params(("id" = i32, Path, description = "ID do endereço")),
    request_body = UpdateAddressPayload,
    responses(
        (status = 200, description = "Endereço atualizado", body = Address),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Endereço não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_address(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdateAddressPayload>,
) -> Result<Json<Address>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.address_service.update(id, payload).await?))
}

// DELETE /api/addresses/{id}
#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    tag = "Addresses",
    params(("id" = i32, Path, description = "ID do endereço")),
    responses(
        (status = 200, description = "Endereço removido", body = Address),
        (status = 404, description = "Endereço não encontrado"),
        (status = 400, description = "Endereço associado a uma entidade")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_address(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Address>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.address_service.remove(id).await?))
}
