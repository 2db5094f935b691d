// src/handlers/clients.rs

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
        roles::{ensure_role, ADMINS, SUPERADMIN_ONLY},
    },
    models::client::{Client, CreateClientPayload, UpdateClientPayload},
};

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(payload): ApiJson<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    ensure_role(&user, SUPERADMIN_ONLY)?;
    let created = app_state.client_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Client>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Client>>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.client_service.list().await?))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = i32, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente encontrado", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Client>, AppError> {
    ensure_role(&user, ADMINS)?;
    Ok(Json(app_state.client_service.find(id).await?))
}

// PATCH /api/clients/{id}
#[utoipa::path(
    patch,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = i32, Path, description = "ID do cliente")),
    request_body = UpdateClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdateClientPayload>,
) -> Result<Json<Client>, AppError> {
    ensure_role(&user, SUPERADMIN_ONLY)?;
    Ok(Json(app_state.client_service.update(id, payload).await?))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = i32, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente removido", body = Client),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Cliente ainda possui inquilinos ou proprietários")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_client(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Client>, AppError> {
    ensure_role(&user, SUPERADMIN_ONLY)?;
    Ok(Json(app_state.client_service.remove(id).await?))
}
