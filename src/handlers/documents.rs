// src/handlers/documents.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{
        error::{AppError, FieldViolation},
        json::ApiJson,
        validation::violation,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        roles::{ensure_role, ADMINS, ALL_ROLES},
    },
    models::{
        document::{Document, DocumentOwnerFilter, DocumentUploadAccepted, UpdateDocumentPayload},
        party::OwnerType,
    },
    services::document_service::DocumentUpload,
};

/// Formato do multipart aceito em `POST /api/documents` (só para a documentação).
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    document_type_id: i32,
    owner_type: OwnerType,
    owner_id: i32,
    observation: Option<String>,
}

// POST /api/documents
#[utoipa::path(
    post,
    path = "/api/documents",
    tag = "Documents",
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 202, description = "Upload aceito e enfileirado", body = DocumentUploadAccepted),
        (status = 400, description = "Formulário inválido ou arquivo maior que 1 MiB"),
        (status = 404, description = "Tipo de documento ou dono não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_document(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    let upload = read_upload(multipart).await?;
    let accepted = app_state.document_service.enqueue_upload(upload, user.0.client_scope()).await?;
    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

// GET /api/documents?ownerType=Tenant&ownerId=1
#[utoipa::path(
    get,
    path = "/api/documents",
    tag = "Documents",
    params(
        ("ownerType" = Option<OwnerType>, Query, description = "Filtra pelo tipo de dono"),
        ("ownerId" = Option<i32>, Query, description = "Filtra pelo id do dono")
    ),
    responses((status = 200, description = "Lista de documentos", body = Vec<Document>)),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(filter): Query<DocumentOwnerFilter>,
) -> Result<Json<Vec<Document>>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    let visible = app_state.document_service.list_visible(filter, user.0.client_scope()).await?;
    Ok(Json(visible))
}

// GET /api/documents/{id}
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = i32, Path, description = "ID do documento")),
    responses(
        (status = 200, description = "Documento encontrado", body = Document),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_document(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Document>, AppError> {
    ensure_role(&user, ALL_ROLES)?;
    Ok(Json(app_state.document_service.find_visible(id, user.0.client_scope()).await?))
}

// PATCH /api/documents/{id}
#[utoipa::path(
    patch,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = i32, Path, description = "ID do documento")),
    request_body = UpdateDocumentPayload,
    responses(
        (status = 200, description = "Documento atualizado", body = Document),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_document(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdateDocumentPayload>,
) -> Result<Json<Document>, AppError> {
    ensure_role(&user, ADMINS)?;
    app_state.document_service.find_visible(id, user.0.client_scope()).await?;
    Ok(Json(app_state.document_service.update(id, payload).await?))
}

// DELETE /api/documents/{id}
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = i32, Path, description = "ID do documento")),
    responses(
        (status = 200, description = "Documento removido", body = Document),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_document(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Document>, AppError> {
    ensure_role(&user, ADMINS)?;
    app_state.document_service.find_visible(id, user.0.client_scope()).await?;
    Ok(Json(app_state.document_service.remove(id).await?))
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::BadRequest(e.body_text())
}

// Lê o formulário inteiro; campos ausentes ou malformados saem juntos como erro de validação
async fn read_upload(mut multipart: Multipart) -> Result<DocumentUpload, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut document_type_id = None;
    let mut owner_type = None;
    let mut owner_id = None;
    let mut observation = None;
    let mut violations: Vec<FieldViolation> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                if file.is_some() {
                    return Err(AppError::BadRequest("Only one file can be uploaded per request.".into()));
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                file = Some((file_name, bytes.to_vec()));
            }
            "documentTypeId" => {
                let text = field.text().await.map_err(bad_multipart)?;
                document_type_id = parse_id(&name, &text, &mut violations);
            }
            "ownerId" => {
                let text = field.text().await.map_err(bad_multipart)?;
                owner_id = parse_id(&name, &text, &mut violations);
            }
            "ownerType" => {
                let text = field.text().await.map_err(bad_multipart)?;
                owner_type = match text.trim().to_ascii_lowercase().as_str() {
                    "tenant" => Some(OwnerType::Tenant),
                    "landlord" => Some(OwnerType::Landlord),
                    _ => {
                        violations.push(violation(
                            "ownerType",
                            "isEnum",
                            "The \"ownerType\" field must be Tenant or Landlord.",
                        ));
                        None
                    }
                };
            }
            "observation" => {
                let text = field.text().await.map_err(bad_multipart)?;
                observation = Some(text).filter(|t| !t.trim().is_empty());
            }
            // campos extras são ignorados
            _ => {}
        }
    }

    let required = [
        ("file", file.is_none()),
        ("documentTypeId", document_type_id.is_none()),
        ("ownerType", owner_type.is_none()),
        ("ownerId", owner_id.is_none()),
    ];
    for (property, missing) in required {
        if missing && !violations.iter().any(|v| v.property == property) {
            violations.push(violation(
                property,
                "isNotEmpty",
                format!("The \"{property}\" field is required."),
            ));
        }
    }

    match (file, document_type_id, owner_type, owner_id) {
        (Some((file_name, bytes)), Some(document_type_id), Some(owner_type), Some(owner_id)) if violations.is_empty() => {
            Ok(DocumentUpload { file_name, bytes, document_type_id, owner_type, owner_id, observation })
        }
        _ => {
            violations.sort_by(|a, b| a.property.cmp(&b.property));
            Err(AppError::ValidationError(violations))
        }
    }
}

fn parse_id(property: &str, text: &str, violations: &mut Vec<FieldViolation>) -> Option<i32> {
    match text.trim().parse::<i32>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            violations.push(violation(
                property,
                "isInt",
                format!("The \"{property}\" field must be a positive integer."),
            ));
            None
        }
    }
}
