// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::me,

        // --- Users ---
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::remove_user,

        // --- Addresses ---
        handlers::addresses::create_address,
        handlers::addresses::list_addresses,
        handlers::addresses::get_address,
        handlers::addresses::update_address,
        handlers::addresses::remove_address,

        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::remove_client,

        // --- Tenants ---
        handlers::tenants::create_tenant,
        handlers::tenants::list_tenants,
        handlers::tenants::get_tenant,
        handlers::tenants::update_tenant,
        handlers::tenants::remove_tenant,
        handlers::tenants::tenant_pending_documents,

        // --- Landlords ---
        handlers::landlords::create_landlord,
        handlers::landlords::list_landlords,
        handlers::landlords::get_landlord,
        handlers::landlords::update_landlord,
        handlers::landlords::remove_landlord,
        handlers::landlords::landlord_pending_documents,

        // --- Document types ---
        handlers::document_types::create_document_type,
        handlers::document_types::list_document_types,
        handlers::document_types::get_document_type,
        handlers::document_types::update_document_type,
        handlers::document_types::remove_document_type,

        // --- Document requirements ---
        handlers::document_requirements::create_document_requirement,
        handlers::document_requirements::list_document_requirements,
        handlers::document_requirements::get_document_requirement,
        handlers::document_requirements::update_document_requirement,
        handlers::document_requirements::remove_document_requirement,

        // --- Documents ---
        handlers::documents::create_document,
        handlers::documents::list_documents,
        handlers::documents::get_document,
        handlers::documents::update_document,
        handlers::documents::remove_document,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::Claims,
            models::auth::LoginPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,

            // --- Addresses ---
            models::address::Address,
            models::address::CreateAddressPayload,
            models::address::UpdateAddressPayload,

            // --- Clients ---
            models::client::Client,
            models::client::CreateClientPayload,
            models::client::UpdateClientPayload,

            // --- Parties ---
            models::party::OwnerType,
            models::party::LegalType,
            models::party::Party,
            models::party::CreatePartyPayload,
            models::party::UpdatePartyPayload,

            // --- Documents ---
            models::document::LegalApplicability,
            models::document::DocumentStatus,
            models::document::DocumentType,
            models::document::CreateDocumentTypePayload,
            models::document::UpdateDocumentTypePayload,
            models::document::DocumentRequirement,
            models::document::CreateDocumentRequirementPayload,
            models::document::UpdateDocumentRequirementPayload,
            models::document::Document,
            models::document::UpdateDocumentPayload,
            models::document::DocumentUploadAccepted,
            handlers::documents::DocumentUploadForm,

            // --- Erros ---
            crate::common::error::FieldViolation,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Users", description = "Usuários do sistema e seus papéis"),
        (name = "Addresses", description = "Endereços de clientes, inquilinos e proprietários"),
        (name = "Clients", description = "Imobiliárias"),
        (name = "Tenants", description = "Inquilinos"),
        (name = "Landlords", description = "Proprietários"),
        (name = "Document Types", description = "Tipos de documento"),
        (name = "Document Requirements", description = "Documentos exigidos por papel"),
        (name = "Documents", description = "Upload e revisão de documentos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
