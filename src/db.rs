pub mod address_repo;
pub use address_repo::{AddressRepository, PgAddressRepository};
pub mod client_repo;
pub use client_repo::{ClientRepository, PgClientRepository};
pub mod party_repo;
pub use party_repo::{PartyRepository, PgPartyRepository};
pub mod document_repo;
pub use document_repo::{
    DocumentRepository, DocumentRequirementRepository, DocumentTypeRepository,
    PgDocumentRepository, PgDocumentRequirementRepository, PgDocumentTypeRepository,
};
pub mod user_repo;
pub use user_repo::{PgUserRepository, UserRepository};

#[cfg(test)]
pub mod memory;

// Converte violações de unicidade em Conflict e o resto em erro de banco
pub(crate) fn map_unique_violation(e: sqlx::Error, message: &str) -> crate::common::error::AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return crate::common::error::AppError::Conflict(message.to_string());
        }
    }
    e.into()
}

pub(crate) fn map_foreign_key_violation(e: sqlx::Error, message: &str) -> crate::common::error::AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return crate::common::error::AppError::Conflict(message.to_string());
        }
    }
    e.into()
}
