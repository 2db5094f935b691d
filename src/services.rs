pub mod address_service;
pub mod auth;
pub mod client_service;
pub mod document_requirement_service;
pub mod document_service;
pub mod document_type_service;
pub mod party_service;
pub mod user_service;
