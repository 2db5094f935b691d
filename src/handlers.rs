pub mod addresses;
pub mod auth;
pub mod clients;
pub mod document_requirements;
pub mod document_types;
pub mod documents;
pub mod landlords;
pub mod tenants;
pub mod users;
