// src/config.rs

use std::{env, path::PathBuf, sync::Arc};

use anyhow::Context;
use sqlx::PgPool;

use crate::{
    cache::CacheService,
    db::{
        AddressRepository, ClientRepository, DocumentRepository, DocumentRequirementRepository,
        DocumentTypeRepository, PartyRepository, PgAddressRepository, PgClientRepository, PgDocumentRepository,
        PgDocumentRequirementRepository, PgDocumentTypeRepository, PgPartyRepository, PgUserRepository,
        UserRepository,
    },
    jobs::DocumentQueue,
    models::party::OwnerType,
    services::{
        address_service::AddressService, auth::AuthService, client_service::ClientService,
        document_requirement_service::DocumentRequirementService, document_service::DocumentService,
        document_type_service::DocumentTypeService, party_service::PartyService, user_service::UserService,
    },
    storage::ObjectStorage,
};

/// Usuário criado no boot quando as três variáveis `SUPERADMIN_*` existem.
#[derive(Debug, Clone)]
pub struct SuperadminSeed {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub bcrypt_cost: u32,
    pub redis_url: Option<String>,
    pub cache_ttl_seconds: u64,
    pub server_addr: String,
    pub storage_bucket_dir: PathBuf,
    pub storage_public_url: String,
    pub address_cleanup_cron: String,
    pub superadmin: Option<SuperadminSeed>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let superadmin = match (
            optional("SUPERADMIN_USERNAME"),
            optional("SUPERADMIN_PASSWORD"),
            optional("SUPERADMIN_EMAIL"),
        ) {
            (Some(username), Some(password), Some(email)) => Some(SuperadminSeed { username, password, email }),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            db_max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            jwt_expiration_hours: parsed("JWT_EXPIRATION_HOURS", 24)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            redis_url: optional("REDIS_URL"),
            cache_ttl_seconds: parsed("CACHE_TTL_SECONDS", 3600)?,
            server_addr: optional("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            storage_bucket_dir: optional("STORAGE_BUCKET_DIR").unwrap_or_else(|| "./bucket".into()).into(),
            storage_public_url: optional("STORAGE_PUBLIC_URL")
                .unwrap_or_else(|| "http://localhost:3000/files".into()),
            address_cleanup_cron: optional("ADDRESS_CLEANUP_CRON").unwrap_or_else(|| "0 0 3 * * *".into()),
            superadmin,
        })
    }
}

// Variável ausente ou vazia conta como não definida
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw.parse().with_context(|| format!("{key} inválido: {raw}")),
        None => Ok(default),
    }
}

/// Uma implementação de cada repositório; Postgres em produção, memória nos testes.
#[derive(Clone)]
pub struct Repositories {
    pub addresses: Arc<dyn AddressRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub tenants: Arc<dyn PartyRepository>,
    pub landlords: Arc<dyn PartyRepository>,
    pub users: Arc<dyn UserRepository>,
    pub document_types: Arc<dyn DocumentTypeRepository>,
    pub document_requirements: Arc<dyn DocumentRequirementRepository>,
    pub documents: Arc<dyn DocumentRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            addresses: Arc::new(PgAddressRepository::new(pool.clone())),
            clients: Arc::new(PgClientRepository::new(pool.clone())),
            tenants: Arc::new(PgPartyRepository::new(pool.clone(), OwnerType::Tenant)),
            landlords: Arc::new(PgPartyRepository::new(pool.clone(), OwnerType::Landlord)),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            document_types: Arc::new(PgDocumentTypeRepository::new(pool.clone())),
            document_requirements: Arc::new(PgDocumentRequirementRepository::new(pool.clone())),
            documents: Arc::new(PgDocumentRepository::new(pool)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub address_service: AddressService,
    pub client_service: ClientService,
    pub tenant_service: PartyService,
    pub landlord_service: PartyService,
    pub document_type_service: DocumentTypeService,
    pub document_requirement_service: DocumentRequirementService,
    pub document_service: DocumentService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(
        config: &Config,
        repos: Repositories,
        cache: CacheService,
        queue: DocumentQueue,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        let auth_service = AuthService::new(repos.users.clone(), config.jwt_secret.clone(), config.jwt_expiration_hours)
            .with_bcrypt_cost(config.bcrypt_cost);
        let user_service = UserService::new(repos.users.clone(), auth_service.clone());
        let address_service = AddressService::new(repos.addresses.clone());
        let client_service = ClientService::new(repos.clients.clone(), address_service.clone());

        let party_service = |kind: OwnerType, repo: &Arc<dyn PartyRepository>| {
            PartyService::new(kind, repo.clone(), repos.clients.clone(), address_service.clone(), cache.clone())
        };
        let tenant_service = party_service(OwnerType::Tenant, &repos.tenants);
        let landlord_service = party_service(OwnerType::Landlord, &repos.landlords);

        let document_requirement_service = DocumentRequirementService::new(
            repos.document_requirements.clone(),
            repos.document_types.clone(),
            cache.clone(),
        );
        let document_type_service =
            DocumentTypeService::new(repos.document_types.clone(), document_requirement_service.clone());
        let document_service = DocumentService::new(
            repos.documents.clone(),
            repos.document_types.clone(),
            repos.tenants.clone(),
            repos.landlords.clone(),
            document_requirement_service.clone(),
            queue,
            storage,
            cache,
        );

        Self {
            auth_service,
            user_service,
            address_service,
            client_service,
            tenant_service,
            landlord_service,
            document_type_service,
            document_requirement_service,
            document_service,
        }
    }
}
