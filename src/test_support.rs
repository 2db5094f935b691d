// src/test_support.rs
//
// Fixtures compartilhadas pelos testes: payloads válidos, seeds no banco em
// memória e um AppState completo sem Postgres/Redis.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::{
    cache::{CacheService, MemoryCacheStore},
    config::{AppState, Config, Repositories},
    db::{memory::MemoryDatabase, AddressRepository, ClientRepository, PartyRepository},
    jobs::{DocumentJob, DocumentQueue},
    storage::LocalBucketStorage,
    models::{
        address::CreateAddressPayload,
        auth::{Claims, Role},
        client::CreateClientPayload,
        party::{CreatePartyPayload, LegalType, OwnerType, Party},
    },
};

static SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_digits(len: usize) -> String {
    format!("{:0len$}", SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

pub fn address_payload() -> CreateAddressPayload {
    CreateAddressPayload {
        street: "Rua Pernambuco".into(),
        number: "1000".into(),
        complement: Some("Apto 301".into()),
        neighborhood: "Savassi".into(),
        city: "Belo Horizonte".into(),
        state: "MG".into(),
        postal_code: "30130150".into(),
        additional_info: None,
    }
}

pub fn client_payload(address_id: i32) -> CreateClientPayload {
    CreateClientPayload {
        name: "Imobiliária Savassi".into(),
        cnpj: next_digits(14),
        phone: "3132221100".into(),
        email: "contato@savassi.com.br".into(),
        site: Some("https://savassi.com.br".into()),
        address_id,
    }
}

pub fn natural_party_payload(client_id: i32, address_id: i32) -> CreatePartyPayload {
    CreatePartyPayload {
        name: "Maria das Graças".into(),
        cpf: Some(next_digits(11)),
        cnpj: None,
        email: "maria@email.com".into(),
        phone: "31988887777".into(),
        annotations: None,
        client_id,
        address_id,
    }
}

pub fn legal_party_payload(client_id: i32, address_id: i32) -> CreatePartyPayload {
    CreatePartyPayload {
        name: "Construtora Horizonte Ltda".into(),
        cpf: None,
        cnpj: Some(next_digits(14)),
        email: "financeiro@horizonte.com.br".into(),
        phone: "3133334444".into(),
        annotations: Some("Contrato corporativo".into()),
        client_id,
        address_id,
    }
}

pub fn memory_cache() -> CacheService {
    CacheService::new(Arc::new(MemoryCacheStore::new(Duration::from_secs(60))))
}

/// Cria endereço + cliente e devolve o id do cliente.
pub async fn seed_client(db: &MemoryDatabase) -> i32 {
    let address = AddressRepository::create(db, &address_payload()).await.unwrap();
    ClientRepository::create(db, &client_payload(address.id)).await.unwrap().id
}

pub async fn seed_party(db: &MemoryDatabase, kind: OwnerType, natural: bool) -> Party {
    let client_id = seed_client(db).await;
    let address = AddressRepository::create(db, &address_payload()).await.unwrap();
    let (payload, legal_type) = if natural {
        (natural_party_payload(client_id, address.id), LegalType::Natural)
    } else {
        (legal_party_payload(client_id, address.id), LegalType::Legal)
    };
    db.party_repository(kind).create(&payload, legal_type).await.unwrap()
}

pub fn claims_for(id: i32, role: Role) -> Claims {
    let now = Utc::now().timestamp() as usize;
    Claims {
        sub: id,
        username: format!("user{id}"),
        email: format!("user{id}@imobiliaria.com"),
        role,
        client: None,
        exp: now + 3600,
        iat: now,
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        db_max_connections: 1,
        jwt_secret: "test-secret".into(),
        jwt_expiration_hours: 1,
        bcrypt_cost: 4,
        redis_url: None,
        cache_ttl_seconds: 60,
        server_addr: "127.0.0.1:0".into(),
        storage_bucket_dir: std::env::temp_dir(),
        storage_public_url: "http://localhost:3000/files".into(),
        address_cleanup_cron: "0 0 3 * * *".into(),
        superadmin: None,
    }
}

/// AppState completo sobre o banco em memória; a fila fica com o teste.
pub struct TestApp {
    pub state: AppState,
    pub db: MemoryDatabase,
    pub jobs: mpsc::Receiver<DocumentJob>,
    pub bucket: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let db = MemoryDatabase::new();
        let repos = Repositories {
            addresses: Arc::new(db.clone()),
            clients: Arc::new(db.clone()),
            tenants: Arc::new(db.party_repository(OwnerType::Tenant)),
            landlords: Arc::new(db.party_repository(OwnerType::Landlord)),
            users: Arc::new(db.clone()),
            document_types: Arc::new(db.clone()),
            document_requirements: Arc::new(db.clone()),
            documents: Arc::new(db.clone()),
        };
        let (queue, jobs) = DocumentQueue::channel(8);
        let bucket = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalBucketStorage::new(bucket.path(), "http://localhost:3000/files"));
        let state = AppState::new(&test_config(), repos, memory_cache(), queue, storage);
        Self { state, db, jobs, bucket }
    }

    /// Cria um usuário com o papel pedido e devolve um token válido para ele.
    pub async fn token_for(&self, role: Role) -> String {
        self.token_for_client(role, None).await
    }

    /// Como `token_for`, com o usuário vinculado a um cliente.
    pub async fn token_for_client(&self, role: Role, client_id: Option<i32>) -> String {
        let username = format!("user-{}", next_digits(6));
        let actor = claims_for(0, Role::Superadmin);
        let user = self
            .state
            .user_service
            .create(
                crate::models::auth::CreateUserPayload {
                    username: username.clone(),
                    password: "s3nha-forte".into(),
                    email: format!("{username}@imobiliaria.com"),
                    role,
                    client_id,
                },
                &actor,
            )
            .await
            .unwrap();
        self.state.auth_service.create_token(&user).unwrap()
    }
}
