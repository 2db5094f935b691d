//src/main.rs

use std::{sync::Arc, time::Duration};

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod cache;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod jobs;
mod middleware;
mod models;
mod services;
mod storage;
#[cfg(test)]
mod test_support;

use crate::{
    cache::{CacheService, CacheStore, MemoryCacheStore, RedisCacheStore},
    config::{AppState, Config, Repositories},
    docs::ApiDoc,
    jobs::{
        address_cleanup::{self, address_cleanup_job},
        document_queue::QUEUE_CAPACITY,
        CronScheduler, DocumentQueue, DocumentUploadHandler, DocumentWorker, Scheduler,
    },
    middleware::auth::auth_guard,
    storage::LocalBucketStorage,
};

// Multipart com folga sobre o limite de 1 MiB do arquivo, checado no serviço
const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;
const DOCUMENT_RETRY_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await?;
    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let cache_store: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisCacheStore::connect(url, "imobiliaria", config.cache_ttl_seconds).await?),
        None => {
            tracing::info!("REDIS_URL ausente, usando cache em memória.");
            Arc::new(MemoryCacheStore::new(Duration::from_secs(config.cache_ttl_seconds)))
        }
    };

    let (queue, receiver) = DocumentQueue::channel(QUEUE_CAPACITY);
    let storage = Arc::new(LocalBucketStorage::new(&config.storage_bucket_dir, &config.storage_public_url));
    let app_state = AppState::new(
        &config,
        Repositories::postgres(db_pool),
        CacheService::new(cache_store),
        queue,
        storage.clone(),
    );

    // Consumidor da fila de documentos
    let handler = Arc::new(DocumentUploadHandler::new(storage, app_state.document_service.clone()));
    tokio::spawn(DocumentWorker::new(receiver, handler, DOCUMENT_RETRY_DELAY).run());

    let scheduler = CronScheduler::new();
    scheduler.register_recurring_job(
        address_cleanup::JOB_NAME,
        &config.address_cleanup_cron,
        address_cleanup_job(app_state.address_service.clone()),
    )?;

    if let Some(seed) = &config.superadmin {
        app_state
            .user_service
            .ensure_superadmin(&seed.username, &seed.password, &seed.email)
            .await?;
    }

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app(app_state)).await?;

    scheduler.shutdown();
    Ok(())
}

pub fn app(app_state: AppState) -> Router {
    use handlers::{
        addresses, auth, clients, document_requirements, document_types, documents, landlords, tenants, users,
    };

    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(auth::login));

    // Todo o resto exige Bearer; os papéis são checados em cada handler
    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/users", post(users::create_user).get(users::list_users))
        .route(
            "/api/users/{id}",
            get(users::get_user).patch(users::update_user).delete(users::remove_user),
        )
        .route("/api/addresses", post(addresses::create_address).get(addresses::list_addresses))
        .route(
            "/api/addresses/{id}",
            get(addresses::get_address)
                .patch(addresses::update_address)
                .delete(addresses::remove_address),
        )
        .route("/api/clients", post(clients::create_client).get(clients::list_clients))
        .route(
            "/api/clients/{id}",
            get(clients::get_client).patch(clients::update_client).delete(clients::remove_client),
        )
        .route("/api/tenants", post(tenants::create_tenant).get(tenants::list_tenants))
        .route(
            "/api/tenants/{id}",
            get(tenants::get_tenant).patch(tenants::update_tenant).delete(tenants::remove_tenant),
        )
        .route("/api/tenants/{id}/pending-documents", get(tenants::tenant_pending_documents))
        .route("/api/landlords", post(landlords::create_landlord).get(landlords::list_landlords))
        .route(
            "/api/landlords/{id}",
            get(landlords::get_landlord)
                .patch(landlords::update_landlord)
                .delete(landlords::remove_landlord),
        )
        .route("/api/landlords/{id}/pending-documents", get(landlords::landlord_pending_documents))
        .route(
            "/api/document-types",
            post(document_types::create_document_type).get(document_types::list_document_types),
        )
        .route(
            "/api/document-types/{id}",
            get(document_types::get_document_type)
                .patch(document_types::update_document_type)
                .delete(document_types::remove_document_type),
        )
        .route(
            "/api/document-requirements",
            post(document_requirements::create_document_requirement)
                .get(document_requirements::list_document_requirements),
        )
        .route(
            "/api/document-requirements/{id}",
            get(document_requirements::get_document_requirement)
                .patch(document_requirements::update_document_requirement)
                .delete(document_requirements::remove_document_requirement),
        )
        .route("/api/documents", post(documents::create_document).get(documents::list_documents))
        .route(
            "/api/documents/{id}",
            get(documents::get_document)
                .patch(documents::update_document)
                .delete(documents::remove_document),
        )
        .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Combina tudo no router principal
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(app_state)
}
