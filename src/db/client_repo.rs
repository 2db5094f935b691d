// src/db/client_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{map_foreign_key_violation, map_unique_violation},
    models::client::{Client, CreateClientPayload, UpdateClientPayload},
};

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn create(&self, input: &CreateClientPayload) -> Result<Client, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Client>, AppError>;
    async fn list(&self) -> Result<Vec<Client>, AppError>;
    async fn update(&self, id: i32, patch: &UpdateClientPayload) -> Result<Option<Client>, AppError>;
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// A mesma violação de unicidade pode vir do CNPJ ou do endereço
fn map_client_write_error(e: sqlx::Error) -> AppError {
    let address_taken = e
        .as_database_error()
        .and_then(|db_err| db_err.constraint())
        .is_some_and(|constraint| constraint == "clients_address_id_key");

    if address_taken {
        return AppError::BadRequest("Address already associated to another entity.".into());
    }
    map_unique_violation(e, "A client with this cnpj already exists.")
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn create(&self, input: &CreateClientPayload) -> Result<Client, AppError> {
        sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, cnpj, phone, email, site, address_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.cnpj)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.site)
        .bind(input.address_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_client_write_error)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    async fn update(&self, id: i32, patch: &UpdateClientPayload) -> Result<Option<Client>, AppError> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name = COALESCE($2, name),
                cnpj = COALESCE($3, cnpj),
                phone = COALESCE($4, phone),
                email = COALESCE($5, email),
                site = COALESCE($6, site),
                is_active = COALESCE($7, is_active),
                address_id = COALESCE($8, address_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.cnpj)
        .bind(&patch.phone)
        .bind(&patch.email)
        .bind(&patch.site)
        .bind(patch.is_active)
        .bind(patch.address_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_client_write_error)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_foreign_key_violation(e, "Client still has tenants or landlords linked to it.")
            })?;

        Ok(result.rows_affected() > 0)
    }
}
