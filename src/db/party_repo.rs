// src/db/party_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::party::{CreatePartyPayload, LegalType, OwnerType, Party, UpdatePartyPayload},
};

/// Armazenamento de inquilinos ou proprietários (mesmo formato, tabelas distintas).
#[async_trait]
pub trait PartyRepository: Send + Sync {
    async fn create(&self, input: &CreatePartyPayload, legal_type: LegalType) -> Result<Party, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Party>, AppError>;
    async fn list(&self) -> Result<Vec<Party>, AppError>;
    async fn update(&self, id: i32, patch: &UpdatePartyPayload) -> Result<Option<Party>, AppError>;
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgPartyRepository {
    pool: PgPool,
    kind: OwnerType,
}

impl PgPartyRepository {
    pub fn new(pool: PgPool, kind: OwnerType) -> Self {
        Self { pool, kind }
    }

}

// O único UNIQUE da tabela é o address_id: corrida entre duas associações
fn map_address_taken(e: sqlx::Error) -> AppError {
    if e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation()) {
        return AppError::BadRequest("Address already associated to another entity.".into());
    }
    e.into()
}

#[async_trait]
impl PartyRepository for PgPartyRepository {
    async fn create(&self, input: &CreatePartyPayload, legal_type: LegalType) -> Result<Party, AppError> {
        // O nome da tabela vem de um enum fechado, nunca da requisição
        let query = format!(
            r#"
            INSERT INTO {} (
                name, cpf, cnpj, legal_type, email, phone, annotations, client_id, address_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
            self.kind.table()
        );

        sqlx::query_as::<_, Party>(&query)
            .bind(&input.name)
            .bind(&input.cpf)
            .bind(&input.cnpj)
            .bind(legal_type)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.annotations)
            .bind(input.client_id)
            .bind(input.address_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_address_taken)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Party>, AppError> {
        let query = format!("SELECT * FROM {} WHERE id = $1", self.kind.table());
        let party = sqlx::query_as::<_, Party>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(party)
    }

    async fn list(&self) -> Result<Vec<Party>, AppError> {
        let query = format!("SELECT * FROM {} ORDER BY id ASC", self.kind.table());
        let parties = sqlx::query_as::<_, Party>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(parties)
    }

    async fn update(&self, id: i32, patch: &UpdatePartyPayload) -> Result<Option<Party>, AppError> {
        let query = format!(
            r#"
            UPDATE {} SET
                name = COALESCE($2, name),
                cpf = COALESCE($3, cpf),
                cnpj = COALESCE($4, cnpj),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                is_active = COALESCE($7, is_active),
                annotations = COALESCE($8, annotations),
                client_id = COALESCE($9, client_id),
                address_id = COALESCE($10, address_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
            self.kind.table()
        );

        sqlx::query_as::<_, Party>(&query)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.cpf)
            .bind(&patch.cnpj)
            .bind(&patch.email)
            .bind(&patch.phone)
            .bind(patch.is_active)
            .bind(&patch.annotations)
            .bind(patch.client_id)
            .bind(patch.address_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_address_taken)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let query = format!("DELETE FROM {} WHERE id = $1", self.kind.table());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;

        Ok(result.rows_affected() > 0)
    }
}
