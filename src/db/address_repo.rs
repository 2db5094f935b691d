// src/db/address_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::map_foreign_key_violation,
    models::address::{Address, AddressWithOwners, CreateAddressPayload, UpdateAddressPayload},
};

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn create(&self, input: &CreateAddressPayload) -> Result<Address, AppError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Address>, AppError>;
    async fn find_with_owners(&self, id: i32) -> Result<Option<AddressWithOwners>, AppError>;
    async fn list(&self) -> Result<Vec<Address>, AppError>;
    async fn list_with_owners(&self) -> Result<Vec<AddressWithOwners>, AppError>;
    async fn update(&self, id: i32, patch: &UpdateAddressPayload) -> Result<Option<Address>, AppError>;
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

// O repositório de endereços, responsável pela tabela 'addresses'
#[derive(Clone)]
pub struct PgAddressRepository {
    pool: PgPool,
}

impl PgAddressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Junta as três referências de volta (inquilino, proprietário, cliente)
const SELECT_WITH_OWNERS: &str = r#"
    SELECT a.*, t.id AS tenant_id, l.id AS landlord_id, c.id AS client_id
    FROM addresses a
    LEFT JOIN tenants t ON t.address_id = a.id
    LEFT JOIN landlords l ON l.address_id = a.id
    LEFT JOIN clients c ON c.address_id = a.id
"#;

#[async_trait]
impl AddressRepository for PgAddressRepository {
    async fn create(&self, input: &CreateAddressPayload) -> Result<Address, AppError> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (
                street, number, complement, neighborhood, city, state, postal_code, additional_info
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&input.street)
        .bind(&input.number)
        .bind(&input.complement)
        .bind(&input.neighborhood)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.additional_info)
        .fetch_one(&self.pool)
        .await?;

        Ok(address)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Address>, AppError> {
        let address = sqlx::query_as::<_, Address>("SELECT * FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(address)
    }

    async fn find_with_owners(&self, id: i32) -> Result<Option<AddressWithOwners>, AppError> {
        let query = format!("{SELECT_WITH_OWNERS} WHERE a.id = $1");
        let address = sqlx::query_as::<_, AddressWithOwners>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(address)
    }

    async fn list(&self) -> Result<Vec<Address>, AppError> {
        let addresses = sqlx::query_as::<_, Address>("SELECT * FROM addresses ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(addresses)
    }

    async fn list_with_owners(&self) -> Result<Vec<AddressWithOwners>, AppError> {
        let query = format!("{SELECT_WITH_OWNERS} ORDER BY a.id ASC");
        let addresses = sqlx::query_as::<_, AddressWithOwners>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(addresses)
    }

    async fn update(&self, id: i32, patch: &UpdateAddressPayload) -> Result<Option<Address>, AppError> {
        let address = sqlx::query_as::<_, Address>(
            r#"
            UPDATE addresses SET
                street = COALESCE($2, street),
                number = COALESCE($3, number),
                complement = COALESCE($4, complement),
                neighborhood = COALESCE($5, neighborhood),
                city = COALESCE($6, city),
                state = COALESCE($7, state),
                postal_code = COALESCE($8, postal_code),
                additional_info = COALESCE($9, additional_info),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.street)
        .bind(&patch.number)
        .bind(&patch.complement)
        .bind(&patch.neighborhood)
        .bind(&patch.city)
        .bind(&patch.state)
        .bind(&patch.postal_code)
        .bind(&patch.additional_info)
        .fetch_optional(&self.pool)
        .await?;

        Ok(address)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_foreign_key_violation(e, "Address is still associated to an entity."))?;

        Ok(result.rows_affected() > 0)
    }
}
