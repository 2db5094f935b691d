// src/services/address_service.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    common::{
        error::{AppError, LogOnError},
        validation::validate_payload,
    },
    db::AddressRepository,
    models::address::{Address, AddressOwner, CreateAddressPayload, UpdateAddressPayload},
};

/// Endereços órfãos mais velhos que isso são apagados pela limpeza.
pub const UNLINKED_ADDRESS_MAX_AGE_HOURS: i64 = 24;

pub const ADDRESS_TAKEN: &str = "Address already associated to another entity.";

#[derive(Clone)]
pub struct AddressService {
    repo: Arc<dyn AddressRepository>,
}

impl AddressService {
    pub fn new(repo: Arc<dyn AddressRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, payload: CreateAddressPayload) -> Result<Address, AppError> {
        async {
            validate_payload(&payload)?;
            self.repo.create(&payload).await
        }
        .await
        .log_on_error("createAddress", &payload)
    }

    pub async fn find(&self, id: i32) -> Result<Address, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .and_then(|found| found.ok_or_else(|| not_found(id)))
            .log_on_error("address", &id)
    }

    pub async fn list(&self) -> Result<Vec<Address>, AppError> {
        self.repo.list().await.log_on_error("addresses", &())
    }

    pub async fn update(&self, id: i32, payload: UpdateAddressPayload) -> Result<Address, AppError> {
        async {
            validate_payload(&payload)?;
            self.repo.update(id, &payload).await?.ok_or_else(|| not_found(id))
        }
        .await
        .log_on_error("updateAddress", &(id, &payload))
    }

    /// Um endereço associado não pode ser removido: o dono ficaria sem endereço.
    pub async fn remove(&self, id: i32) -> Result<Address, AppError> {
        async {
            let found = self.repo.find_with_owners(id).await?.ok_or_else(|| not_found(id))?;
            if found.is_associated() {
                return Err(AppError::BadRequest(
                    "Address is associated to an entity and cannot be removed.".into(),
                ));
            }
            self.repo.delete(id).await?;
            Ok::<_, AppError>(found.address)
        }
        .await
        .log_on_error("removeAddress", &id)
    }

    /// Garante que o endereço existe e está livre (ou já é de `owner`).
    pub async fn ensure_available(&self, address_id: i32, owner: Option<AddressOwner>) -> Result<Address, AppError> {
        let found = self
            .repo
            .find_with_owners(address_id)
            .await?
            .ok_or_else(|| not_found(address_id))?;

        if found.is_associated_to_other_than(owner) {
            return Err(AppError::BadRequest(ADDRESS_TAKEN.into()));
        }
        Ok(found.address)
    }

    /// Apaga os endereços sem dono criados antes de `now - 24h` e devolve os apagados.
    pub async fn delete_unlinked_addresses(&self, now: DateTime<Utc>) -> Result<Vec<Address>, AppError> {
        async {
            let cutoff = now - Duration::hours(UNLINKED_ADDRESS_MAX_AGE_HOURS);
            let stale: Vec<Address> = self
                .repo
                .list_with_owners()
                .await?
                .into_iter()
                .filter(|a| !a.is_associated() && a.address.created_at < cutoff)
                .map(|a| a.address)
                .collect();

            let mut deleted = Vec::with_capacity(stale.len());
            for address in stale {
                match self.repo.delete(address.id).await {
                    Ok(true) => deleted.push(address),
                    Ok(false) => {}
                    // associado depois da listagem: fica para a próxima execução
                    Err(e) => tracing::warn!(address_id = address.id, error = %e, "Endereço mantido pela limpeza"),
                }
            }
            Ok::<_, AppError>(deleted)
        }
        .await
        .log_on_error("deleteUnlinkedAddresses", &now)
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Address with id {id} not found."))
}
