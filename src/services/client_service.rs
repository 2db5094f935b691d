// src/services/client_service.rs

use std::sync::Arc;

use crate::{
    common::{
        error::{AppError, LogOnError},
        validation::validate_payload,
    },
    db::ClientRepository,
    models::{
        address::AddressOwner,
        client::{Client, CreateClientPayload, UpdateClientPayload},
    },
    services::address_service::AddressService,
};

#[derive(Clone)]
pub struct ClientService {
    repo: Arc<dyn ClientRepository>,
    addresses: AddressService,
}

impl ClientService {
    pub fn new(repo: Arc<dyn ClientRepository>, addresses: AddressService) -> Self {
        Self { repo, addresses }
    }

    pub async fn create(&self, payload: CreateClientPayload) -> Result<Client, AppError> {
        async {
            validate_payload(&payload)?;
            self.addresses.ensure_available(payload.address_id, None).await?;
            self.repo.create(&payload).await
        }
        .await
        .log_on_error("createClient", &payload)
    }

    pub async fn find(&self, id: i32) -> Result<Client, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .and_then(|found| found.ok_or_else(|| not_found(id)))
            .log_on_error("client", &id)
    }

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        self.repo.list().await.log_on_error("clients", &())
    }

    pub async fn update(&self, id: i32, payload: UpdateClientPayload) -> Result<Client, AppError> {
        async {
            validate_payload(&payload)?;
            if let Some(address_id) = payload.address_id {
                self.addresses
                    .ensure_available(address_id, Some(AddressOwner::Client(id)))
                    .await?;
            }
            self.repo.update(id, &payload).await?.ok_or_else(|| not_found(id))
        }
        .await
        .log_on_error("updateClient", &(id, &payload))
    }

    pub async fn remove(&self, id: i32) -> Result<Client, AppError> {
        async {
            let client = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
            self.repo.delete(id).await?;
            Ok::<_, AppError>(client)
        }
        .await
        .log_on_error("removeClient", &id)
    }
}

pub(crate) fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Client with id {id} not found."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::services::address_service::ADDRESS_TAKEN;
    use crate::test_support::{address_payload, client_payload};

    fn services(db: &MemoryDatabase) -> (ClientService, AddressService) {
        let addresses = AddressService::new(Arc::new(db.clone()));
        (ClientService::new(Arc::new(db.clone()), addresses.clone()), addresses)
    }

    #[tokio::test]
    async fn second_attach_of_a_linked_address_fails() {
        let db = MemoryDatabase::new();
        let (clients, addresses) = services(&db);
        let address = addresses.create(address_payload()).await.unwrap();
        clients.create(client_payload(address.id)).await.unwrap();

        let mut other = client_payload(address.id);
        other.cnpj = "99888777000166".into();
        let err = clients.create(other).await.unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m == ADDRESS_TAKEN));
    }

    #[tokio::test]
    async fn a_client_may_keep_its_own_address_on_update() {
        let db = MemoryDatabase::new();
        let (clients, addresses) = services(&db);
        let address = addresses.create(address_payload()).await.unwrap();
        let client = clients.create(client_payload(address.id)).await.unwrap();

        let updated = clients
            .update(
                client.id,
                UpdateClientPayload {
                    name: Some("Imobiliária Central".into()),
                    address_id: Some(address.id),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Imobiliária Central");
        assert_eq!(updated.address_id, address.id);
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let db = MemoryDatabase::new();
        let (clients, _) = services(&db);
        assert!(matches!(clients.find(42).await, Err(AppError::NotFound(_))));
        assert!(matches!(clients.remove(42).await, Err(AppError::NotFound(_))));
    }
}
