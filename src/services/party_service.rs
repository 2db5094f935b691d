// src/services/party_service.rs
//
// Inquilinos e proprietários: mesmo fluxo, parametrizado por `OwnerType`.
// Leituras passam pelo cache; escritas atualizam registro e coleção.

use std::sync::Arc;

use crate::{
    cache::{CacheService, CacheUpdate},
    common::{
        error::{AppError, LogOnError},
        validation::validate_payload,
    },
    db::{ClientRepository, PartyRepository},
    models::{
        address::AddressOwner,
        auth::ClientScope,
        party::{CreatePartyPayload, LegalType, OwnerType, Party, UpdatePartyPayload},
    },
    services::{address_service::AddressService, client_service},
};

#[derive(Clone)]
pub struct PartyService {
    kind: OwnerType,
    repo: Arc<dyn PartyRepository>,
    clients: Arc<dyn ClientRepository>,
    addresses: AddressService,
    cache: CacheService,
}

impl PartyService {
    pub fn new(
        kind: OwnerType,
        repo: Arc<dyn PartyRepository>,
        clients: Arc<dyn ClientRepository>,
        addresses: AddressService,
        cache: CacheService,
    ) -> Self {
        Self { kind, repo, clients, addresses, cache }
    }

    fn module_name(&self) -> &'static str {
        self.kind.module_name()
    }

    fn owner(&self, id: i32) -> AddressOwner {
        match self.kind {
            OwnerType::Tenant => AddressOwner::Tenant(id),
            OwnerType::Landlord => AddressOwner::Landlord(id),
        }
    }

    fn not_found(&self, id: i32) -> AppError {
        AppError::NotFound(format!("{} with id {id} not found.", self.kind.label()))
    }

    pub async fn create(&self, payload: CreatePartyPayload) -> Result<Party, AppError> {
        let payload = payload.normalized();
        async {
            validate_payload(&payload)?;
            let legal_type = LegalType::from_documents(payload.cpf.as_deref(), payload.cnpj.as_deref())?;
            self.ensure_client_exists(payload.client_id).await?;
            self.addresses.ensure_available(payload.address_id, None).await?;

            let created = self.repo.create(&payload, legal_type).await?;
            self.refresh_cache(&created).await?;
            Ok::<_, AppError>(created)
        }
        .await
        .log_on_error(self.operation("create"), &payload)
    }

    pub async fn find(&self, id: i32) -> Result<Party, AppError> {
        async {
            if let Some(hit) = self.cache.get_one::<Party>(self.module_name(), id).await? {
                return Ok(hit);
            }
            let found = self.repo.find_by_id(id).await?.ok_or_else(|| self.not_found(id))?;
            self.cache
                .insert_or_update_cache(CacheUpdate {
                    module_name: self.module_name(),
                    created_or_updated: Some(&found),
                    all_entities: None,
                })
                .await?;
            Ok::<_, AppError>(found)
        }
        .await
        .log_on_error(self.operation("find"), &id)
    }

    pub async fn list(&self) -> Result<Vec<Party>, AppError> {
        async {
            if let Some(hit) = self.cache.get_all::<Party>(self.module_name()).await? {
                return Ok(hit);
            }
            let all = self.repo.list().await?;
            self.cache
                .insert_or_update_cache::<Party>(CacheUpdate {
                    module_name: self.module_name(),
                    created_or_updated: None,
                    all_entities: Some(all.clone()),
                })
                .await?;
            Ok::<_, AppError>(all)
        }
        .await
        .log_on_error(self.operation("list"), &())
    }

    /// Fora do escopo do chamador o registro é tratado como inexistente.
    pub async fn find_visible(&self, id: i32, scope: ClientScope) -> Result<Party, AppError> {
        let found = self.find(id).await?;
        if scope.allows(found.client_id) {
            Ok(found)
        } else {
            Err(self.not_found(id))
        }
    }

    pub async fn list_visible(&self, scope: ClientScope) -> Result<Vec<Party>, AppError> {
        let all = self.list().await?;
        Ok(all.into_iter().filter(|p| scope.allows(p.client_id)).collect())
    }

    /// Ordem: portão de ativação, tipo jurídico imutável, validação, referências, gravação.
    pub async fn update(&self, id: i32, payload: UpdatePartyPayload) -> Result<Party, AppError> {
        let payload = payload.normalized();
        async {
            let current = self.find(id).await?;
            self.ensure_update_allowed(&current, &payload)?;
            validate_payload(&payload)?;

            if payload.id.is_some_and(|body_id| body_id != id) {
                return Err(AppError::BadRequest("The payload id does not match the requested id.".into()));
            }
            if let Some(client_id) = payload.client_id {
                self.ensure_client_exists(client_id).await?;
            }
            if let Some(address_id) = payload.address_id {
                self.addresses.ensure_available(address_id, Some(self.owner(id))).await?;
            }

            let updated = self.repo.update(id, &payload).await?.ok_or_else(|| self.not_found(id))?;
            self.refresh_cache(&updated).await?;
            Ok::<_, AppError>(updated)
        }
        .await
        .log_on_error(self.operation("update"), &(id, &payload))
    }

    pub async fn remove(&self, id: i32) -> Result<Party, AppError> {
        async {
            let current = self.find(id).await?;
            if !self.repo.delete(id).await? {
                return Err(self.not_found(id));
            }
            self.cache.remove_from_cache(self.module_name(), id).await?;
            Ok::<_, AppError>(current)
        }
        .await
        .log_on_error(self.operation("remove"), &id)
    }

    /// Regras que não dependem de banco: ativação e imutabilidade do tipo jurídico.
    pub fn ensure_update_allowed(&self, current: &Party, payload: &UpdatePartyPayload) -> Result<(), AppError> {
        let label = self.kind.label();

        if !current.is_active && !payload.is_reactivation_only() {
            return Err(AppError::NotAcceptable(format!(
                "{label} is inactive. The only accepted update is {{id, isActive: true}}."
            )));
        }

        match current.legal_type {
            LegalType::Natural if payload.cnpj.is_some() => Err(AppError::Conflict(format!(
                "{label} is a natural person and cannot receive a cnpj."
            ))),
            LegalType::Legal if payload.cpf.is_some() => Err(AppError::Conflict(format!(
                "{label} is a legal entity and cannot receive a cpf."
            ))),
            _ => Ok(()),
        }
    }

    async fn ensure_client_exists(&self, client_id: i32) -> Result<(), AppError> {
        self.clients
            .find_by_id(client_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| client_service::not_found(client_id))
    }

    async fn refresh_cache(&self, entity: &Party) -> Result<(), AppError> {
        let all = self.repo.list().await?;
        self.cache
            .insert_or_update_cache(CacheUpdate {
                module_name: self.module_name(),
                created_or_updated: Some(entity),
                all_entities: Some(all),
            })
            .await
    }

    fn operation(&self, action: &str) -> &'static str {
        match (self.kind, action) {
            (OwnerType::Tenant, "create") => "createTenant",
            (OwnerType::Tenant, "update") => "updateTenant",
            (OwnerType::Tenant, "remove") => "removeTenant",
            (OwnerType::Tenant, "list") => "tenants",
            (OwnerType::Tenant, _) => "tenant",
            (OwnerType::Landlord, "create") => "createLandlord",
            (OwnerType::Landlord, "update") => "updateLandlord",
            (OwnerType::Landlord, "remove") => "removeLandlord",
            (OwnerType::Landlord, "list") => "landlords",
            (OwnerType::Landlord, _) => "landlord",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::services::address_service::ADDRESS_TAKEN;
    use crate::test_support::{memory_cache, natural_party_payload, legal_party_payload, seed_client};

    async fn setup(kind: OwnerType) -> (PartyService, MemoryDatabase, i32) {
        let db = MemoryDatabase::new();
        let addresses = AddressService::new(Arc::new(db.clone()));
        let client_id = seed_client(&db).await;
        let service = PartyService::new(
            kind,
            Arc::new(db.party_repository(kind)),
            Arc::new(db.clone()),
            addresses,
            memory_cache(),
        );
        (service, db, client_id)
    }

    async fn new_address(db: &MemoryDatabase) -> i32 {
        AddressService::new(Arc::new(db.clone()))
            .create(crate::test_support::address_payload())
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn legal_type_is_derived_on_create() {
        let (tenants, db, client_id) = setup(OwnerType::Tenant).await;
        let natural = tenants
            .create(natural_party_payload(client_id, new_address(&db).await))
            .await
            .unwrap();
        let legal = tenants
            .create(legal_party_payload(client_id, new_address(&db).await))
            .await
            .unwrap();

        assert_eq!(natural.legal_type, LegalType::Natural);
        assert_eq!(legal.legal_type, LegalType::Legal);
        assert!(natural.is_active);
    }

    #[tokio::test]
    async fn address_is_exclusive_across_owner_types() {
        let (tenants, db, client_id) = setup(OwnerType::Tenant).await;
        let address_id = new_address(&db).await;
        tenants.create(natural_party_payload(client_id, address_id)).await.unwrap();

        let landlords = PartyService::new(
            OwnerType::Landlord,
            Arc::new(db.party_repository(OwnerType::Landlord)),
            Arc::new(db.clone()),
            AddressService::new(Arc::new(db.clone())),
            memory_cache(),
        );
        let err = landlords
            .create(natural_party_payload(client_id, address_id))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m == ADDRESS_TAKEN));
    }

    #[tokio::test]
    async fn inactive_party_only_accepts_reactivation() {
        let (landlords, db, client_id) = setup(OwnerType::Landlord).await;
        let created = landlords
            .create(natural_party_payload(client_id, new_address(&db).await))
            .await
            .unwrap();

        // desativar pode vir junto com outras mudanças
        let inactive = landlords
            .update(
                created.id,
                UpdatePartyPayload {
                    is_active: Some(false),
                    name: Some("Maria Souza".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(!inactive.is_active);

        let err = landlords
            .update(
                created.id,
                UpdatePartyPayload {
                    is_active: Some(true),
                    phone: Some("31999990000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAcceptable(_)));

        // sem o id no corpo não é a reativação aceita
        let err = landlords
            .update(created.id, UpdatePartyPayload { is_active: Some(true), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAcceptable(_)));
        let unchanged = landlords.find(created.id).await.unwrap();
        assert_eq!(unchanged.phone, inactive.phone);
        assert!(!unchanged.is_active);

        let reactivated = landlords
            .update(
                created.id,
                UpdatePartyPayload {
                    id: Some(created.id),
                    is_active: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(reactivated.is_active);
    }

    #[tokio::test]
    async fn legal_type_cannot_change_on_update() {
        let (tenants, db, client_id) = setup(OwnerType::Tenant).await;
        let natural = tenants
            .create(natural_party_payload(client_id, new_address(&db).await))
            .await
            .unwrap();
        let legal = tenants
            .create(legal_party_payload(client_id, new_address(&db).await))
            .await
            .unwrap();

        let with_cnpj = UpdatePartyPayload { cnpj: Some("11222333000181".into()), ..Default::default() };
        let with_cpf = UpdatePartyPayload { cpf: Some("12345678901".into()), ..Default::default() };

        assert!(matches!(tenants.update(natural.id, with_cnpj).await, Err(AppError::Conflict(_))));
        assert!(matches!(tenants.update(legal.id, with_cpf).await, Err(AppError::Conflict(_))));

        // documento vazio não conta
        let empty = UpdatePartyPayload { cnpj: Some(String::new()), ..Default::default() };
        assert!(tenants.update(natural.id, empty).await.is_ok());
    }

    #[tokio::test]
    async fn reads_are_served_from_the_cache_after_a_write() {
        let (tenants, db, client_id) = setup(OwnerType::Tenant).await;
        let created = tenants
            .create(natural_party_payload(client_id, new_address(&db).await))
            .await
            .unwrap();

        let calls_after_create = db.list_calls();
        assert_eq!(tenants.find(created.id).await.unwrap(), created);
        assert_eq!(tenants.list().await.unwrap(), vec![created.clone()]);
        assert_eq!(db.list_calls(), calls_after_create);

        tenants.remove(created.id).await.unwrap();
        assert!(matches!(tenants.find(created.id).await, Err(AppError::NotFound(_))));
        assert!(tenants.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_client_is_rejected() {
        let (tenants, db, _) = setup(OwnerType::Tenant).await;
        let err = tenants
            .create(natural_party_payload(999, new_address(&db).await))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
