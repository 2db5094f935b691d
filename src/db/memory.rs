// src/db/memory.rs
//
// Repositórios em memória para os testes: mesmas regras de unicidade e de
// referência que o esquema Postgres impõe.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    db::{
        AddressRepository, ClientRepository, DocumentRepository, DocumentRequirementRepository,
        DocumentTypeRepository, PartyRepository, UserRepository,
    },
    models::{
        address::{Address, AddressWithOwners, CreateAddressPayload, UpdateAddressPayload},
        auth::{NewUser, User, UserPatch},
        client::{Client, CreateClientPayload, UpdateClientPayload},
        document::{
            CreateDocumentRequirementPayload, CreateDocumentTypePayload, Document,
            DocumentRequirement, DocumentStatus, DocumentType, NewDocument, UpdateDocumentPayload,
            UpdateDocumentRequirementPayload, UpdateDocumentTypePayload,
        },
        party::{CreatePartyPayload, LegalType, OwnerType, Party, UpdatePartyPayload},
    },
};

#[derive(Default)]
struct Tables {
    next_id: i32,
    addresses: BTreeMap<i32, Address>,
    clients: BTreeMap<i32, Client>,
    tenants: BTreeMap<i32, Party>,
    landlords: BTreeMap<i32, Party>,
    users: BTreeMap<i32, User>,
    document_types: BTreeMap<i32, DocumentType>,
    requirements: BTreeMap<i32, DocumentRequirement>,
    documents: BTreeMap<i32, Document>,
    list_calls: usize,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn parties(&mut self, kind: OwnerType) -> &mut BTreeMap<i32, Party> {
        match kind {
            OwnerType::Tenant => &mut self.tenants,
            OwnerType::Landlord => &mut self.landlords,
        }
    }

    fn with_owners(&self, address: &Address) -> AddressWithOwners {
        let owner_of = |parties: &BTreeMap<i32, Party>| {
            parties.values().find(|p| p.address_id == address.id).map(|p| p.id)
        };
        AddressWithOwners {
            address: address.clone(),
            tenant_id: owner_of(&self.tenants),
            landlord_id: owner_of(&self.landlords),
            client_id: self.clients.values().find(|c| c.address_id == address.id).map(|c| c.id),
        }
    }

    fn address_in_use(&self, address_id: i32, except: Option<(OwnerType, i32)>) -> bool {
        let in_parties = |kind: OwnerType, parties: &BTreeMap<i32, Party>| {
            parties
                .values()
                .any(|p| p.address_id == address_id && except != Some((kind, p.id)))
        };
        in_parties(OwnerType::Tenant, &self.tenants)
            || in_parties(OwnerType::Landlord, &self.landlords)
            || self.clients.values().any(|c| c.address_id == address_id)
    }
}

/// Banco em memória compartilhado por todos os repositórios de teste.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory database poisoned")
    }

    /// Insere um endereço com data de criação arbitrária (testes da limpeza).
    pub fn insert_address_at(&self, input: &CreateAddressPayload, created_at: DateTime<Utc>) -> Address {
        let mut tables = self.lock();
        let id = tables.next_id();
        let address = build_address(id, input, created_at);
        tables.addresses.insert(id, address.clone());
        address
    }

    /// Quantas listagens chegaram ao "storage"; usado para provar hits de cache.
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    pub fn party_repository(&self, kind: OwnerType) -> MemoryPartyRepository {
        MemoryPartyRepository { db: self.clone(), kind }
    }
}

fn build_address(id: i32, input: &CreateAddressPayload, created_at: DateTime<Utc>) -> Address {
    Address {
        id,
        street: input.street.clone(),
        number: input.number.clone(),
        complement: input.complement.clone(),
        neighborhood: input.neighborhood.clone(),
        city: input.city.clone(),
        state: input.state.clone(),
        postal_code: input.postal_code.clone(),
        additional_info: input.additional_info.clone(),
        created_at,
        updated_at: created_at,
    }
}

fn patch<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

fn patch_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *target = value.clone();
    }
}

#[async_trait]
impl AddressRepository for MemoryDatabase {
    async fn create(&self, input: &CreateAddressPayload) -> Result<Address, AppError> {
        Ok(self.insert_address_at(input, Utc::now()))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Address>, AppError> {
        Ok(self.lock().addresses.get(&id).cloned())
    }

    async fn find_with_owners(&self, id: i32) -> Result<Option<AddressWithOwners>, AppError> {
        let tables = self.lock();
        Ok(tables.addresses.get(&id).map(|a| tables.with_owners(a)))
    }

    async fn list(&self) -> Result<Vec<Address>, AppError> {
        Ok(self.lock().addresses.values().cloned().collect())
    }

    async fn list_with_owners(&self) -> Result<Vec<AddressWithOwners>, AppError> {
        let tables = self.lock();
        Ok(tables.addresses.values().map(|a| tables.with_owners(a)).collect())
    }

    async fn update(&self, id: i32, p: &UpdateAddressPayload) -> Result<Option<Address>, AppError> {
        let mut tables = self.lock();
        let Some(address) = tables.addresses.get_mut(&id) else {
            return Ok(None);
        };
        patch(&mut address.street, &p.street);
        patch(&mut address.number, &p.number);
        patch_opt(&mut address.complement, &p.complement);
        patch(&mut address.neighborhood, &p.neighborhood);
        patch(&mut address.city, &p.city);
        patch(&mut address.state, &p.state);
        patch(&mut address.postal_code, &p.postal_code);
        patch_opt(&mut address.additional_info, &p.additional_info);
        address.updated_at = Utc::now();
        Ok(Some(address.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.lock();
        if tables.address_in_use(id, None) {
            return Err(AppError::Conflict("Address is still associated to an entity.".into()));
        }
        Ok(tables.addresses.remove(&id).is_some())
    }
}

#[async_trait]
impl ClientRepository for MemoryDatabase {
    async fn create(&self, input: &CreateClientPayload) -> Result<Client, AppError> {
        let mut tables = self.lock();
        if tables.clients.values().any(|c| c.cnpj == input.cnpj) {
            return Err(AppError::Conflict("A client with this cnpj already exists.".into()));
        }
        if tables.address_in_use(input.address_id, None) {
            return Err(AppError::BadRequest("Address already associated to another entity.".into()));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let client = Client {
            id,
            name: input.name.clone(),
            cnpj: input.cnpj.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            site: input.site.clone(),
            is_active: true,
            address_id: input.address_id,
            created_at: now,
            updated_at: now,
        };
        tables.clients.insert(id, client.clone());
        Ok(client)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Client>, AppError> {
        Ok(self.lock().clients.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Client>, AppError> {
        Ok(self.lock().clients.values().cloned().collect())
    }

    async fn update(&self, id: i32, p: &UpdateClientPayload) -> Result<Option<Client>, AppError> {
        let mut tables = self.lock();
        if let Some(cnpj) = &p.cnpj {
            if tables.clients.values().any(|c| &c.cnpj == cnpj && c.id != id) {
                return Err(AppError::Conflict("A client with this cnpj already exists.".into()));
            }
        }
        if let Some(address_id) = p.address_id {
            let taken_by_other_client = tables
                .clients
                .values()
                .any(|c| c.address_id == address_id && c.id != id);
            let taken_by_party = tables.tenants.values().any(|t| t.address_id == address_id)
                || tables.landlords.values().any(|l| l.address_id == address_id);
            if taken_by_other_client || taken_by_party {
                return Err(AppError::BadRequest("Address already associated to another entity.".into()));
            }
        }
        let Some(client) = tables.clients.get_mut(&id) else {
            return Ok(None);
        };
        patch(&mut client.name, &p.name);
        patch(&mut client.cnpj, &p.cnpj);
        patch(&mut client.phone, &p.phone);
        patch(&mut client.email, &p.email);
        patch_opt(&mut client.site, &p.site);
        patch(&mut client.is_active, &p.is_active);
        patch(&mut client.address_id, &p.address_id);
        client.updated_at = Utc::now();
        Ok(Some(client.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.lock();
        let linked = tables.tenants.values().any(|p| p.client_id == id)
            || tables.landlords.values().any(|p| p.client_id == id);
        if linked {
            return Err(AppError::Conflict("Client still has tenants or landlords linked to it.".into()));
        }
        Ok(tables.clients.remove(&id).is_some())
    }
}

pub struct MemoryPartyRepository {
    db: MemoryDatabase,
    kind: OwnerType,
}

#[async_trait]
impl PartyRepository for MemoryPartyRepository {
    async fn create(&self, input: &CreatePartyPayload, legal_type: LegalType) -> Result<Party, AppError> {
        let mut tables = self.db.lock();
        if tables.address_in_use(input.address_id, None) {
            return Err(AppError::BadRequest("Address already associated to another entity.".into()));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let party = Party {
            id,
            name: input.name.clone(),
            cpf: input.cpf.clone(),
            cnpj: input.cnpj.clone(),
            legal_type,
            email: input.email.clone(),
            phone: input.phone.clone(),
            is_active: true,
            annotations: input.annotations.clone(),
            client_id: input.client_id,
            address_id: input.address_id,
            created_at: now,
            updated_at: now,
        };
        tables.parties(self.kind).insert(id, party.clone());
        Ok(party)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Party>, AppError> {
        Ok(self.db.lock().parties(self.kind).get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Party>, AppError> {
        let mut tables = self.db.lock();
        tables.list_calls += 1;
        Ok(tables.parties(self.kind).values().cloned().collect())
    }

    async fn update(&self, id: i32, p: &UpdatePartyPayload) -> Result<Option<Party>, AppError> {
        let mut tables = self.db.lock();
        if let Some(address_id) = p.address_id {
            if tables.address_in_use(address_id, Some((self.kind, id))) {
                return Err(AppError::BadRequest("Address already associated to another entity.".into()));
            }
        }
        let Some(party) = tables.parties(self.kind).get_mut(&id) else {
            return Ok(None);
        };
        patch(&mut party.name, &p.name);
        patch_opt(&mut party.cpf, &p.cpf);
        patch_opt(&mut party.cnpj, &p.cnpj);
        patch(&mut party.email, &p.email);
        patch(&mut party.phone, &p.phone);
        patch(&mut party.is_active, &p.is_active);
        patch_opt(&mut party.annotations, &p.annotations);
        patch(&mut party.client_id, &p.client_id);
        patch(&mut party.address_id, &p.address_id);
        party.updated_at = Utc::now();
        Ok(Some(party.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.db.lock().parties(self.kind).remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn create(&self, input: &NewUser) -> Result<User, AppError> {
        let mut tables = self.lock();
        if tables
            .users
            .values()
            .any(|u| u.username == input.username || u.email == input.email)
        {
            return Err(AppError::Conflict("Username or e-mail already in use.".into()));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let user = User {
            id,
            username: input.username.clone(),
            password_hash: input.password_hash.clone(),
            email: input.email.clone(),
            role: input.role,
            is_active: true,
            client_id: input.client_id,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.values().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.lock().users.values().cloned().collect())
    }

    async fn update(&self, id: i32, p: &UserPatch) -> Result<Option<User>, AppError> {
        let mut tables = self.lock();
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        patch(&mut user.email, &p.email);
        patch(&mut user.password_hash, &p.password_hash);
        patch(&mut user.role, &p.role);
        patch(&mut user.is_active, &p.is_active);
        patch_opt(&mut user.client_id, &p.client_id);
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.lock().users.remove(&id).is_some())
    }
}

#[async_trait]
impl DocumentTypeRepository for MemoryDatabase {
    async fn create(&self, input: &CreateDocumentTypePayload) -> Result<DocumentType, AppError> {
        let mut tables = self.lock();
        if tables.document_types.values().any(|t| t.name == input.name) {
            return Err(AppError::Conflict("A document type with this name already exists.".into()));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let document_type = DocumentType {
            id,
            name: input.name.clone(),
            applicable_to: input.applicable_to,
            created_at: now,
            updated_at: now,
        };
        tables.document_types.insert(id, document_type.clone());
        Ok(document_type)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<DocumentType>, AppError> {
        Ok(self.lock().document_types.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentType>, AppError> {
        Ok(self.lock().document_types.values().cloned().collect())
    }

    async fn update(&self, id: i32, p: &UpdateDocumentTypePayload) -> Result<Option<DocumentType>, AppError> {
        let mut tables = self.lock();
        let Some(document_type) = tables.document_types.get_mut(&id) else {
            return Ok(None);
        };
        patch(&mut document_type.name, &p.name);
        patch(&mut document_type.applicable_to, &p.applicable_to);
        document_type.updated_at = Utc::now();
        Ok(Some(document_type.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.lock();
        if tables.documents.values().any(|d| d.document_type_id == id) {
            return Err(AppError::Conflict("Document type is still used by documents.".into()));
        }
        tables.requirements.retain(|_, r| r.document_type_id != id);
        Ok(tables.document_types.remove(&id).is_some())
    }
}

#[async_trait]
impl DocumentRequirementRepository for MemoryDatabase {
    async fn create(&self, input: &CreateDocumentRequirementPayload) -> Result<DocumentRequirement, AppError> {
        let mut tables = self.lock();
        if tables
            .requirements
            .values()
            .any(|r| r.document_type_id == input.document_type_id && r.role == input.role)
        {
            return Err(AppError::Conflict(
                "This document type is already configured for this role.".into(),
            ));
        }
        let id = tables.next_id();
        let now = Utc::now();
        let requirement = DocumentRequirement {
            id,
            document_type_id: input.document_type_id,
            role: input.role,
            is_required: input.is_required,
            created_at: now,
            updated_at: now,
        };
        tables.requirements.insert(id, requirement.clone());
        Ok(requirement)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<DocumentRequirement>, AppError> {
        Ok(self.lock().requirements.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentRequirement>, AppError> {
        let mut tables = self.lock();
        tables.list_calls += 1;
        Ok(tables.requirements.values().cloned().collect())
    }

    async fn update(
        &self,
        id: i32,
        p: &UpdateDocumentRequirementPayload,
    ) -> Result<Option<DocumentRequirement>, AppError> {
        let mut tables = self.lock();
        let Some(requirement) = tables.requirements.get_mut(&id) else {
            return Ok(None);
        };
        patch(&mut requirement.is_required, &p.is_required);
        requirement.updated_at = Utc::now();
        Ok(Some(requirement.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.lock().requirements.remove(&id).is_some())
    }
}

#[async_trait]
impl DocumentRepository for MemoryDatabase {
    async fn create(&self, input: &NewDocument) -> Result<Document, AppError> {
        let mut tables = self.lock();
        let id = tables.next_id();
        let now = Utc::now();
        let document = Document {
            id,
            document_type_id: input.document_type_id,
            owner_type: input.owner_type,
            owner_id: input.owner_id,
            status: DocumentStatus::Processing,
            url: input.url.clone(),
            object_key: input.object_key.clone(),
            file_name: input.file_name.clone(),
            observation: input.observation.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(id, document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Document>, AppError> {
        Ok(self.lock().documents.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Document>, AppError> {
        let mut tables = self.lock();
        tables.list_calls += 1;
        Ok(tables.documents.values().cloned().collect())
    }

    async fn list_by_owner(&self, owner_type: OwnerType, owner_id: i32) -> Result<Vec<Document>, AppError> {
        Ok(self
            .lock()
            .documents
            .values()
            .filter(|d| d.owner_type == owner_type && d.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, p: &UpdateDocumentPayload) -> Result<Option<Document>, AppError> {
        let mut tables = self.lock();
        let Some(document) = tables.documents.get_mut(&id) else {
            return Ok(None);
        };
        patch(&mut document.status, &p.status);
        patch_opt(&mut document.observation, &p.observation);
        document.updated_at = Utc::now();
        Ok(Some(document.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.lock().documents.remove(&id).is_some())
    }
}
