// src/services/user_service.rs

use std::sync::Arc;

use crate::{
    common::{
        error::{AppError, LogOnError},
        validation::validate_payload,
    },
    db::UserRepository,
    models::auth::{Claims, CreateUserPayload, NewUser, Role, UpdateUserPayload, User, UserPatch},
    services::auth::AuthService,
};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    auth: AuthService,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, auth: AuthService) -> Self {
        Self { repo, auth }
    }

    pub async fn create(&self, payload: CreateUserPayload, actor: &Claims) -> Result<User, AppError> {
        async {
            validate_payload(&payload)?;
            ensure_can_grant(actor, Some(payload.role))?;

            let password_hash = self.auth.hash_password(&payload.password).await?;
            self.repo
                .create(&NewUser {
                    username: payload.username.clone(),
                    password_hash,
                    email: payload.email.clone(),
                    role: payload.role,
                    client_id: payload.client_id,
                })
                .await
        }
        .await
        .log_on_error("createUser", &payload.username)
    }

    pub async fn find(&self, id: i32) -> Result<User, AppError> {
        self.repo
            .find_by_id(id)
            .await
            .and_then(|found| found.ok_or_else(|| not_found(id)))
            .log_on_error("user", &id)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.repo.list().await.log_on_error("users", &())
    }

    pub async fn update(&self, id: i32, payload: UpdateUserPayload, actor: &Claims) -> Result<User, AppError> {
        async {
            validate_payload(&payload)?;
            let current = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
            ensure_can_manage(actor, &current)?;
            ensure_can_grant(actor, payload.role)?;

            let password_hash = match &payload.password {
                Some(password) => Some(self.auth.hash_password(password).await?),
                None => None,
            };

            let patch = UserPatch {
                email: payload.email.clone(),
                password_hash,
                role: payload.role,
                is_active: payload.is_active,
                client_id: payload.client_id,
            };
            self.repo.update(id, &patch).await?.ok_or_else(|| not_found(id))
        }
        .await
        .log_on_error("updateUser", &id)
    }

    pub async fn remove(&self, id: i32, actor: &Claims) -> Result<User, AppError> {
        async {
            let current = self.repo.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
            if current.id == actor.sub {
                return Err(AppError::BadRequest("You cannot remove your own user.".into()));
            }
            ensure_can_manage(actor, &current)?;
            self.repo.delete(id).await?;
            Ok::<_, AppError>(current)
        }
        .await
        .log_on_error("removeUser", &id)
    }

    /// Cria o superadmin inicial quando ainda não existe um usuário com esse nome.
    pub async fn ensure_superadmin(&self, username: &str, password: &str, email: &str) -> Result<Option<User>, AppError> {
        if self.repo.find_by_username(username).await?.is_some() {
            return Ok(None);
        }

        let password_hash = self.auth.hash_password(password).await?;
        let user = self
            .repo
            .create(&NewUser {
                username: username.to_string(),
                password_hash,
                email: email.to_string(),
                role: Role::Superadmin,
                client_id: None,
            })
            .await?;

        tracing::info!(username, "👑 Superadmin inicial criado.");
        Ok(Some(user))
    }
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("User with id {id} not found."))
}

// Só um superadmin concede o papel de superadmin
fn ensure_can_grant(actor: &Claims, role: Option<Role>) -> Result<(), AppError> {
    if role == Some(Role::Superadmin) && actor.role != Role::Superadmin {
        return Err(AppError::Forbidden("Only a superadmin can grant the superadmin role.".into()));
    }
    Ok(())
}

fn ensure_can_manage(actor: &Claims, target: &User) -> Result<(), AppError> {
    if target.role == Role::Superadmin && actor.role != Role::Superadmin {
        return Err(AppError::Forbidden("Only a superadmin can manage a superadmin.".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::test_support::claims_for;

    fn service() -> UserService {
        let db = Arc::new(MemoryDatabase::new());
        let auth = AuthService::new(db.clone(), "secret".into(), 1).with_bcrypt_cost(4);
        UserService::new(db, auth)
    }

    fn payload(username: &str, role: Role) -> CreateUserPayload {
        CreateUserPayload {
            username: username.into(),
            password: "s3nha-forte".into(),
            email: format!("{username}@imobiliaria.com"),
            role,
            client_id: None,
        }
    }

    #[tokio::test]
    async fn passwords_are_hashed_and_usernames_unique() {
        let users = service();
        let admin = claims_for(1, Role::Admin);
        let created = users.create(payload("carla", Role::Tenant), &admin).await.unwrap();

        assert_ne!(created.password_hash, "s3nha-forte");
        assert!(bcrypt::verify("s3nha-forte", &created.password_hash).unwrap());
        assert!(matches!(
            users.create(payload("carla", Role::Tenant), &admin).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn admins_cannot_create_or_touch_superadmins() {
        let users = service();
        let admin = claims_for(901, Role::Admin);
        let root = claims_for(902, Role::Superadmin);

        assert!(matches!(
            users.create(payload("root2", Role::Superadmin), &admin).await,
            Err(AppError::Forbidden(_))
        ));

        let superadmin = users.create(payload("root2", Role::Superadmin), &root).await.unwrap();
        assert!(matches!(users.remove(superadmin.id, &admin).await, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn superadmin_bootstrap_runs_once() {
        let users = service();
        let first = users.ensure_superadmin("root", "s3nha-forte", "root@imobiliaria.com").await.unwrap();
        let second = users.ensure_superadmin("root", "s3nha-forte", "root@imobiliaria.com").await.unwrap();

        assert_eq!(first.map(|u| u.role), Some(Role::Superadmin));
        assert!(second.is_none());
    }
}
