// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::{
        error::{AppError, LogOnError},
        validation::validate_payload,
    },
    db::UserRepository,
    models::auth::{AuthResponse, Claims, LoginPayload, User},
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_secret: String,
    expiration_hours: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt_secret: String, expiration_hours: i64) -> Self {
        Self {
            users,
            jwt_secret,
            expiration_hours,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Custo do bcrypt; os testes usam o mínimo para não ficarem lentos.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<AuthResponse, AppError> {
        async {
            validate_payload(&payload)?;

            let user = self
                .users
                .find_by_username(&payload.username)
                .await?
                .filter(|u| u.is_active)
                .ok_or(AppError::InvalidCredentials)?;

            let password = payload.password.clone();
            let password_hash = user.password_hash.clone();

            // Executa a verificação em um thread separado
            let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

            if !is_password_valid {
                return Err(AppError::InvalidCredentials);
            }

            Ok::<_, AppError>(AuthResponse {
                access_token: self.create_token(&user)?,
            })
        }
        .await
        // nunca loga a senha
        .log_on_error("login", &payload.username)
    }

    /// Decodifica o token e confere se o usuário ainda existe e está ativo.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        match self.users.find_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(claims),
            _ => Err(AppError::InvalidToken),
        }
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.expiration_hours);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            client: user.client_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }
}
