//! Account operations: registration, login, tokens and profile upkeep
//!
//! Writes run under one async mutex so the email uniqueness check and the
//! insert that follows it cannot interleave with another registration.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use common::jwt::{Claims, JwtService, now_secs};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginCredentials, NewUser, ProfileUpdate, PublicUser,
    RegisterRequest, User, normalize_email,
};
use crate::password::{hash_password, verify_password};
use crate::repositories::UserBackend;

/// User account service
#[derive(Clone)]
pub struct UserService {
    backend: Arc<dyn UserBackend>,
    jwt_service: JwtService,
    /// Revoked token ids mapped to their expiry
    revoked: Arc<RwLock<HashMap<Uuid, u64>>>,
    write_lock: Arc<Mutex<()>>,
}

impl UserService {
    pub fn new(backend: Arc<dyn UserBackend>, jwt_service: JwtService) -> Self {
        Self {
            backend,
            jwt_service,
            revoked: Arc::new(RwLock::new(HashMap::new())),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn issue(&self, user: &User) -> AuthResult<AuthResponse> {
        let (token, _) = self.jwt_service.generate_token(user.id, &user.email)?;
        Ok(AuthResponse {
            user: PublicUser::from(user),
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.token_ttl(),
        })
    }

    /// Create an account and sign it in
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthResponse> {
        request.validate().into_result()?;

        let email = normalize_email(&request.email);
        let password_hash = hash_password(&request.password)?;

        let _guard = self.write_lock.lock().await;
        if self.backend.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let user = self
            .backend
            .insert_user(
                NewUser {
                    name: request.name.trim().to_string(),
                    email,
                    profile: request.profile,
                    password_hash,
                },
                Utc::now(),
            )
            .await?;
        info!("Registered user {}", user.id);

        self.issue(&user)
    }

    pub async fn login(&self, credentials: LoginCredentials) -> AuthResult<AuthResponse> {
        credentials.validate().into_result()?;

        let email = normalize_email(&credentials.email);
        let Some(user) = self.backend.find_by_email(&email).await? else {
            info!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&credentials.password, &user.password_hash)? {
            info!("Failed login for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        info!("User {} logged in", user.id);
        self.issue(&user)
    }

    /// Check signature, expiry and revocation
    pub async fn authenticate(&self, token: &str) -> AuthResult<Claims> {
        let claims = self
            .jwt_service
            .validate_token(token)
            .map_err(|_| AuthError::InvalidToken)?;

        if self.revoked.read().await.contains_key(&claims.jti) {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    /// The user a token was issued to
    pub async fn current_user(&self, token: &str) -> AuthResult<PublicUser> {
        let claims = self.authenticate(token).await?;
        let user = self
            .backend
            .get_user(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        Ok(PublicUser::from(&user))
    }

    /// Replace name, email and every profile field
    pub async fn update_profile(&self, id: i64, update: ProfileUpdate) -> AuthResult<PublicUser> {
        update.validate().into_result()?;
        let email = normalize_email(&update.email);

        let _guard = self.write_lock.lock().await;
        let mut user = self
            .backend
            .get_user(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if email != user.email
            && let Some(owner) = self.backend.find_by_email(&email).await?
            && owner.id != id
        {
            return Err(AuthError::EmailTaken);
        }

        user.name = update.name.trim().to_string();
        user.email = email;
        user.profile = update.profile;
        user.updated_at = Utc::now();

        let saved = self
            .backend
            .save_user(&user)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        info!("Updated profile of user {}", id);
        Ok(PublicUser::from(&saved))
    }

    pub async fn change_password(&self, id: i64, request: ChangePasswordRequest) -> AuthResult<()> {
        request.validate().into_result()?;

        let _guard = self.write_lock.lock().await;
        let mut user = self
            .backend
            .get_user(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AuthError::IncorrectPassword);
        }

        user.password_hash = hash_password(&request.new_password)?;
        user.updated_at = Utc::now();
        self.backend
            .save_user(&user)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        info!("Changed password of user {}", id);
        Ok(())
    }

    /// Revoke a token until it would have expired anyway
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let claims = self.authenticate(token).await?;
        let now = now_secs()?;

        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti, claims.exp);
        info!("User {} logged out", claims.sub);
        Ok(())
    }

    pub async fn list(&self) -> Vec<PublicUser> {
        match self.backend.list_users().await {
            Ok(users) => users.iter().map(PublicUser::from).collect(),
            Err(err) => {
                warn!("Failed to list users: {}", err);
                Vec::new()
            }
        }
    }

    pub async fn get(&self, id: i64) -> Option<PublicUser> {
        match self.backend.get_user(id).await {
            Ok(user) => user.as_ref().map(PublicUser::from),
            Err(err) => {
                warn!("Failed to load user {}: {}", id, err);
                None
            }
        }
    }

    pub async fn delete(&self, id: i64) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;
        if !self.backend.delete_user(id).await? {
            return Err(AuthError::UserNotFound);
        }
        info!("Deleted user {}", id);
        Ok(())
    }
}
