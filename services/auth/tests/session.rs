use std::sync::Arc;

use auth::{
    accounts::UserService,
    error::AuthError,
    models::{LoginCredentials, Profile, RegisterRequest},
    repositories::MemoryUserBackend,
    session::{AUTH_TOKEN_KEY, FileTokenStore, MemoryTokenStore, SessionManager, TokenStore},
};
use common::{
    config::SessionConfig,
    jwt::{Claims, JwtConfig, JwtService},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tempfile::tempdir;
use uuid::Uuid;

const SECRET: &str = "session-test-secret";

fn accounts() -> UserService {
    let backend = Arc::new(MemoryUserBackend::seeded().unwrap());
    UserService::new(
        backend,
        JwtService::new(JwtConfig {
            secret: SECRET.to_string(),
            token_ttl: 3600,
        }),
    )
}

fn sarah() -> LoginCredentials {
    LoginCredentials {
        email: "sarah@artfolio.com".to_string(),
        password: "password123".to_string(),
    }
}

#[tokio::test]
async fn login_persists_and_restore_survives_a_restart() {
    let dir = tempdir().unwrap();
    let config = SessionConfig {
        token_path: dir.path().join(".artfolio/session.json"),
    };
    let accounts = accounts();

    let first = SessionManager::new(Arc::new(FileTokenStore::from_config(&config)), accounts.clone());
    assert!(first.restore().await.unwrap().is_none());
    let response = first.login(sarah()).await.unwrap();

    let raw = std::fs::read_to_string(&config.token_path).unwrap();
    assert!(raw.contains(AUTH_TOKEN_KEY));

    let second = SessionManager::new(Arc::new(FileTokenStore::from_config(&config)), accounts);
    let restored = second.restore().await.unwrap().unwrap();
    assert_eq!(restored, response.user);
}

#[tokio::test]
async fn register_persists_token() {
    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionManager::new(store.clone(), accounts());
    let response = session
        .register(RegisterRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine42".to_string(),
            confirm_password: "engine42".to_string(),
            profile: Profile::default(),
        })
        .await
        .unwrap();
    assert_eq!(
        store.get(AUTH_TOKEN_KEY).await.unwrap(),
        Some(response.token)
    );
}

#[tokio::test]
async fn failed_login_stores_nothing() {
    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionManager::new(store.clone(), accounts());
    let mut wrong = sarah();
    wrong.password = "password000".to_string();
    assert!(matches!(
        session.login(wrong).await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn expired_token_is_cleared_on_restore() {
    let claims = Claims {
        sub: 1,
        email: "sarah@artfolio.com".to_string(),
        jti: Uuid::new_v4(),
        iat: 1_600_000_000,
        exp: 1_600_086_400,
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let store = Arc::new(MemoryTokenStore::new());
    store.set(AUTH_TOKEN_KEY, &expired).await.unwrap();

    let session = SessionManager::new(store.clone(), accounts());
    assert!(session.restore().await.unwrap().is_none());
    assert!(store.get(AUTH_TOKEN_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn logout_revokes_and_forgets() {
    let store = Arc::new(MemoryTokenStore::new());
    let accounts = accounts();
    let session = SessionManager::new(store.clone(), accounts.clone());
    let response = session.login(sarah()).await.unwrap();

    session.logout().await.unwrap();
    assert!(session.token().await.unwrap().is_none());
    assert!(matches!(
        accounts.current_user(&response.token).await,
        Err(AuthError::InvalidToken)
    ));

    // Logging out twice is harmless
    session.logout().await.unwrap();
    assert!(session.restore().await.unwrap().is_none());
}

#[tokio::test]
async fn corrupt_session_file_restores_as_signed_out() {
    let dir = tempdir().unwrap();
    let config = SessionConfig {
        token_path: dir.path().join("session.json"),
    };
    std::fs::write(&config.token_path, "{\"artfolio.auth_token\": ").unwrap();

    let session = SessionManager::new(Arc::new(FileTokenStore::from_config(&config)), accounts());
    assert!(session.restore().await.unwrap().is_none());
    assert!(!config.token_path.exists());

    // a later login starts a fresh file
    let response = session.login(sarah()).await.unwrap();
    assert_eq!(session.token().await.unwrap(), Some(response.token));
    assert_eq!(session.restore().await.unwrap(), Some(response.user));
}
