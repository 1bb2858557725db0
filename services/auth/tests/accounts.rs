use std::sync::Arc;

use auth::{
    accounts::UserService,
    error::AuthError,
    models::{ChangePasswordRequest, LoginCredentials, Profile, ProfileUpdate, RegisterRequest},
    repositories::{MemoryUserBackend, UserBackend},
};
use common::jwt::{JwtConfig, JwtService};
use tokio_test::{assert_err, assert_ok};

fn service() -> (Arc<MemoryUserBackend>, UserService) {
    let backend = Arc::new(MemoryUserBackend::seeded().unwrap());
    let jwt = JwtService::new(JwtConfig {
        secret: "accounts-test-secret".to_string(),
        token_ttl: 3600,
    });
    (backend.clone(), UserService::new(backend, jwt))
}

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        password: "engine42".to_string(),
        confirm_password: "engine42".to_string(),
        profile: Profile {
            bio: "Notes on the analytical engine".to_string(),
            specialties: vec!["Ink".to_string()],
            ..Default::default()
        },
    }
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_login_and_current_user_round_trip() {
    let (_, accounts) = service();

    let registered = accounts
        .register(registration("Ada@Example.com "))
        .await
        .unwrap();
    assert_eq!(registered.user.id, 3);
    assert_eq!(registered.user.email, "ada@example.com");
    assert_eq!(registered.token_type, "Bearer");
    assert_eq!(registered.expires_in, 3600);

    let me = accounts.current_user(&registered.token).await.unwrap();
    assert_eq!(me, registered.user);

    let logged_in = accounts
        .login(credentials("ada@example.com", "engine42"))
        .await
        .unwrap();
    assert_eq!(logged_in.user.id, 3);
    assert_ne!(logged_in.token, registered.token);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (backend, accounts) = service();
    let err = accounts
        .register(registration("SARAH@artfolio.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
    assert_eq!(backend.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_registration_writes_nothing() {
    let (backend, accounts) = service();
    let mut request = registration("ada@example.com");
    request.confirm_password = "different".to_string();
    match accounts.register(request).await {
        Err(AuthError::Validation(fields)) => {
            assert_eq!(fields.get("confirmPassword"), Some("Passwords do not match"));
        }
        other => panic!("expected validation error, got {:?}", other.map(|r| r.user)),
    }
    assert_eq!(backend.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn bad_credentials_share_one_message() {
    let (_, accounts) = service();
    let wrong_password = accounts
        .login(credentials("sarah@artfolio.com", "password124"))
        .await
        .unwrap_err();
    let unknown = accounts
        .login(credentials("nobody@artfolio.com", "password123"))
        .await
        .unwrap_err();
    assert_eq!(wrong_password.to_string(), "Invalid email or password");
    assert_eq!(unknown.to_string(), wrong_password.to_string());

    assert_ok!(
        accounts
            .login(credentials("sarah@artfolio.com", "password123"))
            .await
    );
}

#[tokio::test]
async fn logout_revokes_only_that_token() {
    let (_, accounts) = service();
    let first = accounts
        .login(credentials("marcus@artfolio.com", "gallery456"))
        .await
        .unwrap();
    let second = accounts
        .login(credentials("marcus@artfolio.com", "gallery456"))
        .await
        .unwrap();

    accounts.logout(&first.token).await.unwrap();
    assert!(matches!(
        accounts.current_user(&first.token).await,
        Err(AuthError::InvalidToken)
    ));
    assert_err!(accounts.logout(&first.token).await);
    assert_ok!(accounts.current_user(&second.token).await);
}

#[tokio::test]
async fn token_for_deleted_user_is_user_not_found() {
    let (_, accounts) = service();
    let session = accounts
        .login(credentials("marcus@artfolio.com", "gallery456"))
        .await
        .unwrap();
    accounts.delete(2).await.unwrap();
    assert!(matches!(
        accounts.current_user(&session.token).await,
        Err(AuthError::UserNotFound)
    ));
    assert!(matches!(accounts.delete(2).await, Err(AuthError::UserNotFound)));
}

#[tokio::test]
async fn profile_update_replaces_fields_and_keeps_password() {
    let (_, accounts) = service();
    let before = accounts.get(1).await.unwrap();

    let updated = accounts
        .update_profile(
            1,
            ProfileUpdate {
                name: "Sarah Chen-Wu".to_string(),
                email: "sarah.chen@artfolio.com".to_string(),
                profile: Profile {
                    website: "https://chenwu.art".to_string(),
                    specialties: vec!["Watercolor".to_string()],
                    ..Default::default()
                },
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.id, 1);
    assert_eq!(updated.name, "Sarah Chen-Wu");
    assert_eq!(updated.profile.bio, "");
    assert_eq!(updated.profile.specialties, vec!["Watercolor"]);
    assert_eq!(updated.created_at, before.created_at);
    assert!(updated.updated_at > before.updated_at);

    assert_ok!(
        accounts
            .login(credentials("sarah.chen@artfolio.com", "password123"))
            .await
    );
}

#[tokio::test]
async fn profile_update_cannot_take_another_email() {
    let (_, accounts) = service();
    let err = accounts
        .update_profile(
            1,
            ProfileUpdate {
                name: "Sarah Chen".to_string(),
                email: "marcus@artfolio.com".to_string(),
                profile: Profile::default(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
}

#[tokio::test]
async fn change_password_checks_current_one() {
    let (_, accounts) = service();
    let wrong = accounts
        .change_password(
            2,
            ChangePasswordRequest {
                current_password: "not-it".to_string(),
                new_password: "brushes789".to_string(),
                confirm_password: "brushes789".to_string(),
            },
        )
        .await;
    assert!(matches!(wrong, Err(AuthError::IncorrectPassword)));

    accounts
        .change_password(
            2,
            ChangePasswordRequest {
                current_password: "gallery456".to_string(),
                new_password: "brushes789".to_string(),
                confirm_password: "brushes789".to_string(),
            },
        )
        .await
        .unwrap();

    assert_err!(
        accounts
            .login(credentials("marcus@artfolio.com", "gallery456"))
            .await
    );
    assert_ok!(
        accounts
            .login(credentials("marcus@artfolio.com", "brushes789"))
            .await
    );
}

#[tokio::test]
async fn store_failures_degrade_reads_and_fail_writes() {
    let (backend, accounts) = service();
    backend.set_simulate_read_error(true);
    assert!(accounts.list().await.is_empty());
    assert!(accounts.get(1).await.is_none());
    assert!(matches!(
        accounts
            .login(credentials("sarah@artfolio.com", "password123"))
            .await,
        Err(AuthError::Store(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_of_one_email_admit_one() {
    let (backend, accounts) = service();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let accounts = accounts.clone();
            tokio::spawn(async move { accounts.register(registration("twin@example.com")).await })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(err) => assert!(matches!(err, AuthError::EmailTaken)),
        }
    }
    assert_eq!(admitted, 1);
    assert_eq!(backend.list_users().await.unwrap().len(), 3);
}
