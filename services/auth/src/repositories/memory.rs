//! In-memory user backend
//!
//! Seed passwords are hashed once when the store is built. Nothing is
//! persisted across restarts.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{StoreError, StoreResult};
use tokio::sync::RwLock;

use super::UserBackend;
use crate::models::{NewUser, User, normalize_email};
use crate::password::hash_password;
use crate::seed;

/// In-memory storage backend
#[derive(Default)]
pub struct MemoryUserBackend {
    users: RwLock<Vec<User>>,
    simulate_read_error: AtomicBool,
    simulate_write_error: AtomicBool,
}

impl MemoryUserBackend {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the bundled mock users
    pub fn seeded() -> Result<Self> {
        let mut users = Vec::new();
        for seed in seed::seed_users()? {
            users.push(User {
                id: seed.id,
                name: seed.name,
                email: normalize_email(&seed.email),
                profile: seed.profile,
                password_hash: hash_password(&seed.password)?,
                created_at: seed.created_at,
                updated_at: seed.updated_at,
            });
        }
        Ok(Self::with_users(users))
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
            ..Self::default()
        }
    }

    /// Make every read fail
    pub fn set_simulate_read_error(&self, simulate: bool) {
        self.simulate_read_error.store(simulate, Ordering::SeqCst);
    }

    /// Make every write fail
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.simulate_read_error.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Simulated read error".to_string()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("Simulated write error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserBackend for MemoryUserBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.check_read()?;
        Ok(self.users.read().await.clone())
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        self.check_read()?;
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_read()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser, now: DateTime<Utc>) -> StoreResult<User> {
        self.check_write()?;
        let mut users = self.users.write().await;
        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = user.into_user(id, now);
        users.push(user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> StoreResult<Option<User>> {
        self.check_write()?;
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => {
                *slot = user.clone();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        self.check_write()?;
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}
