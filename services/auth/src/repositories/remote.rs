//! User backend over the hosted record API
//!
//! Rows are snake_case, the identifier lives in `Id` and specialties travel as
//! one comma-separated string.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    error::{StoreError, StoreResult},
    records::{Condition, FetchQuery, RecordClient},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::UserBackend;
use crate::models::{NewUser, Profile, User, split_specialties};

pub const USER_TABLE: &str = "user";

const USER_FIELDS: &[&str] = &[
    "Id",
    "name",
    "email",
    "password_hash",
    "bio",
    "website",
    "phone",
    "address",
    "specialties",
    "experience",
    "education",
    "created_at",
    "updated_at",
];

/// User row as the record API returns it
#[derive(Debug, Clone, Deserialize)]
pub struct UserRow {
    #[serde(rename = "Id")]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub specialties: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserRecord {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub bio: String,
    pub website: String,
    pub phone: String,
    pub address: String,
    pub specialties: String,
    pub experience: String,
    pub education: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let created_at = row.created_at.unwrap_or_else(Utc::now);
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            profile: Profile {
                bio: row.bio.unwrap_or_default(),
                website: row.website.unwrap_or_default(),
                phone: row.phone.unwrap_or_default(),
                address: row.address.unwrap_or_default(),
                specialties: row
                    .specialties
                    .as_deref()
                    .map(split_specialties)
                    .unwrap_or_default(),
                experience: row.experience.unwrap_or_default(),
                education: row.education.unwrap_or_default(),
            },
            password_hash: row.password_hash,
            created_at,
            updated_at: row.updated_at.unwrap_or(created_at),
        }
    }
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        let profile = &user.profile;
        Self {
            id: Some(user.id),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            bio: profile.bio.clone(),
            website: profile.website.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            specialties: profile.specialties.join(", "),
            experience: profile.experience.clone(),
            education: profile.education.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn single(rows: Vec<UserRow>) -> StoreResult<User> {
    rows.into_iter()
        .next()
        .map(User::from)
        .ok_or_else(|| StoreError::Decode(format!("{} write returned no record", USER_TABLE)))
}

/// Record API storage backend
#[derive(Debug, Clone)]
pub struct RemoteUserBackend {
    client: RecordClient,
}

impl RemoteUserBackend {
    pub fn new(client: RecordClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserBackend for RemoteUserBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> = self
            .client
            .fetch_records(USER_TABLE, &FetchQuery::fields(USER_FIELDS))
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get_user(&self, id: i64) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = self.client.get_record_by_id(USER_TABLE, id).await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let query = FetchQuery::fields(USER_FIELDS).filter(Condition::equal_to("email", email));
        let rows: Vec<UserRow> = self.client.fetch_records(USER_TABLE, &query).await?;
        Ok(rows.into_iter().map(User::from).find(|u| u.email == email))
    }

    async fn insert_user(&self, user: NewUser, now: DateTime<Utc>) -> StoreResult<User> {
        let mut record = UserRecord::from(&user.into_user(0, now));
        record.id = None;
        let rows: Vec<UserRow> = self
            .client
            .create_records(USER_TABLE, std::slice::from_ref(&record))
            .await?;
        let user = single(rows)?;
        debug!("Remote user {} created", user.id);
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> StoreResult<Option<User>> {
        if self.get_user(user.id).await?.is_none() {
            return Ok(None);
        }
        let rows: Vec<UserRow> = self
            .client
            .update_records(USER_TABLE, &[UserRecord::from(user)])
            .await?;
        single(rows).map(Some)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        if self.get_user(id).await?.is_none() {
            return Ok(false);
        }
        self.client.delete_records(USER_TABLE, &[id]).await?;
        Ok(true)
    }
}
