//! Mock users used when no record API is configured

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::Profile;

const USERS_JSON: &str = include_str!("../data/users.json");

/// Seed user as bundled; the password is hashed when the store is built
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn seed_users() -> serde_json::Result<Vec<SeedUser>> {
    serde_json::from_str(USERS_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_users_parse_with_unique_emails() {
        let users = seed_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_ne!(users[0].email, users[1].email);
        assert_eq!(users[1].profile.specialties.len(), 3);
    }
}
