use chrono::{DateTime, Utc};
use serde::Serialize;

/// Authenticated principal returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// User row including the stored argon2 PHC hash; never serialized
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserCredentials> for User {
    fn from(creds: UserCredentials) -> Self {
        Self {
            id: creds.id,
            email: creds.email,
            name: creds.name,
            created_at: creds.created_at,
        }
    }
}
