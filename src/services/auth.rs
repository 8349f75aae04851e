//! Email/password login against argon2 hashes

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Serialize;
use std::sync::Arc;

use crate::models::User;
use crate::store::{CredentialStore, StoreResult};

/// Successful login payload
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: User,
    /// Opaque session token
    pub token: String,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Returns the principal when the password matches, `None` otherwise
    pub async fn verify(&self, email: &str, password: &str) -> StoreResult<Option<User>> {
        let Some(creds) = self.store.find_by_email(email).await? else {
            return Ok(None);
        };

        let hash = match PasswordHash::new(&creds.password_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(user_id = creds.id, error = %e, "Stored password hash is malformed");
                return Ok(None);
            }
        };

        if Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_err()
        {
            return Ok(None);
        }

        Ok(Some(creds.into()))
    }

    pub async fn login(&self, email: &str, password: &str) -> StoreResult<Option<LoginResponse>> {
        Ok(self.verify(email, password).await?.map(|user| LoginResponse {
            user,
            token: uuid::Uuid::new_v4().to_string(),
        }))
    }
}

/// Hash a password into an argon2 PHC string for storage
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(hash.to_string())
}
