//! Admin API key storage.
//!
//! Keys are shown once on creation and stored only as lowercase-hex SHA-256
//! digests in the `api_keys` table.

use chrono::Utc;
use quill_types::error::RepositoryError;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, query_error};

const KEY_PREFIX: &str = "quill_";

/// Compute SHA-256 hash of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}

/// Generate a fresh plaintext key from 32 random bytes.
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut key_bytes);
    format!(
        "{KEY_PREFIX}{}",
        key_bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
    )
}

#[derive(Clone)]
pub struct SqliteApiKeyStore {
    pool: DatabasePool,
}

impl SqliteApiKeyStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Create the admin key if none exists.
    ///
    /// Returns the plaintext key only when it was created by this call.
    pub async fn ensure_admin_key(&self) -> Result<Option<String>, RepositoryError> {
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM api_keys LIMIT 1")
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(query_error)?;
        if existing.is_some() {
            return Ok(None);
        }

        let plaintext = generate_api_key();
        sqlx::query("INSERT INTO api_keys (id, key_hash, name, created_at) VALUES (?, ?, 'admin', ?)")
            .bind(Uuid::now_v7().to_string())
            .bind(hash_api_key(&plaintext))
            .bind(format_datetime(&Utc::now()))
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        Ok(Some(plaintext))
    }

    /// Check a presented key, recording its use on success.
    pub async fn verify(&self, presented: &str) -> Result<bool, RepositoryError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM api_keys WHERE key_hash = ?")
            .bind(hash_api_key(presented))
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        let Some((id,)) = row else {
            return Ok(false);
        };

        // Best effort: a failed timestamp update does not fail the request.
        let _ = sqlx::query("UPDATE api_keys SET last_used_at = ? WHERE id = ?")
            .bind(format_datetime(&Utc::now()))
            .bind(&id)
            .execute(&self.pool.writer)
            .await;
        Ok(true)
    }
}
