//! Synchronization credential entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single credential record the ERP client authenticates with.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct SyncCredential {
    pub id: i32,
    /// Login name, compared case-sensitively.
    pub name: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

impl std::fmt::Debug for SyncCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCredential")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("password_hash", &"***")
            .finish()
    }
}
