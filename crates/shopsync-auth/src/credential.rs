//! The sync login presented by the ERP client.

use tracing::{debug, error};

use shopsync_core::result::AppResult;
use shopsync_database::store::CredentialStore;
use shopsync_entity::credential::SyncCredential;

use crate::password::PasswordHasher;

/// Credential loaded once at construction and immutable afterwards.
#[derive(Debug, Clone)]
pub struct SyncLogin {
    credential: Option<SyncCredential>,
    hasher: PasswordHasher,
}

impl SyncLogin {
    /// Read the credential row. A missing row is logged as a configuration
    /// error; the login then rejects every pair.
    pub async fn load(store: &dyn CredentialStore) -> AppResult<Self> {
        let credential = store.load().await?;
        if credential.is_none() {
            error!("No sync credential configured, every sync request will be rejected");
        }
        Ok(Self {
            credential,
            hasher: PasswordHasher::new(),
        })
    }

    /// Build from an already loaded row.
    pub fn from_credential(credential: Option<SyncCredential>) -> Self {
        Self {
            credential,
            hasher: PasswordHasher::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_some()
    }

    /// Exact username match and Argon2 verification of the password.
    /// Never fails: every problem is a `false`.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let Some(credential) = &self.credential else {
            return false;
        };
        if credential.name != username {
            debug!("Sync login rejected");
            return false;
        }
        match self.hasher.verify_password(password, &credential.password_hash) {
            Ok(valid) => valid,
            Err(e) => {
                error!(error = %e, "Stored sync credential hash cannot be verified");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_database::memory::MemoryCredentialStore;

    async fn login_for(name: &str, password: &str) -> SyncLogin {
        let hash = PasswordHasher::new().hash_password(password).unwrap();
        let store = MemoryCredentialStore::with_credential(name, hash);
        SyncLogin::load(&store).await.unwrap()
    }

    #[tokio::test]
    async fn test_accepts_exact_pair() {
        let login = login_for("wawi", "geheim").await;
        assert!(login.verify("wawi", "geheim"));
    }

    #[tokio::test]
    async fn test_rejects_everything_else() {
        let login = login_for("wawi", "geheim").await;
        for (user, pass) in [
            ("Wawi", "geheim"),
            ("wawi ", "geheim"),
            ("wawi", "Geheim"),
            ("wawi", ""),
            ("", ""),
            ("other", "geheim"),
        ] {
            assert!(!login.verify(user, pass), "{user:?}/{pass:?} must be rejected");
        }
    }

    #[tokio::test]
    async fn test_missing_row_rejects() {
        let login = SyncLogin::load(&MemoryCredentialStore::empty()).await.unwrap();
        assert!(!login.is_configured());
        assert!(!login.verify("wawi", "geheim"));
    }

    #[test]
    fn test_plaintext_hash_is_never_compared() {
        let login = SyncLogin::from_credential(Some(SyncCredential {
            id: 1,
            name: "wawi".into(),
            password_hash: "geheim".into(),
        }));
        assert!(!login.verify("wawi", "geheim"));
    }
}
