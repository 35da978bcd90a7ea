//! RPC authentication: session token first, then credentials.

use std::borrow::Cow;
use std::sync::Arc;

use tracing::{debug, warn};

use shopsync_auth::{RpcSessionStore, SyncLogin};
use shopsync_core::result::AppResult;

use super::request::RpcRequest;

#[derive(Debug, Clone)]
pub struct RpcAuthenticator {
    login: Arc<SyncLogin>,
    sessions: RpcSessionStore,
}

impl RpcAuthenticator {
    pub fn new(login: Arc<SyncLogin>, sessions: RpcSessionStore) -> Self {
        Self { login, sessions }
    }

    /// The session token of an authenticated request, or `None`.
    ///
    /// A presented token is never complemented by credentials: an
    /// unknown or unauthenticated token fails the request.
    pub async fn authenticate(&self, request: &RpcRequest) -> AppResult<Option<String>> {
        if let Some(token) = request.token() {
            if self.sessions.is_authenticated(token).await? {
                return Ok(Some(token.to_string()));
            }
            debug!("RPC token rejected");
            return Ok(None);
        }

        let Some((uid, upwd)) = request.raw_credentials() else {
            return Ok(None);
        };

        let verified = decodings(uid)
            .iter()
            .zip(decodings(upwd).iter())
            .any(|(user, pass)| self.login.verify(user, pass));
        if !verified {
            warn!("RPC login failed");
            return Ok(None);
        }
        Ok(Some(self.sessions.start_authenticated().await?))
    }
}

/// The raw value, then decoded once, then decoded twice. Clients differ
/// in how often they urlencode.
fn decodings(raw: &str) -> Vec<String> {
    let once = decode(raw);
    let twice = decode(&once);
    vec![raw.to_string(), once, twice]
}

fn decode(value: &str) -> String {
    let plus_as_space = value.replace('+', " ");
    match urlencoding::decode(&plus_as_space) {
        Ok(Cow::Borrowed(_)) => plus_as_space,
        Ok(Cow::Owned(decoded)) => decoded,
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_auth::PasswordHasher;
    use shopsync_cache::CacheManager;
    use shopsync_core::config::cache::CacheConfig;
    use shopsync_core::config::session::SessionConfig;
    use shopsync_entity::credential::SyncCredential;

    fn authenticator(password: &str) -> RpcAuthenticator {
        let hash = PasswordHasher::new().hash_password(password).unwrap();
        let login = SyncLogin::from_credential(Some(SyncCredential {
            id: 1,
            name: "sync".into(),
            password_hash: hash,
        }));
        let sessions = RpcSessionStore::new(
            CacheManager::new(&CacheConfig::default()),
            &SessionConfig::default(),
        );
        RpcAuthenticator::new(Arc::new(login), sessions)
    }

    fn request(pairs: &[(&str, &str)]) -> RpcRequest {
        RpcRequest {
            params: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_decodings() {
        assert_eq!(decodings("a%2526b"), vec!["a%2526b", "a%26b", "a&b"]);
        assert_eq!(decodings("a+b"), vec!["a+b", "a b", "a b"]);
    }

    #[tokio::test]
    async fn test_credentials_start_session_and_token_resumes() {
        let auth = authenticator("p&ss wort");

        let token = auth
            .authenticate(&request(&[("uid", "sync"), ("upwd", "p%2526ss%2Bwort")]))
            .await
            .unwrap()
            .expect("login");
        assert!(!token.is_empty());

        let resumed = auth.authenticate(&request(&[("token", &token)])).await.unwrap();
        assert_eq!(resumed.as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_failures() {
        let auth = authenticator("secret");
        assert!(auth.authenticate(&request(&[])).await.unwrap().is_none());
        assert!(
            auth.authenticate(&request(&[("uid", "sync"), ("upwd", "wrong")]))
                .await
                .unwrap()
                .is_none()
        );
        // A bad token is not rescued by valid credentials.
        assert!(
            auth.authenticate(&request(&[
                ("token", "nope"),
                ("uid", "sync"),
                ("upwd", "secret")
            ]))
            .await
            .unwrap()
            .is_none()
        );
    }
}
