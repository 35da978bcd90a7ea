//! Request contexts built once at the transport boundary.

use std::collections::HashMap;
use std::path::PathBuf;

use shopsync_transfer::UploadDescriptor;

use super::client::ClientInfo;

/// Username/password pair presented by the ERP client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// One inbound sync request.
#[derive(Debug, Clone, Default)]
pub struct SyncRequest {
    pub request_type: String,
    pub params: HashMap<String, String>,
    pub upload: Option<UploadDescriptor>,
    pub user_agent: Option<String>,
}

impl SyncRequest {
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn with_upload(mut self, upload: UploadDescriptor) -> Self {
        self.upload = Some(upload);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The presented credentials. `userID`/`userPWD` win over the legacy
    /// `uID`/`uPWD` pair; a missing half counts as empty.
    pub fn credentials(&self) -> Option<Credentials> {
        let pick = |current: &str, legacy: &str| {
            self.param(current)
                .or_else(|| self.param(legacy))
                .map(str::to_string)
        };
        let username = pick("userID", "uID");
        let password = pick("userPWD", "uPWD");
        if username.is_none() && password.is_none() {
            return None;
        }
        Some(Credentials {
            username: username.unwrap_or_default(),
            password: password.unwrap_or_default(),
        })
    }
}

/// What a pull handler receives.
#[derive(Debug, Clone)]
pub struct PullContext {
    pub request_type: String,
    /// Extracted payload files, or the staged upload for raw identifiers.
    pub files: Vec<PathBuf>,
    pub client: ClientInfo,
    pub params: HashMap<String, String>,
}

/// What a push handler receives.
#[derive(Debug, Clone)]
pub struct PushContext {
    pub request_type: String,
    pub client: ClientInfo,
    pub params: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_prefer_current_names() {
        let request = SyncRequest::new("Artikel_xml")
            .with_param("userID", "sync")
            .with_param("userPWD", "secret")
            .with_param("uID", "legacy");
        let creds = request.credentials().unwrap();
        assert_eq!(creds.username, "sync");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_credentials_fall_back_to_legacy_names() {
        let request = SyncRequest::new("Artikel_xml")
            .with_param("uID", "sync")
            .with_param("uPWD", "secret");
        let creds = request.credentials().unwrap();
        assert_eq!(creds.username, "sync");
        assert_eq!(creds.password, "secret");
        assert!(!format!("{creds:?}").contains("secret"));
    }

    #[test]
    fn test_no_credentials() {
        assert!(SyncRequest::new("Artikel_xml").credentials().is_none());
        let half = SyncRequest::new("x").with_param("userID", "sync");
        assert_eq!(half.credentials().unwrap().password, "");
    }
}
