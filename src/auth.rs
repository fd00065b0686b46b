// Stored API credentials and logout
//
// Tokens are issued by the web login flow; `pichat login` just stores them.
// The file holds `{access, refresh}` and nothing else.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// JSON credential file on disk
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read stored credentials; a missing file means logged out
    pub fn load(&self) -> Result<Credentials> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Credentials::default()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read credentials: {}", self.path.display())
                })
            }
        };
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid credentials file: {}", self.path.display()))
    }

    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create credentials dir: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write credentials: {}", self.path.display()))?;

        // Tokens are bearer secrets; keep them owner-only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).with_context(
                || format!("Failed to restrict credentials: {}", self.path.display()),
            )?;
        }

        tracing::debug!(path = %self.path.display(), "Credentials saved");
        Ok(())
    }

    /// Remove the credential file; already absent is fine
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Credentials cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove credentials: {}", self.path.display())
            }),
        }
    }
}

/// Log out: tell the server (best effort), then forget the tokens locally
///
/// Server-side failures are logged and ignored. Local state is always
/// cleared, so the only error this returns is failing to delete the file.
pub async fn logout(client: &ApiClient, store: &CredentialStore) -> Result<()> {
    let refresh = match store.load() {
        Ok(credentials) => credentials.refresh,
        Err(e) => {
            tracing::warn!("Could not read credentials before logout: {:#}", e);
            None
        }
    };

    if let Some(refresh) = refresh {
        match client.logout(&refresh).await {
            Ok(()) => tracing::info!("Logged out on server"),
            Err(e) => tracing::warn!("Server logout failed, continuing: {}", e),
        }
    }

    client.set_token(None);
    store.clear()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{self, DemoConfig};
    use std::time::Duration;

    fn tokens() -> Credentials {
        Credentials {
            access: Some("access-1".to_string()),
            refresh: Some("refresh-1".to_string()),
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        assert!(store.load().unwrap().is_empty());
        store.clear().unwrap();
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested/credentials.json"));

        store.save(&tokens()).unwrap();
        assert_eq!(store.load().unwrap(), tokens());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "{not json").unwrap();
        assert!(CredentialStore::new(path).load().is_err());
    }

    #[tokio::test]
    async fn logout_clears_credentials_and_token() {
        let server = demo::serve("127.0.0.1:0".parse().unwrap(), DemoConfig::default())
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        store.save(&tokens()).unwrap();
        let client = ApiClient::new(&server.api_url(), tokens().access, None).unwrap();

        logout(&client, &store).await.unwrap();

        assert!(!client.has_token());
        assert!(store.load().unwrap().is_empty());
        server.shutdown().await;
    }

    #[tokio::test]
    async fn logout_survives_unreachable_server() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        store.save(&tokens()).unwrap();
        // Port 9 (discard) is closed on test machines
        let client = ApiClient::new(
            "http://127.0.0.1:9/api",
            tokens().access,
            Some(Duration::from_secs(2)),
        )
        .unwrap();

        logout(&client, &store).await.unwrap();
        assert!(!store.path().exists());
    }
}
