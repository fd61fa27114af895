//! Authorization server registry backed by the component configuration file
//!
//! The store is a JSON document keyed by OAuth component module name:
//!
//! ```json
//! {
//!   "loopback-oauth-mfp": {
//!     "authorizationServers": [
//!       { "name": "My MFP Server", "url": "http://localhost:9080/mfp/api" }
//!     ]
//!   }
//! }
//! ```
//!
//! Reads are tolerant: a missing or malformed store is treated as empty.
//! Writes replace the whole document, and unrelated component sections are
//! carried over unchanged.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::AclGenError;
use crate::providers::provider_module_name;

/// Sentinel choice appended to every server list
pub const CREATE_NEW_AUTH_SERVER: &str = "Create a new auth server";

/// Separator between a server name and its URL in display entries
const URL_ANNOTATION: &str = " <url: ";

const SERVERS_KEY: &str = "authorizationServers";

/// A named authorization server endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthServerEntry {
    /// Server name referenced by `authServerName` in ACL entries
    pub name: String,
    /// Endpoint URL
    pub url: String,
}

impl AuthServerEntry {
    /// Display form used in the server prompt: `name <url: url>`
    pub fn display(&self) -> String {
        format!("{}{}{}>", self.name, URL_ANNOTATION, self.url)
    }
}

/// Recover the server name from a display entry
///
/// Strings without the URL annotation are returned unchanged.
///
/// # Example
///
/// ```
/// use acl_gen::auth_servers::display_name_to_server_name;
///
/// assert_eq!(display_name_to_server_name("Main <url: http://auth>"), "Main");
/// assert_eq!(display_name_to_server_name("Main"), "Main");
/// ```
pub fn display_name_to_server_name(display: &str) -> &str {
    match display.find(URL_ANNOTATION) {
        Some(end) => &display[..end],
        None => display,
    }
}

/// Per-provider authorization server lists in the component configuration
#[derive(Debug, Clone)]
pub struct AuthServerRegistry {
    path: PathBuf,
}

impl AuthServerRegistry {
    /// Registry stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing store
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the store, treating absence or corruption as an empty document
    async fn read_store(&self) -> Map<String, Value> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Component config {} not readable: {}", self.path.display(), e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("Component config {} is not an object, ignoring", self.path.display());
                Map::new()
            }
            Err(e) => {
                warn!("Component config {} is malformed: {}", self.path.display(), e);
                Map::new()
            }
        }
    }

    /// Servers registered for `provider`, in stored order
    pub async fn servers(&self, provider: &str) -> Vec<AuthServerEntry> {
        let store = self.read_store().await;
        let Some(servers) = store
            .get(&provider_module_name(provider))
            .and_then(|section| section.get(SERVERS_KEY))
            .and_then(Value::as_array)
        else {
            return Vec::new();
        };

        servers
            .iter()
            .filter_map(|server| match AuthServerEntry::deserialize(server) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping malformed auth server entry {}: {}", server, e);
                    None
                }
            })
            .collect()
    }

    /// Display entries for `provider`, followed by [`CREATE_NEW_AUTH_SERVER`]
    pub async fn list_servers(&self, provider: &str) -> Vec<String> {
        let mut list: Vec<String> = self
            .servers(provider)
            .await
            .iter()
            .map(AuthServerEntry::display)
            .collect();
        list.push(CREATE_NEW_AUTH_SERVER.to_string());
        list
    }

    /// Append a server under `provider` and rewrite the store
    ///
    /// # Errors
    ///
    /// - [`AclGenError::Io`] if the store cannot be written
    pub async fn add_server(
        &self,
        provider: &str,
        name: &str,
        url: &str,
    ) -> Result<(), AclGenError> {
        let mut store = self.read_store().await;
        let module = provider_module_name(provider);

        let section = store
            .entry(module.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }

        let entry = serde_json::to_value(AuthServerEntry {
            name: name.to_string(),
            url: url.to_string(),
        })?;

        if let Value::Object(section) = section {
            match section.get_mut(SERVERS_KEY) {
                Some(Value::Array(servers)) => servers.push(entry),
                _ => {
                    section.insert(SERVERS_KEY.to_string(), Value::Array(vec![entry]));
                }
            }
        }

        let mut contents = serde_json::to_string_pretty(&Value::Object(store))?;
        contents.push('\n');
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, contents).await?;

        debug!("Added auth server {} <{}> under {}", name, url, module);
        Ok(())
    }
}
