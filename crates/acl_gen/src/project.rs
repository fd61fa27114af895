//! Project loading and model definition files
//!
//! A project is a directory with a `package.json` and model definitions in
//! one or more model directories. Each definition is a JSON document with a
//! `name` and an optional `acls` array:
//!
//! ```json
//! {
//!   "name": "Car",
//!   "base": "PersistedModel",
//!   "acls": [
//!     { "accessType": "*", "principalType": "ROLE", "principalId": "$everyone", "permission": "AUDIT" }
//!   ]
//! }
//! ```
//!
//! Model lookups always rescan the model directories, so a run never works
//! from a stale list.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::acl::{AclRecord, Permission};
use crate::error::AclGenError;
use crate::options::GeneratorOptions;

const PACKAGE_FILE: &str = "package.json";

/// A loaded project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    model_dirs: Vec<PathBuf>,
    package: Value,
}

impl Project {
    /// Load the project described by `options`
    ///
    /// # Errors
    ///
    /// - [`AclGenError::ProjectNotFound`] if `package.json` is missing
    /// - [`AclGenError::ProjectLoad`] if `package.json` is not a JSON object
    pub async fn load(options: &GeneratorOptions) -> Result<Self, AclGenError> {
        let root = options.project_root.clone();
        let package_path = root.join(PACKAGE_FILE);

        let contents = match tokio::fs::read_to_string(&package_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AclGenError::ProjectNotFound(root));
            }
            Err(e) => return Err(AclGenError::Io(e)),
        };

        let package: Value = serde_json::from_str(&contents).map_err(|e| {
            AclGenError::ProjectLoad(format!("{}: {}", package_path.display(), e))
        })?;
        if !package.is_object() {
            return Err(AclGenError::ProjectLoad(format!(
                "{}: expected a JSON object",
                package_path.display()
            )));
        }

        debug!("Loaded project at {}", root.display());

        Ok(Self {
            root,
            model_dirs: options.model_dir_paths(),
            package,
        })
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of the declared dependencies, in document order
    pub fn dependencies(&self) -> Vec<String> {
        self.package
            .get("dependencies")
            .and_then(Value::as_object)
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every model definition, sorted by name
    ///
    /// # Errors
    ///
    /// [`AclGenError::ProjectLoad`] if a definition file is not valid JSON.
    pub async fn models(&self) -> Result<Vec<ModelDefinition>, AclGenError> {
        let mut models = Vec::new();

        for dir in &self.model_dirs {
            let mut entries = match tokio::fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    trace!("Model directory {} does not exist", dir.display());
                    continue;
                }
                Err(e) => return Err(AclGenError::Io(e)),
            };

            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    continue;
                }

                if let Some(model) = ModelDefinition::open(path).await? {
                    models.push(model);
                }
            }
        }

        models.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        debug!("Found {} models", models.len());
        Ok(models)
    }

    /// Models matching `name` exactly, or every model when `name` is `None`
    ///
    /// # Errors
    ///
    /// [`AclGenError::ModelNotFound`] if a name is given and no model has it.
    pub async fn find_models(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<ModelDefinition>, AclGenError> {
        let models = self.models().await?;
        match name {
            None => Ok(models),
            Some(name) => {
                let model = models
                    .into_iter()
                    .find(|m| m.name == name)
                    .ok_or_else(|| AclGenError::ModelNotFound(name.to_string()))?;
                Ok(vec![model])
            }
        }
    }
}

/// One model definition file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDefinition {
    name: String,
    path: PathBuf,
}

impl ModelDefinition {
    /// Read the model name from `path`; `None` when the document has no name
    async fn open(path: PathBuf) -> Result<Option<Self>, AclGenError> {
        let contents = tokio::fs::read_to_string(&path).await?;
        let doc: Value = serde_json::from_str(&contents)
            .map_err(|e| AclGenError::ProjectLoad(format!("{}: {}", path.display(), e)))?;

        match doc.get("name").and_then(Value::as_str) {
            Some(name) => Ok(Some(Self {
                name: name.to_string(),
                path,
            })),
            None => {
                warn!("Skipping {}: no model name", path.display());
                Ok(None)
            }
        }
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Definition file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `record` to the stored `acls` list
    ///
    /// The entry is validated first; a rejected entry leaves the file untouched.
    ///
    /// # Errors
    ///
    /// - [`AclGenError::Validation`] if the entry or the document is invalid
    /// - [`AclGenError::Io`] if the file cannot be read or written
    pub async fn append_acl(&self, record: &AclRecord) -> Result<(), AclGenError> {
        self.validate(record)?;

        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut doc: Value = serde_json::from_str(&contents)
            .map_err(|e| self.invalid(format!("definition is not valid JSON: {e}")))?;

        let Value::Object(fields) = &mut doc else {
            return Err(self.invalid("definition is not a JSON object"));
        };

        let entry = serde_json::to_value(record)?;
        match fields.get_mut("acls") {
            Some(Value::Array(acls)) => acls.push(entry),
            Some(_) => return Err(self.invalid("acls must be an array")),
            None => {
                fields.insert("acls".to_string(), Value::Array(vec![entry]));
            }
        }

        let mut contents = serde_json::to_string_pretty(&doc)?;
        contents.push('\n');
        tokio::fs::write(&self.path, contents).await?;

        debug!("Appended ACL to {} ({})", self.name, self.path.display());
        Ok(())
    }

    fn validate(&self, record: &AclRecord) -> Result<(), AclGenError> {
        if record.principal_id.trim().is_empty() {
            return Err(self.invalid("principalId is required"));
        }
        if record.property.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(self.invalid("property must not be empty"));
        }
        if record.permission == Permission::SecurityScope {
            if record.auth_scope.as_deref().is_none_or(|s| s.trim().is_empty()) {
                return Err(self.invalid("authScope is required for SECURITY_SCOPE"));
            }
            if record
                .auth_server_name
                .as_deref()
                .is_none_or(|s| s.trim().is_empty())
            {
                return Err(self.invalid("authServerName is required for SECURITY_SCOPE"));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> AclGenError {
        AclGenError::Validation {
            model: self.name.clone(),
            reason: reason.into(),
        }
    }
}
