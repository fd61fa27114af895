//! Configuration options and builder pattern for generator runs
//!
//! This module provides [`GeneratorOptions`] for configuring where the project
//! lives, where its model definitions and component configuration are stored,
//! and how method discovery is performed.
//!
//! # Example
//!
//! ```
//! use acl_gen::options::GeneratorOptions;
//! use std::time::Duration;
//!
//! let options = GeneratorOptions::builder()
//!     .project_root("/srv/app")
//!     .discovery_timeout(Duration::from_secs(2))
//!     .build();
//!
//! assert_eq!(
//!     options.component_config_file(),
//!     std::path::PathBuf::from("/srv/app/server/component-config.json")
//! );
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Component configuration file, relative to the project root
pub const DEFAULT_COMPONENT_CONFIG_PATH: &str = "server/component-config.json";

/// Directories scanned for model definitions, relative to the project root
pub const DEFAULT_MODEL_DIRS: [&str; 2] = ["common/models", "server/models"];

/// How long method discovery may take before the default catalog is used
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration options for a generator run
///
/// All paths are resolved against [`project_root`](Self::project_root) unless
/// they are absolute.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Project directory (contains `package.json`)
    pub project_root: PathBuf,
    /// Component configuration store holding authorization servers
    pub component_config_path: PathBuf,
    /// Directories scanned for model definition files
    pub model_dirs: Vec<PathBuf>,
    /// Explicit discovery helper command (program followed by its arguments)
    pub discovery_helper: Option<Vec<String>>,
    /// Timeout for the method discovery round trip
    pub discovery_timeout: Duration,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            component_config_path: PathBuf::from(DEFAULT_COMPONENT_CONFIG_PATH),
            model_dirs: DEFAULT_MODEL_DIRS.iter().map(PathBuf::from).collect(),
            discovery_helper: None,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

impl GeneratorOptions {
    /// Create a new options builder
    pub fn builder() -> GeneratorOptionsBuilder {
        GeneratorOptionsBuilder::default()
    }

    /// Absolute-or-root-relative path of the component configuration store
    pub fn component_config_file(&self) -> PathBuf {
        self.project_root.join(&self.component_config_path)
    }

    /// Model directories resolved against the project root
    pub fn model_dir_paths(&self) -> Vec<PathBuf> {
        self.model_dirs
            .iter()
            .map(|dir| self.project_root.join(dir))
            .collect()
    }
}

/// Builder for [`GeneratorOptions`]
///
/// # Example
///
/// ```
/// use acl_gen::options::GeneratorOptions;
///
/// let options = GeneratorOptions::builder()
///     .project_root("/srv/app")
///     .model_dirs(vec!["common/models".into()])
///     .discovery_helper(vec!["node".to_string(), "list-methods.js".to_string()])
///     .build();
///
/// assert_eq!(options.model_dirs.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct GeneratorOptionsBuilder {
    inner: GeneratorOptions,
}

impl GeneratorOptionsBuilder {
    /// Set the project root
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.inner.project_root = root.into();
        self
    }

    /// Set the component configuration path
    pub fn component_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.component_config_path = path.into();
        self
    }

    /// Replace the model directories
    pub fn model_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.inner.model_dirs = dirs;
        self
    }

    /// Set an explicit discovery helper command
    pub fn discovery_helper(mut self, command: Vec<String>) -> Self {
        self.inner.discovery_helper = Some(command);
        self
    }

    /// Set the discovery timeout
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.inner.discovery_timeout = timeout;
        self
    }

    /// Build the options
    pub fn build(self) -> GeneratorOptions {
        self.inner
    }
}
