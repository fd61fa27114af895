//! Method name discovery for the selected model
//!
//! This module provides the [`MethodDiscovery`] trait, which asks a running
//! instance of the target application for the remote methods a model exposes.
//!
//! # Overview
//!
//! Discovery is a one-shot request raced against a timeout:
//! - [`discover_methods`] issues the request and returns a [`DiscoveryOutcome`]
//! - [`MethodCatalog::from_outcome`] turns the outcome into prompt choices,
//!   falling back to [`MethodCatalog::default_catalog`] on timeout or failure
//!
//! The request future is dropped when the timeout elapses, which tears down
//! the helper process. A reply that arrives later is never observed.
//!
//! # Default Implementation
//!
//! [`SubprocessDiscovery`] spawns a helper command with the model name as its
//! last argument and reads one JSON array of method names from its stdout.
//!
//! # Example
//!
//! ```ignore
//! use acl_gen::discovery::{discover_methods, HelperLocator, MethodCatalog, SubprocessDiscovery};
//! use std::time::Duration;
//!
//! let command = HelperLocator::find(None)?;
//! let discovery = SubprocessDiscovery::new(command, "/srv/app");
//! let outcome = discover_methods(&discovery, "Car", Duration::from_secs(5)).await;
//! let catalog = MethodCatalog::from_outcome(outcome);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::acl::{Choice, OTHER_CHOICE};
use crate::error::AclGenError;

mod locate;
mod subprocess;

pub use locate::{
    HelperCommand, HelperLocator, HELPER_BINARY, HELPER_ENV_VAR, LIST_METHODS_SCRIPT, NODE_BINARY,
};
pub use subprocess::SubprocessDiscovery;

/// Methods every model exposes, offered when discovery yields nothing
pub const DEFAULT_METHODS: [&str; 12] = [
    "create",
    "upsert",
    "exists",
    "findById",
    "find",
    "findOne",
    "destroyAll",
    "updateAll",
    "deleteById",
    "count",
    "updateAttributes",
    "createChangeStream",
];

/// Source of method names for a model
///
/// Implementations must be cancel-safe: the caller drops the future when the
/// discovery timeout elapses.
#[async_trait]
pub trait MethodDiscovery: Send + Sync {
    /// Return the externally invocable method names of `model`, in order
    ///
    /// # Errors
    ///
    /// - [`AclGenError::HelperNotFound`] if the helper cannot be started
    /// - [`AclGenError::Discovery`] if the helper replies with something unexpected
    /// - [`AclGenError::Process`] if the helper exits without replying
    async fn discover(&self, model: &str) -> Result<Vec<String>, AclGenError>;
}

/// Result of one discovery request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// The helper replied in time
    Resolved(Vec<String>),
    /// The timeout elapsed first
    TimedOut,
    /// The helper could not produce a reply
    Failed(String),
}

/// Issue one discovery request and race it against `limit`
///
/// Never fails: errors become [`DiscoveryOutcome::Failed`] and are only logged.
pub async fn discover_methods(
    discovery: &dyn MethodDiscovery,
    model: &str,
    limit: Duration,
) -> DiscoveryOutcome {
    match timeout(limit, discovery.discover(model)).await {
        Ok(Ok(methods)) => {
            debug!("Discovered {} methods for {}", methods.len(), model);
            DiscoveryOutcome::Resolved(methods)
        }
        Ok(Err(e)) => {
            debug!("Method discovery for {} failed: {}", model, e);
            DiscoveryOutcome::Failed(e.to_string())
        }
        Err(_) => {
            warn!(
                "Method discovery for {} timed out after {:?}, using default methods",
                model, limit
            );
            DiscoveryOutcome::TimedOut
        }
    }
}

/// Ordered method names offered by the method prompt, ending with `other`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCatalog {
    methods: Vec<String>,
}

impl MethodCatalog {
    /// The fixed catalog: [`DEFAULT_METHODS`] followed by `other`
    pub fn default_catalog() -> Self {
        Self::with_other(DEFAULT_METHODS.iter().map(|m| m.to_string()).collect())
    }

    /// Build the catalog for a discovery outcome
    ///
    /// Only a non-empty resolved list replaces the default catalog.
    pub fn from_outcome(outcome: DiscoveryOutcome) -> Self {
        match outcome {
            DiscoveryOutcome::Resolved(methods) if !methods.is_empty() => {
                Self::with_other(methods)
            }
            _ => Self::default_catalog(),
        }
    }

    fn with_other(mut methods: Vec<String>) -> Self {
        methods.push(OTHER_CHOICE.to_string());
        Self { methods }
    }

    /// Method names, `other` last
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Methods as select choices
    pub fn choices(&self) -> Vec<Choice> {
        self.methods.iter().map(Choice::plain).collect()
    }
}

impl Default for MethodCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}
