//! acl_gen - interactive ACL generator for LoopBack-style projects
//!
//! Asks a short series of questions and appends the resulting access control
//! entry to one model definition, or to every model of the project.
//!
//! # Overview
//!
//! - Model definitions are discovered under the project's model directories
//! - The methods of a selected model are listed by an external helper, with
//!   a fixed default catalog when the helper is missing, slow or failing
//! - `SECURITY_SCOPE` entries are offered when the project depends on an
//!   OAuth provider module, and their auth servers are kept in the
//!   component configuration file
//!
//! # Architecture
//!
//! - `acl`: ACL record and its enumerations
//! - `options`: Generator configuration and builder
//! - `project`: Project and model definition access
//! - `discovery`: Method discovery with a bounded wait
//! - `providers`: OAuth provider detection
//! - `auth_servers`: Auth server store
//! - `prompt`: Question abstraction (terminal and scripted)
//! - `builder`: Normalization of prompt answers into a record
//! - `persist`: Writing a record to the target models
//! - `generator`: The ordered generator run
//! - `error`: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use acl_gen::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AclGenError> {
//!     let options = GeneratorOptions::builder().project_root(".").build();
//!     let prompter = ScriptedPrompter::new()
//!         .answer("model", "Car")
//!         .answer("permission", "AUDIT");
//!
//!     let summary = AclGenerator::new(options, Arc::new(prompter)).run().await?;
//!     println!("Added {:?} to {:?}", summary.record, summary.written);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// ACL record types and enumerations
///
/// `AclRecord` is the entry appended to a model's `acls` array. The choice
/// lists offered by the prompts live here as well.
pub mod acl;

/// Auth server store for `SECURITY_SCOPE` entries
///
/// Servers are kept per provider in the component configuration file, under
/// `loopback-oauth-<provider>.authorizationServers`.
pub mod auth_servers;

/// Normalization of prompt answers into an ACL record
pub mod builder;

/// Method discovery
///
/// This module provides the `MethodDiscovery` trait, the subprocess-backed
/// `SubprocessDiscovery`, and `discover_methods`, which bounds a discovery
/// call by a timeout and reports a `DiscoveryOutcome`.
pub mod discovery;

/// Error types
///
/// This module defines the `AclGenError` enum:
///
/// - `ProjectNotFound` / `ProjectLoad` - Project cannot be loaded
/// - `ModelNotFound` - Named model does not exist
/// - `Validation` - Model definition rejected the entry
/// - `InvalidAnswer` / `Prompt` - Prompt failures
/// - `HelperNotFound` / `Discovery` / `Process` - Method discovery failures
/// - `JsonDecode` - JSON parsing errors (auto-converts from `serde_json::Error`)
/// - `Io` - Filesystem operations (auto-converts from `std::io::Error`)
pub mod error;

/// The generator run
pub mod generator;

/// Configuration options and builder
pub mod options;

/// ACL persistence across models
pub mod persist;

/// Project and model definition access
pub mod project;

/// Question abstraction
pub mod prompt;

/// OAuth provider detection
pub mod providers;

// Prelude module for common imports
pub mod prelude {
    //! Common imports for acl_gen users
    //!
    //! Use `use acl_gen::prelude::*;` to import commonly used types.

    pub use crate::acl::{AccessType, AclRecord, Choice, Permission, PrincipalType, Scope};
    pub use crate::auth_servers::{AuthServerEntry, AuthServerRegistry};
    pub use crate::builder::{
        AclAnswers, AclDefinitionBuilder, BuiltAcl, PendingAuthServer, RunContext,
    };
    pub use crate::discovery::{
        discover_methods, DiscoveryOutcome, MethodCatalog, MethodDiscovery, SubprocessDiscovery,
    };
    pub use crate::error::AclGenError;
    pub use crate::generator::{AclGenerator, RunSummary};
    pub use crate::options::GeneratorOptions;
    pub use crate::persist::{persist_acl, PersistOutcome};
    pub use crate::project::{ModelDefinition, Project};
    pub use crate::prompt::{Prompter, Question, ScriptedPrompter, TerminalPrompter};
}
