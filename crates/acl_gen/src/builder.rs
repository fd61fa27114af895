//! ACL definition builder
//!
//! Turns the answers of one prompt session into a normalized [`AclRecord`].
//! The rules, in priority order:
//!
//! 1. **Method scope** - access type is forced to `EXECUTE`
//! 2. **Property scope** - the property name and the selected access type are kept
//! 3. **All scope** - no property, the selected access type is kept
//! 4. **Principal** - a non-empty custom role wins over the selected role
//! 5. **Security scope** - the auth server name (never in `<url: ...>` display
//!    form) and scope are attached; a new server is paired with the run's provider
//! 6. **Principal type** - always `ROLE`
//!
//! # Example
//!
//! ```
//! use acl_gen::acl::{AccessType, Permission, Scope};
//! use acl_gen::builder::{AclAnswers, AclDefinitionBuilder, RunContext};
//!
//! let context = RunContext::default();
//! let answers = AclAnswers {
//!     scope: Scope::Method,
//!     property: Some("find".to_string()),
//!     access_type: Some(AccessType::Read),
//!     role: "$everyone".to_string(),
//!     custom_role: None,
//!     permission: Permission::Audit,
//!     auth_server: None,
//!     auth_scope: None,
//! };
//!
//! let built = AclDefinitionBuilder::new(&context).build(answers).unwrap();
//! assert_eq!(built.record.access_type, AccessType::Execute);
//! ```

use tracing::debug;

use crate::acl::{AccessType, AclRecord, Permission, PrincipalType, Scope};
use crate::auth_servers::{
    display_name_to_server_name, AuthServerEntry, AuthServerRegistry,
};
use crate::error::AclGenError;

/// State shared by the prompts of one run
///
/// Holds the provider chosen for a security-scope entry and the server list
/// displayed for it.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Provider chosen in the `authProvider` prompt
    pub provider: Option<String>,
    /// Display entries offered in the `authServerName` prompt
    pub auth_server_choices: Vec<String>,
}

impl RunContext {
    /// Record the chosen provider and load its server list
    pub async fn choose_provider(&mut self, registry: &AuthServerRegistry, provider: &str) {
        self.auth_server_choices = registry.list_servers(provider).await;
        self.provider = Some(provider.to_string());
    }
}

/// Server answer of a security-scope entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthServerChoice {
    /// A listed server, possibly in `name <url: ...>` display form
    Existing(String),
    /// A server entered in this run
    New {
        /// Server name
        name: String,
        /// Server URL
        url: String,
    },
}

/// Answers collected by the parameter prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclAnswers {
    /// Selected scope
    pub scope: Scope,
    /// Method or property name (method and property scopes)
    pub property: Option<String>,
    /// Selected access type (ignored for method scope)
    pub access_type: Option<AccessType>,
    /// Selected built-in role, or `other`
    pub role: String,
    /// Free-text role entered after selecting `other`
    pub custom_role: Option<String>,
    /// Selected permission
    pub permission: Permission,
    /// Server answer (security scope only)
    pub auth_server: Option<AuthServerChoice>,
    /// OAuth scope (security scope only)
    pub auth_scope: Option<String>,
}

/// A server entered during the run, not yet in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthServer {
    /// Provider the server is registered under
    pub provider: String,
    /// The server itself
    pub server: AuthServerEntry,
}

/// Output of [`AclDefinitionBuilder::build`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltAcl {
    /// The normalized entry
    pub record: AclRecord,
    /// Server to register before the entry is written
    pub new_auth_server: Option<PendingAuthServer>,
}

/// Builds ACL records from prompt answers
pub struct AclDefinitionBuilder<'a> {
    context: &'a RunContext,
}

impl<'a> AclDefinitionBuilder<'a> {
    /// Builder reading provider state from `context`
    pub fn new(context: &'a RunContext) -> Self {
        Self { context }
    }

    /// Normalize `answers` into a record
    ///
    /// # Errors
    ///
    /// [`AclGenError::InvalidAnswer`] if a new auth server was entered before
    /// a provider was chosen.
    pub fn build(&self, answers: AclAnswers) -> Result<BuiltAcl, AclGenError> {
        let (property, access_type) = match answers.scope {
            Scope::Method => (answers.property, AccessType::Execute),
            Scope::Property => (
                answers.property,
                answers.access_type.unwrap_or(AccessType::All),
            ),
            Scope::All => (None, answers.access_type.unwrap_or(AccessType::All)),
        };

        let principal_id = answers
            .custom_role
            .filter(|role| !role.trim().is_empty())
            .unwrap_or(answers.role);

        let mut new_auth_server = None;
        let (auth_server_name, auth_scope) = if answers.permission == Permission::SecurityScope {
            let name = match answers.auth_server {
                Some(AuthServerChoice::Existing(display)) => {
                    Some(display_name_to_server_name(&display).to_string())
                }
                Some(AuthServerChoice::New { name, url }) => {
                    let provider = self.context.provider.clone().ok_or_else(|| {
                        AclGenError::InvalidAnswer {
                            question: "authProvider".to_string(),
                            value: String::new(),
                        }
                    })?;
                    let name = display_name_to_server_name(&name).to_string();
                    new_auth_server = Some(PendingAuthServer {
                        provider,
                        server: AuthServerEntry {
                            name: name.clone(),
                            url,
                        },
                    });
                    Some(name)
                }
                None => None,
            };
            (name, answers.auth_scope)
        } else {
            (None, None)
        };

        debug!(
            "Built ACL: {} {} {}",
            access_type, principal_id, answers.permission
        );

        Ok(BuiltAcl {
            record: AclRecord {
                property,
                access_type,
                principal_type: PrincipalType::Role,
                principal_id,
                permission: answers.permission,
                auth_scope,
                auth_server_name,
            },
            new_auth_server,
        })
    }
}
