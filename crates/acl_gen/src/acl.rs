//! ACL record types and the enumerations offered by the prompts
//!
//! An [`AclRecord`] is serialized exactly as it is stored in a model
//! definition's `acls` array: camelCase keys, optional fields omitted.
//!
//! # Example
//!
//! ```
//! use acl_gen::acl::{AccessType, AclRecord, Permission, PrincipalType};
//!
//! let record = AclRecord {
//!     property: None,
//!     access_type: AccessType::All,
//!     principal_type: PrincipalType::Role,
//!     principal_id: "$everyone".to_string(),
//!     permission: Permission::Audit,
//!     auth_scope: None,
//!     auth_server_name: None,
//! };
//!
//! let json = serde_json::to_value(&record).unwrap();
//! assert_eq!(json["accessType"], "*");
//! assert!(json.get("property").is_none());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AclGenError;

/// Sentinel choice that switches a select prompt to free-text entry
pub const OTHER_CHOICE: &str = "other";

/// Kind of operation an ACL entry covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessType {
    /// Every access type
    #[serde(rename = "*")]
    All,
    /// Read operations
    #[serde(rename = "READ")]
    Read,
    /// Write operations
    #[serde(rename = "WRITE")]
    Write,
    /// Remote method execution
    #[serde(rename = "EXECUTE")]
    Execute,
}

impl AccessType {
    /// Token used in model definitions and prompt values
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::All => "*",
            AccessType::Read => "READ",
            AccessType::Write => "WRITE",
            AccessType::Execute => "EXECUTE",
        }
    }
}

impl FromStr for AccessType {
    type Err = AclGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "*" => Ok(AccessType::All),
            "READ" => Ok(AccessType::Read),
            "WRITE" => Ok(AccessType::Write),
            "EXECUTE" => Ok(AccessType::Execute),
            other => Err(AclGenError::InvalidAnswer {
                question: "accessType".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision applied when an ACL entry matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Explicitly grant access
    Allow,
    /// Explicitly deny access
    Deny,
    /// Generate an alarm for the access
    Alarm,
    /// Log the access
    Audit,
    /// Require an OAuth scope issued by an authorization server
    SecurityScope,
}

impl Permission {
    /// Token used in model definitions and prompt values
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Allow => "ALLOW",
            Permission::Deny => "DENY",
            Permission::Alarm => "ALARM",
            Permission::Audit => "AUDIT",
            Permission::SecurityScope => "SECURITY_SCOPE",
        }
    }
}

impl FromStr for Permission {
    type Err = AclGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALLOW" => Ok(Permission::Allow),
            "DENY" => Ok(Permission::Deny),
            "ALARM" => Ok(Permission::Alarm),
            "AUDIT" => Ok(Permission::Audit),
            "SECURITY_SCOPE" => Ok(Permission::SecurityScope),
            other => Err(AclGenError::InvalidAnswer {
                question: "permission".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of principal an ACL entry targets. Only roles are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrincipalType {
    /// A built-in or custom role
    #[serde(rename = "ROLE")]
    Role,
}

/// What part of a model an ACL entry applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// All methods and properties
    All,
    /// A single remote method
    Method,
    /// A single property
    Property,
}

impl Scope {
    /// Token used as the prompt value
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Method => "method",
            Scope::Property => "property",
        }
    }
}

impl FromStr for Scope {
    type Err = AclGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Scope::All),
            "method" => Ok(Scope::Method),
            "property" => Ok(Scope::Property),
            other => Err(AclGenError::InvalidAnswer {
                question: "scope".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// One access-control entry as stored in a model definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclRecord {
    /// Method or property name; absent when the entry covers the whole model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Operation kind
    pub access_type: AccessType,
    /// Always [`PrincipalType::Role`]
    pub principal_type: PrincipalType,
    /// Role name or built-in role token
    pub principal_id: String,
    /// Decision
    pub permission: Permission,
    /// OAuth scope, only with [`Permission::SecurityScope`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_scope: Option<String>,
    /// Authorization server name, only with [`Permission::SecurityScope`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_server_name: Option<String>,
}

/// One entry of a select prompt: a display label and the value it yields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Label shown to the user
    pub name: String,
    /// Value returned when selected
    pub value: String,
}

impl Choice {
    /// Choice with a distinct label and value
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Choice whose label is its value
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value,
        }
    }
}

/// Access types offered for "all" and "property" scopes
pub fn access_type_choices() -> Vec<Choice> {
    vec![
        Choice::new("All (match all types)", "*"),
        Choice::new("Read", "READ"),
        Choice::new("Write", "WRITE"),
        Choice::new("Execute", "EXECUTE"),
    ]
}

/// Built-in role tokens
pub fn builtin_role_choices() -> Vec<Choice> {
    vec![
        Choice::new("All users", "$everyone"),
        Choice::new("Any unauthenticated user", "$unauthenticated"),
        Choice::new("Any authenticated user", "$authenticated"),
        Choice::new("Any user related to the object", "$related"),
        Choice::new("The user owning the object", "$owner"),
    ]
}

/// Permission tokens, including the OAuth security scope
pub fn permission_choices() -> Vec<Choice> {
    vec![
        Choice::new("Explicitly grant access", Permission::Allow.as_str()),
        Choice::new("Explicitly deny access", Permission::Deny.as_str()),
        Choice::new("Generate an alarm of the access", Permission::Alarm.as_str()),
        Choice::new("Log the access", Permission::Audit.as_str()),
        Choice::new(
            "Require an OAuth security scope",
            Permission::SecurityScope.as_str(),
        ),
    ]
}
