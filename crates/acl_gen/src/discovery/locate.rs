//! Discovery helper location
//!
//! The helper is the program that boots the application and prints the
//! method names of one model. [`HelperLocator::find`] searches in order:
//!
//! 1. **Explicit command** - `--discovery-helper` / [`GeneratorOptions::discovery_helper`](crate::options::GeneratorOptions)
//! 2. **ACL_GEN_DISCOVERY_HELPER** - environment variable, split on whitespace
//! 3. **PATH** - an executable named [`HELPER_BINARY`]
//! 4. **Bundled script** - [`LIST_METHODS_SCRIPT`] run by `node` from PATH

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AclGenError;

/// Environment variable holding a helper command line
pub const HELPER_ENV_VAR: &str = "ACL_GEN_DISCOVERY_HELPER";

/// Executable searched on PATH when nothing is configured
pub const HELPER_BINARY: &str = "acl-discover-methods";

/// Node runtime that runs the bundled script
pub const NODE_BINARY: &str = "node";

/// Bundled helper: boots `server/server.js` and prints the model's shared methods
pub const LIST_METHODS_SCRIPT: &str = include_str!("list_methods.js");

/// A resolved helper program and the arguments placed before the model name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCommand {
    /// Resolved program path
    pub program: PathBuf,
    /// Leading arguments
    pub args: Vec<String>,
}

/// Helper discovery utility
pub struct HelperLocator;

impl HelperLocator {
    /// Find the discovery helper using the process environment
    ///
    /// # Errors
    ///
    /// [`AclGenError::HelperNotFound`] when no candidate resolves to an existing program.
    pub fn find(explicit: Option<&[String]>) -> Result<HelperCommand, AclGenError> {
        Self::find_in(
            explicit,
            std::env::var(HELPER_ENV_VAR).ok(),
            std::env::var_os("PATH"),
        )
    }

    /// Search with explicit environment values
    pub fn find_in(
        explicit: Option<&[String]>,
        env_command: Option<String>,
        path_env: Option<OsString>,
    ) -> Result<HelperCommand, AclGenError> {
        // 1. Explicit command
        if let Some(command) = explicit {
            if let Some(helper) = Self::resolve(command, path_env.as_ref()) {
                return Ok(helper);
            }
            debug!("Configured discovery helper {:?} not found", command);
        }

        // 2. Environment variable
        if let Some(line) = env_command {
            let command: Vec<String> = line.split_whitespace().map(String::from).collect();
            if let Some(helper) = Self::resolve(&command, path_env.as_ref()) {
                return Ok(helper);
            }
            debug!("{} points at a missing program: {}", HELPER_ENV_VAR, line);
        }

        // 3. PATH
        if let Some(program) = path_env
            .as_ref()
            .and_then(|path| Self::search_path(HELPER_BINARY, path))
        {
            return Ok(HelperCommand {
                program,
                args: Vec::new(),
            });
        }

        // 4. Bundled script
        if let Some(node) = path_env
            .as_ref()
            .and_then(|path| Self::search_path(NODE_BINARY, path))
        {
            debug!("Using bundled discovery script with {}", node.display());
            return Ok(HelperCommand {
                program: node,
                args: vec!["-e".to_string(), LIST_METHODS_SCRIPT.to_string()],
            });
        }

        Err(AclGenError::HelperNotFound)
    }

    fn resolve(command: &[String], path_env: Option<&OsString>) -> Option<HelperCommand> {
        let (program, args) = command.split_first()?;
        let candidate = Path::new(program);

        let program = if candidate.components().count() > 1 || candidate.is_absolute() {
            candidate.exists().then(|| candidate.to_path_buf())?
        } else {
            Self::search_path(program, path_env?)?
        };

        Some(HelperCommand {
            program,
            args: args.to_vec(),
        })
    }

    /// Search for `name` in a PATH-style list
    fn search_path(name: &str, path_env: &OsString) -> Option<PathBuf> {
        // On Windows, also try the usual executable extensions
        let names: Vec<String> = if cfg!(windows) {
            vec![format!("{name}.exe"), format!("{name}.cmd"), name.to_string()]
        } else {
            vec![name.to_string()]
        };

        std::env::split_paths(path_env).find_map(|dir| {
            names
                .iter()
                .map(|n| dir.join(n))
                .find(|candidate| candidate.is_file())
        })
    }
}
