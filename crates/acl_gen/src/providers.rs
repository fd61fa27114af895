//! OAuth provider detection
//!
//! A provider `<name>` is installed when the project depends on the component
//! module `loopback-oauth-<name>`. Without any provider the `SECURITY_SCOPE`
//! permission is not offered.

use crate::acl::{permission_choices, Choice, Permission};

/// Naming convention of OAuth provider component modules
pub const OAUTH_MODULE_PREFIX: &str = "loopback-oauth-";

/// Component module name for a provider (`mfp` → `loopback-oauth-mfp`)
pub fn provider_module_name(provider: &str) -> String {
    format!("{OAUTH_MODULE_PREFIX}{provider}")
}

/// Provider names inferred from dependency names, in dependency order
pub fn oauth_providers<S: AsRef<str>>(dependencies: &[S]) -> Vec<String> {
    dependencies
        .iter()
        .filter_map(|dep| dep.as_ref().strip_prefix(OAUTH_MODULE_PREFIX))
        .filter(|provider| !provider.is_empty())
        .map(String::from)
        .collect()
}

/// Permission choices available given the installed providers
pub fn permission_choices_for(providers: &[String]) -> Vec<Choice> {
    let mut choices = permission_choices();
    if providers.is_empty() {
        choices.retain(|choice| choice.value != Permission::SecurityScope.as_str());
    }
    choices
}
