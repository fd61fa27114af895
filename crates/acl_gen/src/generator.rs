//! The ACL generator run
//!
//! [`AclGenerator::run`] executes the generator steps strictly in order:
//!
//! ```text
//! load project → load models → load enumerations → load OAuth providers
//!   → ask for model → discover methods → ask for parameters
//!   → register new auth server → write ACL entries
//! ```
//!
//! # Example
//!
//! ```no_run
//! use acl_gen::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), AclGenError> {
//! let options = GeneratorOptions::builder().project_root("/srv/app").build();
//! let generator = AclGenerator::new(options, Arc::new(TerminalPrompter));
//! let summary = generator.run().await?;
//! println!("Updated {:?}", summary.written);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::acl::{
    access_type_choices, builtin_role_choices, AccessType, AclRecord, Choice, Permission, Scope,
    OTHER_CHOICE,
};
use crate::auth_servers::{AuthServerEntry, AuthServerRegistry, CREATE_NEW_AUTH_SERVER};
use crate::builder::{AclAnswers, AclDefinitionBuilder, AuthServerChoice, RunContext};
use crate::discovery::{
    discover_methods, HelperLocator, MethodCatalog, MethodDiscovery, SubprocessDiscovery,
};
use crate::error::AclGenError;
use crate::options::GeneratorOptions;
use crate::persist::persist_acl;
use crate::project::Project;
use crate::prompt::{Prompter, Question};
use crate::providers::{oauth_providers, permission_choices_for};

/// Label of the model choice that targets every model
pub const ALL_MODELS_LABEL: &str = "(all existing models)";

/// What one run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Identifier of the run, also attached to its log span
    pub run_id: Uuid,
    /// Selected model, `None` for all models
    pub model: Option<String>,
    /// The entry that was written
    pub record: AclRecord,
    /// Models now holding the entry
    pub written: Vec<String>,
    /// Server registered during the run
    pub auth_server_added: Option<AuthServerEntry>,
}

/// Enumerations offered by the parameter prompts
struct PromptChoices {
    access_types: Vec<Choice>,
    roles: Vec<Choice>,
    permissions: Vec<Choice>,
    providers: Vec<String>,
}

/// Interactive ACL generator
pub struct AclGenerator {
    options: GeneratorOptions,
    prompter: Arc<dyn Prompter>,
    discovery: Option<Arc<dyn MethodDiscovery>>,
}

impl AclGenerator {
    /// Generator asking questions through `prompter`
    ///
    /// Method discovery uses the helper located by [`HelperLocator`] unless
    /// [`with_discovery`](Self::with_discovery) supplies one.
    pub fn new(options: GeneratorOptions, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            options,
            prompter,
            discovery: None,
        }
    }

    /// Use a specific method discovery
    pub fn with_discovery(mut self, discovery: Arc<dyn MethodDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Run the generator once
    ///
    /// # Errors
    ///
    /// - [`AclGenError::ProjectNotFound`] / [`AclGenError::ProjectLoad`] if the project cannot be loaded
    /// - [`AclGenError::ModelNotFound`] if the selected model does not exist
    /// - [`AclGenError::InvalidAnswer`] / [`AclGenError::Prompt`] for prompt failures
    /// - [`AclGenError::Io`] if a new auth server cannot be saved
    /// - The first error of the ACL writes, after every model was attempted
    pub async fn run(&self) -> Result<RunSummary, AclGenError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("acl_run", %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> Result<RunSummary, AclGenError> {
        let project = Project::load(&self.options).await?;

        let model_names: Vec<String> = project
            .models()
            .await?
            .iter()
            .map(|m| m.name().to_string())
            .collect();

        let providers = oauth_providers(&project.dependencies());
        let choices = PromptChoices {
            access_types: access_type_choices(),
            roles: builtin_role_choices(),
            permissions: permission_choices_for(&providers),
            providers,
        };
        debug!(
            "Loaded {} models, {} OAuth providers",
            model_names.len(),
            choices.providers.len()
        );

        let model = self.ask_for_model(&model_names).await?;
        let catalog = self.load_methods(&project, model.as_deref()).await;

        let registry = AuthServerRegistry::new(self.options.component_config_file());
        let mut context = RunContext::default();
        let answers = self
            .ask_for_parameters(&catalog, &choices, &registry, &mut context)
            .await?;

        let built = AclDefinitionBuilder::new(&context).build(answers)?;

        if let Some(pending) = &built.new_auth_server {
            registry
                .add_server(&pending.provider, &pending.server.name, &pending.server.url)
                .await?;
            info!(
                "Registered auth server {} for {}",
                pending.server.name, pending.provider
            );
        }

        let written = persist_acl(&project, &built.record, model.as_deref())
            .await?
            .into_result()?;
        info!("Added ACL entry to {} model(s)", written.len());

        Ok(RunSummary {
            run_id,
            model,
            record: built.record,
            written,
            auth_server_added: built.new_auth_server.map(|pending| pending.server),
        })
    }

    async fn ask_for_model(&self, model_names: &[String]) -> Result<Option<String>, AclGenError> {
        let mut choices = vec![Choice::new(ALL_MODELS_LABEL, "")];
        choices.extend(model_names.iter().map(Choice::plain));

        let question = Question::select(
            "model",
            "Select the model to apply the ACL entry to:",
            choices,
        );
        let answer = self.prompter.select(&question).await?;

        if answer.is_empty() {
            return Ok(None);
        }
        if !model_names.contains(&answer) {
            return Err(AclGenError::ModelNotFound(answer));
        }
        Ok(Some(answer))
    }

    async fn load_methods(&self, project: &Project, model: Option<&str>) -> MethodCatalog {
        let Some(model) = model else {
            return MethodCatalog::default_catalog();
        };

        let discovery: Arc<dyn MethodDiscovery> = match &self.discovery {
            Some(discovery) => discovery.clone(),
            None => match HelperLocator::find(self.options.discovery_helper.as_deref()) {
                Ok(command) => Arc::new(SubprocessDiscovery::new(command, project.root())),
                Err(e) => {
                    debug!("Skipping method discovery: {}", e);
                    return MethodCatalog::default_catalog();
                }
            },
        };

        let outcome =
            discover_methods(discovery.as_ref(), model, self.options.discovery_timeout).await;
        MethodCatalog::from_outcome(outcome)
    }

    async fn ask_for_parameters(
        &self,
        catalog: &MethodCatalog,
        choices: &PromptChoices,
        registry: &AuthServerRegistry,
        context: &mut RunContext,
    ) -> Result<AclAnswers, AclGenError> {
        let scope: Scope = self
            .prompter
            .select(
                &Question::select(
                    "scope",
                    "Select the ACL scope:",
                    vec![
                        Choice::new("All methods and properties", Scope::All.as_str()),
                        Choice::new("A single method", Scope::Method.as_str()),
                    ],
                )
                .with_default(Scope::All.as_str()),
            )
            .await?
            .parse()?;

        let property = match scope {
            Scope::Method => {
                let method = self
                    .prompter
                    .select(&Question::select(
                        "property",
                        "Select the method name:",
                        catalog.choices(),
                    ))
                    .await?;
                if method == OTHER_CHOICE {
                    Some(
                        self.prompter
                            .input(&Question::input("customMethod", "Enter the method name:"))
                            .await?,
                    )
                } else {
                    Some(method)
                }
            }
            Scope::Property => Some(
                self.prompter
                    .input(&Question::input("property", "Enter the property name:"))
                    .await?,
            ),
            Scope::All => None,
        };

        let access_type = match scope {
            Scope::Method => None,
            Scope::All | Scope::Property => Some(
                self.prompter
                    .select(
                        &Question::select(
                            "accessType",
                            "Select the access type:",
                            choices.access_types.clone(),
                        )
                        .with_default(AccessType::All.as_str()),
                    )
                    .await?
                    .parse::<AccessType>()?,
            ),
        };

        let mut roles = choices.roles.clone();
        roles.push(Choice::new("other", OTHER_CHOICE));
        let role = self
            .prompter
            .select(&Question::select("role", "Select the role:", roles).with_default("$everyone"))
            .await?;

        let custom_role = if role == OTHER_CHOICE {
            Some(
                self.prompter
                    .input(&Question::input("customRole", "Enter the role name:"))
                    .await?,
            )
        } else {
            None
        };

        let permission: Permission = self
            .prompter
            .select(&Question::select(
                "permission",
                "Select the permission to apply:",
                choices.permissions.clone(),
            ))
            .await?
            .parse()?;

        let (auth_server, auth_scope) = if permission == Permission::SecurityScope {
            let provider = self
                .prompter
                .select(&Question::select(
                    "authProvider",
                    "Select the auth provider:",
                    choices.providers.iter().map(Choice::plain).collect(),
                ))
                .await?;
            if provider.is_empty() {
                return Err(AclGenError::InvalidAnswer {
                    question: "authProvider".to_string(),
                    value: provider,
                });
            }
            context.choose_provider(registry, &provider).await;

            let server = self
                .prompter
                .select(&Question::select(
                    "authServerName",
                    "Select the auth server:",
                    context.auth_server_choices.iter().map(Choice::plain).collect(),
                ))
                .await?;

            let server = if server == CREATE_NEW_AUTH_SERVER {
                let name = self
                    .prompter
                    .input(&Question::input("newAuthServerName", "Enter auth server name:"))
                    .await?;
                let url = self
                    .prompter
                    .input(&Question::input("authServerURL", "Enter auth server url:"))
                    .await?;
                AuthServerChoice::New { name, url }
            } else {
                AuthServerChoice::Existing(server)
            };

            let auth_scope = self
                .prompter
                .input(&Question::input("authScope", "Enter scope:"))
                .await?;

            (Some(server), non_empty(auth_scope))
        } else {
            (None, None)
        };

        Ok(AclAnswers {
            scope,
            property,
            access_type,
            role,
            custom_role,
            permission,
            auth_server,
            auth_scope,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
