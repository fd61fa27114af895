//! Interactive prompt abstraction
//!
//! The generator asks every question through the [`Prompter`] trait. Each
//! question has a stable name (`scope`, `property`, `role`, ...) so that a
//! [`ScriptedPrompter`] can answer it without a terminal.
//!
//! - [`TerminalPrompter`] renders questions with dialoguer
//! - [`ScriptedPrompter`] answers from a name → value map, falling back to defaults

use std::collections::HashMap;

use async_trait::async_trait;
use dialoguer::{Input, Select};
use tokio::sync::Mutex;

use crate::acl::Choice;
use crate::error::AclGenError;

/// One question of the prompt session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Answer key
    pub name: String,
    /// Text shown to the user
    pub message: String,
    /// Options of a select question; empty for text input
    pub choices: Vec<Choice>,
    /// Default value (a choice value for selects)
    pub default: Option<String>,
}

impl Question {
    /// A select question
    pub fn select(name: impl Into<String>, message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            choices,
            default: None,
        }
    }

    /// A free-text question
    pub fn input(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::select(name, message, Vec::new())
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn default_index(&self) -> usize {
        self.default
            .as_ref()
            .and_then(|d| self.choices.iter().position(|c| &c.value == d))
            .unwrap_or(0)
    }
}

/// Source of answers for the generator's questions
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask a select question and return the chosen value
    async fn select(&self, question: &Question) -> Result<String, AclGenError>;

    /// Ask a free-text question
    async fn input(&self, question: &Question) -> Result<String, AclGenError>;
}

/// Prompter rendering questions on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn select(&self, question: &Question) -> Result<String, AclGenError> {
        if question.choices.is_empty() {
            return Err(AclGenError::Prompt(format!(
                "no choices available for {}",
                question.name
            )));
        }

        let question = question.clone();
        tokio::task::spawn_blocking(move || -> Result<String, AclGenError> {
            let labels: Vec<&str> = question.choices.iter().map(|c| c.name.as_str()).collect();
            let index = Select::new()
                .with_prompt(&question.message)
                .items(&labels)
                .default(question.default_index())
                .interact()?;
            Ok(question.choices[index].value.clone())
        })
        .await
        .map_err(|e| AclGenError::Prompt(e.to_string()))?
    }

    async fn input(&self, question: &Question) -> Result<String, AclGenError> {
        let question = question.clone();
        tokio::task::spawn_blocking(move || -> Result<String, AclGenError> {
            let mut input = Input::<String>::new()
                .with_prompt(&question.message)
                .allow_empty(true);
            if let Some(default) = &question.default {
                input = input.default(default.clone());
            }
            Ok(input.interact_text()?)
        })
        .await
        .map_err(|e| AclGenError::Prompt(e.to_string()))?
    }
}

/// Prompter answering from a fixed set of answers
///
/// Unanswered questions take their default, then their first choice, then
/// the empty string. Answers are not checked against the choices.
///
/// # Example
///
/// ```
/// use acl_gen::prompt::{Prompter, Question, ScriptedPrompter};
///
/// # #[tokio::main]
/// # async fn main() {
/// let prompter = ScriptedPrompter::new().answer("role", "$owner");
/// let question = Question::input("role", "Select the role").with_default("$everyone");
/// assert_eq!(prompter.input(&question).await.unwrap(), "$owner");
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: HashMap<String, String>,
    asked: Mutex<Vec<Question>>,
}

impl ScriptedPrompter {
    /// Prompter with no answers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an answer
    pub fn answer(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.answers.insert(name.into(), value.into());
        self
    }

    /// Questions asked so far, in order
    pub async fn asked(&self) -> Vec<Question> {
        self.asked.lock().await.clone()
    }

    async fn respond(&self, question: &Question) -> String {
        self.asked.lock().await.push(question.clone());

        self.answers
            .get(&question.name)
            .or(question.default.as_ref())
            .or_else(|| question.choices.first().map(|c| &c.value))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn select(&self, question: &Question) -> Result<String, AclGenError> {
        Ok(self.respond(question).await)
    }

    async fn input(&self, question: &Question) -> Result<String, AclGenError> {
        Ok(self.respond(question).await)
    }
}
