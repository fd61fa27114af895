//! ACL persistence across one or all models
//!
//! Every target model is attempted even after a failure. The first
//! validation failure is reported to the user; the rest are logged at debug
//! level and counted. Writes that succeeded are not rolled back.

use tracing::{debug, error};

use crate::acl::AclRecord;
use crate::error::AclGenError;
use crate::project::Project;

/// Per-model results of one persistence pass
#[derive(Debug, Default)]
pub struct PersistOutcome {
    /// Models whose definition now holds the entry, in write order
    pub written: Vec<String>,
    /// Models that rejected the entry, in write order
    pub failed: Vec<(String, AclGenError)>,
    /// Index in `failed` of the error shown to the user
    reported: Option<usize>,
}

impl PersistOutcome {
    /// The first failure of the pass, if any
    pub fn first_error(&self) -> Option<&AclGenError> {
        self.failed.first().map(|(_, err)| err)
    }

    /// The validation failure that was reported, if any
    pub fn reported_error(&self) -> Option<&AclGenError> {
        self.reported
            .and_then(|index| self.failed.get(index))
            .map(|(_, err)| err)
    }

    /// Record a failed write, reporting the first validation failure
    pub fn record_failure(&mut self, model: String, err: AclGenError) {
        if self.reported.is_none() && matches!(err, AclGenError::Validation { .. }) {
            report_validation_error(&err);
            self.reported = Some(self.failed.len());
        } else {
            debug!("Suppressed error for {}: {}", model, err);
        }
        self.failed.push((model, err));
    }

    /// Written model names, or the first failure
    pub fn into_result(self) -> Result<Vec<String>, AclGenError> {
        match self.failed.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(self.written),
        }
    }
}

/// Report a validation failure to the user
pub fn report_validation_error(err: &AclGenError) {
    error!("{}", err);
}

/// Append `record` to the named model, or to every model when `model` is `None`
///
/// # Errors
///
/// Only target resolution errors are returned here:
/// - [`AclGenError::ModelNotFound`] if `model` names no definition
/// - [`AclGenError::ProjectLoad`] if a definition cannot be read
///
/// Write failures are collected in the returned [`PersistOutcome`].
pub async fn persist_acl(
    project: &Project,
    record: &AclRecord,
    model: Option<&str>,
) -> Result<PersistOutcome, AclGenError> {
    let targets = project.find_models(model).await?;
    let mut outcome = PersistOutcome::default();

    for target in targets {
        match target.append_acl(record).await {
            Ok(()) => outcome.written.push(target.name().to_string()),
            Err(err) => outcome.record_failure(target.name().to_string(), err),
        }
    }

    debug!(
        "Persisted ACL: {} written, {} failed",
        outcome.written.len(),
        outcome.failed.len()
    );
    Ok(outcome)
}
