use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use stayquote_core::{ApplicationError, DomainError, QuoteAction, QuoteConfiguration, QuoteEngine};
use stayquote_core::{StaySnapshot, SubmissionRequest};

use crate::commands::CommandFailure;

/// A recorded quote session: an optional saved configuration followed by the
/// actions to replay on top of it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    #[serde(default)]
    pub configuration: Option<QuoteConfiguration>,
    #[serde(default)]
    pub actions: Vec<QuoteAction>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read {what} file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("could not parse {what} file `{}`", path.display()))
}

fn input_failure(error: anyhow::Error) -> CommandFailure {
    CommandFailure::from_application(ApplicationError::Input(format!("{error:#}")))
}

pub fn domain_failure(error: DomainError) -> CommandFailure {
    CommandFailure::from_application(ApplicationError::from(error))
}

/// Loads a stay snapshot and refuses it when structural checks fail.
pub fn load_stay(path: &Path) -> Result<StaySnapshot, CommandFailure> {
    let snapshot: StaySnapshot = read_json(path, "stay snapshot").map_err(input_failure)?;
    let validation = QuoteEngine::new(&snapshot, Default::default()).validate_snapshot();
    if !validation.valid {
        let message = format!(
            "stay snapshot `{}` has {} violation(s)",
            snapshot.id,
            validation.violations.len()
        );
        return Err(CommandFailure::from_application(ApplicationError::Snapshot(message))
            .with_data(validation.violations));
    }
    Ok(snapshot)
}

pub fn load_session(path: &Path) -> Result<SessionFile, CommandFailure> {
    read_json(path, "quote session").map_err(input_failure)
}

pub fn load_request(path: &Path) -> Result<SubmissionRequest, CommandFailure> {
    read_json(path, "submission request").map_err(input_failure)
}

/// Re-points the saved configuration at the snapshot, then replays the
/// recorded actions in order.
pub fn replay(
    engine: &QuoteEngine<'_>,
    session: &SessionFile,
) -> Result<QuoteConfiguration, CommandFailure> {
    let start = match &session.configuration {
        Some(saved) => engine.reconcile(saved),
        None => engine.start(),
    };
    engine.apply_all(&start, &session.actions).map_err(domain_failure)
}
