use std::path::Path;

use serde_json::json;
use stayquote_core::{AppConfig, QuoteEngine};

use crate::commands::session::{domain_failure, load_request, load_session, load_stay, replay};
use crate::commands::{CommandFailure, CommandResult};

pub fn run(config: &AppConfig, stay: &Path, session: &Path, request: &Path) -> CommandResult {
    submit(config, stay, session, request).unwrap_or_else(|failure| failure.into_result("submit"))
}

fn submit(
    config: &AppConfig,
    stay: &Path,
    session: &Path,
    request: &Path,
) -> Result<CommandResult, CommandFailure> {
    let snapshot = load_stay(stay)?;
    let session = load_session(session)?;
    let request = load_request(request)?;
    let engine = QuoteEngine::new(&snapshot, config.engine.clone());

    let configuration = replay(&engine, &session)?;
    let outcome = engine.submit(&configuration, &request).map_err(domain_failure)?;

    let message = format!(
        "submission for `{}` built: {} night(s), total {}{}",
        outcome.submission.stay_id,
        outcome.nights,
        outcome.price.total,
        if outcome.price.has_undefined_pricing { " (manual pricing required)" } else { "" }
    );
    Ok(CommandResult::success_with_data("submit", message, Some(json!(outcome))))
}
