use std::path::Path;

use serde_json::json;
use stayquote_core::{AppConfig, QuoteEngine};

use crate::commands::session::{load_session, load_stay, replay};
use crate::commands::{CommandFailure, CommandResult};

pub fn run(config: &AppConfig, stay: &Path, session: &Path) -> CommandResult {
    estimate(config, stay, session).unwrap_or_else(|failure| failure.into_result("estimate"))
}

fn estimate(
    config: &AppConfig,
    stay: &Path,
    session: &Path,
) -> Result<CommandResult, CommandFailure> {
    let snapshot = load_stay(stay)?;
    let session = load_session(session)?;
    let engine = QuoteEngine::new(&snapshot, config.engine.clone());

    let configuration = replay(&engine, &session)?;
    let estimate = engine.estimate(&configuration);

    Ok(CommandResult::success_with_data(
        "estimate",
        format!("estimated total {} (approximation)", estimate.total),
        Some(json!({ "estimate": estimate })),
    ))
}
