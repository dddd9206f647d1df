use std::path::Path;

use serde_json::json;
use stayquote_core::{AppConfig, QuoteEngine};

use crate::commands::session::{domain_failure, load_session, load_stay, replay};
use crate::commands::{CommandFailure, CommandResult};

pub fn run(config: &AppConfig, stay: &Path, session: &Path) -> CommandResult {
    price(config, stay, session).unwrap_or_else(|failure| failure.into_result("price"))
}

fn price(config: &AppConfig, stay: &Path, session: &Path) -> Result<CommandResult, CommandFailure> {
    let snapshot = load_stay(stay)?;
    let session = load_session(session)?;
    let engine = QuoteEngine::new(&snapshot, config.engine.clone());

    let configuration = replay(&engine, &session)?;
    let summary = engine.summary(&configuration).map_err(domain_failure)?;

    let message = if summary.price.has_undefined_pricing {
        format!("total {} with undefined pricing", summary.price.total)
    } else {
        format!("total {}", summary.price.total)
    };
    Ok(CommandResult::success_with_data(
        "price",
        message,
        Some(json!({ "configuration": configuration, "summary": summary })),
    ))
}
