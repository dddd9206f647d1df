use std::path::Path;

use crate::commands::session::load_stay;
use crate::commands::CommandResult;

pub fn run(stay: &Path) -> CommandResult {
    match load_stay(stay) {
        Ok(snapshot) => CommandResult::success(
            "validate",
            format!(
                "stay snapshot `{}` is valid ({} age brackets, {} sub-periods, {} room types)",
                snapshot.id,
                snapshot.age_brackets.len(),
                snapshot.sub_periods.len(),
                snapshot.rooms.len()
            ),
        ),
        Err(failure) => failure.into_result("validate"),
    }
}
