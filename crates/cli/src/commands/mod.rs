pub mod config;
pub mod estimate;
pub mod price;
pub mod session;
pub mod submit;
pub mod validate;

use serde::Serialize;
use serde_json::Value;
use stayquote_core::{ApplicationError, DomainError};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Why a command stopped early; rendered as an `error` outcome.
#[derive(Debug)]
pub struct CommandFailure {
    pub error_class: String,
    pub message: String,
    pub exit_code: u8,
    pub data: Option<Value>,
}

impl CommandFailure {
    pub fn new(error_class: &str, message: impl Into<String>, exit_code: u8) -> Self {
        Self {
            error_class: error_class.to_string(),
            message: message.into(),
            exit_code,
            data: None,
        }
    }

    /// Maps an application error onto its class and process exit code.
    pub fn from_application(error: ApplicationError) -> Self {
        let exit_code = match &error {
            ApplicationError::Input(_) | ApplicationError::Configuration(_) => 2,
            ApplicationError::Snapshot(_) => 3,
            ApplicationError::Domain(_) => 4,
        };
        let failure = Self::new(error.error_class(), error.to_string(), exit_code);
        match &error {
            ApplicationError::Domain(DomainError::FlowTransition(transition)) => {
                failure.with_data(transition.unmet())
            }
            _ => failure,
        }
    }

    pub fn with_data(mut self, data: impl Serialize) -> Self {
        self.data = serde_json::to_value(data).ok();
        self
    }

    pub fn into_result(self, command: &str) -> CommandResult {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(self.error_class),
            message: self.message,
            data: self.data,
        };
        CommandResult { exit_code: self.exit_code, output: serialize_payload(payload) }
    }
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
