pub mod check;
pub mod config;
pub mod graph;
pub mod next;
pub mod simulate;
pub mod status;

use quoteflow_core::{DomainError, QuoteStatus};
use serde::Serialize;

pub const EXIT_OK: u8 = 0;
pub const EXIT_UNKNOWN_STATUS: u8 = 2;
pub const EXIT_NOT_PERMITTED: u8 = 3;
pub const EXIT_CONFIG: u8 = 4;
pub const EXIT_RUNTIME: u8 = 5;

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
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self::report(exit_code, &payload)
    }

    /// Wraps a command-specific payload.
    pub fn report<T: Serialize>(exit_code: u8, payload: &T) -> Self {
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Parses a status argument, or produces the failure a command should return.
pub(crate) fn parse_status(command: &str, value: &str) -> Result<QuoteStatus, CommandResult> {
    value.parse::<QuoteStatus>().map_err(|error: DomainError| {
        CommandResult::failure(command, "unknown_status", error.to_string(), EXIT_UNKNOWN_STATUS)
    })
}

fn serialize_payload<T: Serialize>(payload: &T) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
