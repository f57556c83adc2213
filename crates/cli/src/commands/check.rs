use quoteflow_core::lifecycle::{is_valid_transition, valid_transitions};
use quoteflow_core::{ApplicationError, DomainError, QuoteStatus};
use serde::Serialize;

use crate::commands::{parse_status, CommandResult, EXIT_NOT_PERMITTED, EXIT_OK};

#[derive(Debug, Serialize)]
struct CheckReport {
    command: &'static str,
    status: &'static str,
    error_class: Option<&'static str>,
    message: String,
    from: QuoteStatus,
    to: QuoteStatus,
    allowed: bool,
    valid_targets: &'static [QuoteStatus],
}

pub fn run(from: &str, to: &str) -> CommandResult {
    let from = match parse_status("check", from) {
        Ok(status) => status,
        Err(failure) => return failure,
    };
    let to = match parse_status("check", to) {
        Ok(status) => status,
        Err(failure) => return failure,
    };

    if is_valid_transition(from, to) {
        return CommandResult::report(
            EXIT_OK,
            &CheckReport {
                command: "check",
                status: "ok",
                error_class: None,
                message: format!("`{from}` may move to `{to}`"),
                from,
                to,
                allowed: true,
                valid_targets: valid_transitions(from),
            },
        );
    }

    let interface = ApplicationError::from(DomainError::InvalidQuoteTransition { from, to })
        .into_interface("cli");
    CommandResult::report(
        EXIT_NOT_PERMITTED,
        &CheckReport {
            command: "check",
            status: "error",
            error_class: Some("not_permitted"),
            message: interface.user_message().to_string(),
            from,
            to,
            allowed: false,
            valid_targets: valid_transitions(from),
        },
    )
}
