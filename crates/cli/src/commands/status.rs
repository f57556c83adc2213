use quoteflow_core::lifecycle::{can_receive_actions_str, is_locked_str, valid_transitions};
use quoteflow_core::{QuoteStatus, StatusTone};
use serde::Serialize;

use crate::commands::{parse_status, CommandResult, EXIT_OK};

#[derive(Debug, Serialize)]
struct StatusEntry {
    status: QuoteStatus,
    label: &'static str,
    tone: StatusTone,
    locked: bool,
    terminal: bool,
}

#[derive(Debug, Serialize)]
struct StatusListReport {
    command: &'static str,
    status: &'static str,
    statuses: Vec<StatusEntry>,
}

#[derive(Debug, Serialize)]
struct TransitionsReport {
    command: &'static str,
    status: &'static str,
    from: QuoteStatus,
    targets: &'static [QuoteStatus],
    locked: bool,
    terminal: bool,
}

#[derive(Debug, Serialize)]
struct LockReport {
    command: &'static str,
    status: &'static str,
    value: String,
    known: bool,
    locked: bool,
    can_receive_actions: bool,
}

pub fn list() -> CommandResult {
    let statuses = QuoteStatus::ALL
        .into_iter()
        .map(|status| StatusEntry {
            status,
            label: status.label(),
            tone: status.tone(),
            locked: status.is_locked(),
            terminal: status.is_terminal(),
        })
        .collect();

    CommandResult::report(
        EXIT_OK,
        &StatusListReport { command: "statuses", status: "ok", statuses },
    )
}

pub fn transitions(value: &str) -> CommandResult {
    let from = match parse_status("transitions", value) {
        Ok(status) => status,
        Err(failure) => return failure,
    };

    CommandResult::report(
        EXIT_OK,
        &TransitionsReport {
            command: "transitions",
            status: "ok",
            from,
            targets: valid_transitions(from),
            locked: from.is_locked(),
            terminal: from.is_terminal(),
        },
    )
}

/// Works on the raw value so legacy markers such as `paid` report as locked
/// instead of failing.
pub fn locked(value: &str) -> CommandResult {
    let known = value.parse::<QuoteStatus>().is_ok();
    CommandResult::report(
        EXIT_OK,
        &LockReport {
            command: "locked",
            status: "ok",
            value: value.to_string(),
            known,
            locked: is_locked_str(value),
            can_receive_actions: can_receive_actions_str(value),
        },
    )
}
