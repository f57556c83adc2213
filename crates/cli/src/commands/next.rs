use quoteflow_core::lifecycle::{next_automatic_status, TransitionContext};
use quoteflow_core::QuoteStatus;
use serde::Serialize;

use crate::commands::{parse_status, CommandResult, EXIT_OK};

#[derive(Debug, Serialize)]
struct NextReport {
    command: &'static str,
    status: &'static str,
    from: QuoteStatus,
    context: TransitionContext,
    suggested: Option<QuoteStatus>,
}

pub fn run(value: &str, all_proposals_received: bool) -> CommandResult {
    let from = match parse_status("next", value) {
        Ok(status) => status,
        Err(failure) => return failure,
    };
    let context = TransitionContext { all_proposals_received };

    CommandResult::report(
        EXIT_OK,
        &NextReport {
            command: "next",
            status: "ok",
            from,
            context,
            suggested: next_automatic_status(from, Some(&context)),
        },
    )
}
