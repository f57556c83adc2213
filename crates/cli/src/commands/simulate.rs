use quoteflow_core::config::AppConfig;
use quoteflow_core::{
    ApplicationError, AuditContext, AuditEvent, DomainError, InMemoryAuditSink,
    InMemoryQuoteRepository, InterfaceError, Quote, QuoteId, QuoteRepository, QuoteStatus,
    StatusGate, TransitionContext, TransitionRecord,
};
use serde::Serialize;

use crate::commands::{parse_status, CommandResult, EXIT_NOT_PERMITTED, EXIT_OK, EXIT_RUNTIME};

const SIMULATED_QUOTE_ID: &str = "Q-SIMULATED";
const CORRELATION_ID: &str = "cli-simulate";

#[derive(Debug, Serialize)]
struct SimulationReport {
    command: &'static str,
    status: &'static str,
    error_class: Option<&'static str>,
    message: String,
    final_status: QuoteStatus,
    transitions: Vec<TransitionRecord>,
    declined_automatic: Vec<DeclinedMove>,
    audit_trail: Vec<AuditEvent>,
}

/// An automatic suggestion the transition table refused.
#[derive(Debug, Serialize)]
struct DeclinedMove {
    from: QuoteStatus,
    to: QuoteStatus,
}

#[derive(Default)]
struct Walk {
    transitions: Vec<TransitionRecord>,
    declined_automatic: Vec<DeclinedMove>,
}

pub fn run(config: &AppConfig, steps: &[String], all_proposals_received: bool) -> CommandResult {
    let mut requested = Vec::with_capacity(steps.len());
    for step in steps {
        match parse_status("simulate", step) {
            Ok(status) => requested.push(status),
            Err(failure) => return failure,
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "simulate",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    let audit = AuditContext::new(CORRELATION_ID, config.audit.actor.clone());
    let context = TransitionContext { all_proposals_received };
    runtime.block_on(simulate(&requested, &context, &audit))
}

async fn simulate(
    requested: &[QuoteStatus],
    context: &TransitionContext,
    audit: &AuditContext,
) -> CommandResult {
    let gate = StatusGate::new(InMemoryQuoteRepository::default(), InMemoryAuditSink::default());
    let id = QuoteId(SIMULATED_QUOTE_ID.to_string());

    if let Err(error) = gate.repository().insert(Quote::new(id.clone())).await {
        return CommandResult::failure(
            "simulate",
            "service_unavailable",
            error.to_string(),
            EXIT_RUNTIME,
        );
    }

    let mut walk = Walk::default();
    let mut failure = None;
    for next in requested {
        if let Err(error) = walk_step(&gate, &id, *next, context, audit, &mut walk).await {
            failure = Some(error);
            break;
        }
    }
    let Walk { transitions, declined_automatic } = walk;

    let final_status = match gate.repository().find_by_id(&id).await {
        Ok(Some(quote)) => quote.status,
        Ok(None) => QuoteStatus::Draft,
        Err(error) => {
            return CommandResult::failure(
                "simulate",
                "service_unavailable",
                error.to_string(),
                EXIT_RUNTIME,
            );
        }
    };
    let audit_trail = gate.sink().events();

    match failure {
        None => CommandResult::report(
            EXIT_OK,
            &SimulationReport {
                command: "simulate",
                status: "ok",
                error_class: None,
                message: format!("{} step(s) applied", transitions.len()),
                final_status,
                transitions,
                declined_automatic,
                audit_trail,
            },
        ),
        Some(error) => {
            let interface = error.clone().into_interface(audit.correlation_id.clone());
            let (error_class, exit_code) = classify(&interface);
            CommandResult::report(
                exit_code,
                &SimulationReport {
                    command: "simulate",
                    status: "error",
                    error_class: Some(error_class),
                    message: format!("{} ({error})", interface.user_message()),
                    final_status,
                    transitions,
                    declined_automatic,
                    audit_trail,
                },
            )
        }
    }
}

/// Requests one status, then tries any automatic move that follows.
///
/// A suggestion the table refuses is recorded and the walk goes on; any other
/// failure ends it.
async fn walk_step(
    gate: &StatusGate<InMemoryQuoteRepository, InMemoryAuditSink>,
    id: &QuoteId,
    next: QuoteStatus,
    context: &TransitionContext,
    audit: &AuditContext,
    walk: &mut Walk,
) -> Result<(), ApplicationError> {
    walk.transitions.push(gate.request_transition(id, next, audit).await?);
    match gate.apply_automatic(id, context, audit).await {
        Ok(Some(record)) => walk.transitions.push(record),
        Ok(None) => {}
        Err(ApplicationError::Domain(DomainError::InvalidQuoteTransition { from, to })) => {
            walk.declined_automatic.push(DeclinedMove { from, to });
        }
        Err(error) => return Err(error),
    }
    Ok(())
}

fn classify(error: &InterfaceError) -> (&'static str, u8) {
    match error {
        InterfaceError::NotPermitted { .. } => ("not_permitted", EXIT_NOT_PERMITTED),
        InterfaceError::BadRequest { .. } => ("bad_request", EXIT_NOT_PERMITTED),
        InterfaceError::NotFound { .. } => ("not_found", EXIT_RUNTIME),
        InterfaceError::Conflict { .. } => ("conflict", EXIT_RUNTIME),
        InterfaceError::ServiceUnavailable { .. } => ("service_unavailable", EXIT_RUNTIME),
        InterfaceError::Internal { .. } => ("internal", EXIT_RUNTIME),
    }
}
