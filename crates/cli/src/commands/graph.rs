use quoteflow_core::lifecycle::transition_edges;
use quoteflow_core::QuoteStatus;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_OK};

#[derive(Debug, Serialize)]
struct Edge {
    from: QuoteStatus,
    to: QuoteStatus,
}

#[derive(Debug, Serialize)]
struct GraphReport {
    command: &'static str,
    status: &'static str,
    initial: QuoteStatus,
    terminal: Vec<QuoteStatus>,
    edges: Vec<Edge>,
}

pub fn run(dot: bool) -> CommandResult {
    if dot {
        return CommandResult { exit_code: EXIT_OK, output: render_dot() };
    }

    let terminal =
        QuoteStatus::ALL.into_iter().filter(|status| status.is_terminal()).collect::<Vec<_>>();
    let edges = transition_edges().map(|(from, to)| Edge { from, to }).collect();

    CommandResult::report(
        EXIT_OK,
        &GraphReport {
            command: "graph",
            status: "ok",
            initial: QuoteStatus::Draft,
            terminal,
            edges,
        },
    )
}

fn render_dot() -> String {
    let mut lines = vec!["digraph quote_lifecycle {".to_string(), "  rankdir=LR;".to_string()];

    for status in QuoteStatus::ALL {
        let shape = if status.is_terminal() {
            "doublecircle"
        } else if status.is_locked() {
            "box"
        } else {
            "ellipse"
        };
        lines.push(format!("  {status} [label=\"{}\", shape={shape}];", status.label()));
    }

    for (from, to) in transition_edges() {
        lines.push(format!("  {from} -> {to};"));
    }

    lines.push("}".to_string());
    lines.join("\n")
}
