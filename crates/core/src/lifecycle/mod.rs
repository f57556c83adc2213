pub mod gate;
pub mod transitions;

pub use gate::{StatusGate, TransitionRecord, TransitionTrigger};
pub use transitions::{
    can_receive_actions, can_receive_actions_str, is_locked, is_locked_str, is_quote_actionable,
    is_valid_transition, is_valid_transition_str, next_automatic_status, transition_edges,
    valid_transitions, valid_transitions_for, TransitionContext,
};
