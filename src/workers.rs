//! Worker nodes
//!
//! Pure staging steps between classification and tool dispatch. Each worker
//! copies the latest message content into its own staged slot and explicitly
//! unsets the sibling slot, so at most one slot is populated entering the
//! dispatcher.

use crate::models::{ConversationState, SlotUpdate, StateUpdate};
use tracing::debug;

pub fn search_worker(state: &ConversationState) -> StateUpdate {
    let staged = state.last_content().to_string();
    debug!(run_id = %state.run_id, query = %staged, "searchWorker staged input");

    StateUpdate {
        search_input: SlotUpdate::Set(staged),
        utility_input: SlotUpdate::Clear,
        ..StateUpdate::default()
    }
}

pub fn utility_worker(state: &ConversationState) -> StateUpdate {
    let staged = state.last_content().to_string();
    debug!(run_id = %state.run_id, request = %staged, "utilityWorker staged input");

    StateUpdate {
        utility_input: SlotUpdate::Set(staged),
        search_input: SlotUpdate::Clear,
        ..StateUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_worker_stages_and_unsets_sibling() {
        let mut state = ConversationState::from_prompt("latest bitcoin news");
        state.utility_input = Some("leftover".to_string());

        let update = search_worker(&state);
        assert!(update.messages.is_empty());
        state.apply(update);

        assert_eq!(state.search_input.as_deref(), Some("latest bitcoin news"));
        assert!(state.utility_input.is_none());
    }

    #[test]
    fn test_utility_worker_stages_and_unsets_sibling() {
        let mut state = ConversationState::from_prompt("convert hello to emoji");
        state.search_input = Some("leftover".to_string());

        let update = utility_worker(&state);
        assert!(update.messages.is_empty());
        state.apply(update);

        assert_eq!(state.utility_input.as_deref(), Some("convert hello to emoji"));
        assert!(state.search_input.is_none());
    }
}
