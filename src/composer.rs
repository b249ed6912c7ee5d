//! Answer composer
//!
//! Terminal node. Echoes the most recent tool message verbatim when one
//! exists; otherwise asks the completion model directly. Model failures
//! degrade to a fixed apology, so the node never errors.

use crate::llm::CompletionModel;
use crate::models::{ConversationState, Message, StateUpdate};
use std::sync::Arc;
use tracing::{debug, warn};

/// Returned when the model capability fails.
pub const APOLOGY: &str =
    "Sorry, I couldn't produce an answer right now. Please try again.";

pub struct AnswerComposer {
    model: Arc<dyn CompletionModel>,
}

impl AnswerComposer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub async fn compose(&self, state: &ConversationState) -> StateUpdate {
        // Tool output is echoed verbatim, never re-summarized.
        if let Some(tool_output) = state.last_tool_content() {
            debug!(run_id = %state.run_id, "composing answer from tool output");
            return StateUpdate::append(Message::assistant(tool_output.to_string()));
        }

        let prompt = state.last_user_content().unwrap_or_default();
        let content = match self.model.complete(prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(run_id = %state.run_id, error = %e, "model call failed, using apology");
                APOLOGY.to_string()
            }
        };

        StateUpdate::append(Message::assistant(content))
    }
}
