//! Core data models for the conversation graph

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
    System,
}

/// Route decision driving the graph branch after classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Search,
    Utility,
    Answer,
}

//
// ================= Message =================
//

/// One transcript entry. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

//
// ================= Conversation State =================
//

/// The single mutable entity threaded through the graph. Created fresh per
/// prompt, exclusively owned by its run, discarded after the final state is
/// returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub run_id: Uuid,
    pub messages: Vec<Message>,
    pub search_input: Option<String>,
    pub utility_input: Option<String>,
    pub route: Option<Intent>,
}

impl ConversationState {
    /// Fresh state seeded with a single user message.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self::from_messages(vec![Message::user(prompt)])
    }

    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            messages,
            search_input: None,
            utility_input: None,
            route: None,
        }
    }

    /// Content of the most recent message, or "" for an empty transcript.
    pub fn last_content(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Content of the most recent user-role message, scanned from the end.
    pub fn last_user_content(&self) -> Option<&str> {
        self.last_content_with_role(Role::User)
    }

    /// Content of the most recent tool-role message, scanned from the end.
    pub fn last_tool_content(&self) -> Option<&str> {
        self.last_content_with_role(Role::Tool)
    }

    /// Final assistant message of the run, if one was produced.
    pub fn final_answer(&self) -> Option<&str> {
        self.last_content_with_role(Role::Assistant)
    }

    fn last_content_with_role(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }

    /// Merge a node's partial return into the running state. Messages are
    /// append-only; the transcript never shrinks or reorders.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        update.search_input.apply_to(&mut self.search_input);
        update.utility_input.apply_to(&mut self.utility_input);
        if let Some(route) = update.route {
            self.route = Some(route);
        }
    }
}

//
// ================= Partial Updates =================
//

/// How a node's partial return treats one staged slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotUpdate {
    #[default]
    Keep,
    Clear,
    Set(String),
}

impl SlotUpdate {
    fn apply_to(self, slot: &mut Option<String>) {
        match self {
            SlotUpdate::Keep => {}
            SlotUpdate::Clear => *slot = None,
            SlotUpdate::Set(value) => *slot = Some(value),
        }
    }
}

/// Partial state returned by every node; the engine merges it via
/// [`ConversationState::apply`].
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub search_input: SlotUpdate,
    pub utility_input: SlotUpdate,
    pub route: Option<Intent>,
}

impl StateUpdate {
    /// Update that appends one message and leaves everything else untouched.
    pub fn append(message: Message) -> Self {
        Self {
            messages: vec![message],
            ..Self::default()
        }
    }
}

//
// ================= Display =================
//

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
            Role::System => "system",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Intent::Search => "search",
            Intent::Utility => "utility",
            Intent::Answer => "answer",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_appends_messages() {
        let mut state = ConversationState::from_prompt("hello");
        state.apply(StateUpdate::append(Message::assistant("hi")));

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.final_answer(), Some("hi"));
    }

    #[test]
    fn test_apply_slot_semantics() {
        let mut state = ConversationState::from_prompt("hello");

        state.apply(StateUpdate {
            search_input: SlotUpdate::Set("query".to_string()),
            utility_input: SlotUpdate::Clear,
            ..StateUpdate::default()
        });
        assert_eq!(state.search_input.as_deref(), Some("query"));
        assert!(state.utility_input.is_none());

        // Keep leaves an existing value alone
        state.apply(StateUpdate::default());
        assert_eq!(state.search_input.as_deref(), Some("query"));

        state.apply(StateUpdate {
            search_input: SlotUpdate::Clear,
            ..StateUpdate::default()
        });
        assert!(state.search_input.is_none());
    }

    #[test]
    fn test_last_content_helpers() {
        let mut state = ConversationState::from_messages(vec![
            Message::user("first"),
            Message::tool("tool output"),
            Message::user("second"),
        ]);

        assert_eq!(state.last_content(), "second");
        assert_eq!(state.last_user_content(), Some("second"));
        assert_eq!(state.last_tool_content(), Some("tool output"));
        assert!(state.final_answer().is_none());

        state.messages.clear();
        assert_eq!(state.last_content(), "");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let msg = Message::tool("x");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "tool");
    }
}
