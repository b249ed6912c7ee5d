//! The graph runtime
//!
//! Five fixed nodes, exactly one path per run:
//!
//! orchestrator → searchWorker  → tools → answer
//!              → utilityWorker → tools → answer
//!              → answer
//!
//! The engine runs the current node, merges its partial return into the
//! running state, consults the branch table, and repeats until a terminal
//! node completes. No node error aborts a run; the only error that may
//! escape is a contract violation in the engine itself.

use crate::classifier::IntentClassifier;
use crate::composer::AnswerComposer;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::llm::GeminiClient;
use crate::models::{ConversationState, Intent, StateUpdate};
use crate::tools::{NewsProvider, PriceProvider, ToolDispatcher};
use crate::workers::{search_worker, utility_worker};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Graph nodes. `Answer` is the only terminal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
    Orchestrator,
    SearchWorker,
    UtilityWorker,
    Tools,
    Answer,
}

/// Upper bound on node executions per run. The fixed graph needs at most
/// four, so hitting this means the edge table is wrong.
const MAX_NODE_VISITS: usize = 8;

/// The graph runtime driving a single request from entry to terminal node.
pub struct Orchestrator {
    dispatcher: ToolDispatcher,
    composer: AnswerComposer,
}

impl Orchestrator {
    pub fn new(dispatcher: ToolDispatcher, composer: AnswerComposer) -> Self {
        Self {
            dispatcher,
            composer,
        }
    }

    /// Wire the provider-backed graph from process configuration.
    pub fn from_config(config: &AgentConfig) -> Self {
        let news = Arc::new(NewsProvider::from_config(config));
        let price = Arc::new(PriceProvider::from_config(config));
        let model = Arc::new(GeminiClient::from_config(config));

        Self::new(
            ToolDispatcher::new(news, price),
            AnswerComposer::new(model),
        )
    }

    /// Run a single prompt through the graph and return the final state.
    pub async fn run(&self, prompt: &str) -> Result<ConversationState> {
        self.run_state(ConversationState::from_prompt(prompt)).await
    }

    /// Drive a pre-seeded state from entry to terminal node.
    pub async fn run_state(&self, mut state: ConversationState) -> Result<ConversationState> {
        let mut node = NodeId::Orchestrator;
        let mut visits = 0;

        info!(run_id = %state.run_id, "starting graph run");

        loop {
            visits += 1;
            if visits > MAX_NODE_VISITS {
                return Err(AgentError::GraphError(format!(
                    "exceeded {} node visits without reaching a terminal node",
                    MAX_NODE_VISITS
                )));
            }

            let update = self.run_node(node, &state).await;
            state.apply(update);

            node = match Self::next_node(node, &mut state)? {
                Some(next) => next,
                None => break,
            };
        }

        info!(
            run_id = %state.run_id,
            messages = state.messages.len(),
            "graph run complete"
        );
        Ok(state)
    }

    async fn run_node(&self, node: NodeId, state: &ConversationState) -> StateUpdate {
        match node {
            NodeId::Orchestrator => {
                let intent = IntentClassifier::classify(state);
                info!(run_id = %state.run_id, intent = %intent, "classified request");
                StateUpdate {
                    route: Some(intent),
                    ..StateUpdate::default()
                }
            }
            NodeId::SearchWorker => search_worker(state),
            NodeId::UtilityWorker => utility_worker(state),
            NodeId::Tools => self.dispatcher.dispatch(state).await,
            NodeId::Answer => self.composer.compose(state).await,
        }
    }

    /// Edge table. The entry node branches on the recorded route, which is
    /// consumed here; every other edge is fixed. `None` means the node was
    /// terminal.
    fn next_node(node: NodeId, state: &mut ConversationState) -> Result<Option<NodeId>> {
        match node {
            NodeId::Orchestrator => {
                let route = state.route.take().ok_or_else(|| {
                    AgentError::InvalidRoute(
                        "entry node completed without a route decision".to_string(),
                    )
                })?;

                debug!(run_id = %state.run_id, route = %route, "branching");
                Ok(Some(match route {
                    Intent::Search => NodeId::SearchWorker,
                    Intent::Utility => NodeId::UtilityWorker,
                    Intent::Answer => NodeId::Answer,
                }))
            }
            NodeId::SearchWorker | NodeId::UtilityWorker => Ok(Some(NodeId::Tools)),
            NodeId::Tools => Ok(Some(NodeId::Answer)),
            NodeId::Answer => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionModel;
    use crate::models::Role;
    use crate::tools::{NewsAdapter, PriceAdapter};

    struct NewsStub;

    #[async_trait::async_trait]
    impl NewsAdapter for NewsStub {
        async fn fetch_news(&self, query: &str) -> Result<String> {
            Ok(format!("Headlines for: {}", query))
        }
    }

    struct PriceStub;

    #[async_trait::async_trait]
    impl PriceAdapter for PriceStub {
        async fn fetch_price(&self, _token: &str) -> Result<String> {
            Ok("$0.06".to_string())
        }
    }

    struct ModelStub;

    #[async_trait::async_trait]
    impl CompletionModel for ModelStub {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok("Focus tip: minimize distractions.".to_string())
        }
    }

    fn stub_orchestrator() -> Orchestrator {
        Orchestrator::new(
            ToolDispatcher::new(Arc::new(NewsStub), Arc::new(PriceStub)),
            AnswerComposer::new(Arc::new(ModelStub)),
        )
    }

    #[tokio::test]
    async fn test_search_path_end_to_end() {
        let orchestrator = stub_orchestrator();

        let prompt = "Find the latest news about Bitcoin";
        let state = orchestrator.run(prompt).await.unwrap();

        let tool_content = state.last_tool_content().expect("tool message missing");
        assert_eq!(tool_content, format!("Headlines for: {}", prompt));
        assert_eq!(state.final_answer(), Some(tool_content));
        assert_eq!(state.messages.last().unwrap().role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_price_path_end_to_end() {
        let orchestrator = stub_orchestrator();

        let state = orchestrator
            .run("How much is doge worth right now?")
            .await
            .unwrap();

        assert_eq!(state.last_tool_content(), Some("$0.06"));
        assert_eq!(state.final_answer(), Some("$0.06"));
    }

    #[tokio::test]
    async fn test_utility_echo_path_end_to_end() {
        let orchestrator = stub_orchestrator();

        let state = orchestrator.run("convert hello to emoji").await.unwrap();

        assert_eq!(state.last_tool_content(), Some("convert hello to emoji"));
        assert_eq!(state.final_answer(), Some("convert hello to emoji"));
    }

    #[tokio::test]
    async fn test_answer_path_skips_tools() {
        let orchestrator = stub_orchestrator();

        let state = orchestrator
            .run("Give me one short focus tip")
            .await
            .unwrap();

        assert!(state.last_tool_content().is_none());
        assert_eq!(
            state.final_answer(),
            Some("Focus tip: minimize distractions.")
        );
    }

    #[tokio::test]
    async fn test_staged_slots_empty_after_run() {
        let orchestrator = stub_orchestrator();

        for prompt in ["latest bitcoin news", "convert hello to emoji"] {
            let state = orchestrator.run(prompt).await.unwrap();
            assert!(state.search_input.is_none(), "prompt: {}", prompt);
            assert!(state.utility_input.is_none(), "prompt: {}", prompt);
        }
    }

    #[tokio::test]
    async fn test_exactly_one_terminal_assistant_message() {
        let orchestrator = stub_orchestrator();

        for prompt in [
            "latest bitcoin news",
            "convert hello to emoji",
            "Give me one short focus tip",
        ] {
            let state = orchestrator.run(prompt).await.unwrap();
            let assistants = state
                .messages
                .iter()
                .filter(|m| m.role == Role::Assistant)
                .count();

            assert_eq!(assistants, 1, "prompt: {}", prompt);
            assert_eq!(state.messages.last().unwrap().role, Role::Assistant);
        }
    }

    #[tokio::test]
    async fn test_route_is_consumed_by_the_branch() {
        let orchestrator = stub_orchestrator();

        let state = orchestrator.run("latest bitcoin news").await.unwrap();
        assert!(state.route.is_none());
    }
}
