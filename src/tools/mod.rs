//! Tool dispatch
//!
//! Inspects the staged slots, invokes the matching provider adapter,
//! appends a tool-role message, and clears both slots. Provider failures
//! degrade to tool messages here; nothing escapes the node.

pub mod news;
pub mod price;

pub use news::{NewsProvider, NewsSearch, TavilyClient, Topic, DEFAULT_NEWS_QUERY, TOPIC_TIERS};
pub use price::{CoinGeckoClient, PriceProvider, QuoteSource, PRICE_UNAVAILABLE};

use crate::models::{ConversationState, Message, SlotUpdate, StateUpdate};
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// News capability at the dispatcher boundary.
#[async_trait::async_trait]
pub trait NewsAdapter: Send + Sync {
    async fn fetch_news(&self, query: &str) -> Result<String>;
}

/// Price capability at the dispatcher boundary.
#[async_trait::async_trait]
pub trait PriceAdapter: Send + Sync {
    async fn fetch_price(&self, token: &str) -> Result<String>;
}

lazy_static! {
    /// Valuation phrasing that routes a utility request to the price adapter.
    static ref PRICE_PATTERN: Regex =
        Regex::new(r"\b(price|current price|how much|worth)\b").expect("invalid price pattern");

    /// Known token aliases extracted from a price request.
    static ref TOKEN_PATTERN: Regex =
        Regex::new(r"\b(bitcoin|ethereum|dogecoin|btc|eth|doge)\b").expect("invalid token pattern");
}

/// Tool dispatcher node.
pub struct ToolDispatcher {
    news: Arc<dyn NewsAdapter>,
    price: Arc<dyn PriceAdapter>,
}

impl ToolDispatcher {
    pub fn new(news: Arc<dyn NewsAdapter>, price: Arc<dyn PriceAdapter>) -> Self {
        Self { news, price }
    }

    /// Run the staged tool call, if any. Both slots come back cleared no
    /// matter which branch fired.
    pub async fn dispatch(&self, state: &ConversationState) -> StateUpdate {
        let mut update = StateUpdate {
            search_input: SlotUpdate::Clear,
            utility_input: SlotUpdate::Clear,
            ..StateUpdate::default()
        };

        if let Some(query) = staged(state.search_input.as_deref()) {
            info!(run_id = %state.run_id, query, "dispatching news search");

            let content = match self.news.fetch_news(query).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(
                        run_id = %state.run_id,
                        error = %e,
                        "news adapter failed, degrading to empty tool message"
                    );
                    String::new()
                }
            };
            update.messages.push(Message::tool(content));
            return update;
        }

        if let Some(request) = staged(state.utility_input.as_deref()) {
            update.messages.push(self.utility_message(state, request).await);
            return update;
        }

        // Defensive branch: classifier routing should never land here with
        // nothing staged, but an empty dispatch is a no-op, not an error.
        debug!(run_id = %state.run_id, "no staged tool input, dispatcher is a no-op");
        update
    }

    async fn utility_message(&self, state: &ConversationState, request: &str) -> Message {
        let lower = request.to_lowercase();

        if PRICE_PATTERN.is_match(&lower) {
            let alias = TOKEN_PATTERN
                .find(&lower)
                .map(|m| m.as_str())
                .unwrap_or(request);
            info!(run_id = %state.run_id, alias, "dispatching price lookup");

            match self.price.fetch_price(alias).await {
                Ok(quote) => return Message::tool(quote),
                Err(e) => {
                    warn!(
                        run_id = %state.run_id,
                        error = %e,
                        "price adapter failed, echoing the request"
                    );
                }
            }
        }

        // Identity fallback: utility requests with no dedicated adapter
        // (emoji/translation style) and failed price lookups converge here.
        Message::tool(request.to_string())
    }
}

/// A slot counts as staged only when it holds non-whitespace content.
fn staged(slot: Option<&str>) -> Option<&str> {
    slot.map(str::trim).filter(|s| !s.is_empty())
}
