//! News provider adapter
//!
//! Tier-fallback policy over a pluggable search transport. The outer
//! contract is non-throwing with one exception: a missing credential, which
//! the dispatcher degrades to an empty tool message. Every other failure is
//! absorbed by the tier chain and resolves to a string result.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::text::normalize_query;
use crate::tools::NewsAdapter;
use crate::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Substituted when the incoming query normalizes to nothing.
pub const DEFAULT_NEWS_QUERY: &str = "latest crypto news";

/// Topic tiers attempted in order; later tiers are more permissive.
pub const TOPIC_TIERS: [Topic; 3] = [Topic::News, Topic::General, Topic::Finance];

const MAX_RESULTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    News,
    General,
    Finance,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::News => "news",
            Topic::General => "general",
            Topic::Finance => "finance",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw search capability behind the tier policy.
#[async_trait::async_trait]
pub trait NewsSearch: Send + Sync {
    /// One attempt at one topic tier. `Ok(None)` means the tier completed
    /// but yielded nothing usable.
    async fn search(&self, query: &str, topic: Topic) -> Result<Option<String>>;
}

/// News adapter: credential precondition plus topic-tier fallback.
pub struct NewsProvider {
    search: Arc<dyn NewsSearch>,
    has_credential: bool,
}

impl NewsProvider {
    pub fn new(search: Arc<dyn NewsSearch>, has_credential: bool) -> Self {
        Self {
            search,
            has_credential,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let has_credential = !config.tavily_api_key.is_empty();
        Self::new(
            Arc::new(TavilyClient::new(config.tavily_api_key.clone())),
            has_credential,
        )
    }
}

#[async_trait::async_trait]
impl NewsAdapter for NewsProvider {
    async fn fetch_news(&self, query: &str) -> Result<String> {
        if !self.has_credential {
            return Err(AgentError::MissingCredential(
                "TAVILY_API_KEY is not set".to_string(),
            ));
        }

        let mut query = normalize_query(query);
        if query.is_empty() {
            warn!("empty news query, defaulting to '{}'", DEFAULT_NEWS_QUERY);
            query = DEFAULT_NEWS_QUERY.to_string();
        }

        // Each tier is independent: a provider rejection, a transport error,
        // and an empty result all mean "try the next tier".
        for topic in TOPIC_TIERS {
            match self.search.search(&query, topic).await {
                Ok(Some(result)) if !result.trim().is_empty() => {
                    info!(topic = %topic, "news search succeeded");
                    return Ok(result);
                }
                Ok(_) => {
                    warn!(topic = %topic, "news search yielded nothing, trying next tier");
                }
                Err(e) => {
                    warn!(topic = %topic, error = %e, "news search failed, trying next tier");
                }
            }
        }

        Ok(format!(
            "News search failed for \"{}\". Please try a different phrasing or verify the search API key.",
            query
        ))
    }
}

/// Tavily-backed search transport.
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: "https://api.tavily.com/search".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    topic: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

#[async_trait::async_trait]
impl NewsSearch for TavilyClient {
    async fn search(&self, query: &str, topic: Topic) -> Result<Option<String>> {
        let request = TavilyRequest {
            api_key: &self.api_key,
            query,
            topic: topic.as_str(),
            max_results: MAX_RESULTS,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::ProviderError(format!("Tavily request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ProviderError(format!(
                "Tavily returned {} for topic {}: {}",
                status, topic, body
            )));
        }

        let parsed: TavilyResponse = response
            .json()
            .await
            .map_err(|e| AgentError::ProviderError(format!("Invalid Tavily response: {}", e)))?;

        if parsed.results.is_empty() {
            return Ok(None);
        }

        let digest = parsed
            .results
            .iter()
            .map(|r| {
                if r.title.is_empty() {
                    r.content.clone()
                } else {
                    format!("{}: {}", r.title, r.content)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Some(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted transport: one outcome per topic tier, recording queries.
    struct TierStub {
        news: Result<Option<String>>,
        general: Result<Option<String>>,
        finance: Result<Option<String>>,
        seen_queries: Mutex<Vec<String>>,
    }

    impl TierStub {
        fn new(
            news: Result<Option<String>>,
            general: Result<Option<String>>,
            finance: Result<Option<String>>,
        ) -> Self {
            Self {
                news,
                general,
                finance,
                seen_queries: Mutex::new(Vec::new()),
            }
        }
    }

    fn clone_outcome(outcome: &Result<Option<String>>) -> Result<Option<String>> {
        match outcome {
            Ok(value) => Ok(value.clone()),
            Err(e) => Err(AgentError::ProviderError(e.to_string())),
        }
    }

    #[async_trait::async_trait]
    impl NewsSearch for TierStub {
        async fn search(&self, query: &str, topic: Topic) -> Result<Option<String>> {
            self.seen_queries.lock().unwrap().push(query.to_string());
            match topic {
                Topic::News => clone_outcome(&self.news),
                Topic::General => clone_outcome(&self.general),
                Topic::Finance => clone_outcome(&self.finance),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_news_tier_falls_back_to_general() {
        let stub = TierStub::new(
            Err(AgentError::ProviderError("Invalid topic".to_string())),
            Ok(Some("ETH gas is low".to_string())),
            Ok(None),
        );
        let provider = NewsProvider::new(Arc::new(stub), true);

        let result = provider.fetch_news("ethereum gas fees").await.unwrap();
        assert_eq!(result, "ETH gas is low");
    }

    #[tokio::test]
    async fn test_empty_tiers_fall_through_to_finance() {
        let stub = TierStub::new(
            Ok(None),
            Ok(Some("   ".to_string())),
            Ok(Some("finance tier result".to_string())),
        );
        let provider = NewsProvider::new(Arc::new(stub), true);

        let result = provider.fetch_news("bitcoin").await.unwrap();
        assert_eq!(result, "finance tier result");
    }

    #[tokio::test]
    async fn test_exhausted_tiers_return_failure_string_naming_query() {
        let stub = TierStub::new(
            Err(AgentError::ProviderError("boom".to_string())),
            Ok(None),
            Err(AgentError::ProviderError("boom again".to_string())),
        );
        let provider = NewsProvider::new(Arc::new(stub), true);

        let result = provider.fetch_news("dogecoin rally").await.unwrap();
        assert!(result.contains("\"dogecoin rally\""));
    }

    #[tokio::test]
    async fn test_query_is_normalized_and_defaulted() {
        let stub = Arc::new(TierStub::new(Ok(Some("ok".to_string())), Ok(None), Ok(None)));
        let provider = NewsProvider::new(stub.clone(), true);

        provider.fetch_news("  ethereum \n gas   fees ").await.unwrap();
        assert_eq!(
            stub.seen_queries.lock().unwrap().as_slice(),
            ["ethereum gas fees"]
        );

        provider.fetch_news("   ").await.unwrap();
        assert_eq!(
            stub.seen_queries.lock().unwrap().last().map(String::as_str),
            Some(DEFAULT_NEWS_QUERY)
        );
    }

    #[tokio::test]
    async fn test_missing_credential_is_fatal_for_this_adapter() {
        let stub = TierStub::new(Ok(Some("unreachable".to_string())), Ok(None), Ok(None));
        let provider = NewsProvider::new(Arc::new(stub), false);

        let result = provider.fetch_news("bitcoin").await;
        assert!(matches!(result, Err(AgentError::MissingCredential(_))));
    }
}
