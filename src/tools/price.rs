//! Price provider adapter
//!
//! Alias resolution plus a live quote lookup with a static mock fallback.
//! Every failure path resolves to a string result: live price, mock price,
//! or the not-available sentinel. The concrete adapter never surfaces an
//! error.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::tools::PriceAdapter;
use crate::Result;
use lazy_static::lazy_static;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Sentinel for identifiers absent from both the live source and the mock
/// table.
pub const PRICE_UNAVAILABLE: &str = "Price not available (mock)";

lazy_static! {
    /// Alias → canonical asset identifier. Unknown aliases pass through
    /// unchanged as the identifier.
    static ref ASSET_ALIASES: HashMap<&'static str, &'static str> = HashMap::from([
        ("bitcoin", "bitcoin"),
        ("btc", "bitcoin"),
        ("ethereum", "ethereum"),
        ("eth", "ethereum"),
        ("dogecoin", "dogecoin"),
        ("doge", "dogecoin"),
    ]);

    /// Last-resort quotes for when the live lookup is disabled or dry.
    static ref MOCK_PRICES: HashMap<&'static str, &'static str> = HashMap::from([
        ("bitcoin", "$30,000"),
        ("ethereum", "$1,800"),
        ("dogecoin", "$0.06"),
    ]);
}

/// Raw quote capability behind the adapter.
#[async_trait::async_trait]
pub trait QuoteSource: Send + Sync {
    /// USD quote for a canonical identifier; `Ok(None)` when the source has
    /// no data for it.
    async fn usd_quote(&self, id: &str) -> Result<Option<f64>>;
}

pub struct PriceProvider {
    quotes: Arc<dyn QuoteSource>,
    live_disabled: bool,
}

impl PriceProvider {
    pub fn new(quotes: Arc<dyn QuoteSource>, live_disabled: bool) -> Self {
        Self {
            quotes,
            live_disabled,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(Arc::new(CoinGeckoClient::new()), config.coingecko_disabled)
    }
}

#[async_trait::async_trait]
impl PriceAdapter for PriceProvider {
    async fn fetch_price(&self, token: &str) -> Result<String> {
        let key = token.trim().to_lowercase();
        let id = ASSET_ALIASES
            .get(key.as_str())
            .copied()
            .unwrap_or(key.as_str());

        if self.live_disabled {
            info!(id, "live quote lookup disabled by configuration");
        } else {
            match self.quotes.usd_quote(id).await {
                Ok(Some(price)) => {
                    let formatted = format_usd(price);
                    info!(id, price = %formatted, "live quote");
                    return Ok(formatted);
                }
                Ok(None) => {
                    warn!(id, "no live quote, falling back to mock table");
                }
                Err(e) => {
                    warn!(id, error = %e, "quote lookup failed, falling back to mock table");
                }
            }
        }

        let mock = MOCK_PRICES
            .get(id)
            .or_else(|| MOCK_PRICES.get(key.as_str()))
            .copied()
            .unwrap_or(PRICE_UNAVAILABLE);

        info!(id, price = mock, "mock price");
        Ok(mock.to_string())
    }
}

/// Currency formatting with thousands separators: 30000.0 → "$30,000",
/// 1800.25 → "$1,800.25", 0.06 → "$0.06".
fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), ""),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        format!("${}", grouped)
    } else {
        format!("${}.{}", grouped, frac)
    }
}

/// CoinGecko-backed quote transport.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
        }
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl QuoteSource for CoinGeckoClient {
    async fn usd_quote(&self, id: &str) -> Result<Option<f64>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("ids", id), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| AgentError::ProviderError(format!("CoinGecko request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(id, status = %response.status(), "CoinGecko returned non-success status");
            return Ok(None);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::ProviderError(format!("Invalid CoinGecko response: {}", e)))?;

        Ok(body.get(id).and_then(|v| v.get("usd")).and_then(Value::as_f64))
    }
}
