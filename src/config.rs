//! Process configuration
//!
//! Every environment read happens here, once, at process start. Nodes and
//! adapters receive this struct explicitly through their constructors;
//! nothing reads ambient environment state at call time.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    /// Credential for the news search provider. Empty means unset; the news
    /// adapter treats that as a fatal precondition for its own invocation.
    pub tavily_api_key: String,

    /// Credential for the completion model. Empty means unset; the composer
    /// degrades to the apology path when the model call fails.
    pub gemini_api_key: String,

    /// When true, the price adapter skips the live quote lookup and serves
    /// the mock table directly.
    pub coingecko_disabled: bool,

    /// Optional prompt list for the CLI, newline separated. None falls back
    /// to the built-in demo prompts.
    pub prompts: Option<Vec<String>>,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            tavily_api_key: env::var("TAVILY_API_KEY").unwrap_or_default(),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            coingecko_disabled: flag_enabled(env::var("COINGECKO_DISABLED").ok().as_deref()),
            prompts: env::var("AGENT_PROMPTS")
                .ok()
                .map(|raw| parse_prompt_list(&raw))
                .filter(|prompts| !prompts.is_empty()),
        }
    }
}

fn flag_enabled(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

fn parse_prompt_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_enabled() {
        assert!(flag_enabled(Some("1")));
        assert!(flag_enabled(Some("true")));
        assert!(!flag_enabled(Some("0")));
        assert!(!flag_enabled(Some("yes")));
        assert!(!flag_enabled(None));
    }

    #[test]
    fn test_parse_prompt_list() {
        let prompts = parse_prompt_list("first prompt\n\n  second prompt  \n");
        assert_eq!(prompts, vec!["first prompt", "second prompt"]);

        assert!(parse_prompt_list("\n  \n").is_empty());
    }
}
