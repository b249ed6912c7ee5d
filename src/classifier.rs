//! Intent classifier
//!
//! Classifies the latest message onto exactly one route:
//! - Search: news/market requests served by the news provider
//! - Utility: conversion/valuation requests served by the utility tools
//! - Answer: everything else, answered directly by the model

use crate::models::{ConversationState, Intent};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// News/market vocabulary, checked first.
    static ref NEWS_PATTERN: Regex =
        Regex::new(r"\b(news|latest|update|ethereum|eth|gas|bitcoin|crypto)\b")
            .expect("invalid news pattern");

    /// Conversion/valuation vocabulary.
    static ref UTILITY_PATTERN: Regex =
        Regex::new(r"\b(convert|emoji|transform|translate|price|how much)\b")
            .expect("invalid utility pattern");
}

/// Intent classifier
pub struct IntentClassifier;

impl IntentClassifier {
    /// Classify the latest message content. Deterministic given identical
    /// text; no side effects on the input state. No vocabulary match means
    /// the direct-answer route, not an error.
    pub fn classify(state: &ConversationState) -> Intent {
        let content = state.last_content().to_lowercase();

        if NEWS_PATTERN.is_match(&content) {
            Intent::Search
        } else if UTILITY_PATTERN.is_match(&content) {
            Intent::Utility
        } else {
            Intent::Answer
        }
    }
}
