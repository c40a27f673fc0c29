//! Core data types for resolution results

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Intent returned for null or blank input
pub const UNKNOWN_INTENT: &str = "unknown";

/// A single extracted parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Intent parameters, keyed by parameter name
pub type Params = BTreeMap<String, ParamValue>;

/// How the resolver arrived at an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// A catalog rule matched
    Rule,
    /// No rule matched, but the text reads like a question
    QuestionFallback,
    /// No rule matched, but the text carries a search verb
    SearchFallback,
    /// Nothing matched; open-ended chat
    ChatFallback,
    /// Input was empty or whitespace-only
    Blank,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::QuestionFallback => "question_fallback",
            Self::SearchFallback => "search_fallback",
            Self::ChatFallback => "chat_fallback",
            Self::Blank => "blank",
        }
    }
}

/// Output of a single resolution call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub intent: String,
    pub params: Params,
    /// Detected language, used for response styling only
    pub language: Option<Language>,
    /// Advisory score in [0, 1]
    pub confidence: Option<f64>,
    pub source: MatchSource,
}

impl ParsedCommand {
    pub fn new(intent: String, params: Params, source: MatchSource) -> Self {
        Self {
            intent,
            params,
            language: None,
            confidence: None,
            source,
        }
    }

    /// The command produced for blank input
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_INTENT.to_string(), Params::new(), MatchSource::Blank)
    }

    pub fn is_unknown(&self) -> bool {
        self.intent == UNKNOWN_INTENT
    }

    /// Text value of a parameter, if present and textual
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(ParamValue::as_str)
    }
}
