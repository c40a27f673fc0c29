//! Intent matcher - first-match walk over the ordered catalog

use crate::catalog::{IntentCatalog, IntentRule};
use crate::types::MatchSource;

/// Outcome of matching one normalized utterance
#[derive(Debug, Clone, Copy)]
pub enum IntentMatch<'a> {
    /// A catalog rule matched
    Rule(&'a IntentRule),
    /// Nothing matched; the fallback policy chose an intent
    Fallback { intent: &'a str, source: MatchSource },
}

impl<'a> IntentMatch<'a> {
    pub fn intent_name(&self) -> &'a str {
        match *self {
            Self::Rule(rule) => &rule.name,
            Self::Fallback { intent, .. } => intent,
        }
    }

    pub fn source(&self) -> MatchSource {
        match self {
            Self::Rule(_) => MatchSource::Rule,
            Self::Fallback { source, .. } => *source,
        }
    }
}

/// First rule, in declaration order, with any matching pattern.
///
/// Specificity is ignored: if two rules match, the earlier one wins.
pub fn match_rule<'a>(text: &str, rules: &'a [IntentRule]) -> Option<&'a IntentRule> {
    rules.iter().find(|rule| rule.matches(text))
}

/// Match against the catalog, falling back when no rule matches.
///
/// Fallback is two-tier: question-like text (or text with a search verb)
/// becomes a search; anything else becomes open-ended chat.
pub fn match_intent<'a>(text: &str, catalog: &'a IntentCatalog) -> IntentMatch<'a> {
    if let Some(rule) = match_rule(text, catalog.rules()) {
        return IntentMatch::Rule(rule);
    }

    let fallback = catalog.fallback();
    if fallback.is_question(text) {
        IntentMatch::Fallback {
            intent: &fallback.search_intent,
            source: MatchSource::QuestionFallback,
        }
    } else if fallback.has_search_verb(text) {
        IntentMatch::Fallback {
            intent: &fallback.search_intent,
            source: MatchSource::SearchFallback,
        }
    } else {
        IntentMatch::Fallback {
            intent: &fallback.chat_intent,
            source: MatchSource::ChatFallback,
        }
    }
}
