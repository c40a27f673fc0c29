//! Intent resolver - utterance in, `ParsedCommand` out
//!
//! Normalizes the text, detects its language (metadata only), walks the
//! catalog, and runs the extractors of whichever intent was chosen. The
//! resolver holds no mutable state, so a single instance can be shared
//! across threads.

use crate::catalog::IntentCatalog;
use crate::entities::EntityExtractor;
use crate::error::CatalogError;
use crate::language::Language;
use crate::matcher::match_intent;
use crate::normalize::normalize;
use crate::similarity::{
    word_set, EXACT_MATCH_CONFIDENCE, MAX_SUGGESTIONS, SUGGESTION_MAX, SUGGESTION_MIN,
    UNCATALOGUED_CONFIDENCE, UNKNOWN_CONFIDENCE, WEAK_MATCH_CONFIDENCE,
};
use crate::types::{ParsedCommand, Params, UNKNOWN_INTENT};

pub struct IntentResolver {
    catalog: IntentCatalog,
    extractor: EntityExtractor,
}

impl IntentResolver {
    pub fn new(catalog: IntentCatalog) -> Self {
        Self {
            catalog,
            extractor: EntityExtractor::new(),
        }
    }

    /// Resolver over the built-in catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Ok(Self::new(IntentCatalog::builtin()?))
    }

    pub fn catalog(&self) -> &IntentCatalog {
        &self.catalog
    }

    /// Resolve raw user text into an intent and its parameters.
    ///
    /// Never fails: blank input gives `unknown`, unmatched input goes
    /// through the search/chat fallback, and missing entities get defaults.
    pub fn resolve(&self, raw: &str) -> ParsedCommand {
        let text = normalize(raw);
        if text.is_empty() {
            tracing::debug!("Blank input, resolving to unknown");
            return ParsedCommand::unknown();
        }

        let language = self.catalog.detector().detect(&text);
        let matched = match_intent(&text, &self.catalog);
        let intent = matched.intent_name();

        let params = self
            .catalog
            .rule(intent)
            .map(|rule| self.extractor.extract(rule, &text))
            .unwrap_or_default();

        let confidence = self.score(&text, intent);

        tracing::debug!(
            intent,
            source = ?matched.source(),
            language = %language,
            confidence,
            "Resolved utterance"
        );

        ParsedCommand {
            intent: intent.to_string(),
            params,
            language: Some(language),
            confidence: Some(confidence),
            source: matched.source(),
        }
    }

    /// Detected language of the raw text
    pub fn detect_language(&self, raw: &str) -> Language {
        self.catalog.detector().detect(raw)
    }

    /// Advisory confidence that `intent` fits `text`.
    ///
    /// 0.0 for `unknown`, 0.5 for intents outside the catalog, otherwise the
    /// best of 0.9 (a pattern matches) and 0.6 (a pattern shares a word).
    pub fn confidence(&self, raw: &str, intent: &str) -> f64 {
        self.score(&normalize(raw), intent)
    }

    /// Up to three intents with a medium score, in catalog order.
    ///
    /// Advisory only; `resolve` does not consult it.
    pub fn suggest_alternatives(&self, raw: &str) -> Vec<String> {
        let text = normalize(raw);
        if text.is_empty() {
            return Vec::new();
        }

        self.catalog
            .intent_names()
            .filter(|name| {
                let score = self.score(&text, name);
                (SUGGESTION_MIN..SUGGESTION_MAX).contains(&score)
            })
            .take(MAX_SUGGESTIONS)
            .map(str::to_string)
            .collect()
    }

    /// Extract parameters for a known intent, bypassing matching
    pub fn extract_params(&self, raw: &str, intent: &str) -> Params {
        let text = normalize(raw);
        self.catalog
            .rule(intent)
            .map(|rule| self.extractor.extract(rule, &text))
            .unwrap_or_default()
    }

    fn score(&self, text: &str, intent: &str) -> f64 {
        if intent == UNKNOWN_INTENT {
            return UNKNOWN_CONFIDENCE;
        }
        let Some(rule) = self.catalog.rule(intent) else {
            return UNCATALOGUED_CONFIDENCE;
        };

        let words = word_set(text);
        rule.patterns.iter().fold(0.0, |best: f64, pattern| {
            if pattern.is_match(text) {
                best.max(EXACT_MATCH_CONFIDENCE)
            } else if pattern.overlaps(&words) {
                best.max(WEAK_MATCH_CONFIDENCE)
            } else {
                best
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MatchSource, ParamValue};
    use proptest::prelude::*;

    fn resolver() -> IntentResolver {
        IntentResolver::builtin().unwrap()
    }

    #[test]
    fn test_blank_is_unknown() {
        let r = resolver();
        for input in ["", "   ", "\t\n", "?!"] {
            let cmd = r.resolve(input);
            assert_eq!(cmd.intent, "unknown");
            assert!(cmd.params.is_empty());
            assert_eq!(cmd.source, MatchSource::Blank);
        }
    }

    #[test]
    fn test_ping() {
        let cmd = resolver().resolve("ping google.com");
        assert_eq!(cmd.intent, "ping_website");
        assert_eq!(cmd.param_str("host"), Some("google.com"));
        assert_eq!(cmd.params.len(), 1);
    }

    #[test]
    fn test_weather() {
        let cmd = resolver().resolve("weather in Mumbai");
        assert_eq!(cmd.intent, "get_weather");
        assert_eq!(cmd.param_str("city"), Some("Mumbai"));
    }

    #[test]
    fn test_weather_default_city() {
        let cmd = resolver().resolve("aaj ka mausam kaisa hai?");
        assert_eq!(cmd.intent, "get_weather");
        assert_eq!(cmd.param_str("city"), Some("Delhi"));
    }

    #[test]
    fn test_search_query() {
        let cmd = resolver().resolve("search for python tutorials");
        assert_eq!(cmd.intent, "google_search");
        assert_eq!(cmd.param_str("query"), Some("python tutorials"));
        assert_eq!(cmd.source, MatchSource::Rule);
    }

    #[test]
    fn test_detailed_search_before_google() {
        let cmd = resolver().resolve("Detailed search for black holes");
        assert_eq!(cmd.intent, "detailed_search");
        assert_eq!(cmd.param_str("query"), Some("black holes"));
    }

    #[test]
    fn test_chat_fallback() {
        let cmd = resolver().resolve("mujhe kuch samajh nahi aa raha");
        assert_eq!(cmd.intent, "chat_ai");
        assert_eq!(cmd.source, MatchSource::ChatFallback);
        assert_eq!(cmd.param_str("message"), Some("mujhe kuch samajh nahi aa raha"));
    }

    #[test]
    fn test_question_fallback() {
        let cmd = resolver().resolve("Why do cats purr?");
        assert_eq!(cmd.intent, "google_search");
        assert_eq!(cmd.source, MatchSource::QuestionFallback);
        assert_eq!(cmd.param_str("query"), Some("why do cats purr"));
    }

    #[test]
    fn test_connect_room() {
        let r = resolver();
        let cmd = r.resolve("join room standup");
        assert_eq!(cmd.intent, "connect_room");
        assert_eq!(cmd.param_str("room"), Some("standup"));
        assert_eq!(cmd.param_str("participant"), Some("jarvis"));

        let cmd = r.resolve("connect to the room");
        assert_eq!(cmd.param_str("room"), Some("jarvis-room"));
    }

    #[test]
    fn test_open_app() {
        let r = resolver();
        let cmd = r.resolve("Open Spotify app");
        assert_eq!(cmd.intent, "open_app");
        assert_eq!(cmd.param_str("app"), Some("spotify"));

        let cmd = r.resolve("launch application");
        assert_eq!(cmd.intent, "open_app");
        assert_eq!(cmd.param_str("app"), Some(""));
    }

    #[test]
    fn test_launch_words_inside_questions_are_not_apps() {
        let r = resolver();
        assert_eq!(r.resolve("what is open source").intent, "google_search");
        assert_eq!(r.resolve("how to start a business").intent, "google_search");
        assert_eq!(r.resolve("please open the notes app").intent, "open_app");
    }

    #[test]
    fn test_adjacent_stop_words_in_params() {
        let r = resolver();
        let cmd = r.resolve("open app application");
        assert_eq!(cmd.intent, "open_app");
        assert_eq!(cmd.param_str("app"), Some(""));

        let cmd = r.resolve("ping my website server");
        assert_eq!(cmd.intent, "ping_website");
        assert_eq!(cmd.param_str("host"), Some("my"));
    }

    #[test]
    fn test_weather_filler_is_not_a_city() {
        let r = resolver();
        for text in ["tell me the weather", "please show weather"] {
            let cmd = r.resolve(text);
            assert_eq!(cmd.intent, "get_weather");
            assert_eq!(cmd.param_str("city"), Some("Delhi"));
        }
        assert_eq!(r.resolve("pune ka mausam").param_str("city"), Some("Pune"));
    }

    #[test]
    fn test_open_file() {
        let cmd = resolver().resolve("open file report.pdf");
        assert_eq!(cmd.intent, "open_file");
        assert_eq!(cmd.param_str("path"), Some("report.pdf"));
    }

    #[test]
    fn test_fixed_params() {
        let cmd = resolver().resolve("add expense for lunch");
        assert_eq!(cmd.intent, "add_expense");
        assert_eq!(cmd.params.get("amount"), Some(&ParamValue::Integer(100)));
        assert_eq!(cmd.param_str("category"), Some("general"));
    }

    #[test]
    fn test_device_control() {
        let cmd = resolver().resolve("fan off please");
        assert_eq!(cmd.intent, "control_device");
        assert_eq!(cmd.param_str("device_name"), Some("fan"));
        assert_eq!(cmd.param_str("action"), Some("off"));
    }

    #[test]
    fn test_params_only_for_intent() {
        let cmd = resolver().resolve("take a screenshot");
        assert_eq!(cmd.intent, "take_screenshot");
        assert!(cmd.params.is_empty());
    }

    #[test]
    fn test_language_attached_not_used_for_matching() {
        let r = resolver();
        let cmd = r.resolve("internet check karo");
        assert_eq!(cmd.intent, "check_internet");
        assert_eq!(cmd.language, Some(Language::Hinglish));

        let cmd = r.resolve("check internet status");
        assert_eq!(cmd.intent, "check_internet");
        assert_eq!(cmd.language, Some(Language::English));
    }

    #[test]
    fn test_hindi_script_command() {
        let cmd = resolver().resolve("इंटरनेट चेक करो");
        assert_eq!(cmd.intent, "check_internet");
        assert_eq!(cmd.language, Some(Language::Hindi));
    }

    #[test]
    fn test_confidence_levels() {
        let r = resolver();
        assert_eq!(r.confidence("anything", "unknown"), 0.0);
        assert_eq!(r.confidence("anything", "launch_rocket"), 0.5);
        assert_eq!(r.confidence("ping google.com", "ping_website"), 0.9);
        // shares "weather" with no pattern matching
        assert_eq!(r.confidence("weatherman", "get_weather"), 0.0);
        assert_eq!(r.confidence("show images", "video_search"), 0.6);
        assert_eq!(r.resolve("ping google.com").confidence, Some(0.9));
    }

    #[test]
    fn test_suggest_alternatives() {
        let catalog = IntentCatalog::from_toml_str(
            r#"
            [[intent]]
            name = "play_music"
            patterns = [{ keywords = ["play music"] }]

            [[intent]]
            name = "music_video"
            patterns = [{ keywords = ["music video"] }]

            [[intent]]
            name = "get_weather"
            patterns = [{ keywords = ["weather"] }]
            "#,
        )
        .unwrap();
        let r = IntentResolver::new(catalog);
        assert_eq!(r.resolve("play music now").intent, "play_music");
        assert_eq!(r.suggest_alternatives("play music now"), vec!["music_video"]);
        assert!(r.suggest_alternatives("").is_empty());
    }

    #[test]
    fn test_builtin_suggestions_are_medium_confidence() {
        let r = resolver();
        let text = "show images of cats";
        let resolved = r.resolve(text).intent;
        let suggestions = r.suggest_alternatives(text);
        assert!(suggestions.len() <= 3);
        assert!(!suggestions.contains(&resolved));
        for intent in &suggestions {
            let score = r.confidence(text, intent);
            assert!((0.3..0.8).contains(&score));
        }
    }

    #[test]
    fn test_extract_params_directly() {
        let params = resolver().extract_params("ping example.org", "ping_website");
        assert_eq!(params.get("host"), Some(&ParamValue::Text("example.org".to_string())));
    }

    #[test]
    fn test_resolver_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IntentResolver>();
    }

    proptest! {
        #[test]
        fn prop_whitespace_is_unknown(s in "[ \t\r\n]{0,16}") {
            let cmd = resolver().resolve(&s);
            prop_assert_eq!(cmd.intent, "unknown");
            prop_assert!(cmd.params.is_empty());
        }

        #[test]
        fn prop_unmatched_question_is_search(
            marker in prop::sample::select(vec!["why", "where", "when", "kyun", "kahan"]),
            tail in "(zorp|blarg|quux)( (zorp|blarg|quux)){0,3}",
        ) {
            let text = format!("{} {}", marker, tail);
            let cmd = resolver().resolve(&text);
            prop_assert_eq!(cmd.intent, "google_search");
        }
    }
}
