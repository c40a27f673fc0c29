//! Entity extraction from normalized text
//!
//! Every extractor is total: a missing entity yields the configured default
//! (or the whole text), never an error.

use ahash::AHashSet;
use regex::Regex;

use crate::catalog::{Extractor, IntentRule};
use crate::types::{ParamValue, Params};

/// Pulls typed parameters out of an utterance for a matched rule
pub struct EntityExtractor {
    url: Regex,
}

impl EntityExtractor {
    pub fn new() -> Self {
        // Constant pattern - this should never fail
        let url = Regex::new(r"(?:https?://)?(?:www\.)?([a-zA-Z0-9.-]+\.[a-zA-Z]{2,})")
            .expect("Invalid regex pattern");
        Self { url }
    }

    /// Extract every parameter the rule declares
    pub fn extract(&self, rule: &IntentRule, text: &str) -> Params {
        let mut params = Params::new();
        for param in &rule.params {
            let value = self.extract_one(&param.extractor, text);
            tracing::trace!(intent = %rule.name, key = %param.key, value = %value, "Extracted parameter");
            params.insert(param.key.clone(), value);
        }
        params
    }

    pub fn extract_one(&self, extractor: &Extractor, text: &str) -> ParamValue {
        match extractor {
            Extractor::Strip {
                markers,
                stop_words,
                min_len,
                default,
            } => strip_markers(text, markers, stop_words, *min_len, default.as_deref()).into(),
            Extractor::City {
                markers,
                stop_words,
                default,
            } => extract_city(text, markers, stop_words, default).into(),
            Extractor::Host {
                markers,
                stop_words,
                default,
            } => self.extract_host(text, markers, stop_words, default).into(),
            Extractor::TokenAfter { anchor, default } => token_after(text, anchor)
                .unwrap_or(default)
                .to_string()
                .into(),
            Extractor::RestAfter {
                anchor,
                stop_words,
                default,
            } => rest_after(text, anchor, stop_words).unwrap_or_else(|| default.clone()).into(),
            Extractor::Choice { options, default } => choose_option(text, options)
                .unwrap_or(default)
                .to_string()
                .into(),
            Extractor::Fixed(value) => value.clone(),
        }
    }

    /// URL-shaped token first; otherwise the text with ping markers and
    /// stop words removed
    pub fn extract_host(
        &self,
        text: &str,
        markers: &[String],
        stop_words: &AHashSet<String>,
        default: &str,
    ) -> String {
        if let Some(host) = self.url.captures(text).and_then(|c| c.get(1)) {
            return host.as_str().to_string();
        }
        if !markers.iter().any(|m| text.contains(m.as_str())) {
            return default.to_string();
        }
        strip_markers(text, markers, stop_words, 1, Some(default))
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove marker phrases (in order) and stop words from the text.
///
/// Markers are plain substrings, so a marker that also occurs inside a
/// content word is removed from it too. Stop words are dropped token by
/// token. If no marker occurs at all, the whole text is returned. If less
/// than `min_len` characters survive, the default is returned, or the whole
/// text when there is no default.
pub fn strip_markers(
    text: &str,
    markers: &[String],
    stop_words: &AHashSet<String>,
    min_len: usize,
    default: Option<&str>,
) -> String {
    if !markers.iter().any(|m| text.contains(m.as_str())) {
        return text.to_string();
    }

    let mut remaining = text.to_string();
    for marker in markers {
        remaining = remaining.replace(marker.as_str(), "").trim().to_string();
    }
    let remaining = remaining
        .split_whitespace()
        .filter(|t| !stop_words.contains(*t))
        .collect::<Vec<_>>()
        .join(" ");

    if remaining.chars().count() < min_len {
        tracing::trace!(text, "Stripped text too short, using fallback");
        return default.unwrap_or(text).to_string();
    }
    remaining
}

/// Hindi possessive particles: "pune ka mausam" names the city before the marker
const POSSESSIVES: &[&str] = &["ka", "ki", "ke"];

/// City name near a weather marker.
///
/// Tokens after the first marker are scanned; the first token that is
/// neither a marker nor a stop word wins. Failing that, the possessive form
/// `<city> ka <marker>` is checked. Otherwise the default is returned.
pub fn extract_city(
    text: &str,
    markers: &AHashSet<String>,
    stop_words: &AHashSet<String>,
    default: &str,
) -> String {
    let tokens: Vec<&str> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c.is_ascii_punctuation() && c != '\'' && c != '-'))
        .filter(|t| !t.is_empty())
        .collect();
    let is_candidate = |t: &&str| !markers.contains(*t) && !stop_words.contains(*t);

    let Some(pos) = tokens.iter().position(|t| markers.contains(*t)) else {
        return default.to_string();
    };

    let after = tokens[pos + 1..].iter().find(|t| is_candidate(*t));
    let possessive = if pos >= 2 && POSSESSIVES.iter().any(|p| *p == tokens[pos - 1]) {
        Some(&tokens[pos - 2]).filter(|t| is_candidate(*t))
    } else {
        None
    };

    after
        .or(possessive)
        .map(|t| title_case(t))
        .unwrap_or_else(|| default.to_string())
}

/// Token immediately following `anchor`
pub fn token_after<'a>(text: &'a str, anchor: &str) -> Option<&'a str> {
    let mut tokens = text.split_whitespace();
    tokens.by_ref().find(|t| *t == anchor)?;
    tokens.next()
}

/// All tokens after `anchor`, minus stop words, joined with spaces
pub fn rest_after(text: &str, anchor: &str, stop_words: &AHashSet<String>) -> Option<String> {
    let mut tokens = text.split_whitespace();
    tokens.by_ref().find(|t| *t == anchor)?;
    let rest: Vec<&str> = tokens.filter(|t| !stop_words.contains(*t)).collect();
    if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    }
}

/// First option (in declared order) present in the text
pub fn choose_option<'a>(text: &str, options: &'a [String]) -> Option<&'a str> {
    let words: AHashSet<&str> = text.split_whitespace().collect();
    options
        .iter()
        .find(|o| {
            if o.contains(' ') {
                text.contains(o.as_str())
            } else {
                words.contains(o.as_str())
            }
        })
        .map(String::as_str)
}

fn title_case(word: &str) -> String {
    word.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn set(words: &[&str]) -> AHashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_search_query_strips_markers() {
        let markers = strings(&["search for", "google", "search"]);
        assert_eq!(
            strip_markers("search for python tutorials", &markers, &set(&[]), 2, None),
            "python tutorials"
        );
    }

    #[test]
    fn test_search_query_too_short_returns_original() {
        let markers = strings(&["search for", "search"]);
        assert_eq!(strip_markers("search for x", &markers, &set(&[]), 2, None), "search for x");
        assert_eq!(strip_markers("search", &markers, &set(&[]), 2, None), "search");
    }

    #[test]
    fn test_strip_without_marker_returns_whole_text() {
        let markers = strings(&["open"]);
        assert_eq!(strip_markers("tell me a joke", &markers, &set(&[]), 1, Some("")), "tell me a joke");
    }

    #[test]
    fn test_strip_substring_limitation() {
        // marker words inside content are removed too
        let markers = strings(&["search for", "google", "search"]);
        assert_eq!(
            strip_markers("how to search for google", &markers, &set(&[]), 2, None),
            "how to"
        );
    }

    #[test]
    fn test_app_name() {
        let markers = strings(&["open", "launch", "start"]);
        let stop = set(&["app", "application", "program"]);
        assert_eq!(strip_markers("open spotify app", &markers, &stop, 1, Some("")), "spotify");
        assert_eq!(strip_markers("open app", &markers, &stop, 1, Some("")), "");
        assert_eq!(
            strip_markers("launch the application store", &markers, &stop, 1, Some("")),
            "the store"
        );
    }

    #[test]
    fn test_adjacent_stop_words_all_removed() {
        let markers = strings(&["open", "launch", "start"]);
        let stop = set(&["app", "application", "program"]);
        assert_eq!(strip_markers("open app application", &markers, &stop, 1, Some("")), "");
        assert_eq!(
            strip_markers("launch program app notes", &markers, &stop, 1, Some("")),
            "notes"
        );
    }

    #[test]
    fn test_city() {
        let markers = set(&["weather", "mausam", "temperature"]);
        let stop = set(&["weather", "mausam", "in", "of", "get", "show", "ka"]);
        assert_eq!(extract_city("weather in mumbai", &markers, &stop, "Delhi"), "Mumbai");
        assert_eq!(extract_city("show weather", &markers, &stop, "Delhi"), "Delhi");
        assert_eq!(extract_city("pune ka mausam", &markers, &stop, "Delhi"), "Pune");
        assert_eq!(extract_city("weather of new-delhi", &markers, &stop, "Delhi"), "New-Delhi");
        assert_eq!(extract_city("weather", &markers, &stop, "Delhi"), "Delhi");
    }

    #[test]
    fn test_city_ignores_leading_filler() {
        let markers = set(&["weather", "mausam", "temperature"]);
        let stop = set(&["weather", "mausam", "in", "of", "get", "show", "the", "ka", "aaj"]);
        assert_eq!(extract_city("tell me the weather", &markers, &stop, "Delhi"), "Delhi");
        assert_eq!(extract_city("please show weather", &markers, &stop, "Delhi"), "Delhi");
        // possessive with a stop word is not a city
        assert_eq!(extract_city("aaj ka mausam", &markers, &stop, "Delhi"), "Delhi");
        assert_eq!(extract_city("mumbai", &markers, &stop, "Delhi"), "Delhi");
    }

    #[test]
    fn test_host() {
        let extractor = EntityExtractor::new();
        let markers = strings(&["test connection to", "ping", "check"]);
        let stop = set(&["website", "site", "server"]);
        assert_eq!(
            extractor.extract_host("ping google.com", &markers, &stop, "google.com"),
            "google.com"
        );
        assert_eq!(
            extractor.extract_host("ping https://www.example.org/path", &markers, &stop, "google.com"),
            "example.org"
        );
        assert_eq!(
            extractor.extract_host("ping my server", &markers, &stop, "google.com"),
            "my"
        );
        assert_eq!(
            extractor.extract_host("ping website", &markers, &stop, "google.com"),
            "google.com"
        );
        assert_eq!(
            extractor.extract_host("ping my website server", &markers, &stop, "google.com"),
            "my"
        );
    }

    #[test]
    fn test_token_after() {
        assert_eq!(token_after("join room alpha now", "room"), Some("alpha"));
        assert_eq!(token_after("join the room", "room"), None);
        assert_eq!(token_after("join livekit", "room"), None);
    }

    #[test]
    fn test_rest_after() {
        let stop = set(&["to", "wifi"]);
        assert_eq!(
            rest_after("connect to wifi home network", "connect", &stop),
            Some("home network".to_string())
        );
        assert_eq!(rest_after("wifi connect", "connect", &stop), None);
    }

    #[test]
    fn test_choose_option_order() {
        let options = strings(&["off", "on"]);
        assert_eq!(choose_option("turn light off", &options), Some("off"));
        assert_eq!(choose_option("light on", &options), Some("on"));
        assert_eq!(choose_option("dim the light", &options), None);

        let devices = strings(&["light", "air conditioner", "ac"]);
        assert_eq!(choose_option("switch off the air conditioner", &devices), Some("air conditioner"));
    }

    #[test]
    fn test_fixed_value() {
        let extractor = EntityExtractor::new();
        let value = extractor.extract_one(&Extractor::Fixed(ParamValue::Integer(1)), "complete task");
        assert_eq!(value, ParamValue::Integer(1));
    }
}
