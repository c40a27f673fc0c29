//! Keyword-overlap scoring for the advisory confidence path
//!
//! Confidence is deliberately coarse: a pattern either matches (high),
//! shares a literal word with the text (medium), or does neither.

use ahash::AHashSet;
use unicode_segmentation::UnicodeSegmentation;

/// A catalog pattern matched the text
pub const EXACT_MATCH_CONFIDENCE: f64 = 0.9;
/// A pattern shares at least one literal word with the text
pub const WEAK_MATCH_CONFIDENCE: f64 = 0.6;
/// The intent is not in the catalog at all
pub const UNCATALOGUED_CONFIDENCE: f64 = 0.5;
/// Blank input
pub const UNKNOWN_CONFIDENCE: f64 = 0.0;

/// Scores in `[SUGGESTION_MIN, SUGGESTION_MAX)` are offered as alternatives
pub const SUGGESTION_MIN: f64 = 0.3;
pub const SUGGESTION_MAX: f64 = 0.8;
pub const MAX_SUGGESTIONS: usize = 3;

/// Shortest regex literal run treated as a word
const MIN_REGEX_TERM_LEN: usize = 3;

/// Lower-cased word set of `text`
pub fn word_set(text: &str) -> AHashSet<&str> {
    text.unicode_words().collect()
}

/// Literal words embedded in a regex source.
///
/// `\b(?:search|find) (?:me )?images?` yields `search`, `find`, `images`.
/// Runs shorter than three letters are dropped so escape letters and
/// fragments like `me` do not count.
pub fn pattern_terms(source: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut seen = AHashSet::new();

    // "\b" and friends would otherwise glue their letter onto the next word
    let stripped: String = strip_escapes(source);
    for run in stripped.split(|c: char| !c.is_alphabetic()) {
        if run.chars().count() >= MIN_REGEX_TERM_LEN {
            let term = run.to_lowercase();
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
    }
    terms
}

/// Individual words of keyword phrases
pub fn keyword_terms(keywords: &[String]) -> Vec<String> {
    let mut terms = Vec::new();
    let mut seen = AHashSet::new();
    for keyword in keywords {
        for word in keyword.unicode_words() {
            let term = word.to_lowercase();
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
    }
    terms
}

/// True if any term is one of the words
pub fn term_overlap(words: &AHashSet<&str>, terms: &[String]) -> bool {
    terms.iter().any(|t| words.contains(t.as_str()))
}

fn strip_escapes(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}
