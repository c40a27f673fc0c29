//! Language detection for Hindi, English and code-mixed Hinglish
//!
//! Scores an utterance on three axes and picks a label. The result is
//! side information for response styling; it never gates intent matching.

use std::fmt;

use ahash::AHashSet;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::CatalogError;

/// Detected language label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hindi,
    English,
    Hinglish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hindi => "hindi",
            Self::English => "english",
            Self::Hinglish => "hinglish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted per-language scores for one utterance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LanguageScore {
    pub hindi: u32,
    pub english: u32,
    pub hinglish: u32,
}

impl LanguageScore {
    /// Pick a label.
    ///
    /// Any Hinglish marker alongside Hindi or English evidence wins outright.
    /// Ties, including the all-zero score of empty input, resolve to Hinglish.
    pub fn label(&self) -> Language {
        if self.hinglish > 0 && (self.hindi > 0 || self.english > 0) {
            Language::Hinglish
        } else if self.hindi > self.english {
            Language::Hindi
        } else if self.english > self.hindi {
            Language::English
        } else {
            Language::Hinglish
        }
    }
}

const DEVANAGARI_WEIGHT: u32 = 2;
const HINDI_WORD_WEIGHT: u32 = 3;
const ENGLISH_WORD_WEIGHT: u32 = 2;
const HINGLISH_MARKER_WEIGHT: u32 = 4;

const HINDI_WORDS: &[&str] = &[
    "नमस्कार", "नमस्ते", "हैलो", "कैसे", "हो", "क्या", "है", "कर", "सकते", "हैं",
    "मैं", "आप", "तुम", "यह", "वह", "कहाँ", "कब", "क्यों", "जो",
    "और", "या", "लेकिन", "अगर", "तो", "भी", "नहीं", "हाँ", "जी", "सर",
    "समय", "दिन", "रात", "सुबह", "शाम", "आज", "कल", "परसों", "अभी",
    "गूगल", "सर्च", "खोजो", "बताओ", "दिखाओ", "चेक", "करो", "देखो",
    "इंटरनेट", "नेटवर्क", "कनेक्शन", "स्पीड", "टेस्ट", "जानकारी", "मदद",
];

const ENGLISH_WORDS: &[&str] = &[
    "hello", "hi", "hey", "what", "how", "when", "where", "why", "who",
    "can", "could", "would", "should", "will", "do", "does", "did",
    "time", "date", "today", "tomorrow", "yesterday", "now", "later",
    "search", "google", "find", "show", "tell", "check", "test", "help",
];

const HINGLISH_PATTERNS: &[&str] = &[
    r"\b(kar|karo|karna|kiye|kiya|hai|hain|ho|hoon|hun)\b",
    r"\b(aur|ya|lekin|agar|to|bhi|nahi|haan|ji)\b",
    r"\b(kya|kaise|kahan|kab|kyun|jo|yeh|voh)\b",
    r"\b(google|search|internet|network|time|check)\b.*\b(kar|karo|hai)\b",
];

/// Vocabulary and marker tables used by the detector.
///
/// Can be supplied through the `[language]` table of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageLexicon {
    pub hindi_words: Vec<String>,
    pub english_words: Vec<String>,
    pub hinglish_patterns: Vec<String>,
}

impl Default for LanguageLexicon {
    fn default() -> Self {
        let owned = |words: &[&str]| -> Vec<String> { words.iter().map(|w| w.to_string()).collect() };
        Self {
            hindi_words: owned(HINDI_WORDS),
            english_words: owned(ENGLISH_WORDS),
            hinglish_patterns: owned(HINGLISH_PATTERNS),
        }
    }
}

/// Scores text as Hindi, English or Hinglish
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    hindi_words: AHashSet<String>,
    english_words: AHashSet<String>,
    hinglish_markers: Vec<Regex>,
}

impl LanguageDetector {
    pub fn new() -> Self {
        // Built-in patterns are constants; they always compile
        Self::from_lexicon(&LanguageLexicon::default()).expect("Invalid built-in lexicon")
    }

    pub fn from_lexicon(lexicon: &LanguageLexicon) -> Result<Self, CatalogError> {
        let hinglish_markers = lexicon
            .hinglish_patterns
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| CatalogError::InvalidPattern {
                        intent: "language".to_string(),
                        pattern: p.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let lowered = |words: &[String]| -> AHashSet<String> {
            words.iter().map(|w| w.to_lowercase()).collect()
        };
        Ok(Self {
            hindi_words: lowered(&lexicon.hindi_words),
            english_words: lowered(&lexicon.english_words),
            hinglish_markers,
        })
    }

    /// Compute the weighted scores for `text`
    pub fn score(&self, text: &str) -> LanguageScore {
        let lower = text.to_lowercase();
        let words: AHashSet<&str> = lower.unicode_words().collect();

        let hindi_chars = lower.chars().filter(|c| is_devanagari(*c)).count() as u32;
        let hindi_word_count = count_vocabulary(&self.hindi_words, &words, &lower);
        let english_word_count = count_vocabulary(&self.english_words, &words, &lower);
        let hinglish_pattern_count = self
            .hinglish_markers
            .iter()
            .filter(|re| re.is_match(&lower))
            .count() as u32;

        LanguageScore {
            hindi: DEVANAGARI_WEIGHT * hindi_chars + HINDI_WORD_WEIGHT * hindi_word_count,
            english: ENGLISH_WORD_WEIGHT * english_word_count,
            hinglish: HINGLISH_MARKER_WEIGHT * hinglish_pattern_count,
        }
    }

    /// Detect the language of `text`. Empty input is Hinglish (tie-break).
    pub fn detect(&self, text: &str) -> Language {
        self.score(text).label()
    }
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Number of distinct vocabulary terms present in the text
fn count_vocabulary(vocabulary: &AHashSet<String>, words: &AHashSet<&str>, text: &str) -> u32 {
    vocabulary
        .iter()
        .filter(|term| {
            if term.contains(' ') {
                text.contains(term.as_str())
            } else {
                words.contains(term.as_str())
            }
        })
        .count() as u32
}
