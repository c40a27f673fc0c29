//! Intent catalog - ordered rule table loaded from TOML
//!
//! The catalog is plain configuration data: intent names, their patterns,
//! the parameters each intent extracts, and the fallback policy used when
//! nothing matches. It is compiled once (regexes built, names validated)
//! and then shared read-only by the resolver.

use std::path::Path;

use ahash::{AHashMap, AHashSet};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::language::{LanguageDetector, LanguageLexicon};
use crate::similarity::{keyword_terms, pattern_terms, term_overlap};
use crate::types::ParamValue;

const BUILTIN_CATALOG: &str = include_str!("../catalog/intents.toml");

/// Raw catalog document, as written in TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSpec {
    #[serde(default)]
    pub fallback: FallbackSpec,
    #[serde(default, rename = "intent")]
    pub intents: Vec<RuleSpec>,
    #[serde(default)]
    pub language: Option<LanguageLexicon>,
}

/// What to return when no rule matches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackSpec {
    pub search_intent: String,
    pub chat_intent: String,
    pub question_markers: Vec<String>,
    pub search_markers: Vec<String>,
}

impl Default for FallbackSpec {
    fn default() -> Self {
        let owned = |words: &[&str]| -> Vec<String> { words.iter().map(|w| w.to_string()).collect() };
        Self {
            search_intent: "google_search".to_string(),
            chat_intent: "chat_ai".to_string(),
            question_markers: owned(&[
                "what", "how", "why", "when", "where", "who", "kya", "kaise", "kyun", "kab", "kahan",
                "kaun",
            ]),
            search_markers: owned(&["search", "find", "lookup", "google"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<PatternSpec>,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternSpec {
    Regex { regex: String },
    Keywords { keywords: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Remove marker phrases and stop words, keep the rest
    Strip,
    /// First non-stop token near a weather marker, title-cased
    City,
    /// URL-shaped token, else the stripped remainder
    Host,
    /// Token right after an anchor token
    TokenAfter,
    /// Every token after an anchor token
    RestAfter,
    /// First listed option present in the text
    Choice,
    /// Constant value
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub key: String,
    pub kind: ExtractorKind,
    #[serde(default)]
    pub markers: Vec<String>,
    /// Single tokens, dropped wherever they occur
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub min_len: Option<usize>,
    #[serde(default)]
    pub value: Option<ParamValue>,
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct RulePattern {
    regex: Regex,
    terms: Vec<String>,
}

impl RulePattern {
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Whether any literal term of the pattern appears among `words`
    pub fn overlaps(&self, words: &AHashSet<&str>) -> bool {
        term_overlap(words, &self.terms)
    }
}

/// Compiled parameter extractor
#[derive(Debug, Clone)]
pub enum Extractor {
    Strip {
        markers: Vec<String>,
        stop_words: AHashSet<String>,
        min_len: usize,
        default: Option<String>,
    },
    City {
        markers: AHashSet<String>,
        stop_words: AHashSet<String>,
        default: String,
    },
    Host {
        markers: Vec<String>,
        stop_words: AHashSet<String>,
        default: String,
    },
    TokenAfter {
        anchor: String,
        default: String,
    },
    RestAfter {
        anchor: String,
        stop_words: AHashSet<String>,
        default: String,
    },
    Choice {
        options: Vec<String>,
        default: String,
    },
    Fixed(ParamValue),
}

#[derive(Debug, Clone)]
pub struct ParamRule {
    pub key: String,
    pub extractor: Extractor,
}

/// One catalog entry: an intent, its patterns, and its parameter extractors
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub name: String,
    pub patterns: Vec<RulePattern>,
    pub params: Vec<ParamRule>,
}

impl IntentRule {
    /// True if any pattern matches the normalized text
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Compiled fallback policy
#[derive(Debug, Clone)]
pub struct Fallback {
    pub search_intent: String,
    pub chat_intent: String,
    question_markers: Option<Regex>,
    search_markers: Option<Regex>,
}

impl Fallback {
    pub fn is_question(&self, text: &str) -> bool {
        self.question_markers.as_ref().is_some_and(|re| re.is_match(text))
    }

    pub fn has_search_verb(&self, text: &str) -> bool {
        self.search_markers.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Validated, compiled intent catalog
#[derive(Debug, Clone)]
pub struct IntentCatalog {
    rules: Vec<IntentRule>,
    index: AHashMap<String, usize>,
    fallback: Fallback,
    detector: LanguageDetector,
}

impl IntentCatalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let spec: CatalogSpec = toml::from_str(source)?;
        Self::compile(spec)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), rules = catalog.len(), "Loaded intent catalog");
        Ok(catalog)
    }

    /// Validate and compile a catalog document
    pub fn compile(spec: CatalogSpec) -> Result<Self, CatalogError> {
        if spec.intents.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut rules = Vec::with_capacity(spec.intents.len());
        let mut index = AHashMap::with_capacity(spec.intents.len());

        for rule_spec in spec.intents {
            if index.contains_key(&rule_spec.name) {
                return Err(CatalogError::DuplicateIntent(rule_spec.name));
            }
            let rule = compile_rule(rule_spec)?;
            index.insert(rule.name.clone(), rules.len());
            rules.push(rule);
        }

        let fallback = compile_fallback(spec.fallback)?;
        let detector = match &spec.language {
            Some(lexicon) => LanguageDetector::from_lexicon(lexicon)?,
            None => LanguageDetector::new(),
        };

        tracing::info!(rules = rules.len(), "Compiled intent catalog");

        Ok(Self {
            rules,
            index,
            fallback,
            detector,
        })
    }

    /// Rules in declaration order
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&IntentRule> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn intent_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name.as_str())
    }

    pub fn fallback(&self) -> &Fallback {
        &self.fallback
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_rule(spec: RuleSpec) -> Result<IntentRule, CatalogError> {
    if spec.patterns.is_empty() {
        return Err(CatalogError::EmptyPattern { intent: spec.name });
    }

    let mut patterns = Vec::with_capacity(spec.patterns.len());
    for pattern in &spec.patterns {
        patterns.push(compile_pattern(&spec.name, pattern)?);
    }

    let params = spec
        .params
        .into_iter()
        .map(|p| compile_param(&spec.name, p))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(IntentRule {
        name: spec.name,
        patterns,
        params,
    })
}

fn compile_pattern(intent: &str, spec: &PatternSpec) -> Result<RulePattern, CatalogError> {
    match spec {
        PatternSpec::Regex { regex } => {
            if regex.trim().is_empty() {
                return Err(CatalogError::EmptyPattern {
                    intent: intent.to_string(),
                });
            }
            Ok(RulePattern {
                regex: build_regex(intent, regex)?,
                terms: pattern_terms(regex),
            })
        }
        PatternSpec::Keywords { keywords } => {
            let regex = keyword_regex(intent, keywords)?.ok_or_else(|| CatalogError::EmptyPattern {
                intent: intent.to_string(),
            })?;
            Ok(RulePattern {
                regex,
                terms: keyword_terms(keywords),
            })
        }
    }
}

fn compile_param(intent: &str, spec: ParamSpec) -> Result<ParamRule, CatalogError> {
    let missing = |field: &'static str| CatalogError::MissingField {
        intent: intent.to_string(),
        key: spec.key.clone(),
        field,
    };
    let lowered = |words: &[String]| -> Vec<String> {
        words
            .iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !w.trim().is_empty())
            .collect()
    };
    let word_set = |words: &[String]| -> AHashSet<String> { lowered(words).into_iter().collect() };

    let extractor = match spec.kind {
        ExtractorKind::Strip => Extractor::Strip {
            markers: lowered(&spec.markers),
            stop_words: word_set(&spec.stop_words),
            min_len: spec.min_len.unwrap_or(1),
            default: spec.default.clone(),
        },
        ExtractorKind::City => Extractor::City {
            markers: word_set(&spec.markers),
            stop_words: word_set(&spec.stop_words),
            default: spec.default.clone().unwrap_or_default(),
        },
        ExtractorKind::Host => Extractor::Host {
            markers: lowered(&spec.markers),
            stop_words: word_set(&spec.stop_words),
            default: spec.default.clone().unwrap_or_default(),
        },
        ExtractorKind::TokenAfter => Extractor::TokenAfter {
            anchor: spec.anchor.clone().ok_or_else(|| missing("anchor"))?.to_lowercase(),
            default: spec.default.clone().unwrap_or_default(),
        },
        ExtractorKind::RestAfter => Extractor::RestAfter {
            anchor: spec.anchor.clone().ok_or_else(|| missing("anchor"))?.to_lowercase(),
            stop_words: word_set(&spec.stop_words),
            default: spec.default.clone().unwrap_or_default(),
        },
        ExtractorKind::Choice => {
            if spec.options.is_empty() {
                return Err(missing("options"));
            }
            Extractor::Choice {
                options: lowered(&spec.options),
                default: spec.default.clone().unwrap_or_default(),
            }
        }
        ExtractorKind::Fixed => Extractor::Fixed(spec.value.clone().ok_or_else(|| missing("value"))?),
    };

    Ok(ParamRule {
        key: spec.key,
        extractor,
    })
}

fn compile_fallback(spec: FallbackSpec) -> Result<Fallback, CatalogError> {
    for intent in [&spec.search_intent, &spec.chat_intent] {
        if intent.trim().is_empty() {
            return Err(CatalogError::UnknownFallbackIntent(intent.clone()));
        }
    }

    Ok(Fallback {
        question_markers: keyword_regex("fallback", &spec.question_markers)?,
        search_markers: keyword_regex("fallback", &spec.search_markers)?,
        search_intent: spec.search_intent,
        chat_intent: spec.chat_intent,
    })
}

fn build_regex(intent: &str, pattern: &str) -> Result<Regex, CatalogError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| CatalogError::InvalidPattern {
            intent: intent.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// Compile keywords into one regex matching any of them as a whole word or phrase.
///
/// Returns `None` for an empty list.
fn keyword_regex(intent: &str, keywords: &[String]) -> Result<Option<Regex>, CatalogError> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?:^|[^\w])(?:{})(?:$|[^\w])", alternatives.join("|"));
    build_regex(intent, &pattern).map(Some)
}
