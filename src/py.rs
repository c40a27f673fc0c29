//! Python bindings for intent core using PyO3

use std::sync::OnceLock;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::catalog::IntentCatalog;
use crate::error::CatalogError;
use crate::language::LanguageDetector;
use crate::normalize::normalize;
use crate::resolver::IntentResolver;
use crate::types::{ParamValue, ParsedCommand};

fn catalog_err(e: CatalogError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Process-wide detector, built on first use
fn shared_detector() -> &'static LanguageDetector {
    static DETECTOR: OnceLock<LanguageDetector> = OnceLock::new();
    DETECTOR.get_or_init(LanguageDetector::new)
}

/// Detect the language of a piece of text (Python function)
#[pyfunction]
#[pyo3(name = "detect_language")]
pub fn py_detect_language(text: &str) -> &'static str {
    shared_detector().detect(text).as_str()
}

/// Normalize text the way the resolver does before matching
#[pyfunction]
#[pyo3(name = "normalize_text")]
pub fn py_normalize_text(text: &str) -> String {
    normalize(text)
}

/// Python wrapper for the intent resolver
#[pyclass(name = "IntentResolver")]
pub struct PyIntentResolver {
    resolver: IntentResolver,
}

#[pymethods]
impl PyIntentResolver {
    /// Build from the built-in catalog, or from a TOML catalog file
    #[new]
    #[pyo3(signature = (catalog_path=None))]
    fn new(catalog_path: Option<&str>) -> PyResult<Self> {
        let catalog = match catalog_path {
            Some(path) => IntentCatalog::load(path),
            None => IntentCatalog::builtin(),
        }
        .map_err(catalog_err)?;
        Ok(Self {
            resolver: IntentResolver::new(catalog),
        })
    }

    /// Resolve text into a dict with intent, params, language, confidence and source
    fn resolve<'py>(&self, text: &str, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let cmd = self.resolver.resolve(text);
        command_to_dict(py, &cmd)
    }

    /// Resolve text and return the command serialized as JSON
    fn resolve_json(&self, text: &str) -> PyResult<String> {
        let cmd = self.resolver.resolve(text);
        serde_json::to_string(&cmd)
            .map_err(|e| PyValueError::new_err(format!("Failed to serialize command: {}", e)))
    }

    /// Advisory confidence that `intent` fits `text`
    fn confidence(&self, text: &str, intent: &str) -> f64 {
        self.resolver.confidence(text, intent)
    }

    /// Up to three medium-scoring alternative intents
    fn suggest_alternatives(&self, text: &str) -> Vec<String> {
        self.resolver.suggest_alternatives(text)
    }

    /// Intent names in catalog order
    fn intents(&self) -> Vec<String> {
        self.resolver
            .catalog()
            .intent_names()
            .map(str::to_string)
            .collect()
    }

    fn __len__(&self) -> usize {
        self.resolver.catalog().len()
    }
}

/// Python wrapper for the language detector
#[pyclass(name = "LanguageDetector")]
pub struct PyLanguageDetector {
    detector: LanguageDetector,
}

#[pymethods]
impl PyLanguageDetector {
    #[new]
    fn new() -> Self {
        Self {
            detector: LanguageDetector::new(),
        }
    }

    /// Language label: "hindi", "english" or "hinglish"
    fn detect(&self, text: &str) -> &'static str {
        self.detector.detect(text).as_str()
    }

    /// Raw per-language scores
    fn scores<'py>(&self, text: &str, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let score = self.detector.score(text);
        let dict = PyDict::new_bound(py);
        dict.set_item("hindi", score.hindi)?;
        dict.set_item("english", score.english)?;
        dict.set_item("hinglish", score.hinglish)?;
        Ok(dict)
    }
}

fn command_to_dict<'py>(py: Python<'py>, cmd: &ParsedCommand) -> PyResult<Bound<'py, PyDict>> {
    let params = PyDict::new_bound(py);
    for (key, value) in &cmd.params {
        match value {
            ParamValue::Flag(b) => params.set_item(key, *b)?,
            ParamValue::Integer(n) => params.set_item(key, *n)?,
            ParamValue::Float(f) => params.set_item(key, *f)?,
            ParamValue::Text(s) => params.set_item(key, s)?,
        }
    }

    let dict = PyDict::new_bound(py);
    dict.set_item("intent", &cmd.intent)?;
    dict.set_item("params", params)?;
    dict.set_item("language", cmd.language.map(|l| l.as_str()))?;
    dict.set_item("confidence", cmd.confidence)?;
    dict.set_item("source", cmd.source.as_str())?;
    Ok(dict)
}
