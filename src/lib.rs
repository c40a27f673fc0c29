//! Intent core - command resolution for Hindi, English and Hinglish
//!
//! Turns a transcribed or typed utterance into an intent name plus typed
//! parameters using an ordered rule catalog, with language detection
//! attached as metadata and a dispatch contract for downstream executors.

pub mod catalog;
pub mod dispatch;
pub mod entities;
pub mod error;
pub mod language;
pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod similarity;
pub mod types;

pub use catalog::{IntentCatalog, IntentRule};
pub use dispatch::{CommandExecutor, Dispatcher};
pub use entities::EntityExtractor;
pub use error::{CatalogError, DispatchError};
pub use language::{Language, LanguageDetector, LanguageScore};
pub use matcher::{match_intent, IntentMatch};
pub use normalize::normalize;
pub use resolver::IntentResolver;
pub use types::*;

// Python bindings
#[cfg(feature = "extension-module")]
pub mod py;

#[cfg(feature = "extension-module")]
use pyo3::prelude::*;

#[cfg(feature = "extension-module")]
#[pymodule]
fn intent_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    use py::*;
    m.add_class::<PyIntentResolver>()?;
    m.add_class::<PyLanguageDetector>()?;
    m.add_function(wrap_pyfunction!(py_detect_language, m)?)?;
    m.add_function(wrap_pyfunction!(py_normalize_text, m)?)?;
    Ok(())
}
