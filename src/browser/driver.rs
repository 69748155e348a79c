use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::browser::error::DriverError;
use crate::browser::script::PageScript;

/// What a screenshot should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    FullPage,
    Element(String),
}

/// The capability set the engine consumes from the page-automation layer.
///
/// All calls are blocking request/response operations against one rendered
/// page. Element handles are never held across calls: every operation takes
/// a selector and re-queries, because the page may re-render between calls.
pub trait Driver {
    /// Run a named in-page function and return its JSON result.
    fn evaluate(&mut self, script: &PageScript) -> Result<Value, DriverError>;

    /// Number of elements currently matching `selector`.
    fn query_count(&mut self, selector: &str) -> Result<usize, DriverError>;

    fn click(&mut self, selector: &str) -> Result<(), DriverError>;

    fn type_text(&mut self, selector: &str, text: &str) -> Result<(), DriverError>;

    /// Pick the option with the given visible label in a `<select>`.
    fn select(&mut self, selector: &str, label: &str) -> Result<(), DriverError>;

    /// Real keyboard press on the focused page (e.g. `"Escape"`).
    fn press_key(&mut self, key: &str) -> Result<(), DriverError>;

    fn screenshot(&mut self, target: &CaptureTarget, path: &Path) -> Result<(), DriverError>;

    /// Wait until `selector` matches something, up to `timeout_ms`. Returns whether it appeared.
    fn wait_for(&mut self, selector: &str, timeout_ms: u64) -> Result<bool, DriverError>;

    /// Fixed settle delay after a state-mutating action.
    fn wait_idle(&mut self, ms: u64);
}

/// Evaluate a script and deserialize the result.
pub fn evaluate_as<T: DeserializeOwned>(
    driver: &mut dyn Driver,
    script: &PageScript,
) -> Result<T, DriverError> {
    let value = driver.evaluate(script)?;
    serde_json::from_value(value).map_err(|e| DriverError::JsonParse {
        context: format!("{} result", script.name()),
        source: e,
    })
}
