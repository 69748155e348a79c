use thiserror::Error;

/// Failures surfaced by a `Driver` implementation.
///
/// Every driver call can fail hard (element missing, helper process gone).
/// The engine catches these at the field / page boundary and degrades.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Helper subprocess failed to spawn
    #[error("failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from / writing to the helper process failed
    #[error("session I/O: {0}")]
    SessionIO(String),

    /// Helper answered with ok=false or an unexpected shape
    #[error("{command} failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// No element matched the selector
    #[error("element '{selector}' not found")]
    ElementNotFound { selector: String },

    /// An in-page script returned something the engine cannot use
    #[error("script {script} returned unexpected data: {detail}")]
    ScriptResult { script: &'static str, detail: String },
}
