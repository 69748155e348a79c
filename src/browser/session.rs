use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::browser::driver::{CaptureTarget, Driver};
use crate::browser::error::DriverError;
use crate::browser::script::{PRELUDE, PageScript};

/// Request sent to the helper process over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest {
    Navigate {
        url: String,
    },
    Evaluate {
        script: String,
        source: String,
        args: Value,
    },
    QueryCount {
        selector: String,
    },
    Click {
        selector: String,
    },
    Type {
        selector: String,
        text: String,
    },
    Select {
        selector: String,
        label: String,
    },
    Press {
        key: String,
    },
    Screenshot {
        path: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        selector: Option<String>,
    },
    WaitFor {
        selector: String,
        timeout_ms: u64,
    },
    Quit,
}

impl BrowserRequest {
    pub fn evaluate(script: &PageScript) -> Self {
        BrowserRequest::Evaluate {
            script: script.name().to_string(),
            source: format!("{}\nreturn ({})(args);", PRELUDE, script.source()),
            args: script.args(),
        }
    }

    fn command_name(&self) -> &'static str {
        match self {
            BrowserRequest::Navigate { .. } => "navigate",
            BrowserRequest::Evaluate { .. } => "evaluate",
            BrowserRequest::QueryCount { .. } => "query_count",
            BrowserRequest::Click { .. } => "click",
            BrowserRequest::Type { .. } => "type",
            BrowserRequest::Select { .. } => "select",
            BrowserRequest::Press { .. } => "press",
            BrowserRequest::Screenshot { .. } => "screenshot",
            BrowserRequest::WaitFor { .. } => "wait_for",
            BrowserRequest::Quit => "quit",
        }
    }
}

/// Response received from the helper process over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub found: Option<bool>,
}

/// A persistent browser session backed by a Node.js Playwright helper.
///
/// The helper keeps one Chromium page open; commands go out as NDJSON on
/// stdin and answers come back one line each on stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
}

impl BrowserSession {
    /// Spawn the helper script and wait for its ready line.
    pub fn launch(helper_script: &str, headless: bool) -> Result<Self, DriverError> {
        let mut child = Command::new("node")
            .arg(helper_script)
            .env("SURVEY_WALKER_HEADLESS", if headless { "1" } else { "0" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| DriverError::SubprocessSpawn {
                script: helper_script.into(),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DriverError::SessionIO("failed to capture helper stdin".into()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DriverError::SessionIO("failed to capture helper stdout".into()))?;

        let mut reader = BufReader::new(stdout);

        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| DriverError::SessionIO(format!("failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
                context: "helper ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(DriverError::SessionProtocol {
                command: "launch".into(),
                error: "helper did not send a ready signal".into(),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
        })
    }

    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, DriverError> {
        let json = serde_json::to_string(request).map_err(|e| DriverError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json)
            .map_err(|e| DriverError::SessionIO(format!("failed to write to helper: {}", e)))?;
        self.stdin
            .flush()
            .map_err(|e| DriverError::SessionIO(format!("failed to flush helper stdin: {}", e)))?;

        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| DriverError::SessionIO(format!("failed to read from helper: {}", e)))?;

        if line.trim().is_empty() {
            return Err(DriverError::SessionIO(
                "empty response from helper (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| DriverError::JsonParse {
            context: "helper response".into(),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, DriverError> {
        let response = self.send(request)?;
        if !response.ok {
            let error = response.error.unwrap_or_else(|| "unknown error".into());
            if error.contains("not found") || error.contains("No element") {
                if let Some(selector) = selector_of(request) {
                    return Err(DriverError::ElementNotFound { selector });
                }
            }
            return Err(DriverError::SessionProtocol {
                command: request.command_name().into(),
                error,
            });
        }
        Ok(response)
    }

    pub fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Navigate {
            url: url.to_string(),
        })?;
        Ok(())
    }

    pub fn quit(&mut self) -> Result<(), DriverError> {
        // best effort: the process may already be gone
        let _ = self.send(&BrowserRequest::Quit);
        let _ = self.child.wait();
        Ok(())
    }
}

impl Driver for BrowserSession {
    fn evaluate(&mut self, script: &PageScript) -> Result<Value, DriverError> {
        debug!(script = script.name(), "evaluate");
        let response = self.send_ok(&BrowserRequest::evaluate(script))?;
        Ok(response.data.unwrap_or(Value::Null))
    }

    fn query_count(&mut self, selector: &str) -> Result<usize, DriverError> {
        let response = self.send_ok(&BrowserRequest::QueryCount {
            selector: selector.to_string(),
        })?;
        Ok(response.count.unwrap_or(0))
    }

    fn click(&mut self, selector: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Click {
            selector: selector.to_string(),
        })?;
        Ok(())
    }

    fn type_text(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Type {
            selector: selector.to_string(),
            text: text.to_string(),
        })?;
        Ok(())
    }

    fn select(&mut self, selector: &str, label: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Select {
            selector: selector.to_string(),
            label: label.to_string(),
        })?;
        Ok(())
    }

    fn press_key(&mut self, key: &str) -> Result<(), DriverError> {
        self.send_ok(&BrowserRequest::Press {
            key: key.to_string(),
        })?;
        Ok(())
    }

    fn screenshot(&mut self, target: &CaptureTarget, path: &Path) -> Result<(), DriverError> {
        let selector = match target {
            CaptureTarget::FullPage => None,
            CaptureTarget::Element(selector) => Some(selector.clone()),
        };
        self.send_ok(&BrowserRequest::Screenshot {
            path: path.display().to_string(),
            selector,
        })?;
        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout_ms: u64) -> Result<bool, DriverError> {
        let response = self.send_ok(&BrowserRequest::WaitFor {
            selector: selector.to_string(),
            timeout_ms,
        })?;
        Ok(response.found.unwrap_or(false))
    }

    fn wait_idle(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}

fn selector_of(request: &BrowserRequest) -> Option<String> {
    match request {
        BrowserRequest::Click { selector }
        | BrowserRequest::Type { selector, .. }
        | BrowserRequest::Select { selector, .. }
        | BrowserRequest::QueryCount { selector }
        | BrowserRequest::WaitFor { selector, .. } => Some(selector.clone()),
        _ => None,
    }
}
