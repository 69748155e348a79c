use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::navigator::navigator::NavigationConfig;
use crate::reset::service::ResetConfig;
use crate::survey::scanner::ScanConfig;

pub const DEFAULT_CONFIG_FILE: &str = "survey-walker.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "survey-walker",
    version,
    about = "Walks multi-step web surveys, classifying and filling every question"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama API endpoint for the type advisor
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name for the type advisor
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to config file (default: survey-walker.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a live survey from its first step to the end
    Walk {
        /// Survey URL
        #[arg(long)]
        url: String,

        /// Write the JSON run report here (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Skip returning to the first step and clearing values
        #[arg(long)]
        no_reset: bool,

        /// Write field and page screenshots under this directory
        #[arg(long)]
        capture_dir: Option<PathBuf>,

        /// Append a JSONL navigation trace to this file
        #[arg(long)]
        trace: Option<PathBuf>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,

        /// Show the browser window
        #[arg(long)]
        headed: bool,

        /// Ask the LLM advisor about questions no pattern recognises
        #[arg(long)]
        advisor: bool,
    },

    /// Classify one question offline and print its test data
    Classify {
        /// Question text, optionally with its number and required marker
        #[arg(long)]
        text: String,

        /// Input kind (text, textarea, radio, checkbox, dropdown, date, email, number, vas, nrs, autocomplete)
        #[arg(long, default_value = "text")]
        kind: String,

        /// Choice label (repeatable)
        #[arg(long = "choice")]
        choices: Vec<String>,

        /// Ask the LLM advisor when no pattern matches
        #[arg(long)]
        advisor: bool,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `survey-walker.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub reset: ResetConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Node.js helper speaking the NDJSON session protocol.
    #[serde(default = "default_helper_script")]
    pub helper_script: String,

    #[serde(default = "default_true")]
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            helper_script: default_helper_script(),
            headless: true,
        }
    }
}

// Serde default helpers
fn default_helper_script() -> String { "node/browser_server.js".to_string() }
fn default_true() -> bool { true }

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. A missing file yields defaults.
pub fn load_config(path: Option<&str>) -> Result<EngineConfig, ConfigError> {
    let config_path = Path::new(path.unwrap_or(DEFAULT_CONFIG_FILE));
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(EngineConfig::default()),
        Err(e) => {
            return Err(ConfigError::Read {
                path: config_path.to_path_buf(),
                source: e,
            });
        }
    };

    let config: EngineConfig = if content.trim().is_empty() {
        EngineConfig::default()
    } else {
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?
    };
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.scan.container_class.trim().is_empty() {
        return Err(ConfigError::Invalid("scan.container_class must not be empty".into()));
    }
    if !(0.0..=1.0).contains(&config.navigation.analog_position) {
        return Err(ConfigError::Invalid(format!(
            "navigation.analog_position must be within 0..1, got {}",
            config.navigation.analog_position
        )));
    }
    if config.navigation.max_pages == 0 {
        return Err(ConfigError::Invalid("navigation.max_pages must be at least 1".into()));
    }
    if config.navigation.transition.max_attempts == 0 {
        return Err(ConfigError::Invalid(
            "navigation.transition.max_attempts must be at least 1".into(),
        ));
    }
    Ok(())
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// CLI flags from `walk` layered over the file values.
pub struct WalkOverrides {
    pub capture_dir: Option<PathBuf>,
    pub trace: Option<PathBuf>,
    pub max_pages: Option<usize>,
    pub headed: bool,
    pub advisor: bool,
    pub ollama_endpoint: Option<String>,
    pub ollama_model: Option<String>,
}

pub fn apply_overrides(mut config: EngineConfig, overrides: WalkOverrides) -> EngineConfig {
    if overrides.capture_dir.is_some() {
        config.scan.capture_dir = overrides.capture_dir;
    }
    if overrides.trace.is_some() {
        config.navigation.trace_path = overrides.trace;
    }
    if let Some(max_pages) = overrides.max_pages {
        config.navigation.max_pages = max_pages.max(1);
    }
    if overrides.headed {
        config.browser.headless = false;
    }
    if overrides.advisor {
        config.advisor.enabled = true;
    }
    if overrides.ollama_endpoint.is_some() {
        config.advisor.endpoint = overrides.ollama_endpoint;
    }
    if overrides.ollama_model.is_some() {
        config.advisor.model = overrides.ollama_model;
    }
    config
}
