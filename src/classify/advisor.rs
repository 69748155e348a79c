use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::field_type::FieldType;
use crate::survey::model::InputKind;

/// Second opinion consulted when no registry pattern fires.
pub trait TypeAdvisor {
    fn suggest(&self, question_text: &str, kind: InputKind, choices: &[String]) -> Option<FieldType>;
}

// ============================================================================
// Ollama Advisor
// ============================================================================

pub struct OllamaAdvisor {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaAdvisor {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/generate".to_string(),
            model: "qwen2.5:1.5b".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Deserialize)]
struct AdvisorAnswer {
    field_type: String,
}

impl OllamaAdvisor {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            ..Self::default()
        }
    }

    fn build_prompt(&self, question_text: &str, kind: InputKind, choices: &[String]) -> String {
        let known = FieldType::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
r#"You classify survey questions into semantic field types.

QUESTION:
- Text: {}
- Input kind: {}
- Choices: {}

KNOWN TYPES: {}

Respond with ONLY valid JSON: {{"field_type":"..."}}"#,
            question_text,
            kind.as_str(),
            if choices.is_empty() { "(none)".to_string() } else { choices.join(" | ") },
            known
        )
    }

    fn parse_response(&self, response: &str) -> Option<FieldType> {
        let parsed: AdvisorAnswer = serde_json::from_str(response).ok()?;
        FieldType::from_name(&parsed.field_type)
    }
}

impl TypeAdvisor for OllamaAdvisor {
    fn suggest(&self, question_text: &str, kind: InputKind, choices: &[String]) -> Option<FieldType> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(question_text, kind, choices),
            stream: false,
            format: "json",
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .ok()?;
        let response = match client.post(&self.endpoint).json(&request).send() {
            Ok(r) => r,
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "advisor unreachable");
                return None;
            }
        };

        let ollama_response: OllamaResponse = response.json().ok()?;
        self.parse_response(&ollama_response.response)
    }
}

// ============================================================================
// Static Advisor (offline)
// ============================================================================

/// Answers from a fixed keyword table. Used offline and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticAdvisor {
    pub rules: Vec<(String, FieldType)>,
}

impl StaticAdvisor {
    pub fn new(rules: &[(&str, FieldType)]) -> Self {
        StaticAdvisor {
            rules: rules
                .iter()
                .map(|(k, t)| (k.to_lowercase(), *t))
                .collect(),
        }
    }
}

impl TypeAdvisor for StaticAdvisor {
    fn suggest(&self, question_text: &str, _kind: InputKind, _choices: &[String]) -> Option<FieldType> {
        let lower = question_text.to_lowercase();
        self.rules
            .iter()
            .find(|(keyword, _)| lower.contains(keyword.as_str()))
            .map(|(_, t)| *t)
    }
}
