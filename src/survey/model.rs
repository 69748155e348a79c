use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::testdata::model::TestDataSet;

// ============================================================================
// Field model
// ============================================================================

/// How a question is answered on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "textarea")]
    Textarea,
    #[serde(rename = "radio")]
    Radio,
    #[serde(rename = "checkbox")]
    Checkbox,
    #[serde(rename = "dropdown")]
    Dropdown,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "number")]
    Number,
    /// Slider-style analog scale
    #[serde(rename = "VAS")]
    Vas,
    /// Button-grid numeric rating scale
    #[serde(rename = "NRS")]
    Nrs,
    #[serde(rename = "autocompleteDropdown")]
    AutocompleteDropdown,
    /// Container with text but no usable control
    #[serde(rename = "static")]
    Static,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Textarea => "textarea",
            InputKind::Radio => "radio",
            InputKind::Checkbox => "checkbox",
            InputKind::Dropdown => "dropdown",
            InputKind::Date => "date",
            InputKind::Email => "email",
            InputKind::Number => "number",
            InputKind::Vas => "VAS",
            InputKind::Nrs => "NRS",
            InputKind::AutocompleteDropdown => "autocompleteDropdown",
            InputKind::Static => "static",
        }
    }

    pub fn parse(name: &str) -> Option<InputKind> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "text" => InputKind::Text,
            "textarea" => InputKind::Textarea,
            "radio" => InputKind::Radio,
            "checkbox" => InputKind::Checkbox,
            "dropdown" | "select" => InputKind::Dropdown,
            "date" => InputKind::Date,
            "email" => InputKind::Email,
            "number" => InputKind::Number,
            "vas" => InputKind::Vas,
            "nrs" => InputKind::Nrs,
            "autocompletedropdown" | "autocomplete" => InputKind::AutocompleteDropdown,
            "static" => InputKind::Static,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the field takes typed text.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            InputKind::Text
                | InputKind::Textarea
                | InputKind::Date
                | InputKind::Email
                | InputKind::Number
                | InputKind::AutocompleteDropdown
        )
    }

    pub fn is_interactive(&self) -> bool {
        !matches!(self, InputKind::Static)
    }

    /// Scale widgets carry their own value domain whatever the question says.
    pub fn is_scale_widget(&self) -> bool {
        matches!(self, InputKind::Vas | InputKind::Nrs)
    }
}

/// Set on fields that appeared only after another field received a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalInfo {
    pub parent_question: String,
    pub parent_value: String,
    pub discovered_at_ms: u64,
}

/// One detected question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    /// Dotted prefix such as "2.3"; empty when the question is unnumbered.
    pub question_number: String,
    pub question_text: String,
    pub input_kind: InputKind,
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// One selector per entry in `choices`, same order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choice_selectors: Vec<String>,
    pub primary_selector: String,
    /// Always prefixed by the survey root selector.
    pub container_selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_data: Option<TestDataSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_info: Option<ConditionalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl FieldRecord {
    /// Join key used to match the field across scans.
    pub fn key(&self) -> &str {
        if self.question_number.is_empty() {
            &self.container_selector
        } else {
            &self.question_number
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.conditional_info.is_some()
    }
}

// ============================================================================
// Page model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavKind {
    Next,
    Previous,
    Finish,
}

/// A navigation affordance found on the current step. Recomputed on every scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavButton {
    pub kind: NavKind,
    pub label: String,
    pub selector: String,
    pub enabled: bool,
}

/// One step of the survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub index: usize,
    pub long_title: String,
    pub short_name: String,
    pub fields: Vec<FieldRecord>,
    pub navigation_buttons: Vec<NavButton>,
    /// Root container was not found; the scan ran against the page body.
    #[serde(default)]
    pub degraded_scope: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

/// Cheap identity signal used to notice navigation that went nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageIdentity {
    pub short_name: String,
    pub leading_question: String,
}

/// Characters of the leading question text that take part in page identity.
pub const IDENTITY_TEXT_LEN: usize = 60;

impl PageIdentity {
    pub fn new(short_name: &str, leading_question: &str) -> Self {
        let collapse = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        PageIdentity {
            short_name: collapse(short_name),
            leading_question: collapse(leading_question)
                .chars()
                .take(IDENTITY_TEXT_LEN)
                .collect(),
        }
    }
}

impl PageRecord {
    pub fn identity(&self) -> PageIdentity {
        let leading = self
            .fields
            .first()
            .map(|f| f.question_text.as_str())
            .unwrap_or("");
        PageIdentity::new(&self.short_name, leading)
    }

    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key() == key)
    }

    pub fn field(&self, key: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.key() == key)
    }

    pub fn has_question_number(&self, number: &str) -> bool {
        !number.is_empty() && self.fields.iter().any(|f| f.question_number == number)
    }
}
