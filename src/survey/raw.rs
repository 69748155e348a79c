use serde::Deserialize;

// Payloads returned by the in-page extraction scripts. Everything is optional
// on the wire; missing keys deserialize to empty values.

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTitle {
    pub long_title: String,
    pub short_name: String,
}

/// One form control inside a question container.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawControl {
    pub tag: String,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub name: Option<String>,
    pub dom_id: Option<String>,
    pub label: String,
    pub hidden: bool,
    pub required: bool,
    pub autocomplete: bool,
    /// Selector relative to the question container.
    pub locator: String,
}

impl RawControl {
    pub fn type_is(&self, t: &str) -> bool {
        self.input_type.as_deref() == Some(t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWidget {
    pub locator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRatingButton {
    pub label: String,
    pub locator: String,
}

/// One question container as seen by `ExtractQuestions`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQuestion {
    pub tag: String,
    pub dom_id: Option<String>,
    pub data_attributes: Vec<(String, String)>,
    /// 1-based position among same-tag siblings, when there are several.
    pub nth_of_type: Option<usize>,
    /// Structural path from the root container, `> a:nth-of-type(1) > b:nth-of-type(2)`.
    pub ancestor_path: Option<String>,
    /// Filtered visible text (input values and hidden nodes excluded).
    pub text: String,
    /// Placeholder / aria / name / class text of the controls.
    pub metadata: String,
    pub controls: Vec<RawControl>,
    pub options: Vec<String>,
    pub analog_scale: Option<RawWidget>,
    pub rating_buttons: Vec<RawRatingButton>,
    pub clear_affordance: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawButton {
    pub label: String,
    pub locator: String,
    pub enabled: bool,
    pub role: Option<String>,
    /// id / class / aria-label / title text
    pub hint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawModal {
    pub locator: String,
    pub text: String,
}
