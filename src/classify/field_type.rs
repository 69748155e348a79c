use serde::{Deserialize, Serialize};

use crate::survey::model::InputKind;

/// Semantic type of a question, used to pick its test-data template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    SingleChoice,
    MultipleChoice,
    YesNo,
    Dropdown,
    Date,
    BirthDate,
    Weight,
    Height,
    Age,
    Email,
    Phone,
    PostalCode,
    Name,
    Number,
    FreeText,
    LongText,
    AnalogScale,
    NumericRating,
    Autocomplete,
    Informational,
}

impl FieldType {
    pub const ALL: [FieldType; 20] = [
        FieldType::SingleChoice,
        FieldType::MultipleChoice,
        FieldType::YesNo,
        FieldType::Dropdown,
        FieldType::Date,
        FieldType::BirthDate,
        FieldType::Weight,
        FieldType::Height,
        FieldType::Age,
        FieldType::Email,
        FieldType::Phone,
        FieldType::PostalCode,
        FieldType::Name,
        FieldType::Number,
        FieldType::FreeText,
        FieldType::LongText,
        FieldType::AnalogScale,
        FieldType::NumericRating,
        FieldType::Autocomplete,
        FieldType::Informational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::SingleChoice => "single_choice",
            FieldType::MultipleChoice => "multiple_choice",
            FieldType::YesNo => "yes_no",
            FieldType::Dropdown => "dropdown",
            FieldType::Date => "date",
            FieldType::BirthDate => "birth_date",
            FieldType::Weight => "weight",
            FieldType::Height => "height",
            FieldType::Age => "age",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::PostalCode => "postal_code",
            FieldType::Name => "name",
            FieldType::Number => "number",
            FieldType::FreeText => "free_text",
            FieldType::LongText => "long_text",
            FieldType::AnalogScale => "analog_scale",
            FieldType::NumericRating => "numeric_rating",
            FieldType::Autocomplete => "autocomplete",
            FieldType::Informational => "informational",
        }
    }

    /// Lenient lookup by name ("Birth date", "birth_date", "BIRTH-DATE").
    pub fn from_name(name: &str) -> Option<FieldType> {
        let normalized: String = name
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
    }

    /// Deterministic fallback when no pattern fires.
    pub fn for_input_kind(kind: InputKind) -> FieldType {
        match kind {
            InputKind::Text => FieldType::FreeText,
            InputKind::Textarea => FieldType::LongText,
            InputKind::Radio => FieldType::SingleChoice,
            InputKind::Checkbox => FieldType::MultipleChoice,
            InputKind::Dropdown => FieldType::Dropdown,
            InputKind::Date => FieldType::Date,
            InputKind::Email => FieldType::Email,
            InputKind::Number => FieldType::Number,
            InputKind::Vas => FieldType::AnalogScale,
            InputKind::Nrs => FieldType::NumericRating,
            InputKind::AutocompleteDropdown => FieldType::Autocomplete,
            InputKind::Static => FieldType::Informational,
        }
    }
}
