use std::collections::HashMap;

use crate::classify::field_type::FieldType;
use crate::survey::model::{FieldRecord, InputKind};
use crate::testdata::model::Category;

/// Optional conditions a field must meet for a template entry to apply.
/// Unset conditions always hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applicability {
    /// Allow-list; empty means any kind.
    pub kinds: Vec<InputKind>,
    pub min_choices: Option<usize>,
    pub max_choices: Option<usize>,
    pub required: Option<bool>,
}

impl Applicability {
    pub fn holds_for(&self, field: &FieldRecord) -> bool {
        let n = field.choices.len();
        (self.kinds.is_empty() || self.kinds.contains(&field.input_kind))
            && self.min_choices.is_none_or(|min| n >= min)
            && self.max_choices.is_none_or(|max| n <= max)
            && self.required.is_none_or(|r| r == field.is_required)
    }
}

/// One entry of a field-type template.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseTemplate {
    pub id: String,
    pub category: Category,
    pub value: String,
    pub description: String,
    /// Static weight, becomes the case's quality score.
    pub weight: f32,
    pub applies: Applicability,
}

impl TestCaseTemplate {
    pub fn new(id: &str, category: Category, value: &str, description: &str, weight: f32) -> Self {
        TestCaseTemplate {
            id: id.to_string(),
            category,
            value: value.to_string(),
            description: description.to_string(),
            weight,
            applies: Applicability::default(),
        }
    }

    pub fn only_required(mut self) -> Self {
        self.applies.required = Some(true);
        self
    }

    pub fn min_choices(mut self, n: usize) -> Self {
        self.applies.min_choices = Some(n);
        self
    }

    pub fn for_kinds(mut self, kinds: &[InputKind]) -> Self {
        self.applies.kinds = kinds.to_vec();
        self
    }
}

/// Templates keyed by semantic field type.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<FieldType, Vec<TestCaseTemplate>>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TemplateRegistry {
    pub fn empty() -> Self {
        TemplateRegistry {
            templates: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for (field_type, entries) in default_templates() {
            registry.register(field_type, entries);
        }
        registry
    }

    /// Replaces any template previously registered for `field_type`.
    pub fn register(&mut self, field_type: FieldType, entries: Vec<TestCaseTemplate>) {
        self.templates.insert(field_type, entries);
    }

    /// Exact template, or the generic text template when none is registered.
    /// Returns the key actually used.
    pub fn lookup(&self, field_type: FieldType) -> Option<(FieldType, &[TestCaseTemplate])> {
        self.templates
            .get(&field_type)
            .map(|t| (field_type, t.as_slice()))
            .or_else(|| {
                self.templates
                    .get(&FieldType::FreeText)
                    .map(|t| (FieldType::FreeText, t.as_slice()))
            })
    }
}

// ============================================================================
// Built-in templates
// ============================================================================

fn default_templates() -> Vec<(FieldType, Vec<TestCaseTemplate>)> {
    use Category::*;
    let t = TestCaseTemplate::new;

    vec![
        (
            FieldType::FreeText,
            vec![
                t("text-typical", Valid, "Sample answer", "Typical short answer", 1.0),
                t("text-single-char", Boundary, "A", "Shortest non-empty answer", 0.7),
                t("text-umlauts", Edge, "Ärger über Größe – ça va?", "Non-ASCII letters and punctuation", 0.6),
                t("text-empty", Invalid, "", "Empty value on a required field", 0.8).only_required(),
            ],
        ),
        (
            FieldType::LongText,
            vec![
                t("long-typical", Valid, "I have had these symptoms for several weeks. They get worse in the evening.", "Multi-sentence answer", 1.0),
                t("long-max", Boundary, &"x".repeat(2000), "Very long answer", 0.6),
                t("long-newlines", Edge, "First line\nSecond line", "Embedded line break", 0.5),
                t("long-empty", Invalid, "", "Empty value on a required field", 0.8).only_required(),
            ],
        ),
        (
            FieldType::SingleChoice,
            vec![t("single-first", Valid, "0", "First option", 1.0)],
        ),
        (
            FieldType::YesNo,
            vec![
                t("yes-no-first", Valid, "0", "First answer", 1.0),
                t("yes-no-second", Valid, "1", "Second answer", 1.0),
            ],
        ),
        (
            FieldType::Dropdown,
            vec![t("dropdown-first", Valid, "0", "First meaningful option", 1.0)],
        ),
        (
            FieldType::MultipleChoice,
            vec![
                t("multi-first", Valid, "0", "Tick the first option", 1.0),
                t("multi-two", Valid, "0,1", "Tick the first two options", 0.8).min_choices(2),
                t("multi-none", Invalid, "", "No option ticked on a required field", 0.7).only_required(),
            ],
        ),
        (
            FieldType::Date,
            vec![
                t("date-typical", Valid, "15.03.2021", "Ordinary past date", 1.0),
                t("date-epoch", Boundary, "01.01.1900", "Earliest plausible date", 0.6),
                t("date-leap-day", Edge, "29.02.2020", "Leap day", 0.7),
                t("date-impossible", Invalid, "31.02.2020", "Day does not exist", 0.8),
                t("date-iso", Invalid, "2020-03-15", "Wrong format", 0.5),
            ],
        ),
        (
            FieldType::BirthDate,
            vec![
                t("birth-typical", Valid, "15.03.1985", "Adult birth date", 1.0),
                t("birth-oldest", Boundary, "01.01.1900", "Oldest plausible birth date", 0.6),
                t("birth-leap-day", Edge, "29.02.2000", "Born on a leap day", 0.7),
                t("birth-future", Invalid, "31.12.2099", "Birth date in the future", 0.8),
                t("birth-impossible", Invalid, "31.02.1990", "Day does not exist", 0.7),
            ],
        ),
        (
            FieldType::Weight,
            vec![
                t("weight-typical", Valid, "72", "Typical adult weight in kg", 1.0),
                t("weight-low", Boundary, "30", "Lower plausible weight", 0.6),
                t("weight-high", Boundary, "250", "Upper plausible weight", 0.6),
                t("weight-decimal", Edge, "72.5", "Decimal weight", 0.5),
                t("weight-negative", Invalid, "-5", "Negative weight", 0.8),
                t("weight-text", Invalid, "abc", "Not a number", 0.7),
            ],
        ),
        (
            FieldType::Height,
            vec![
                t("height-typical", Valid, "175", "Typical adult height in cm", 1.0),
                t("height-low", Boundary, "100", "Lower plausible height", 0.6),
                t("height-high", Boundary, "230", "Upper plausible height", 0.6),
                t("height-decimal", Edge, "175.5", "Decimal height", 0.5),
                t("height-zero", Invalid, "0", "Zero height", 0.8),
            ],
        ),
        (
            FieldType::Age,
            vec![
                t("age-typical", Valid, "42", "Typical adult age", 1.0),
                t("age-adult", Boundary, "18", "Age of majority", 0.7),
                t("age-high", Boundary, "99", "Highest two-digit age", 0.6),
                t("age-zero", Edge, "0", "Newborn", 0.5),
                t("age-negative", Invalid, "-1", "Negative age", 0.8),
                t("age-implausible", Invalid, "150", "Implausibly high age", 0.7),
            ],
        ),
        (
            FieldType::Email,
            vec![
                t("email-typical", Valid, "test.user@example.com", "Ordinary address", 1.0),
                t("email-plus", Edge, "first.last+tag@sub.example.co.uk", "Plus tag and subdomain", 0.6),
                t("email-missing-at", Invalid, "not-an-email", "Missing @", 0.8),
                t("email-missing-domain", Invalid, "user@", "Missing domain", 0.7),
            ],
        ),
        (
            FieldType::Phone,
            vec![
                t("phone-international", Valid, "+49 30 1234567", "International format", 1.0),
                t("phone-local", Edge, "030/1234567", "Local format with slash", 0.6),
                t("phone-letters", Invalid, "abc", "Letters only", 0.8),
            ],
        ),
        (
            FieldType::PostalCode,
            vec![
                t("postal-typical", Valid, "10115", "Five-digit code", 1.0),
                t("postal-leading-zero", Boundary, "01067", "Leading zero", 0.7),
                t("postal-short", Invalid, "1234", "Too short", 0.8),
                t("postal-letters", Invalid, "ABCDE", "Letters", 0.7),
            ],
        ),
        (
            FieldType::Name,
            vec![
                t("name-typical", Valid, "Max Mustermann", "Ordinary full name", 1.0),
                t("name-hyphen", Edge, "Anne-Marie O'Neil", "Hyphen and apostrophe", 0.6),
                t("name-umlauts", Edge, "Jürgen Größe", "Umlauts", 0.6),
                t("name-empty", Invalid, "", "Empty value on a required field", 0.8).only_required(),
            ],
        ),
        (
            FieldType::Number,
            vec![
                t("number-typical", Valid, "42", "Ordinary integer", 1.0),
                t("number-zero", Boundary, "0", "Zero", 0.7),
                t("number-negative", Edge, "-1", "Negative integer", 0.6),
                t("number-decimal", Edge, "3.14", "Decimal", 0.5),
                t("number-text", Invalid, "abc", "Not a number", 0.8),
            ],
        ),
        (
            FieldType::AnalogScale,
            vec![
                t("scale-middle", Valid, "50", "Middle of the track", 1.0),
                t("scale-start", Boundary, "0", "Start of the track", 0.8),
                t("scale-end", Boundary, "100", "End of the track", 0.8),
            ],
        ),
        (
            FieldType::NumericRating,
            vec![
                t("rating-middle", Valid, "5", "Middle rating", 1.0),
                t("rating-lowest", Boundary, "0", "Lowest rating", 0.8),
                t("rating-highest", Boundary, "10", "Highest rating", 0.8),
            ],
        ),
        (
            FieldType::Autocomplete,
            vec![
                t("suggest-prefix", Valid, "Ber", "Prefix that yields suggestions", 1.0),
                t("suggest-none", Edge, "zzzz", "Prefix without suggestions", 0.5),
            ],
        ),
        (FieldType::Informational, vec![]),
    ]
}
