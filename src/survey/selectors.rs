use regex::Regex;

use crate::survey::model::InputKind;
use crate::survey::raw::{RawControl, RawQuestion};

// ============================================================================
// Text cleanup
// ============================================================================

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a leading dotted question number off the text.
///
/// `"2.3. How old are you?"` → `("2.3", "How old are you?")`. The prefix must
/// either end in a dot (`"4."`) or contain an inner dot (`"4.1"`) and be
/// followed by whitespace, so plain leading numbers like `"10 kg"` are kept.
pub fn split_question_number(text: &str) -> (String, String) {
    let trimmed = text.trim_start();
    let token_len = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let token = &trimmed[..token_len];
    let rest = &trimmed[token_len..];

    let starts_with_digit = token.starts_with(|c: char| c.is_ascii_digit());
    let followed_by_space = rest.is_empty() || rest.starts_with(char::is_whitespace);
    let well_formed = !token.contains("..");
    let core = token.trim_end_matches('.');
    let dotted = token.ends_with('.') || core.contains('.');

    if starts_with_digit && followed_by_space && well_formed && dotted && !core.is_empty() {
        (core.to_string(), collapse_whitespace(rest))
    } else {
        (String::new(), collapse_whitespace(text))
    }
}

/// Remove every choice label from the question text, longest label first,
/// only where the label stands on word boundaries.
pub fn strip_choice_labels(text: &str, choices: &[String]) -> String {
    let mut sorted: Vec<&String> = choices.iter().filter(|c| !c.trim().is_empty()).collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    let mut result = text.to_string();
    for choice in sorted {
        let choice = choice.trim();
        let starts_word = choice.starts_with(|c: char| c.is_alphanumeric());
        let ends_word = choice.ends_with(|c: char| c.is_alphanumeric());
        let pattern = format!(
            "(?i){}{}{}",
            if starts_word { r"\b" } else { "" },
            regex::escape(choice),
            if ends_word { r"\b" } else { "" },
        );
        if let Ok(re) = Regex::new(&pattern) {
            result = re.replace_all(&result, " ").into_owned();
        }
    }
    collapse_whitespace(&result)
}

/// Unit labels that surveys render after the required glyph ("Weight * kg").
const UNIT_SUFFIXES: &[&str] = &[
    "kg", "g", "lbs", "cm", "mm", "m", "ft", "ml", "l", "%", "min", "h", "years", "jahre", "€", "$",
];

/// Trailing-marker rule: the question is required when its text ends with `*`,
/// or with `*` followed by a single unit label. Returns the flag and the text
/// with the marker removed; a unit label is kept.
pub fn extract_required_marker(text: &str) -> (bool, String) {
    let trimmed = text.trim_end();
    if trimmed.ends_with('*') {
        return (true, trimmed.trim_end_matches('*').trim_end().to_string());
    }

    if let Some((head, unit)) = trimmed.rsplit_once(char::is_whitespace) {
        let head = head.trim_end();
        let bare = unit
            .trim_matches(|c| matches!(c, '(' | ')' | '[' | ']'))
            .to_lowercase();
        if head.ends_with('*') && UNIT_SUFFIXES.contains(&bare.as_str()) {
            let question = head.trim_end_matches('*').trim_end();
            return (true, format!("{} {}", question, unit));
        }
    }

    (false, trimmed.to_string())
}

// ============================================================================
// Control detection
// ============================================================================

/// What the container's controls say about how to answer it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedControl {
    pub kind: InputKind,
    pub choices: Vec<String>,
    /// Relative to the container, one per choice.
    pub choice_locators: Vec<String>,
    /// Relative to the container; empty when the container itself is the target.
    pub primary_locator: String,
    pub required_attribute: bool,
}

impl DetectedControl {
    fn simple(kind: InputKind, locator: &str) -> Self {
        DetectedControl {
            kind,
            choices: vec![],
            choice_locators: vec![],
            primary_locator: locator.to_string(),
            required_attribute: false,
        }
    }
}

/// Specialized widgets first (they often carry no form control at all),
/// then the conventional `<input>/<select>/<textarea>` controls.
pub fn detect_control(raw: &RawQuestion) -> DetectedControl {
    let required_attribute = raw.controls.iter().any(|c| c.required);

    if let Some(scale) = &raw.analog_scale {
        return DetectedControl {
            required_attribute,
            ..DetectedControl::simple(InputKind::Vas, &scale.locator)
        };
    }

    if !raw.rating_buttons.is_empty() {
        return DetectedControl {
            kind: InputKind::Nrs,
            choices: raw.rating_buttons.iter().map(|b| b.label.clone()).collect(),
            choice_locators: raw.rating_buttons.iter().map(|b| b.locator.clone()).collect(),
            primary_locator: String::new(),
            required_attribute,
        };
    }

    // custom-styled radios/checkboxes often hide the native input
    let usable: Vec<&RawControl> = raw
        .controls
        .iter()
        .filter(|c| !c.type_is("hidden"))
        .filter(|c| !c.hidden || c.type_is("radio") || c.type_is("checkbox"))
        .collect();

    let Some(first) = usable.first() else {
        return DetectedControl::simple(InputKind::Static, "");
    };

    let mut detected = if first.type_is("radio") || first.type_is("checkbox") {
        grouped(&usable, first)
    } else if first.tag == "select" {
        DetectedControl {
            kind: InputKind::Dropdown,
            choices: meaningful_options(&raw.options),
            ..DetectedControl::simple(InputKind::Dropdown, &first.locator)
        }
    } else if first.tag == "textarea" {
        DetectedControl::simple(InputKind::Textarea, &first.locator)
    } else {
        DetectedControl::simple(native_input_kind(first), &first.locator)
    };

    detected.required_attribute = required_attribute;
    detected
}

fn grouped(usable: &[&RawControl], first: &RawControl) -> DetectedControl {
    let group_type = first.input_type.clone();
    let members: Vec<&&RawControl> = usable
        .iter()
        .filter(|c| c.input_type == group_type && c.name == first.name)
        .collect();

    let kind = if first.type_is("radio") {
        InputKind::Radio
    } else {
        InputKind::Checkbox
    };

    DetectedControl {
        kind,
        choices: members
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if c.label.trim().is_empty() {
                    format!("Option {}", i + 1)
                } else {
                    collapse_whitespace(&c.label)
                }
            })
            .collect(),
        choice_locators: members.iter().map(|c| c.locator.clone()).collect(),
        primary_locator: first.locator.clone(),
        required_attribute: false,
    }
}

fn native_input_kind(control: &RawControl) -> InputKind {
    if control.autocomplete {
        return InputKind::AutocompleteDropdown;
    }
    match control.input_type.as_deref() {
        Some("email") => InputKind::Email,
        Some("number") => InputKind::Number,
        Some("date") | Some("datetime-local") | Some("month") => InputKind::Date,
        Some("range") => InputKind::Vas,
        _ => InputKind::Text,
    }
}

/// Drop placeholder options such as "" / "-- please select --".
fn meaningful_options(options: &[String]) -> Vec<String> {
    options
        .iter()
        .map(|o| collapse_whitespace(o))
        .filter(|o| {
            let lower = o.to_lowercase();
            !o.is_empty()
                && !o.chars().all(|c| c == '-' || c.is_whitespace())
                && !lower.contains("please select")
                && !lower.contains("bitte wählen")
                && !lower.contains("choose")
        })
        .collect()
}

// ============================================================================
// Secondary classification
// ============================================================================

const DATE_VOCABULARY: &[&str] = &[
    "date",
    "datum",
    "geburtsdatum",
    "birthday",
    "birthdate",
    "date of birth",
    "datepicker",
    "dd.mm",
    "tt.mm",
    "mm/dd",
    "yyyy",
    "jjjj",
];

const WEIGHT_VOCABULARY: &[&str] = &[
    "weight",
    "gewicht",
    "körpergewicht",
    "kg",
    "kilogram",
    "kilogramm",
    "lbs",
    "pounds",
];

/// Promote plain text fields that are really date pickers or unit-entry fields.
pub fn refine_input_kind(kind: InputKind, question_text: &str, metadata: &str) -> InputKind {
    if kind != InputKind::Text {
        return kind;
    }
    let haystack = format!("{} {}", question_text, metadata).to_lowercase();
    if contains_vocabulary(&haystack, DATE_VOCABULARY) {
        InputKind::Date
    } else if contains_vocabulary(&haystack, WEIGHT_VOCABULARY) {
        InputKind::AutocompleteDropdown
    } else {
        kind
    }
}

fn contains_vocabulary(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|word| {
        haystack.match_indices(word).any(|(at, _)| {
            let before = haystack[..at].chars().next_back();
            let after = haystack[at + word.len()..].chars().next();
            // short unit words must stand alone ("kg" yes, "background" no)
            let alone = |c: Option<char>| c.is_none_or(|c| !c.is_alphanumeric());
            word.len() > 4 || (alone(before) && alone(after))
        })
    })
}

// ============================================================================
// Selector construction
// ============================================================================

/// Build a container selector that always starts with the root selector.
///
/// Preference: element id, stable data attribute, nth-of-type among
/// container-class siblings, structural path from the root, and finally a
/// content match on the question number. The nth-of-type step is pinned to
/// the container's parent so elements nested inside an earlier container
/// never match.
pub fn container_selector(
    root: &str,
    raw: &RawQuestion,
    container_class: &str,
    question_number: &str,
) -> String {
    if let Some(id) = raw.dom_id.as_deref().filter(|id| !id.is_empty()) {
        return if is_css_identifier(id) {
            format!("{} #{}", root, id)
        } else {
            format!("{} [id=\"{}\"]", root, id.replace('"', "\\\""))
        };
    }

    if let Some((name, value)) = raw.data_attributes.iter().find(|(_, v)| !v.is_empty()) {
        return format!("{} [{}=\"{}\"]", root, name, value.replace('"', "\\\""));
    }

    let path = raw
        .ancestor_path
        .as_deref()
        .map(str::trim)
        .filter(|p| *p != ">" && !p.is_empty());

    if let Some(n) = raw.nth_of_type {
        let tag = if raw.tag.is_empty() { "div" } else { &raw.tag };
        let step = format!("{}[class*=\"{}\"]:nth-of-type({})", tag, container_class, n);
        return match path.and_then(parent_path) {
            Some(parent) if parent.is_empty() => format!("{} > {}", root, step),
            Some(parent) => format!("{} {} > {}", root, parent, step),
            // no parent chain: at least keep out matches nested in another container
            None => format!("{} {}:not([class*=\"{}\"] *)", root, step, container_class),
        };
    }

    if let Some(path) = path {
        return format!("{} {}", root, path);
    }

    if !question_number.is_empty() {
        return format!(
            "{} [class*=\"{}\"]:has-text(\"{}.\")",
            root, container_class, question_number
        );
    }

    format!("{} [class*=\"{}\"]", root, container_class)
}

/// The child-combinator chain leading to the container's parent, taken from
/// a `> a:nth-of-type(1) > b:nth-of-type(2)` ancestor path. Empty when the
/// container sits directly under the root.
fn parent_path(ancestor_path: &str) -> Option<String> {
    let (parent, last) = ancestor_path.rsplit_once('>')?;
    if last.trim().is_empty() {
        return None;
    }
    Some(parent.trim().to_string())
}

/// Scope a container-relative locator under its container.
pub fn scoped(container: &str, locator: &str) -> String {
    if locator.is_empty() {
        container.to_string()
    } else {
        format!("{} {}", container, locator)
    }
}

fn is_css_identifier(id: &str) -> bool {
    id.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '-')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
