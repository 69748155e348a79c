use crate::browser::driver::Driver;
use crate::browser::error::DriverError;
use crate::browser::locator::{Locator, act_with_fallback};
use crate::survey::model::{NavButton, NavKind};
use crate::survey::raw::RawButton;

// ============================================================================
// Taxonomy
// ============================================================================

const PREVIOUS_WORDS: &[&str] = &["back", "previous", "prev", "zurück", "zuruck", "vorherige", "vorige"];
const FINISH_WORDS: &[&str] = &[
    "finish", "submit", "complete", "done", "send", "abschließen", "abschliessen", "absenden",
    "beenden", "fertig",
];
const NEXT_WORDS: &[&str] = &["next", "continue", "forward", "proceed", "weiter", "nächste", "naechste"];

const PREVIOUS_SYMBOLS: &[&str] = &["<", "«", "←", "‹"];
const NEXT_SYMBOLS: &[&str] = &[">", "»", "→", "›"];

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn kind_of(text: &str) -> Option<NavKind> {
    let trimmed = text.trim();
    if PREVIOUS_SYMBOLS.contains(&trimmed) {
        return Some(NavKind::Previous);
    }
    if NEXT_SYMBOLS.contains(&trimmed) {
        return Some(NavKind::Next);
    }

    let words = words(text);
    let has = |list: &[&str]| words.iter().any(|w| list.contains(&w.as_str()));
    // previous wins over finish, finish over next
    if has(PREVIOUS_WORDS) {
        Some(NavKind::Previous)
    } else if has(FINISH_WORDS) {
        Some(NavKind::Finish)
    } else if has(NEXT_WORDS) {
        Some(NavKind::Next)
    } else {
        None
    }
}

/// Label first, then the id/class/aria hint.
pub fn classify_button(label: &str, hint: &str) -> Option<NavKind> {
    kind_of(label).or_else(|| kind_of(hint))
}

pub fn to_nav_buttons(raw: &[RawButton]) -> Vec<NavButton> {
    raw.iter()
        .filter_map(|b| {
            classify_button(&b.label, &b.hint).map(|kind| NavButton {
                kind,
                label: b.label.clone(),
                selector: b.locator.clone(),
                enabled: b.enabled,
            })
        })
        .collect()
}

// ============================================================================
// Predicates
// ============================================================================

pub fn first_enabled(buttons: &[NavButton], kind: NavKind) -> Option<&NavButton> {
    buttons.iter().find(|b| b.kind == kind && b.enabled)
}

fn has_kind(buttons: &[NavButton], kind: NavKind) -> bool {
    buttons.iter().any(|b| b.kind == kind)
}

/// A "next" affordance and no "previous" one.
pub fn is_first_form(buttons: &[NavButton]) -> bool {
    has_kind(buttons, NavKind::Next) && !has_kind(buttons, NavKind::Previous)
}

/// A "finish" affordance and no enabled "next".
pub fn is_final_page(buttons: &[NavButton]) -> bool {
    has_kind(buttons, NavKind::Finish) && first_enabled(buttons, NavKind::Next).is_none()
}

// ============================================================================
// Clicking
// ============================================================================

/// Direct selector first, then an in-page label match.
pub fn click_button(driver: &mut dyn Driver, button: &NavButton) -> Result<String, DriverError> {
    let mut strategies = vec![Locator::css(button.selector.clone())];
    if !button.label.trim().is_empty() {
        strategies.push(Locator::label("body", button.label.clone()));
    }
    act_with_fallback(driver, &strategies, |d, selector| d.click(selector))
}
