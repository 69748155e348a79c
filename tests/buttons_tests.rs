mod common;

use common::fake_survey::{FakeControl, FakePage, FakeQuestion, FakeSurvey, NEXT};
use survey_walker::navigator::buttons::{
    classify_button, click_button, first_enabled, is_final_page, is_first_form, to_nav_buttons,
};
use survey_walker::survey::model::{NavButton, NavKind};
use survey_walker::survey::raw::RawButton;

fn button(kind: NavKind, enabled: bool) -> NavButton {
    NavButton {
        kind,
        label: format!("{:?}", kind),
        selector: format!("#{:?}", kind).to_lowercase(),
        enabled,
    }
}

// =========================================================================
// Taxonomy
// =========================================================================

#[test]
fn labels_map_to_kinds() {
    assert_eq!(classify_button("Next", ""), Some(NavKind::Next));
    assert_eq!(classify_button("Weiter", ""), Some(NavKind::Next));
    assert_eq!(classify_button("Continue »", ""), Some(NavKind::Next));
    assert_eq!(classify_button("»", ""), Some(NavKind::Next));
    assert_eq!(classify_button("Zurück", ""), Some(NavKind::Previous));
    assert_eq!(classify_button("‹", ""), Some(NavKind::Previous));
    assert_eq!(classify_button("Absenden", ""), Some(NavKind::Finish));
    assert_eq!(classify_button("Submit answers", ""), Some(NavKind::Finish));
    assert_eq!(classify_button("Help", ""), None);
}

#[test]
fn previous_beats_finish_beats_next() {
    assert_eq!(classify_button("Back to previous step", ""), Some(NavKind::Previous));
    assert_eq!(classify_button("Submit and continue", ""), Some(NavKind::Finish));
}

#[test]
fn words_match_whole_only() {
    // "next" inside "nextcloud", "send" inside "sender"
    assert_eq!(classify_button("Nextcloud login", ""), None);
    assert_eq!(classify_button("Sender info", ""), None);
}

#[test]
fn hint_is_used_when_label_is_silent() {
    assert_eq!(classify_button("", "btn btn-next"), Some(NavKind::Next));
    assert_eq!(classify_button("→", "btn-prev"), Some(NavKind::Next));
    assert_eq!(classify_button("", "icon-only"), None);
}

#[test]
fn unclassified_raw_buttons_are_dropped() {
    let raw = vec![
        RawButton {
            label: "Back".into(),
            locator: "#b".into(),
            enabled: true,
            ..Default::default()
        },
        RawButton {
            label: "Print".into(),
            locator: "#p".into(),
            enabled: true,
            ..Default::default()
        },
        RawButton {
            label: "Next".into(),
            locator: "#n".into(),
            enabled: false,
            ..Default::default()
        },
    ];
    let buttons = to_nav_buttons(&raw);

    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[0].kind, NavKind::Previous);
    assert_eq!(buttons[1].selector, "#n");
    assert!(!buttons[1].enabled);
}

// =========================================================================
// Predicates
// =========================================================================

#[test]
fn first_form_has_next_and_no_previous() {
    assert!(is_first_form(&[button(NavKind::Next, true)]));
    assert!(!is_first_form(&[button(NavKind::Previous, true), button(NavKind::Next, true)]));
    assert!(!is_first_form(&[button(NavKind::Finish, true)]));
    assert!(!is_first_form(&[]));
}

#[test]
fn final_page_has_finish_and_no_enabled_next() {
    assert!(is_final_page(&[button(NavKind::Previous, true), button(NavKind::Finish, true)]));
    assert!(is_final_page(&[button(NavKind::Finish, true), button(NavKind::Next, false)]));
    assert!(!is_final_page(&[button(NavKind::Finish, true), button(NavKind::Next, true)]));
    assert!(!is_final_page(&[button(NavKind::Next, true)]));
}

#[test]
fn first_enabled_skips_disabled_buttons() {
    let buttons = vec![
        NavButton {
            selector: "#disabled".into(),
            ..button(NavKind::Next, false)
        },
        NavButton {
            selector: "#live".into(),
            ..button(NavKind::Next, true)
        },
    ];
    assert_eq!(first_enabled(&buttons, NavKind::Next).map(|b| b.selector.as_str()), Some("#live"));
    assert!(first_enabled(&buttons, NavKind::Previous).is_none());
}

// =========================================================================
// Clicking
// =========================================================================

#[test]
fn click_uses_the_button_selector() {
    let mut survey = FakeSurvey::new(vec![
        FakePage::new("One", vec![FakeQuestion::new("q-1", "1. A", FakeControl::Text)]),
        FakePage::new("Two", vec![FakeQuestion::new("q-2", "2. B", FakeControl::Text)]).last(),
    ]);
    let next = NavButton {
        kind: NavKind::Next,
        label: "Next".into(),
        selector: NEXT.into(),
        enabled: true,
    };

    assert_eq!(click_button(&mut survey, &next).expect("click"), NEXT);
    assert_eq!(survey.current, 1);
}

#[test]
fn click_fails_when_no_strategy_resolves() {
    let mut survey = FakeSurvey::new(vec![FakePage::new("One", vec![])]);
    let ghost = NavButton {
        kind: NavKind::Next,
        label: "Next".into(),
        selector: "#ghost".into(),
        enabled: true,
    };

    assert!(click_button(&mut survey, &ghost).is_err());
    assert!(survey.clicks.is_empty());
}
