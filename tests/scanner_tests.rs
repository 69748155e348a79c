mod common;

use common::fake_survey::{FakeControl, FakePage, FakeQuestion, FakeSurvey};
use common::scanner;
use survey_walker::classify::field_type::FieldType;
use survey_walker::survey::model::{InputKind, NavKind};
use survey_walker::survey::raw::{RawControl, RawQuestion};
use survey_walker::testdata::model::Strategy;

fn intake_page() -> FakeSurvey {
    FakeSurvey::new(vec![FakePage::new(
        "About you",
        vec![
            FakeQuestion::new("intro", "Please answer honestly.", FakeControl::None),
            FakeQuestion::radio("q-1", "1. Do you smoke? *", &["Yes", "No"]),
            FakeQuestion::new("q-2", "2. Date of birth *", FakeControl::Text),
            FakeQuestion::new("q-3", "3. How intense is the pain?", FakeControl::Rating(10)),
            FakeQuestion::new("q-4", "4. Your weight", FakeControl::Text),
        ],
    )
    .with_previous()])
}

// =========================================================================
// Full scan
// =========================================================================

#[test]
fn scan_builds_one_record_per_container_in_dom_order() {
    let mut survey = intake_page();
    let page = scanner().scan(&mut survey, 0).expect("scan");

    let keys: Vec<&str> = page.fields.iter().map(|f| f.key()).collect();
    assert_eq!(keys, vec!["#survey #intro", "1", "2", "3", "4"]);
    assert_eq!(page.short_name, "About you");
}

#[test]
fn scan_assigns_kinds_and_test_data() {
    let mut survey = intake_page();
    let page = scanner().scan(&mut survey, 0).expect("scan");

    let intro = &page.fields[0];
    assert_eq!(intro.input_kind, InputKind::Static);
    let intro_data = intro.test_data.as_ref().expect("test data");
    assert_eq!(intro_data.summary.field_type, FieldType::Informational);
    assert_eq!(intro_data.summary.strategy, Strategy::None);
    assert!(intro_data.test_cases.is_empty());

    let smoke = &page.fields[1];
    assert_eq!(smoke.input_kind, InputKind::Radio);
    assert_eq!(smoke.test_data.as_ref().map(|t| t.summary.field_type), Some(FieldType::YesNo));

    // text field promoted to a date picker by its wording
    let birth = &page.fields[2];
    assert_eq!(birth.input_kind, InputKind::Date);
    assert!(birth.is_required);
    assert_eq!(birth.test_data.as_ref().map(|t| t.summary.field_type), Some(FieldType::BirthDate));

    let rating = &page.fields[3];
    assert_eq!(rating.input_kind, InputKind::Nrs);
    assert_eq!(rating.choices.len(), 11);
    assert_eq!(rating.choice_selectors.len(), 11);

    let weight = &page.fields[4];
    assert_eq!(weight.input_kind, InputKind::AutocompleteDropdown);
    assert_eq!(weight.test_data.as_ref().map(|t| t.summary.field_type), Some(FieldType::Weight));
}

#[test]
fn choice_selectors_are_scoped_under_the_container() {
    let mut survey = intake_page();
    let page = scanner().scan(&mut survey, 0).expect("scan");

    let smoke = &page.fields[1];
    assert_eq!(smoke.container_selector, "#survey #q-1");
    assert_eq!(
        smoke.choice_selectors,
        vec![
            "#survey #q-1 input[name=\"q-1\"][value=\"0\"]",
            "#survey #q-1 input[name=\"q-1\"][value=\"1\"]",
        ]
    );
    for field in &page.fields {
        assert!(field.container_selector.starts_with("#survey"));
        assert!(field.primary_selector.starts_with(&field.container_selector));
    }
}

#[test]
fn scan_classifies_navigation_buttons() {
    let mut survey = intake_page();
    let page = scanner().scan(&mut survey, 0).expect("scan");

    let kinds: Vec<NavKind> = page.navigation_buttons.iter().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![NavKind::Previous, NavKind::Next]);
}

#[test]
fn scan_scrolls_before_extracting() {
    let mut survey = intake_page();
    scanner().scan(&mut survey, 0).expect("scan");

    let first_extract = survey
        .scripts
        .iter()
        .position(|s| *s == "extract_questions")
        .expect("extraction ran");
    let scrolls = survey.scripts[..first_extract]
        .iter()
        .filter(|s| **s == "scroll_container")
        .count();
    assert_eq!(scrolls, 2);
}

// =========================================================================
// Questions
// =========================================================================

#[test]
fn duplicate_question_numbers_keep_the_first() {
    let mut survey = FakeSurvey::new(vec![FakePage::new(
        "Dupes",
        vec![
            FakeQuestion::new("a", "5. First copy", FakeControl::Text),
            FakeQuestion::new("b", "5. Second copy", FakeControl::Text),
        ],
    )]);
    let fields = scanner().scan_questions(&mut survey, "#survey").expect("scan");

    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].question_text, "First copy");
}

#[test]
fn decorative_containers_are_dropped() {
    let raw = RawQuestion {
        dom_id: Some("spacer".into()),
        text: "   ".into(),
        ..Default::default()
    };
    assert!(scanner().build_field("#survey", &raw).is_none());
}

#[test]
fn required_attribute_marks_field_required() {
    let raw = RawQuestion {
        dom_id: Some("q-9".into()),
        text: "9. Postal code".into(),
        controls: vec![RawControl {
            tag: "input".into(),
            input_type: Some("text".into()),
            required: true,
            locator: "input".into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let field = scanner().build_field("#survey", &raw).expect("field");

    assert!(field.is_required);
    assert_eq!(field.question_text, "Postal code");
    assert_eq!(field.primary_selector, "#survey #q-9 input");
}

#[test]
fn visible_question_numbers_skip_unnumbered_heads() {
    let mut survey = intake_page();
    let numbers = scanner()
        .visible_question_numbers(&mut survey, "#survey")
        .expect("heads");
    assert_eq!(numbers, vec!["1", "2", "3", "4"]);
}

#[test]
fn scan_revealed_returns_only_requested_numbers() {
    let mut survey = intake_page();
    let fields = scanner()
        .scan_revealed(&mut survey, "#survey", &["2".to_string(), "4".to_string()], 0)
        .expect("scan");

    let numbers: Vec<&str> = fields.iter().map(|f| f.question_number.as_str()).collect();
    assert_eq!(numbers, vec!["2", "4"]);
    assert!(fields.iter().all(|f| f.test_data.is_some()));
}

// =========================================================================
// Root resolution
// =========================================================================

#[test]
fn root_falls_back_to_body_when_no_selector_matches() {
    let mut survey = intake_page();
    survey.has_root = false;
    let scanner = scanner();

    assert_eq!(scanner.find_root(&mut survey), None);
    assert_eq!(scanner.resolve_root(&mut survey), ("body".to_string(), true));

    let page = scanner.scan(&mut survey, 0).expect("scan");
    assert!(page.degraded_scope);
    assert_eq!(page.fields[1].container_selector, "body #q-1");
}
