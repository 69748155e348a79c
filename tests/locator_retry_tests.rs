mod common;

use common::fake_survey::{FakeControl, FakePage, FakeQuestion, FakeSurvey};
use common::field;
use survey_walker::browser::error::DriverError;
use survey_walker::browser::locator::{Locator, Resolution, act_with_fallback, resolve};
use survey_walker::navigator::filler::{FieldFiller, FillError, text_value};
use survey_walker::navigator::retry::{Exhausted, Pause, RetryPolicy, retry};
use survey_walker::survey::model::InputKind;

fn one_page(questions: Vec<FakeQuestion>) -> FakeSurvey {
    FakeSurvey::new(vec![FakePage::new("Only", questions).last()])
}

// =========================================================================
// Locator strategies
// =========================================================================

#[test]
fn resolve_returns_first_matching_strategy() {
    let mut survey = one_page(vec![FakeQuestion::new("q-1", "1. A", FakeControl::Text)]);
    let strategies = [
        Locator::css("#missing"),
        Locator::css("#survey #q-1"),
        Locator::css("#survey"),
    ];

    assert_eq!(
        resolve(&mut survey, &strategies),
        Resolution::Located {
            selector: "#survey #q-1".into(),
            strategy: 1
        }
    );
}

#[test]
fn resolve_reports_not_found() {
    let mut survey = one_page(vec![]);
    let strategies = [Locator::css("#missing"), Locator::label("#survey", "Yes")];

    let resolution = resolve(&mut survey, &strategies);
    assert_eq!(resolution, Resolution::NotFound);
    assert_eq!(resolution.selector(), None);
    assert!(survey.scripts.contains(&"locate_by_label"));
}

#[test]
fn failed_action_retries_once_with_next_strategy() {
    let mut survey = one_page(vec![
        FakeQuestion::new("q-1", "1. A", FakeControl::Text),
        FakeQuestion::new("q-2", "2. B", FakeControl::Text),
    ]);
    let strategies = [
        Locator::css("#survey #q-1"),
        Locator::css("#survey #q-2"),
    ];
    let mut attempts = Vec::new();

    let used = act_with_fallback(&mut survey, &strategies, |_, selector| {
        attempts.push(selector.to_string());
        if attempts.len() == 1 {
            Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
            })
        } else {
            Ok(())
        }
    })
    .expect("alternate succeeds");

    assert_eq!(used, "#survey #q-2");
    assert_eq!(attempts, vec!["#survey #q-1", "#survey #q-2"]);
}

#[test]
fn failed_action_without_alternate_returns_first_error() {
    let mut survey = one_page(vec![FakeQuestion::new("q-1", "1. A", FakeControl::Text)]);
    let strategies = [Locator::css("#survey #q-1"), Locator::css("#missing")];

    let err = act_with_fallback(&mut survey, &strategies, |_, _| {
        Err(DriverError::SessionIO("detached".into()))
    })
    .expect_err("no alternate");

    assert!(matches!(err, DriverError::SessionIO(_)));
}

// =========================================================================
// Retry
// =========================================================================

#[derive(Default)]
struct Clock {
    pauses: Vec<u64>,
}

impl Pause for Clock {
    fn pause(&mut self, ms: u64) {
        self.pauses.push(ms);
    }
}

#[test]
fn retry_stops_at_first_success() {
    let mut clock = Clock::default();
    let policy = RetryPolicy {
        max_attempts: 5,
        interval_ms: 100,
    };

    let result: Result<u32, Exhausted<String>> = retry(&mut clock, &policy, |_, attempt| {
        if attempt < 3 { Err(format!("attempt {}", attempt)) } else { Ok(attempt) }
    });

    assert_eq!(result, Ok(3));
    assert_eq!(clock.pauses, vec![100, 100]);
}

#[test]
fn retry_gives_up_with_last_error() {
    let mut clock = Clock::default();
    let policy = RetryPolicy {
        max_attempts: 3,
        interval_ms: 50,
    };

    let result: Result<(), Exhausted<String>> =
        retry(&mut clock, &policy, |_, attempt| Err(format!("attempt {}", attempt)));

    let exhausted = result.expect_err("exhausted");
    assert_eq!(exhausted.attempts, 3);
    assert_eq!(exhausted.last_error.as_deref(), Some("attempt 3"));
    assert_eq!(exhausted.to_string(), "gave up after 3 attempts: attempt 3");
    // no pause after the final attempt
    assert_eq!(clock.pauses.len(), 2);
}

#[test]
fn zero_attempts_never_runs() {
    let mut clock = Clock::default();
    let policy = RetryPolicy {
        max_attempts: 0,
        interval_ms: 50,
    };
    let mut ran = false;

    let result: Result<(), Exhausted<String>> = retry(&mut clock, &policy, |_, _| {
        ran = true;
        Ok(())
    });

    assert!(!ran);
    assert_eq!(result.expect_err("exhausted").last_error, None);
}

#[test]
fn drivers_pause_through_wait_idle() {
    let mut survey = one_page(vec![]);
    survey.pause(250);
    assert_eq!(survey.waits, vec![250]);
}

// =========================================================================
// Filler
// =========================================================================

#[test]
fn text_value_defaults_per_kind() {
    assert_eq!(text_value(&field("1", "When?", InputKind::Date)), "15.03.2021");
    assert_eq!(text_value(&field("1", "Mail", InputKind::Email)), "test.user@example.com");
    assert_eq!(text_value(&field("1", "Count", InputKind::Number)), "42");
    assert_eq!(text_value(&field("1", "Other", InputKind::Text)), "Sample answer");
}

#[test]
fn static_fields_cannot_be_filled() {
    let mut survey = one_page(vec![]);
    let err = FieldFiller::default()
        .fill(&mut survey, &field("1", "Note", InputKind::Static))
        .expect_err("static");
    assert!(matches!(err, FillError::NoControl { .. }));
}

#[test]
fn fill_falls_back_to_container_input() {
    let mut survey = one_page(vec![FakeQuestion::new("q-1", "1. Your name", FakeControl::Text)]);
    let mut target = field("1", "Your name", InputKind::Text);
    target.primary_selector = "#survey #stale-id".into();

    let value = FieldFiller::new(0, 0.5).fill(&mut survey, &target).expect("fill");

    assert_eq!(value, "Sample answer");
    assert_eq!(survey.typed[0].0, "#survey #q-1 input:not([type=\"hidden\"])");
}

#[test]
fn analog_position_is_clamped() {
    assert_eq!(FieldFiller::new(0, 1.7).analog_position, 1.0);
    assert_eq!(FieldFiller::new(0, -0.2).analog_position, 0.0);
}

#[test]
fn analog_scale_uses_configured_position_without_test_data() {
    let mut survey = one_page(vec![FakeQuestion::new("q-1", "1. Pain", FakeControl::Slider)]);
    let value = FieldFiller::new(0, 0.25)
        .fill(&mut survey, &field("1", "Pain", InputKind::Vas))
        .expect("fill");

    assert_eq!(value, "25");
    assert!(survey.scripts.contains(&"set_analog_scale"));
    assert!(survey.clicks.is_empty());
}
