#![allow(dead_code)]

pub mod fake_survey;

use survey_walker::navigator::navigator::{NavigationConfig, Navigator};
use survey_walker::navigator::retry::RetryPolicy;
use survey_walker::survey::model::{FieldRecord, InputKind};
use survey_walker::survey::scanner::{FormScanner, ScanConfig};
use survey_walker::testdata::generator::TestDataGenerator;

pub fn scanner() -> FormScanner {
    FormScanner::new(ScanConfig::default(), TestDataGenerator::default())
}

/// Short settle times and a three-attempt transition poll.
pub fn fast_config() -> NavigationConfig {
    NavigationConfig {
        settle_ms: 10,
        transition: RetryPolicy {
            max_attempts: 3,
            interval_ms: 5,
        },
        ..NavigationConfig::default()
    }
}

pub fn navigator() -> Navigator {
    Navigator::new(scanner(), fast_config())
}

pub fn navigator_with(config: NavigationConfig) -> Navigator {
    Navigator::new(scanner(), config)
}

/// Bare field record addressed the way the scanner would address it.
pub fn field(number: &str, text: &str, kind: InputKind) -> FieldRecord {
    let container = format!("#survey #q-{}", number.replace('.', "-"));
    FieldRecord {
        question_number: number.to_string(),
        question_text: text.to_string(),
        input_kind: kind,
        is_required: true,
        choices: vec![],
        choice_selectors: vec![],
        primary_selector: container.clone(),
        container_selector: container,
        test_data: None,
        conditional_info: None,
        screenshot: None,
    }
}
