mod common;

use common::field;
use survey_walker::classify::advisor::StaticAdvisor;
use survey_walker::classify::field_type::FieldType;
use survey_walker::classify::registry::{ClassificationMethod, FieldTypeRegistry};
use survey_walker::survey::model::InputKind;
use survey_walker::testdata::generator::{GENERATOR_NAME, GenerationError, TestDataGenerator};
use survey_walker::testdata::model::{
    Category, ProvenanceSource, Strategy, TestCase, TestCaseStatus, TestDataSet,
};
use survey_walker::testdata::templates::{TemplateRegistry, TestCaseTemplate};

fn with_choices(kind: InputKind, text: &str, choices: &[&str]) -> survey_walker::survey::model::FieldRecord {
    let mut f = field("1", text, kind);
    f.choices = choices.iter().map(|c| c.to_string()).collect();
    f
}

// =========================================================================
// Choice strategy
// =========================================================================

#[test]
fn radio_gets_one_valid_case_per_choice() {
    let generator = TestDataGenerator::default();
    let set = generator
        .generate(&with_choices(InputKind::Radio, "How often?", &["Never", "Sometimes", "Often"]))
        .expect("generate");

    assert_eq!(set.summary.strategy, Strategy::Choice);
    assert_eq!(set.summary.total, 3);
    assert_eq!(set.summary.valid, 3);

    let values: Vec<&str> = set.test_cases.iter().map(|t| t.value()).collect();
    assert_eq!(values, vec!["0", "1", "2"]);
    assert_eq!(set.test_cases[1].description(), "Choice 2: Sometimes");
    assert!(set.test_cases.iter().all(|t| t.quality_score() == 1.0));
}

#[test]
fn dropdown_uses_choices_too() {
    let generator = TestDataGenerator::default();
    let set = generator
        .generate(&with_choices(InputKind::Dropdown, "Country", &["Germany", "Austria"]))
        .expect("generate");
    assert_eq!(set.summary.strategy, Strategy::Choice);
    assert_eq!(set.summary.total, 2);
}

#[test]
fn checkbox_uses_templates_filtered_by_applicability() {
    let generator = TestDataGenerator::default();

    let single = generator
        .generate(&with_choices(InputKind::Checkbox, "Symptoms", &["Fever"]))
        .expect("generate");
    assert_eq!(single.summary.strategy, Strategy::Template);
    assert!(single.test_cases.iter().all(|t| t.value() != "0,1"));

    let several = generator
        .generate(&with_choices(InputKind::Checkbox, "Symptoms", &["Fever", "Cough"]))
        .expect("generate");
    assert!(several.test_cases.iter().any(|t| t.value() == "0,1"));
}

// =========================================================================
// Template strategy
// =========================================================================

#[test]
fn email_template_covers_every_category_it_defines() {
    let generator = TestDataGenerator::default();
    let set = generator
        .generate(&field("2", "Your e-mail address", InputKind::Email))
        .expect("generate");

    assert_eq!(set.summary.field_type, FieldType::Email);
    assert_eq!(set.summary.strategy, Strategy::Template);
    assert_eq!(set.first_valid().map(|t| t.value()), Some("test.user@example.com"));
    assert_eq!(set.summary.invalid, set.by_category(Category::Invalid).count());
    assert_eq!(
        set.summary.total,
        set.summary.valid + set.summary.boundary + set.summary.edge + set.summary.invalid
    );
}

#[test]
fn empty_value_case_only_for_required_fields() {
    let generator = TestDataGenerator::default();
    let mut optional = field("3", "Comments", InputKind::Text);
    optional.is_required = false;

    let required = generator.generate(&field("3", "Comments", InputKind::Text)).expect("generate");
    let not_required = generator.generate(&optional).expect("generate");

    assert!(required.test_cases.iter().any(|t| t.value().is_empty()));
    assert!(!not_required.test_cases.iter().any(|t| t.value().is_empty()));
}

#[test]
fn static_fields_get_an_empty_informational_set() {
    let generator = TestDataGenerator::default();
    let set = generator
        .generate(&field("", "Please read carefully.", InputKind::Static))
        .expect("generate");

    assert!(set.test_cases.is_empty());
    assert_eq!(set.summary.field_type, FieldType::Informational);
    assert_eq!(set.summary.strategy, Strategy::None);
    assert!(generator.registry().unknown_fields().is_empty());
}

#[test]
fn missing_template_falls_back_to_free_text() {
    let mut templates = TemplateRegistry::empty();
    templates.register(
        FieldType::FreeText,
        vec![TestCaseTemplate::new("only", Category::Valid, "x", "Only entry", 0.5)],
    );
    let generator = TestDataGenerator::new(FieldTypeRegistry::with_defaults(), templates);

    let set = generator
        .generate(&field("4", "Your phone number", InputKind::Text))
        .expect("generate");
    assert_eq!(set.summary.field_type, FieldType::Phone);
    assert_eq!(set.first_valid().map(|t| t.value()), Some("x"));
}

#[test]
fn no_template_at_all_is_an_error() {
    let generator = TestDataGenerator::new(FieldTypeRegistry::with_defaults(), TemplateRegistry::empty());
    let result = generator.generate(&field("4", "Your phone number", InputKind::Text));
    assert!(matches!(result, Err(GenerationError::NoTemplate { .. })));
}

// =========================================================================
// Ids + provenance
// =========================================================================

#[test]
fn case_ids_are_deterministic_per_field() {
    let generator = TestDataGenerator::default();
    let a = generator.generate(&field("5", "Your age", InputKind::Number)).expect("generate");
    let b = generator.generate(&field("5", "Your age", InputKind::Number)).expect("generate");
    let other = generator.generate(&field("6", "Your age", InputKind::Number)).expect("generate");

    let ids = |set: &TestDataSet| set.test_cases.iter().map(|t| t.id().to_string()).collect::<Vec<_>>();
    assert_eq!(ids(&a), ids(&b));
    assert_ne!(ids(&a), ids(&other));
    assert!(ids(&a).iter().all(|id| id.starts_with("tc-") && id.len() == 15));
}

#[test]
fn provenance_names_generator_and_method() {
    let generator = TestDataGenerator::default();
    let set = generator.generate(&field("7", "Your age", InputKind::Number)).expect("generate");
    let provenance = set.test_cases[0].provenance();

    assert_eq!(provenance.source, ProvenanceSource::Generated);
    let info = provenance.generator_info.as_ref().expect("generator info");
    assert_eq!(info.generator, GENERATOR_NAME);
    assert_eq!(info.method, ClassificationMethod::Pattern { id: "age".into() });
}

#[test]
fn advisor_classification_is_hybrid() {
    let registry = FieldTypeRegistry::with_defaults()
        .with_advisor(Box::new(StaticAdvisor::new(&[("allerg", FieldType::LongText)])));
    let generator = TestDataGenerator::new(registry, TemplateRegistry::with_defaults());

    let set = generator
        .generate(&field("8", "List your allergies", InputKind::Text))
        .expect("generate");
    assert_eq!(set.summary.field_type, FieldType::LongText);
    assert!(
        set.test_cases
            .iter()
            .all(|t| t.provenance().source == ProvenanceSource::Hybrid)
    );
}

#[test]
fn new_cases_are_pending_and_only_status_changes() {
    let provenance = survey_walker::testdata::model::Provenance {
        source: ProvenanceSource::Human,
        generator_info: None,
    };
    let mut case = TestCase::new("1", Category::Edge, "x", "Edge", provenance, 2.0);

    assert_eq!(case.status(), TestCaseStatus::Pending);
    assert_eq!(case.quality_score(), 1.0);

    let id = case.id().to_string();
    case.set_status(TestCaseStatus::Approved);
    assert_eq!(case.status(), TestCaseStatus::Approved);
    assert_eq!(case.id(), id);
}

#[test]
fn test_data_serializes_with_summary() {
    let generator = TestDataGenerator::default();
    let set = generator.generate(&field("9", "Your age", InputKind::Number)).expect("generate");
    let json = serde_json::to_value(&set).expect("serialize");

    assert_eq!(json["summary"]["fieldType"], "age");
    assert_eq!(json["summary"]["strategy"], "template");
    assert_eq!(json["testCases"][0]["category"], "valid");
    assert_eq!(json["testCases"][0]["status"], "pending");
}
