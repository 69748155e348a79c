use thiserror::Error;
use tracing::debug;

use crate::classify::field_type::FieldType;
use crate::classify::registry::{Classification, ClassificationMethod, FieldTypeRegistry};
use crate::survey::model::{FieldRecord, InputKind};
use crate::testdata::model::{
    Category, GeneratorInfo, Provenance, ProvenanceSource, Strategy, TestCase, TestDataSet,
};
use crate::testdata::templates::TemplateRegistry;

pub const GENERATOR_NAME: &str = "survey-walker";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no test-data template for {field_type:?} and no generic fallback")]
    NoTemplate { field_type: FieldType },
}

/// Turns a classified field into an ordered list of test cases.
///
/// Output depends only on the field and the registered patterns/templates;
/// the registry's usage counters are the only state that changes.
pub struct TestDataGenerator {
    registry: FieldTypeRegistry,
    templates: TemplateRegistry,
}

impl Default for TestDataGenerator {
    fn default() -> Self {
        Self::new(FieldTypeRegistry::with_defaults(), TemplateRegistry::with_defaults())
    }
}

impl TestDataGenerator {
    pub fn new(registry: FieldTypeRegistry, templates: TemplateRegistry) -> Self {
        TestDataGenerator {
            registry,
            templates,
        }
    }

    pub fn registry(&self) -> &FieldTypeRegistry {
        &self.registry
    }

    pub fn generate(&self, field: &FieldRecord) -> Result<TestDataSet, GenerationError> {
        if !field.input_kind.is_interactive() {
            return Ok(TestDataSet::new(
                vec![],
                FieldType::Informational,
                100,
                ClassificationMethod::KindFallback,
                Strategy::None,
            ));
        }

        let classification =
            self.registry
                .classify(&field.question_text, field.input_kind, &field.choices);

        let choice_based = matches!(field.input_kind, InputKind::Radio | InputKind::Dropdown)
            && !field.choices.is_empty();

        let (cases, strategy) = if choice_based {
            (choice_cases(field, &classification), Strategy::Choice)
        } else {
            (self.template_cases(field, &classification)?, Strategy::Template)
        };

        debug!(
            question = %field.key(),
            field_type = classification.field_type.as_str(),
            cases = cases.len(),
            "generated test data"
        );

        Ok(TestDataSet::new(
            cases,
            classification.field_type,
            classification.confidence,
            classification.method,
            strategy,
        ))
    }

    fn template_cases(
        &self,
        field: &FieldRecord,
        classification: &Classification,
    ) -> Result<Vec<TestCase>, GenerationError> {
        let (_, entries) = self
            .templates
            .lookup(classification.template)
            .ok_or(GenerationError::NoTemplate {
                field_type: classification.template,
            })?;

        Ok(entries
            .iter()
            .filter(|entry| entry.applies.holds_for(field))
            .map(|entry| {
                TestCase::new(
                    field.key(),
                    entry.category,
                    &entry.value,
                    &entry.description,
                    provenance(&classification.method, &entry.id),
                    entry.weight,
                )
            })
            .collect())
    }
}

/// One valid case per choice position, value = zero-based index.
fn choice_cases(field: &FieldRecord, classification: &Classification) -> Vec<TestCase> {
    field
        .choices
        .iter()
        .enumerate()
        .map(|(index, label)| {
            TestCase::new(
                field.key(),
                Category::Valid,
                &index.to_string(),
                &format!("Choice {}: {}", index + 1, label),
                provenance(&classification.method, "choice-index"),
                1.0,
            )
        })
        .collect()
}

fn provenance(method: &ClassificationMethod, template_id: &str) -> Provenance {
    let source = match method {
        ClassificationMethod::Advisor => ProvenanceSource::Hybrid,
        _ => ProvenanceSource::Generated,
    };
    Provenance {
        source,
        generator_info: Some(GeneratorInfo {
            generator: GENERATOR_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            template_id: template_id.to_string(),
            method: method.clone(),
        }),
    }
}
