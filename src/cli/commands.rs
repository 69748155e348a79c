use serde_json::json;

use crate::browser::session::BrowserSession;
use crate::classify::advisor::OllamaAdvisor;
use crate::classify::registry::FieldTypeRegistry;
use crate::cli::config::{AdvisorConfig, EngineConfig};
use crate::survey::model::{FieldRecord, InputKind};
use crate::survey::selectors::{extract_required_marker, split_question_number};
use crate::testdata::generator::TestDataGenerator;
use crate::testdata::templates::TemplateRegistry;
use crate::{SurveyRun, run_survey};

// ============================================================================
// walk subcommand
// ============================================================================

pub fn cmd_walk(
    url: &str,
    config: &EngineConfig,
    output: Option<&str>,
    reset: bool,
    verbose: u8,
) -> Result<SurveyRun, Box<dyn std::error::Error>> {
    let mut session = BrowserSession::launch(&config.browser.helper_script, config.browser.headless)?;

    if verbose > 0 {
        eprintln!(
            "Walking {} (max_pages={}, reset={})...",
            url, config.navigation.max_pages, reset
        );
    }

    session.navigate(url)?;
    let run = run_survey(&mut session, config, reset);
    session.quit()?;

    let json = serde_json::to_string_pretty(&run)?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!("Report written to {}", path);
        }
        None => println!("{}", json),
    }

    // Print summary
    eprintln!(
        "Visited {} pages, {} fields, {} validation retries: {:?}",
        run.report.pages.len(),
        run.report.field_count(),
        run.report.total_validation_retries(),
        run.report.outcome
    );
    for visit in &run.report.visits {
        eprintln!(
            "  [{}] {} (filled {}, discovered {}, retries {})",
            visit.index, visit.short_name, visit.filled, visit.discovered, visit.validation_retries
        );
    }

    Ok(run)
}

// ============================================================================
// classify subcommand
// ============================================================================

/// Classify one question offline and return the JSON that gets printed.
pub fn cmd_classify(
    text: &str,
    kind: &str,
    choices: &[String],
    advisor: &AdvisorConfig,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let input_kind = InputKind::parse(kind).ok_or_else(|| format!("unknown input kind '{}'", kind))?;
    let (question_number, rest) = split_question_number(text);
    let (is_required, question_text) = extract_required_marker(&rest);

    let field = FieldRecord {
        question_number,
        question_text,
        input_kind,
        is_required,
        choices: choices.to_vec(),
        choice_selectors: vec![],
        primary_selector: String::new(),
        container_selector: String::new(),
        test_data: None,
        conditional_info: None,
        screenshot: None,
    };

    let generator = build_generator(advisor);
    let test_data = generator.generate(&field)?;

    let result = json!({
        "field": field,
        "testData": test_data,
        "unknownFields": generator.registry().unknown_fields(),
    });
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result)
}

// ============================================================================
// Helpers
// ============================================================================

/// Default patterns and templates, plus the Ollama advisor when enabled.
pub fn build_generator(advisor: &AdvisorConfig) -> TestDataGenerator {
    let mut registry = FieldTypeRegistry::with_defaults();
    if advisor.enabled {
        let defaults = OllamaAdvisor::default();
        let endpoint = advisor.endpoint.as_deref().unwrap_or(&defaults.endpoint);
        let model = advisor.model.as_deref().unwrap_or(&defaults.model);
        registry = registry.with_advisor(Box::new(OllamaAdvisor::new(endpoint, model)));
    }
    TestDataGenerator::new(registry, TemplateRegistry::with_defaults())
}
