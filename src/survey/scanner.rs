use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::browser::driver::{Driver, evaluate_as};
use crate::browser::error::DriverError;
use crate::browser::locator::{Locator, Resolution, resolve};
use crate::browser::script::PageScript;
use crate::navigator::buttons::to_nav_buttons;
use crate::survey::capture::capture_field;
use crate::survey::model::{FieldRecord, InputKind, NavButton, PageRecord};
use crate::survey::raw::{RawButton, RawQuestion, RawTitle};
use crate::survey::selectors::{
    collapse_whitespace, container_selector, detect_control, extract_required_marker,
    refine_input_kind, scoped, split_question_number, strip_choice_labels,
};
use crate::testdata::generator::TestDataGenerator;

/// Selector used when no configured root matches.
pub const BODY_SCOPE: &str = "body";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{stage} failed: {source}")]
    Driver {
        stage: &'static str,
        #[source]
        source: DriverError,
    },
}

impl ScanError {
    fn at(stage: &'static str) -> impl FnOnce(DriverError) -> ScanError {
        move |source| ScanError::Driver { stage, source }
    }
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Tried in order; the page body is the last resort.
    #[serde(default = "default_root_selectors")]
    pub root_selectors: Vec<String>,

    /// Fuzzy class-name fragment identifying question containers.
    #[serde(default = "default_container_class")]
    pub container_class: String,

    #[serde(default = "default_scroll_pause")]
    pub scroll_pause_ms: u64,

    /// Screenshots are written here when set.
    #[serde(default)]
    pub capture_dir: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_selectors: default_root_selectors(),
            container_class: default_container_class(),
            scroll_pause_ms: default_scroll_pause(),
            capture_dir: None,
        }
    }
}

fn default_root_selectors() -> Vec<String> {
    vec!["#survey".to_string(), "[class*=\"survey\"]".to_string()]
}
fn default_container_class() -> String { "question".to_string() }
fn default_scroll_pause() -> u64 { 400 }

// ============================================================================
// Scanner
// ============================================================================

/// Turns the rendered step into a `PageRecord`.
pub struct FormScanner {
    config: ScanConfig,
    generator: TestDataGenerator,
}

impl FormScanner {
    pub fn new(config: ScanConfig, generator: TestDataGenerator) -> Self {
        FormScanner { config, generator }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn generator(&self) -> &TestDataGenerator {
        &self.generator
    }

    /// First configured root that currently matches.
    pub fn find_root(&self, driver: &mut dyn Driver) -> Option<String> {
        let strategies: Vec<Locator> = self
            .config
            .root_selectors
            .iter()
            .map(Locator::css)
            .collect();

        match resolve(driver, &strategies) {
            Resolution::Located { selector, .. } => Some(selector),
            Resolution::NotFound => None,
        }
    }

    /// `find_root`, else the body (degraded).
    pub fn resolve_root(&self, driver: &mut dyn Driver) -> (String, bool) {
        match self.find_root(driver) {
            Some(root) => (root, false),
            None => {
                warn!(tried = ?self.config.root_selectors, "survey root not found, scanning page body");
                (BODY_SCOPE.to_string(), true)
            }
        }
    }

    /// Full pass over the current step.
    pub fn scan(&self, driver: &mut dyn Driver, page_index: usize) -> Result<PageRecord, ScanError> {
        let (root, degraded_scope) = self.resolve_root(driver);
        self.materialize(driver, &root);

        let title = match evaluate_as::<Option<RawTitle>>(
            driver,
            &PageScript::ExtractTitle { root: root.clone() },
        ) {
            Ok(title) => title.unwrap_or_default(),
            Err(e) => {
                warn!(page = page_index, error = %e, "title extraction failed");
                RawTitle::default()
            }
        };

        let mut fields = self.scan_questions(driver, &root)?;
        for field in fields.iter_mut() {
            self.enrich(driver, field, page_index);
        }

        let navigation_buttons = match self.nav_buttons(driver) {
            Ok(buttons) => buttons,
            Err(e) => {
                warn!(page = page_index, error = %e, "navigation button extraction failed");
                vec![]
            }
        };

        info!(
            page = page_index,
            short_name = %title.short_name,
            fields = fields.len(),
            buttons = navigation_buttons.len(),
            "page scanned"
        );

        Ok(PageRecord {
            index: page_index,
            long_title: collapse_whitespace(&title.long_title),
            short_name: collapse_whitespace(&title.short_name),
            fields,
            navigation_buttons,
            degraded_scope,
            screenshot: None,
        })
    }

    /// Scroll to the end and back so lazily mounted widgets render.
    fn materialize(&self, driver: &mut dyn Driver, root: &str) {
        for to_end in [true, false] {
            let script = PageScript::ScrollContainer {
                root: root.to_string(),
                to_end,
            };
            if let Err(e) = driver.evaluate(&script) {
                debug!(error = %e, "scroll failed");
            }
            driver.wait_idle(self.config.scroll_pause_ms);
        }
    }

    /// Every meaningful question container, without capture or test data.
    /// Repeated question numbers keep their first occurrence.
    pub fn scan_questions(
        &self,
        driver: &mut dyn Driver,
        root: &str,
    ) -> Result<Vec<FieldRecord>, ScanError> {
        let raw: Vec<RawQuestion> = evaluate_as(
            driver,
            &PageScript::ExtractQuestions {
                root: root.to_string(),
                container_class: self.config.container_class.clone(),
            },
        )
        .map_err(ScanError::at("question extraction"))?;

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(raw.len());
        for question in &raw {
            let Some(field) = self.build_field(root, question) else {
                continue;
            };
            if !field.question_number.is_empty() && !seen.insert(field.question_number.clone()) {
                warn!(question = %field.question_number, "duplicate question number, keeping the first");
                continue;
            }
            fields.push(field);
        }
        Ok(fields)
    }

    /// Convert one container into a field. `None` for decorative containers
    /// with neither text nor a question number.
    pub fn build_field(&self, root: &str, raw: &RawQuestion) -> Option<FieldRecord> {
        let (question_number, text) = split_question_number(&raw.text);
        let detected = detect_control(raw);

        // choice labels are part of the container text only for radio/checkbox groups
        let text = if matches!(detected.kind, InputKind::Radio | InputKind::Checkbox) {
            strip_choice_labels(&text, &detected.choices)
        } else {
            text
        };
        let (marked, question_text) = extract_required_marker(&text);

        if question_text.is_empty() && question_number.is_empty() {
            return None;
        }

        let input_kind = refine_input_kind(detected.kind, &question_text, &raw.metadata);
        let container = container_selector(
            root,
            raw,
            &self.config.container_class,
            &question_number,
        );

        Some(FieldRecord {
            input_kind,
            is_required: marked || detected.required_attribute,
            choice_selectors: detected
                .choice_locators
                .iter()
                .map(|l| scoped(&container, l))
                .collect(),
            choices: detected.choices,
            primary_selector: scoped(&container, &detected.primary_locator),
            container_selector: container,
            question_number,
            question_text,
            test_data: None,
            conditional_info: None,
            screenshot: None,
        })
    }

    /// Attach a screenshot and test data. Failures leave the payload empty.
    pub fn enrich(&self, driver: &mut dyn Driver, field: &mut FieldRecord, page_index: usize) {
        if let Some(dir) = &self.config.capture_dir {
            match capture_field(driver, dir, page_index, field) {
                Ok(path) => field.screenshot = Some(path),
                Err(e) => warn!(page = page_index, question = %field.key(), error = %e, "field capture failed"),
            }
        }

        match self.generator.generate(field) {
            Ok(set) => field.test_data = Some(set),
            Err(e) => {
                warn!(page = page_index, question = %field.key(), error = %e, "test data generation failed");
                field.test_data = None;
            }
        }
    }

    pub fn nav_buttons(&self, driver: &mut dyn Driver) -> Result<Vec<NavButton>, DriverError> {
        let raw: Vec<RawButton> = evaluate_as(driver, &PageScript::ExtractNavButtons)?;
        Ok(to_nav_buttons(&raw))
    }

    /// Question numbers of the currently visible containers, in DOM order.
    pub fn visible_question_numbers(
        &self,
        driver: &mut dyn Driver,
        root: &str,
    ) -> Result<Vec<String>, ScanError> {
        let heads: Vec<String> = evaluate_as(
            driver,
            &PageScript::QuestionHeads {
                root: root.to_string(),
                container_class: self.config.container_class.clone(),
            },
        )
        .map_err(ScanError::at("question snapshot"))?;

        Ok(heads
            .iter()
            .map(|head| split_question_number(head).0)
            .filter(|n| !n.is_empty())
            .collect())
    }

    /// Scan and enrich only the questions whose numbers are listed.
    pub fn scan_revealed(
        &self,
        driver: &mut dyn Driver,
        root: &str,
        numbers: &[String],
        page_index: usize,
    ) -> Result<Vec<FieldRecord>, ScanError> {
        let mut revealed: Vec<FieldRecord> = self
            .scan_questions(driver, root)?
            .into_iter()
            .filter(|f| numbers.contains(&f.question_number))
            .collect();
        for field in revealed.iter_mut() {
            self.enrich(driver, field, page_index);
        }
        Ok(revealed)
    }
}
