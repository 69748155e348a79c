use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::browser::driver::{Driver, evaluate_as};
use crate::browser::error::DriverError;
use crate::browser::script::PageScript;
use crate::navigator::buttons::{click_button, first_enabled, is_final_page};
use crate::navigator::discovery::{QuestionSnapshot, splice_after};
use crate::navigator::filler::FieldFiller;
use crate::navigator::retry::{Exhausted, RetryPolicy, retry};
use crate::navigator::state::{NavState, PageVisit, TransitionResult, WalkOutcome, WalkReport};
use crate::navigator::validation::{close_modal, is_empty, probe_modal};
use crate::survey::capture::capture_page;
use crate::survey::model::{ConditionalInfo, FieldRecord, InputKind, NavKind, PageIdentity, PageRecord};
use crate::survey::scanner::{BODY_SCOPE, FormScanner};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{NavTraceEvent, now_ms};

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    /// Fixed pause after clicks, typed input and modal closes.
    #[serde(default = "default_settle")]
    pub settle_ms: u64,

    /// Polling for question content after a navigation click.
    #[serde(default)]
    pub transition: RetryPolicy,

    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Track position (0.0–1.0) for analog scales.
    #[serde(default = "default_analog_position")]
    pub analog_position: f64,

    /// JSONL navigation trace, disabled when unset.
    #[serde(default)]
    pub trace_path: Option<PathBuf>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            settle_ms: default_settle(),
            transition: RetryPolicy::default(),
            max_pages: default_max_pages(),
            analog_position: default_analog_position(),
            trace_path: None,
        }
    }
}

fn default_settle() -> u64 { 500 }
fn default_max_pages() -> usize { 50 }
fn default_analog_position() -> f64 { 0.5 }

/// Required fields get filled; analog scales always get an interaction
/// since their default position cannot be told apart from an answer.
pub fn needs_interaction(field: &FieldRecord) -> bool {
    field.input_kind.is_interactive() && (field.is_required || field.input_kind == InputKind::Vas)
}

// ============================================================================
// Navigator
// ============================================================================

/// Per-page fill / discover / navigate state machine.
pub struct Navigator {
    scanner: FormScanner,
    filler: FieldFiller,
    config: NavigationConfig,
    tracer: TraceLogger,
}

impl Navigator {
    pub fn new(scanner: FormScanner, config: NavigationConfig) -> Self {
        let tracer = match &config.trace_path {
            Some(path) => TraceLogger::new(path),
            None => TraceLogger::disabled(),
        };
        Navigator {
            scanner,
            filler: FieldFiller::new(config.settle_ms, config.analog_position),
            config,
            tracer,
        }
    }

    pub fn scanner(&self) -> &FormScanner {
        &self.scanner
    }

    pub fn filler(&self) -> &FieldFiller {
        &self.filler
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    fn trace(&self, event: NavTraceEvent) {
        self.tracer.log(&event);
    }

    /// Walk forward from the current step until the survey ends, gets stuck
    /// or hits the page limit. Always returns what was gathered.
    pub fn walk(&self, driver: &mut dyn Driver) -> WalkReport {
        let mut pages: Vec<PageRecord> = Vec::new();
        let mut visits: Vec<PageVisit> = Vec::new();
        let mut previous: Option<PageIdentity> = None;

        let outcome = loop {
            let index = pages.len();
            if index >= self.config.max_pages {
                warn!(pages = index, "page limit reached");
                break WalkOutcome::PageLimit { pages: index };
            }

            self.trace(NavTraceEvent::now(index, NavState::AnalyzingPage));
            let mut page = match self.scanner.scan(driver, index) {
                Ok(page) => page,
                Err(e) => {
                    warn!(page = index, error = %e, "scan failed");
                    self.trace(NavTraceEvent::now(index, NavState::Stuck).with_detail(&e));
                    break WalkOutcome::Stuck {
                        page: index,
                        reason: e.to_string(),
                    };
                }
            };

            let identity = page.identity();
            let mut visit = PageVisit::start(&page);

            if previous.as_ref() == Some(&identity) {
                warn!(page = index, short_name = %page.short_name, "page unchanged after navigation, stopping");
                self.trace(
                    NavTraceEvent::now(index, NavState::Stuck).with_decision("stuck_loop"),
                );
                visit.transition = TransitionResult::Loop;
                pages.push(page);
                visits.push(visit);
                break WalkOutcome::StuckLoop { page: index };
            }

            self.fill_page(driver, &mut page, &mut visit);
            self.pre_nav_capture(driver, &mut page);

            // filling can enable or swap buttons
            match self.scanner.nav_buttons(driver) {
                Ok(buttons) if !buttons.is_empty() => page.navigation_buttons = buttons,
                Ok(_) => {}
                Err(e) => debug!(page = index, error = %e, "button refresh failed"),
            }

            if is_final_page(&page.navigation_buttons) {
                info!(page = index, "final page reached");
                self.trace(NavTraceEvent::now(index, NavState::Finished));
                visit.transition = TransitionResult::Finished;
                pages.push(page);
                visits.push(visit);
                break WalkOutcome::Finished { page: index };
            }

            let transition = self.advance(driver, &mut page, &mut visit);
            visit.transition = transition.clone();
            pages.push(page);
            visits.push(visit);

            if let TransitionResult::Stuck { reason } = transition {
                warn!(page = index, reason = %reason, "navigation stuck");
                self.trace(NavTraceEvent::now(index, NavState::Stuck).with_detail(&reason));
                break WalkOutcome::Stuck {
                    page: index,
                    reason,
                };
            }

            self.trace(NavTraceEvent::now(index, NavState::NextPage));
            previous = Some(identity);
        };

        info!(pages = pages.len(), outcome = ?outcome, "walk complete");
        WalkReport {
            pages,
            visits,
            outcome,
        }
    }

    // ========================================================================
    // FillingRequired + DiscoveringConditional
    // ========================================================================

    /// Fill every field that needs it, splicing revealed fields in after
    /// their trigger. Walks by index so spliced fields are visited in turn.
    pub fn fill_page(&self, driver: &mut dyn Driver, page: &mut PageRecord, visit: &mut PageVisit) {
        let (root, _) = self.scanner.resolve_root(driver);
        let mut index = 0;

        while index < page.fields.len() {
            let field = page.fields[index].clone();
            index += 1;

            if !needs_interaction(&field) {
                continue;
            }
            if field.input_kind != InputKind::Vas {
                match is_empty(driver, &field) {
                    Some(true) => {}
                    Some(false) => {
                        debug!(question = %field.key(), "already filled");
                        continue;
                    }
                    None => {
                        debug!(question = %field.key(), "not visible, skipping");
                        continue;
                    }
                }
            }

            self.trace(
                NavTraceEvent::now(page.index, NavState::FillingRequired).with_question(field.key()),
            );

            let before = match QuestionSnapshot::capture(driver, &self.scanner, &root) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    debug!(error = %e, "snapshot before fill failed");
                    None
                }
            };

            let value = match self.filler.fill(driver, &field) {
                Ok(value) => {
                    visit.filled += 1;
                    value
                }
                Err(e) => {
                    warn!(page = page.index, question = %field.key(), error = %e, "fill failed");
                    visit.fill_failures += 1;
                    continue;
                }
            };

            if let Some(before) = before {
                visit.discovered += self.discover(driver, page, index - 1, &root, &before, &value);
            }
        }
    }

    /// Diff the visible questions against `before` and splice new ones in
    /// after `trigger`. Returns how many were added.
    pub fn discover(
        &self,
        driver: &mut dyn Driver,
        page: &mut PageRecord,
        trigger: usize,
        root: &str,
        before: &QuestionSnapshot,
        parent_value: &str,
    ) -> usize {
        let after = match QuestionSnapshot::capture(driver, &self.scanner, root) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "snapshot after fill failed");
                return 0;
            }
        };

        let numbers: Vec<String> = after
            .revealed_since(before)
            .into_iter()
            .filter(|n| !page.has_question_number(n))
            .collect();
        if numbers.is_empty() {
            return 0;
        }

        let parent = page.fields[trigger].key().to_string();
        self.trace(
            NavTraceEvent::now(page.index, NavState::DiscoveringConditional)
                .with_question(&parent)
                .with_detail(numbers.join(",")),
        );

        let mut revealed = match self.scanner.scan_revealed(driver, root, &numbers, page.index) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(page = page.index, parent = %parent, error = %e, "scan of revealed fields failed");
                return 0;
            }
        };

        let discovered_at_ms = now_ms();
        for field in revealed.iter_mut() {
            field.conditional_info = Some(ConditionalInfo {
                parent_question: parent.clone(),
                parent_value: parent_value.to_string(),
                discovered_at_ms,
            });
        }

        let added = splice_after(&mut page.fields, trigger, revealed);
        info!(page = page.index, parent = %parent, added, "conditional fields discovered");
        added
    }

    /// Fill visible required fields that are still empty on the live page.
    /// Fields revealed by a sweep fill are discovered and swept in turn.
    pub fn sweep_required(&self, driver: &mut dyn Driver, page: &mut PageRecord, visit: &mut PageVisit) -> usize {
        let (root, _) = self.scanner.resolve_root(driver);
        let mut filled = 0;
        let mut index = 0;

        while index < page.fields.len() {
            let field = page.fields[index].clone();
            index += 1;

            if !needs_interaction(&field) || is_empty(driver, &field) != Some(true) {
                continue;
            }
            let before = QuestionSnapshot::capture(driver, &self.scanner, &root).ok();
            match self.filler.fill(driver, &field) {
                Ok(value) => {
                    filled += 1;
                    if let Some(before) = before {
                        visit.discovered += self.discover(driver, page, index - 1, &root, &before, &value);
                    }
                }
                Err(e) => warn!(page = page.index, question = %field.key(), error = %e, "sweep fill failed"),
            }
        }
        filled
    }

    fn pre_nav_capture(&self, driver: &mut dyn Driver, page: &mut PageRecord) {
        let Some(dir) = &self.scanner.config().capture_dir else {
            return;
        };
        self.trace(NavTraceEvent::now(page.index, NavState::PreNavCapture));
        match capture_page(driver, dir, page.index) {
            Ok(path) => page.screenshot = Some(path),
            Err(e) => warn!(page = page.index, error = %e, "page capture failed"),
        }
    }

    // ========================================================================
    // Navigating + ValidationCheck + Transitioning
    // ========================================================================

    /// Click "next", handle a validation modal with one retry, then poll for
    /// question content.
    pub fn advance(&self, driver: &mut dyn Driver, page: &mut PageRecord, visit: &mut PageVisit) -> TransitionResult {
        self.trace(NavTraceEvent::now(page.index, NavState::Navigating));

        let Some(next) = first_enabled(&page.navigation_buttons, NavKind::Next).cloned() else {
            return TransitionResult::Stuck {
                reason: "no enabled next button".to_string(),
            };
        };
        if let Err(e) = click_button(driver, &next) {
            return TransitionResult::Stuck {
                reason: format!("next click failed: {}", e),
            };
        }
        driver.wait_idle(self.config.settle_ms);

        self.trace(NavTraceEvent::now(page.index, NavState::ValidationCheck));
        if let Some(modal) = probe_modal(driver) {
            warn!(page = page.index, text = %modal.text, "validation modal after next");
            close_modal(driver, self.config.settle_ms);
            let swept = self.sweep_required(driver, page, visit);
            visit.validation_retries += 1;
            visit.filled += swept;

            self.trace(
                NavTraceEvent::now(page.index, NavState::Navigating)
                    .with_decision("validation_retry")
                    .with_detail(format!("{} fields swept", swept))
                    .with_attempt(visit.validation_retries),
            );

            // the button may have re-rendered
            let retry_button = self
                .scanner
                .nav_buttons(driver)
                .ok()
                .and_then(|buttons| first_enabled(&buttons, NavKind::Next).cloned())
                .unwrap_or(next);
            if let Err(e) = click_button(driver, &retry_button) {
                return TransitionResult::Stuck {
                    reason: format!("next click failed on retry: {}", e),
                };
            }
            driver.wait_idle(self.config.settle_ms);

            if let Some(modal) = probe_modal(driver) {
                close_modal(driver, self.config.settle_ms);
                return TransitionResult::Stuck {
                    reason: format!("validation modal persisted: {}", modal.text),
                };
            }
        }

        self.trace(NavTraceEvent::now(page.index, NavState::Transitioning));
        match self.wait_for_questions(driver) {
            Ok(count) => {
                debug!(page = page.index, questions = count, "next page has content");
                TransitionResult::Advanced
            }
            Err(exhausted) => TransitionResult::Stuck {
                reason: exhausted.to_string(),
            },
        }
    }

    /// Poll until at least one question container is visible.
    pub fn wait_for_questions(&self, driver: &mut dyn Driver) -> Result<usize, Exhausted<String>> {
        let container_class = self.scanner.config().container_class.clone();
        let primary_root = self.scanner.config().root_selectors.first().cloned();
        let interval_ms = self.config.transition.interval_ms;
        retry(driver, &self.config.transition, |d, attempt| {
            // block until the survey root re-renders, at most one interval
            let rendered = match &primary_root {
                Some(primary) => d.wait_for(primary, interval_ms).unwrap_or(false),
                None => false,
            };
            let root = match &primary_root {
                Some(primary) if rendered => primary.clone(),
                _ => self
                    .scanner
                    .find_root(d)
                    .unwrap_or_else(|| BODY_SCOPE.to_string()),
            };
            let heads: Vec<String> = evaluate_as(
                d,
                &PageScript::QuestionHeads {
                    root,
                    container_class: container_class.clone(),
                },
            )
            .map_err(|e| e.to_string())?;

            if heads.is_empty() {
                Err(format!("no questions visible (attempt {})", attempt))
            } else {
                Ok(heads.len())
            }
        })
    }

    /// Click the first enabled button of `kind` on the current step.
    /// `Ok(None)` when there is none.
    pub fn click_nav(&self, driver: &mut dyn Driver, kind: NavKind) -> Result<Option<String>, DriverError> {
        let buttons = self.scanner.nav_buttons(driver)?;
        let Some(button) = first_enabled(&buttons, kind) else {
            return Ok(None);
        };
        let selector = click_button(driver, button)?;
        driver.wait_idle(self.config.settle_ms);
        Ok(Some(selector))
    }
}
