use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::browser::driver::{Driver, evaluate_as};
use crate::browser::script::PageScript;
use crate::navigator::buttons::first_enabled;
use crate::navigator::navigator::Navigator;
use crate::survey::model::{NavKind, PageIdentity};
use crate::survey::raw::{RawQuestion, RawTitle};
use crate::survey::scanner::BODY_SCOPE;
use crate::survey::selectors::{container_selector, scoped, split_question_number};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Upper bound on "previous" clicks.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Run `clear_all_values` after reaching the first step.
    #[serde(default = "default_true")]
    pub clear_values: bool,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            clear_values: true,
        }
    }
}

fn default_max_attempts() -> u32 { 20 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResetOutcome {
    pub at_start: bool,
    /// Clicks that moved to a different step.
    pub steps_back: u32,
    /// Clicks that failed or left the step unchanged.
    pub soft_failures: u32,
    pub cleared: usize,
}

/// Brings the survey back to its first step before a walk.
pub struct ResetService<'n> {
    navigator: &'n Navigator,
    config: ResetConfig,
}

impl<'n> ResetService<'n> {
    pub fn new(navigator: &'n Navigator, config: ResetConfig) -> Self {
        ResetService { navigator, config }
    }

    /// `ensure_at_start`, then `clear_all_values` when configured.
    pub fn reset(&self, driver: &mut dyn Driver) -> ResetOutcome {
        let mut outcome = self.ensure_at_start(driver);
        if self.config.clear_values {
            outcome.cleared = self.clear_all_values(driver);
        }
        outcome
    }

    /// Click "previous" until none is offered, at most `max_attempts` times.
    /// A click that fails or does not change the step is counted and the
    /// loop carries on.
    pub fn ensure_at_start(&self, driver: &mut dyn Driver) -> ResetOutcome {
        let mut outcome = ResetOutcome::default();

        for attempt in 1..=self.config.max_attempts {
            let before = self.identity(driver);
            match self.navigator.click_nav(driver, NavKind::Previous) {
                Ok(None) => {
                    info!(steps_back = outcome.steps_back, "at first step");
                    outcome.at_start = true;
                    return outcome;
                }
                Ok(Some(_)) => {
                    if self.identity(driver) == before {
                        debug!(attempt, "previous click made no progress");
                        outcome.soft_failures += 1;
                    } else {
                        outcome.steps_back += 1;
                    }
                }
                Err(e) => {
                    warn!(attempt, error = %e, "previous click failed");
                    outcome.soft_failures += 1;
                }
            }
        }

        // the last allowed click may have reached the first step
        let previous_offered = match self.navigator.scanner().nav_buttons(driver) {
            Ok(buttons) => first_enabled(&buttons, NavKind::Previous).is_some(),
            Err(e) => {
                debug!(error = %e, "button refresh failed after last attempt");
                true
            }
        };
        if !previous_offered {
            info!(steps_back = outcome.steps_back, "at first step");
            outcome.at_start = true;
            return outcome;
        }

        warn!(
            attempts = self.config.max_attempts,
            soft_failures = outcome.soft_failures,
            "still not at first step"
        );
        outcome
    }

    /// Invoke every question container's clear affordance. Containers
    /// without one are skipped.
    pub fn clear_all_values(&self, driver: &mut dyn Driver) -> usize {
        let scanner = self.navigator.scanner();
        let (root, _) = scanner.resolve_root(driver);
        let container_class = scanner.config().container_class.clone();

        let raw: Vec<RawQuestion> = match evaluate_as(
            driver,
            &PageScript::ExtractQuestions {
                root: root.clone(),
                container_class: container_class.clone(),
            },
        ) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "could not list question containers");
                return 0;
            }
        };

        let mut cleared = 0;
        for question in &raw {
            let Some(affordance) = &question.clear_affordance else {
                continue;
            };
            let (number, _) = split_question_number(&question.text);
            let container = container_selector(&root, question, &container_class, &number);
            let selector = scoped(&container, affordance);
            match driver.click(&selector) {
                Ok(()) => {
                    cleared += 1;
                    driver.wait_idle(self.navigator.config().settle_ms);
                }
                Err(e) => debug!(selector = %selector, error = %e, "clear affordance click failed"),
            }
        }

        info!(cleared, "values cleared");
        cleared
    }

    fn identity(&self, driver: &mut dyn Driver) -> Option<PageIdentity> {
        let scanner = self.navigator.scanner();
        let root = scanner.find_root(driver).unwrap_or_else(|| BODY_SCOPE.to_string());
        let title: RawTitle = evaluate_as::<Option<RawTitle>>(
            driver,
            &PageScript::ExtractTitle { root: root.clone() },
        )
        .ok()
        .flatten()
        .unwrap_or_default();
        let heads: Vec<String> = evaluate_as(
            driver,
            &PageScript::QuestionHeads {
                root,
                container_class: scanner.config().container_class.clone(),
            },
        )
        .ok()?;
        let leading = heads
            .first()
            .map(|h| split_question_number(h).1)
            .unwrap_or_default();
        Some(PageIdentity::new(&title.short_name, &leading))
    }
}
