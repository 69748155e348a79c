use serde::Serialize;
use tracing::info;

use crate::{
    browser::driver::Driver,
    cli::{commands::build_generator, config::EngineConfig},
    navigator::{
        navigator::Navigator,
        state::WalkReport,
    },
    reset::service::{ResetOutcome, ResetService},
    survey::scanner::FormScanner,
};

pub mod browser;
pub mod classify;
pub mod cli;
pub mod navigator;
pub mod reset;
pub mod survey;
pub mod testdata;
pub mod trace;

/// Outbound result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct SurveyRun {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<ResetOutcome>,
    pub report: WalkReport,
}

/// Build the engine from `config`, optionally reset the survey to its first
/// step, and walk it. Never fails once a driver exists; anomalies show up
/// in the report.
pub fn run_survey(driver: &mut dyn Driver, config: &EngineConfig, reset: bool) -> SurveyRun {
    let scanner = FormScanner::new(config.scan.clone(), build_generator(&config.advisor));
    let navigator = Navigator::new(scanner, config.navigation.clone());

    let reset = if reset {
        let outcome = ResetService::new(&navigator, config.reset.clone()).reset(driver);
        info!(at_start = outcome.at_start, cleared = outcome.cleared, "reset done");
        Some(outcome)
    } else {
        None
    };

    let report = navigator.walk(driver);
    SurveyRun { reset, report }
}
