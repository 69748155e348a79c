use serde::Serialize;

use crate::survey::model::PageRecord;

/// Navigator states, in the order a page normally passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavState {
    AnalyzingPage,
    FillingRequired,
    DiscoveringConditional,
    PreNavCapture,
    Navigating,
    ValidationCheck,
    Transitioning,
    NextPage,
    Stuck,
    Finished,
}

/// How the navigator left one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TransitionResult {
    Advanced,
    /// Final page, walk ends here.
    Finished,
    Stuck { reason: String },
    /// Same identity as the previous page.
    Loop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVisit {
    pub index: usize,
    pub short_name: String,
    pub filled: usize,
    pub fill_failures: usize,
    pub discovered: usize,
    pub validation_retries: u32,
    pub transition: TransitionResult,
}

impl PageVisit {
    pub fn start(page: &PageRecord) -> Self {
        PageVisit {
            index: page.index,
            short_name: page.short_name.clone(),
            filled: 0,
            fill_failures: 0,
            discovered: 0,
            validation_retries: 0,
            transition: TransitionResult::Advanced,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalkOutcome {
    Finished { page: usize },
    Stuck { page: usize, reason: String },
    StuckLoop { page: usize },
    PageLimit { pages: usize },
}

impl WalkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WalkOutcome::Finished { .. })
    }
}

/// Everything gathered during one walk, including partial results.
#[derive(Debug, Clone, Serialize)]
pub struct WalkReport {
    pub pages: Vec<PageRecord>,
    pub visits: Vec<PageVisit>,
    pub outcome: WalkOutcome,
}

impl WalkReport {
    pub fn field_count(&self) -> usize {
        self.pages.iter().map(|p| p.fields.len()).sum()
    }

    pub fn total_validation_retries(&self) -> u32 {
        self.visits.iter().map(|v| v.validation_retries).sum()
    }
}
