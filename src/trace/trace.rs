use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::navigator::state::NavState;

/// Milliseconds since the Unix epoch; 0 if the clock is before it.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One navigator state transition.
#[derive(Debug, Serialize)]
pub struct NavTraceEvent {
    pub timestamp_ms: u64,
    pub page: usize,

    pub state: NavState,

    pub decision: Option<String>,
    pub question: Option<String>,
    pub detail: Option<String>,

    pub attempt: Option<u32>,
}

impl NavTraceEvent {
    pub fn now(page: usize, state: NavState) -> Self {
        Self {
            timestamp_ms: now_ms(),
            page,
            state,
            decision: None,
            question: None,
            detail: None,
            attempt: None,
        }
    }

    pub fn with_decision(mut self, decision: impl ToString) -> Self {
        self.decision = Some(decision.to_string());
        self
    }

    pub fn with_question(mut self, question: impl ToString) -> Self {
        self.question = Some(question.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }
}
