use tracing::debug;

use crate::browser::driver::{Driver, evaluate_as};
use crate::browser::error::DriverError;
use crate::browser::script::PageScript;

/// One way of finding an element on the live page.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    /// Plain CSS selector; found when it matches at least one element.
    Css(String),
    /// First element under `scope` whose visible label matches one of `labels`.
    Label { scope: String, labels: Vec<String> },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn label(scope: impl Into<String>, label: impl Into<String>) -> Self {
        Locator::Label {
            scope: scope.into(),
            labels: vec![label.into()],
        }
    }

    fn describe(&self) -> String {
        match self {
            Locator::Css(selector) => selector.clone(),
            Locator::Label { scope, labels } => format!("{} label={:?}", scope, labels),
        }
    }
}

/// Outcome of walking an ordered list of locator strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// `strategy` is the index of the locator that matched.
    Located { selector: String, strategy: usize },
    NotFound,
}

impl Resolution {
    pub fn selector(&self) -> Option<&str> {
        match self {
            Resolution::Located { selector, .. } => Some(selector),
            Resolution::NotFound => None,
        }
    }
}

/// Try each strategy in order and return the first that matches.
///
/// Driver errors on a single strategy count as "not found here" and the
/// walk continues with the next one.
pub fn resolve(driver: &mut dyn Driver, strategies: &[Locator]) -> Resolution {
    resolve_from(driver, strategies, 0)
}

/// Same as `resolve`, starting at strategy index `start`.
pub fn resolve_from(driver: &mut dyn Driver, strategies: &[Locator], start: usize) -> Resolution {
    for (index, locator) in strategies.iter().enumerate().skip(start) {
        let found = match locator {
            Locator::Css(selector) => match driver.query_count(selector) {
                Ok(n) if n > 0 => Some(selector.clone()),
                Ok(_) => None,
                Err(e) => {
                    debug!(selector = %selector, error = %e, "locator query failed");
                    None
                }
            },
            Locator::Label { scope, labels } => {
                let script = PageScript::LocateByLabel {
                    scope: scope.clone(),
                    labels: labels.clone(),
                };
                match evaluate_as::<Option<String>>(driver, &script) {
                    Ok(found) => found,
                    Err(e) => {
                        debug!(labels = ?labels, error = %e, "label locator failed");
                        None
                    }
                }
            }
        };

        if let Some(selector) = found {
            return Resolution::Located {
                selector,
                strategy: index,
            };
        }
    }

    Resolution::NotFound
}

/// Resolve, run `act` on the match, and on failure retry exactly once with
/// the next strategy that resolves. Returns the selector that succeeded.
pub fn act_with_fallback<F>(
    driver: &mut dyn Driver,
    strategies: &[Locator],
    mut act: F,
) -> Result<String, DriverError>
where
    F: FnMut(&mut dyn Driver, &str) -> Result<(), DriverError>,
{
    let (selector, strategy) = match resolve(driver, strategies) {
        Resolution::Located { selector, strategy } => (selector, strategy),
        Resolution::NotFound => {
            return Err(DriverError::ElementNotFound {
                selector: describe_all(strategies),
            });
        }
    };

    let first_error = match act(driver, &selector) {
        Ok(()) => return Ok(selector),
        Err(e) => e,
    };

    debug!(selector = %selector, error = %first_error, "primary strategy failed, trying alternate");

    match resolve_from(driver, strategies, strategy + 1) {
        Resolution::Located { selector, .. } => {
            act(driver, &selector)?;
            Ok(selector)
        }
        Resolution::NotFound => Err(first_error),
    }
}

fn describe_all(strategies: &[Locator]) -> String {
    strategies
        .iter()
        .map(Locator::describe)
        .collect::<Vec<_>>()
        .join(" | ")
}
