use thiserror::Error;
use tracing::debug;

use crate::browser::driver::{Driver, evaluate_as};
use crate::browser::error::DriverError;
use crate::browser::locator::{Locator, act_with_fallback};
use crate::browser::script::PageScript;
use crate::survey::model::{FieldRecord, InputKind};

#[derive(Debug, Error)]
pub enum FillError {
    #[error("question {question}: nothing to interact with")]
    NoControl { question: String },

    #[error("question {question}: {source}")]
    Driver {
        question: String,
        #[source]
        source: DriverError,
    },
}

/// Applies one representative value to a field on the live page.
#[derive(Debug, Clone)]
pub struct FieldFiller {
    /// Pause after each interaction.
    pub settle_ms: u64,
    /// Track position (0.0–1.0) for analog scales without test data.
    pub analog_position: f64,
}

impl Default for FieldFiller {
    fn default() -> Self {
        Self {
            settle_ms: 300,
            analog_position: 0.5,
        }
    }
}

impl FieldFiller {
    pub fn new(settle_ms: u64, analog_position: f64) -> Self {
        FieldFiller {
            settle_ms,
            analog_position: analog_position.clamp(0.0, 1.0),
        }
    }

    /// Fill `field` and return the value given (choice label for choice kinds).
    pub fn fill(&self, driver: &mut dyn Driver, field: &FieldRecord) -> Result<String, FillError> {
        let question = field.key().to_string();
        let wrap = |source: DriverError| FillError::Driver {
            question: question.clone(),
            source,
        };

        let value = match field.input_kind {
            InputKind::Radio | InputKind::Checkbox | InputKind::Nrs => {
                self.pick_choice(driver, field).map_err(wrap)?
            }
            InputKind::Dropdown => self.pick_option(driver, field).map_err(wrap)?,
            InputKind::Vas => self.set_scale(driver, field).map_err(wrap)?,
            InputKind::AutocompleteDropdown => {
                let typed = self.type_value(driver, field).map_err(wrap)?;
                driver.wait_idle(self.settle_ms);
                let picked: bool = evaluate_as(
                    driver,
                    &PageScript::PickSuggestion {
                        container: field.container_selector.clone(),
                    },
                )
                .map_err(wrap)?;
                if !picked {
                    debug!(question = %question, "no suggestion offered, keeping typed text");
                }
                typed
            }
            InputKind::Text
            | InputKind::Textarea
            | InputKind::Date
            | InputKind::Email
            | InputKind::Number => self.type_value(driver, field).map_err(wrap)?,
            InputKind::Static => {
                return Err(FillError::NoControl {
                    question: question.clone(),
                });
            }
        };

        driver.wait_idle(self.settle_ms);
        debug!(question = %question, value = %value, kind = field.input_kind.as_str(), "field filled");
        Ok(value)
    }

    fn pick_choice(&self, driver: &mut dyn Driver, field: &FieldRecord) -> Result<String, DriverError> {
        let index = choice_index(field);
        let Some(label) = field.choices.get(index) else {
            driver.click(&field.primary_selector)?;
            return Ok(String::new());
        };

        let mut strategies = Vec::new();
        if let Some(selector) = field.choice_selectors.get(index) {
            strategies.push(Locator::css(selector.clone()));
        }
        strategies.push(Locator::label(field.container_selector.clone(), label.clone()));

        act_with_fallback(driver, &strategies, |d, s| d.click(s))?;
        Ok(label.clone())
    }

    fn pick_option(&self, driver: &mut dyn Driver, field: &FieldRecord) -> Result<String, DriverError> {
        let index = choice_index(field);
        let label = field
            .choices
            .get(index)
            .cloned()
            .ok_or_else(|| DriverError::ElementNotFound {
                selector: format!("{} option #{}", field.primary_selector, index),
            })?;

        let strategies = [
            Locator::css(field.primary_selector.clone()),
            Locator::css(format!("{} select", field.container_selector)),
        ];
        act_with_fallback(driver, &strategies, |d, s| d.select(s, &label))?;
        Ok(label)
    }

    fn set_scale(&self, driver: &mut dyn Driver, field: &FieldRecord) -> Result<String, DriverError> {
        let fraction = field
            .test_data
            .as_ref()
            .and_then(|t| t.first_valid())
            .and_then(|t| t.value().parse::<f64>().ok())
            .map(|percent| (percent / 100.0).clamp(0.0, 1.0))
            .unwrap_or(self.analog_position);

        let moved: bool = evaluate_as(
            driver,
            &PageScript::SetAnalogScale {
                container: field.container_selector.clone(),
                fraction,
            },
        )?;
        if !moved {
            driver.click(&field.primary_selector)?;
        }
        Ok(format!("{}", (fraction * 100.0).round()))
    }

    fn type_value(&self, driver: &mut dyn Driver, field: &FieldRecord) -> Result<String, DriverError> {
        let value = text_value(field);
        let strategies = [
            Locator::css(field.primary_selector.clone()),
            Locator::css(format!("{} input:not([type=\"hidden\"])", field.container_selector)),
            Locator::css(format!("{} textarea", field.container_selector)),
        ];
        act_with_fallback(driver, &strategies, |d, s| d.type_text(s, &value))?;
        Ok(value)
    }
}

/// Index from the first valid test case, clamped to the choice list.
/// NRS picks the button whose label equals the value.
fn choice_index(field: &FieldRecord) -> usize {
    let value = field
        .test_data
        .as_ref()
        .and_then(|t| t.first_valid())
        .map(|t| t.value().to_string());

    let index = match (&field.input_kind, value) {
        (InputKind::Nrs, Some(v)) => field
            .choices
            .iter()
            .position(|c| c == &v)
            .unwrap_or(field.choices.len() / 2),
        (InputKind::Nrs, None) => field.choices.len() / 2,
        (_, Some(v)) => v
            .split(',')
            .next()
            .and_then(|first| first.trim().parse::<usize>().ok())
            .unwrap_or(0),
        (_, None) => 0,
    };

    index.min(field.choices.len().saturating_sub(1))
}

/// First valid non-empty test value, else a per-kind default.
pub fn text_value(field: &FieldRecord) -> String {
    let generated = field
        .test_data
        .as_ref()
        .and_then(|t| t.first_valid())
        .map(|t| t.value().to_string())
        .filter(|v| !v.is_empty());

    generated.unwrap_or_else(|| {
        match field.input_kind {
            InputKind::Date => "15.03.2021",
            InputKind::Email => "test.user@example.com",
            InputKind::Number => "42",
            InputKind::Textarea => "Sample answer with some detail.",
            _ => "Sample answer",
        }
        .to_string()
    })
}
