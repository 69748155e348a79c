use tracing::{debug, info};

use crate::browser::driver::{Driver, evaluate_as};
use crate::browser::script::PageScript;
use crate::survey::model::FieldRecord;
use crate::survey::raw::RawModal;

/// Visible dialog / alert, if any. Probe failures read as "no modal".
pub fn probe_modal(driver: &mut dyn Driver) -> Option<RawModal> {
    match evaluate_as::<Option<RawModal>>(driver, &PageScript::ProbeModal) {
        Ok(modal) => modal,
        Err(e) => {
            debug!(error = %e, "modal probe failed");
            None
        }
    }
}

/// Close button heuristics, else an Escape key press. Returns whether the
/// modal is gone afterwards.
pub fn close_modal(driver: &mut dyn Driver, settle_ms: u64) -> bool {
    let clicked = evaluate_as::<bool>(driver, &PageScript::CloseModal).unwrap_or(false);
    if !clicked {
        debug!("no close button, sending Escape");
        if let Err(e) = driver.press_key("Escape") {
            debug!(error = %e, "escape key press failed");
        }
    }
    driver.wait_idle(settle_ms);

    let gone = probe_modal(driver).is_none();
    info!(clicked, gone, "validation modal closed");
    gone
}

/// Live check of a container's value/selection state. `None` when the
/// container is not visible or the check failed.
pub fn is_empty(driver: &mut dyn Driver, field: &FieldRecord) -> Option<bool> {
    let script = PageScript::FieldIsEmpty {
        container: field.container_selector.clone(),
        kind: field.input_kind,
    };
    match evaluate_as::<Option<bool>>(driver, &script) {
        Ok(empty) => empty,
        Err(e) => {
            debug!(question = %field.key(), error = %e, "emptiness check failed");
            None
        }
    }
}
