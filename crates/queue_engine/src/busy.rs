use std::sync::Arc;

use queue_logging::{queue_trace, queue_warn};

use crate::page::{Element, Page, PageError};

/// Label fragments of the control that stops a response in progress.
const STOP_LABEL_PHRASES: &[&str] = &["stop generating", "stop streaming", "stop"];
const GENERATING_KEYWORD: &str = "generating";
const STOP_KEYWORD: &str = "stop";
/// Path fragments unique to the stop glyph drawn inside the send/stop control.
const STOP_GLYPH_SIGNATURE: &[&str] = &["M8.99992 16V6.41407", "L5.70696 9.70704", "L15.707 8.29298"];

/// Answers "is the assistant producing output right now?".
pub trait BusyProbe: Send + Sync {
    fn is_busy(&self) -> bool;
}

/// Which heuristic fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusySignal {
    StopControl,
    StopKeyword,
    StopGlyph,
}

/// Reads busy/idle from transient DOM signals. Nothing is cached between checks.
#[derive(Clone)]
pub struct BusyDetector {
    page: Arc<dyn Page>,
}

impl BusyDetector {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self { page }
    }

    /// First matching signal, in order: visible stop control, stop keyword in a
    /// form control, stop glyph in a form control.
    pub fn detect(&self) -> Result<Option<BusySignal>, PageError> {
        let labelled = self.page.select("button[aria-label]")?;
        if labelled.iter().any(is_visible_stop_control) {
            return Ok(Some(BusySignal::StopControl));
        }

        let form_controls: Vec<Element> = self
            .page
            .select("form button")?
            .into_iter()
            .filter(|button| !button.is_disabled() && button.visible)
            .collect();

        if form_controls.iter().any(mentions_stop) {
            return Ok(Some(BusySignal::StopKeyword));
        }

        for control in &form_controls {
            let paths = self.page.select_within(control.id, "svg path")?;
            if paths.iter().any(draws_stop_glyph) {
                return Ok(Some(BusySignal::StopGlyph));
            }
        }

        Ok(None)
    }
}

impl BusyProbe for BusyDetector {
    fn is_busy(&self) -> bool {
        match self.detect() {
            Ok(Some(signal)) => {
                queue_trace!("assistant busy: {:?}", signal);
                true
            }
            Ok(None) => {
                queue_trace!("assistant idle: no stop indicators");
                false
            }
            Err(err) => {
                queue_warn!("busy detection skipped: {}", err);
                false
            }
        }
    }
}

fn is_visible_stop_control(button: &Element) -> bool {
    let label = button.aria_label();
    button.visible && STOP_LABEL_PHRASES.iter().any(|phrase| label.contains(phrase))
}

fn mentions_stop(button: &Element) -> bool {
    let text = button.text.to_lowercase();
    let label = button.aria_label();
    text.contains(STOP_KEYWORD) || label.contains(STOP_KEYWORD) || label.contains(GENERATING_KEYWORD)
}

fn draws_stop_glyph(path: &Element) -> bool {
    let d = path.attr("d").unwrap_or_default();
    STOP_GLYPH_SIGNATURE.iter().all(|fragment| d.contains(fragment))
}
