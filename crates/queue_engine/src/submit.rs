use std::sync::Arc;

use queue_logging::queue_debug;

use crate::input::InputAdapter;
use crate::page::{DomEvent, Element, Page, PageError};

const SEND_BUTTON_SELECTOR: &str = r#"button[data-testid="send-button"]"#;
/// Localized accessible-label fragments of the send control.
const SEND_LABEL_KEYWORDS: &[&str] = &["send", "отправить"];

#[derive(Clone)]
pub struct SubmitAdapter {
    page: Arc<dyn Page>,
    input: InputAdapter,
}

impl SubmitAdapter {
    pub fn new(page: Arc<dyn Page>) -> Self {
        let input = InputAdapter::new(page.clone());
        Self { page, input }
    }

    /// Send control by its test id, else any labelled send button that is usable.
    pub fn locate(&self) -> Option<Element> {
        let preferred = self
            .select(SEND_BUTTON_SELECTOR)
            .into_iter()
            .find(Self::is_ready);
        if preferred.is_some() {
            return preferred;
        }
        self.select("button[aria-label]").into_iter().find(|button| {
            let label = button.aria_label();
            SEND_LABEL_KEYWORDS.iter().any(|kw| label.contains(kw)) && Self::is_ready(button)
        })
    }

    /// Present, enabled and rendered.
    pub fn is_ready(button: &Element) -> bool {
        button.visible && !button.is_disabled()
    }

    pub fn invoke(&self, button: &Element) -> Result<bool, PageError> {
        self.page.click(button.id)?;
        Ok(true)
    }

    /// Dispatches `submit` on the input's enclosing form.
    /// `false` when there is no input, no form, or the host cancelled the event.
    pub fn submit_via_form(&self) -> Result<bool, PageError> {
        let Some(input) = self.input.locate() else {
            return Ok(false);
        };
        let Some(form) = self.page.closest(input.id(), "form")? else {
            return Ok(false);
        };
        self.page.dispatch(form.id, DomEvent::Submit)
    }

    fn select(&self, selector: &str) -> Vec<Element> {
        self.page.select(selector).unwrap_or_else(|err| {
            queue_debug!("send selector {} skipped: {}", selector, err);
            Vec::new()
        })
    }
}
