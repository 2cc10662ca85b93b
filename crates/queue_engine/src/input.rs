use std::sync::Arc;

use queue_logging::queue_debug;

use crate::page::{DomEvent, Element, ElementId, Page, PageError};

/// Candidate selectors for the chat input, most specific first.
pub const INPUT_SELECTORS: &[&str] = &[
    r#"textarea[data-id="root"]"#,
    "#prompt-textarea",
    "form textarea",
    r#"textarea[placeholder*="Message"]"#,
    r#"textarea[placeholder*="Ask"]"#,
    "textarea",
    r#"[contenteditable="true"][data-id="root"]"#,
    r#"form [contenteditable="true"]"#,
    r#"[contenteditable="true"][placeholder*="Message"]"#,
    r#"[contenteditable="true"][placeholder*="Ask"]"#,
    r#"[contenteditable="true"]"#,
];

/// The two shapes the chat input comes in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputTarget {
    /// Multi-line text field; its value goes through the native setter.
    PlainField(Element),
    /// Rich content-editable surface; its value is the text content.
    RichEditable(Element),
}

impl InputTarget {
    pub fn from_element(element: Element) -> Self {
        if element.is_content_editable() {
            InputTarget::RichEditable(element)
        } else {
            InputTarget::PlainField(element)
        }
    }

    pub fn element(&self) -> &Element {
        match self {
            InputTarget::PlainField(el) | InputTarget::RichEditable(el) => el,
        }
    }

    pub fn id(&self) -> ElementId {
        self.element().id
    }
}

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn any(&self) -> bool {
        self.shift || self.alt || self.ctrl || self.meta
    }
}

#[derive(Clone)]
pub struct InputAdapter {
    page: Arc<dyn Page>,
}

impl InputAdapter {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self { page }
    }

    /// Current chat input, if the host has rendered one. Absence means "retry later".
    pub fn locate(&self) -> Option<InputTarget> {
        INPUT_SELECTORS.iter().find_map(|selector| {
            let first = match self.page.select(selector) {
                Ok(found) => found.into_iter().next(),
                Err(err) => {
                    queue_debug!("input selector {} skipped: {}", selector, err);
                    None
                }
            };
            first.map(InputTarget::from_element)
        })
    }

    pub fn read(&self, target: &InputTarget) -> Result<String, PageError> {
        match target {
            InputTarget::PlainField(el) => self.page.value(el.id),
            InputTarget::RichEditable(el) => self.page.text_content(el.id),
        }
    }

    /// Sets the value and then notifies the host so its own state catches up;
    /// without the events the host keeps its send control disabled.
    pub fn write(&self, target: &InputTarget, value: &str) -> Result<(), PageError> {
        match target {
            InputTarget::PlainField(el) => self.page.set_value_native(el.id, value)?,
            InputTarget::RichEditable(el) => self.page.set_text_content(el.id, value)?,
        }
        let id = target.id();
        for event in [DomEvent::Input, DomEvent::Change, DomEvent::KeyDown] {
            self.page.dispatch(id, event)?;
        }
        Ok(())
    }

    pub fn clear(&self, target: &InputTarget) -> Result<(), PageError> {
        self.write(target, "")
    }
}
