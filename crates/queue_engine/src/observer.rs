use std::sync::Arc;

use queue_logging::{queue_debug, queue_info};

use crate::input::{InputAdapter, InputTarget};
use crate::page::{ElementId, Page};

/// Result of re-checking which input node the key handler is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// No input on the page yet.
    NotFound,
    AlreadyAttached(ElementId),
    /// A new (or re-mounted) input node; the key handler must be bound to it.
    Attached(ElementId),
}

/// Tracks the input node across host re-renders.
pub struct ChangeObserver {
    input: InputAdapter,
    attached: Option<ElementId>,
}

impl ChangeObserver {
    pub fn new(page: Arc<dyn Page>) -> Self {
        Self {
            input: InputAdapter::new(page),
            attached: None,
        }
    }

    pub fn attached(&self) -> Option<ElementId> {
        self.attached
    }

    pub fn attach(&mut self) -> Attachment {
        let Some(target) = self.input.locate() else {
            queue_debug!("no input element; handler not attached");
            return Attachment::NotFound;
        };
        let id = target.id();
        if self.attached == Some(id) {
            return Attachment::AlreadyAttached(id);
        }
        let variant = match &target {
            InputTarget::PlainField(_) => "plain field",
            InputTarget::RichEditable(_) => "content-editable",
        };
        queue_info!(
            "input handler attached to <{}> ({})",
            target.element().tag,
            variant
        );
        self.attached = Some(id);
        Attachment::Attached(id)
    }
}
