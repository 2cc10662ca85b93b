use std::collections::BTreeMap;

/// Identity of an element within one rendering of the document.
///
/// The generation changes whenever the host re-renders, so a node that was
/// replaced never compares equal to its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    generation: u64,
    index: usize,
}

impl ElementId {
    pub fn new(generation: u64, index: usize) -> Self {
        Self { generation, index }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Snapshot of an element taken at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: ElementId,
    /// Lower-case tag name.
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    /// Rendered: attached and neither it nor an ancestor is hidden.
    pub visible: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_disabled(&self) -> bool {
        self.attributes.contains_key("disabled")
    }

    pub fn is_content_editable(&self) -> bool {
        matches!(self.attr("contenteditable"), Some("true") | Some(""))
    }

    /// Lower-cased accessible label, empty when absent.
    pub fn aria_label(&self) -> String {
        self.attr("aria-label").unwrap_or_default().to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Input,
    Change,
    KeyDown,
    Submit,
}

impl DomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::KeyDown => "keydown",
            DomEvent::Submit => "submit",
        }
    }

    pub fn is_cancelable(&self) -> bool {
        matches!(self, DomEvent::Submit | DomEvent::KeyDown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("element {0:?} is no longer attached to the document")]
    StaleElement(ElementId),
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
    #[error("element {0:?} has no editable value")]
    NotEditable(ElementId),
}

/// The live document as seen by the adapters.
///
/// Every call reads the current state; implementations must not cache across calls.
pub trait Page: Send + Sync {
    /// All elements matching `selector`, in document order.
    fn select(&self, selector: &str) -> Result<Vec<Element>, PageError>;

    /// Descendants of `scope` matching `selector`, in document order.
    fn select_within(&self, scope: ElementId, selector: &str) -> Result<Vec<Element>, PageError>;

    /// Nearest ancestor-or-self of `element` matching `selector`.
    fn closest(&self, element: ElementId, selector: &str) -> Result<Option<Element>, PageError>;

    /// Current value of a plain text field.
    fn value(&self, element: ElementId) -> Result<String, PageError>;

    fn text_content(&self, element: ElementId) -> Result<String, PageError>;

    /// Sets a field value through the element's native setter, bypassing any
    /// framework override.
    fn set_value_native(&self, element: ElementId, value: &str) -> Result<(), PageError>;

    fn set_text_content(&self, element: ElementId, value: &str) -> Result<(), PageError>;

    /// Dispatches a bubbling synthetic event; `false` when a handler cancelled it.
    fn dispatch(&self, element: ElementId, event: DomEvent) -> Result<bool, PageError>;

    fn click(&self, element: ElementId) -> Result<(), PageError>;
}
