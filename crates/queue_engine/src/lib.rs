//! Queue engine: page adapters, busy detection and the submission processor.
mod busy;
mod engine;
mod html_page;
mod input;
mod observer;
mod page;
mod presenter;
mod processor;
mod settings;
mod submit;
mod timer;
mod wait;

pub use busy::{BusyDetector, BusyProbe, BusySignal};
pub use engine::{KeyOutcome, QueueEngine};
pub use html_page::{HtmlPage, PageEvent};
pub use input::{InputAdapter, InputTarget, KeyModifiers, INPUT_SELECTORS};
pub use observer::{Attachment, ChangeObserver};
pub use page::{DomEvent, Element, ElementId, Page, PageError};
pub use presenter::{LogPresenter, Presenter};
pub use processor::{CycleOutcome, QueueProcessor, RequeueReason, SharedState, SkipReason};
pub use settings::{CompletionSettings, ProcessorSettings};
pub use submit::SubmitAdapter;
pub use timer::{Timer, TokioTimer};
pub use wait::{await_idle, CompletionReport, WaitError};
