use queue_core::QueueViewModel;
use queue_logging::{queue_debug, queue_info};

use crate::busy::BusyProbe;
use crate::input::InputAdapter;
use crate::processor::{lock_state, SharedState};

/// Display collaborator: badge, queue card and transient notices.
pub trait Presenter: Send + Sync {
    fn render(&self, view: &QueueViewModel);
    fn notify(&self, message: &str);
}

/// Presenter that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn render(&self, view: &QueueViewModel) {
        queue_debug!(
            "queue view: {} pending, processing={}",
            view.count,
            view.is_processing
        );
    }

    fn notify(&self, message: &str) {
        queue_info!("{}", message);
    }
}

/// Renders the current view if anything changed since the last render.
pub(crate) fn refresh(
    state: &SharedState,
    input: &InputAdapter,
    probe: &dyn BusyProbe,
    presenter: &dyn Presenter,
) {
    let input_has_text = input
        .locate()
        .and_then(|target| input.read(&target).ok())
        .is_some_and(|text| !text.trim().is_empty());
    let host_busy = probe.is_busy();
    let view = {
        let mut guard = lock_state(state);
        if !guard.consume_dirty() {
            return;
        }
        guard.view(input_has_text, host_busy)
    };
    presenter.render(&view);
}
