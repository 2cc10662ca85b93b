use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use queue_core::{
    parse_request, update, Ack, Effect, Msg, ProtocolError, QueueState, QueueViewModel, Request,
    Response,
};
use queue_logging::{queue_debug, queue_error, queue_warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::busy::{BusyDetector, BusyProbe};
use crate::input::{InputAdapter, KeyModifiers};
use crate::observer::{Attachment, ChangeObserver};
use crate::page::Page;
use crate::presenter::{refresh, Presenter};
use crate::processor::{lock_state, QueueProcessor, SharedState};
use crate::settings::ProcessorSettings;
use crate::timer::Timer;

/// What the caller must do with the key press that reached [`QueueEngine::on_enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The text was queued; suppress the host's own send.
    Queued,
    /// Not ours; let the host handle it.
    PassThrough,
}

/// Entry points of the page context: key presses, requests, mutation batches.
///
/// Processing runs on a scheduler task that sleeps for the requested wake
/// delay and then drains the queue. Wakes that arrive while it sleeps are
/// folded into the same drain.
pub struct QueueEngine {
    state: SharedState,
    input: InputAdapter,
    probe: Arc<dyn BusyProbe>,
    presenter: Arc<dyn Presenter>,
    settings: ProcessorSettings,
    observer: Mutex<ChangeObserver>,
    wake_tx: mpsc::UnboundedSender<Duration>,
    cancel: CancellationToken,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl QueueEngine {
    /// Starts the scheduler task on the current tokio runtime.
    pub fn spawn(
        page: Arc<dyn Page>,
        probe: Arc<dyn BusyProbe>,
        timer: Arc<dyn Timer>,
        presenter: Arc<dyn Presenter>,
        settings: ProcessorSettings,
    ) -> Self {
        let state: SharedState = Arc::new(Mutex::new(QueueState::new()));
        let processor = QueueProcessor::new(
            state.clone(),
            page.clone(),
            probe.clone(),
            timer.clone(),
            presenter.clone(),
            settings.clone(),
        );
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let scheduler = tokio::spawn(run_scheduler(processor, timer, wake_rx, cancel.clone()));

        Self {
            state,
            input: InputAdapter::new(page.clone()),
            probe,
            presenter,
            settings,
            observer: Mutex::new(ChangeObserver::new(page)),
            wake_tx,
            cancel,
            scheduler: Mutex::new(Some(scheduler)),
        }
    }

    /// Same as [`QueueEngine::spawn`] with busy state read from the page itself.
    pub fn with_detector(
        page: Arc<dyn Page>,
        timer: Arc<dyn Timer>,
        presenter: Arc<dyn Presenter>,
        settings: ProcessorSettings,
    ) -> Self {
        let probe: Arc<dyn BusyProbe> = Arc::new(BusyDetector::new(page.clone()));
        Self::spawn(page, probe, timer, presenter, settings)
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Prompts still queued or in flight.
    pub fn has_pending_work(&self) -> bool {
        let state = lock_state(&self.state);
        state.is_processing() || !state.is_empty()
    }

    pub fn view(&self) -> QueueViewModel {
        let input_has_text = self
            .input
            .locate()
            .and_then(|target| self.input.read(&target).ok())
            .is_some_and(|text| !text.trim().is_empty());
        let host_busy = self.probe.is_busy();
        lock_state(&self.state).view(input_has_text, host_busy)
    }

    pub fn handle_request(&self, request: Request) -> Response {
        let host_busy = self.probe.is_busy();
        let response = self.dispatch(Msg::Request { request, host_busy });
        debug_assert!(response.is_some(), "request left unanswered");
        response.unwrap_or_else(|| {
            queue_error!("request left unanswered");
            Response::Ack(Ack::error("Unhandled request"))
        })
    }

    /// Parses and handles one raw request. `Ok(None)` for actions without a response.
    pub fn handle_raw_request(&self, raw: &str) -> Result<Option<Response>, ProtocolError> {
        Ok(parse_request(raw)?.map(|request| self.handle_request(request)))
    }

    /// Enter pressed in the chat input.
    pub fn on_enter(&self, modifiers: KeyModifiers) -> KeyOutcome {
        if modifiers.any() {
            return KeyOutcome::PassThrough;
        }
        let Some(target) = self.input.locate() else {
            return KeyOutcome::PassThrough;
        };
        let text = match self.input.read(&target) {
            Ok(text) => text,
            Err(err) => {
                queue_warn!("could not read input: {}", err);
                return KeyOutcome::PassThrough;
            }
        };
        if text.trim().is_empty() {
            return KeyOutcome::PassThrough;
        }
        let host_busy = self.probe.is_busy();
        self.dispatch(Msg::EnterPressed { text, host_busy });
        KeyOutcome::Queued
    }

    /// One batch of DOM mutations was observed.
    pub fn on_mutations(&self) -> Attachment {
        let attachment = self
            .observer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .attach();
        if let Attachment::Attached(_) = attachment {
            // Fresh input node: make sure the badge reflects the current queue.
            lock_state(&self.state).mark_dirty();
        }
        let host_busy = self.probe.is_busy();
        self.dispatch(Msg::MutationsObserved { host_busy });
        attachment
    }

    /// Stops the scheduler. A cycle still in flight is dropped and its
    /// unconfirmed prompt returns to the head of the queue.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self
            .scheduler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn dispatch(&self, msg: Msg) -> Option<Response> {
        let effects = {
            let mut guard = lock_state(&self.state);
            let state = std::mem::take(&mut *guard);
            let (state, effects) = update(state, msg);
            *guard = state;
            effects
        };

        let mut response = None;
        for effect in effects {
            match effect {
                Effect::ClearInput => self.clear_input(),
                Effect::Notify(message) => self.presenter.notify(&message),
                Effect::ScheduleProcessing { trigger } => {
                    self.schedule(self.settings.wake_delay(trigger));
                }
                Effect::Respond(reply) => response = Some(reply),
            }
        }
        refresh(
            &self.state,
            &self.input,
            self.probe.as_ref(),
            self.presenter.as_ref(),
        );
        response
    }

    fn clear_input(&self) {
        let Some(target) = self.input.locate() else {
            return;
        };
        if let Err(err) = self.input.clear(&target) {
            queue_warn!("could not clear input: {}", err);
        }
    }

    fn schedule(&self, delay: Duration) {
        if self.wake_tx.send(delay).is_err() {
            queue_debug!("scheduler stopped; wake dropped");
        }
    }
}

impl Drop for QueueEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_scheduler(
    processor: QueueProcessor,
    timer: Arc<dyn Timer>,
    mut wake_rx: mpsc::UnboundedReceiver<Duration>,
    cancel: CancellationToken,
) {
    loop {
        let delay = tokio::select! {
            _ = cancel.cancelled() => break,
            wake = wake_rx.recv() => match wake {
                Some(delay) => delay,
                None => break,
            },
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = timer.sleep(delay) => {}
        }
        while wake_rx.try_recv().is_ok() {}
        tokio::select! {
            _ = cancel.cancelled() => break,
            outcomes = processor.drain() => queue_debug!("drain finished: {:?}", outcomes),
        }
    }
    queue_debug!("scheduler stopped");
}
