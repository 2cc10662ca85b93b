use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use queue_core::{Prompt, QueueState, PREVIEW_CHARS};
use queue_logging::{queue_error, queue_info, queue_warn, set_cycle};

use crate::busy::BusyProbe;
use crate::input::InputAdapter;
use crate::page::{Page, PageError};
use crate::presenter::{refresh, Presenter};
use crate::settings::ProcessorSettings;
use crate::submit::SubmitAdapter;
use crate::timer::Timer;
use crate::wait::await_idle;

/// Queue state shared between the processor and the enqueue entry points.
pub type SharedState = Arc<Mutex<QueueState>>;

pub(crate) fn lock_state(state: &SharedState) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyProcessing,
    QueueEmpty,
    HostBusy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequeueReason {
    InputMissing,
    SubmitUnavailable,
    PageFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Entry conditions not met; nothing was checked out.
    Skipped(SkipReason),
    /// The prompt went back to the head of the queue.
    Requeued(RequeueReason),
    /// Sent and the response finished.
    Completed,
    /// Sent, but no idle confirmation arrived in time. The prompt is not re-queued.
    TimedOut,
}

impl CycleOutcome {
    /// Whether draining should go straight on to the next prompt.
    pub fn continues_drain(&self) -> bool {
        matches!(self, CycleOutcome::Completed | CycleOutcome::TimedOut)
    }
}

/// Holds the processing flag and the checked-out prompt for one cycle.
///
/// Dropping it, on any path, hands an unconfirmed prompt back to the head and
/// lowers the flag.
struct CycleGuard {
    state: SharedState,
    prompt: Option<Prompt>,
}

impl CycleGuard {
    fn confirm_sent(&mut self) {
        self.prompt = None;
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        if let Some(prompt) = self.prompt.take() {
            state.requeue(prompt);
        }
        state.end_cycle();
        set_cycle(0);
    }
}

/// Submits queued prompts one at a time, waiting out each response.
#[derive(Clone)]
pub struct QueueProcessor {
    state: SharedState,
    probe: Arc<dyn BusyProbe>,
    input: InputAdapter,
    submit: SubmitAdapter,
    timer: Arc<dyn Timer>,
    presenter: Arc<dyn Presenter>,
    settings: ProcessorSettings,
}

impl QueueProcessor {
    pub fn new(
        state: SharedState,
        page: Arc<dyn Page>,
        probe: Arc<dyn BusyProbe>,
        timer: Arc<dyn Timer>,
        presenter: Arc<dyn Presenter>,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            state,
            probe,
            input: InputAdapter::new(page.clone()),
            submit: SubmitAdapter::new(page),
            timer,
            presenter,
            settings,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Runs cycles back to back while the queue has work and the host is idle.
    /// Stops after the first cycle that does not end in a send.
    pub async fn drain(&self) -> Vec<CycleOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let outcome = self.run_cycle().await;
            outcomes.push(outcome);
            if !outcome.continues_drain() {
                return outcomes;
            }
        }
    }

    /// One pop-write-submit-await cycle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let outcome = self.cycle().await;
        self.refresh();
        outcome
    }

    async fn cycle(&self) -> CycleOutcome {
        {
            let state = lock_state(&self.state);
            if state.is_processing() {
                return CycleOutcome::Skipped(SkipReason::AlreadyProcessing);
            }
            if state.is_empty() {
                return CycleOutcome::Skipped(SkipReason::QueueEmpty);
            }
        }
        if self.probe.is_busy() {
            return CycleOutcome::Skipped(SkipReason::HostBusy);
        }

        let checked_out = {
            let mut state = lock_state(&self.state);
            match state.begin_cycle() {
                Some(checked_out) => checked_out,
                None if state.is_processing() => {
                    return CycleOutcome::Skipped(SkipReason::AlreadyProcessing)
                }
                None => return CycleOutcome::Skipped(SkipReason::QueueEmpty),
            }
        };
        set_cycle(checked_out.cycle);
        let mut guard = CycleGuard {
            state: self.state.clone(),
            prompt: Some(checked_out.prompt.clone()),
        };
        self.refresh();

        let prompt = checked_out.prompt;
        queue_info!("sending from queue: {}", prompt.preview(PREVIEW_CHARS));
        match self.submit_prompt(&prompt).await {
            Ok(()) => guard.confirm_sent(),
            Err(reason) => {
                queue_warn!("prompt re-queued at head: {:?}", reason);
                return CycleOutcome::Requeued(reason);
            }
        }

        match await_idle(
            self.probe.as_ref(),
            self.timer.as_ref(),
            &self.settings.completion,
        )
        .await
        {
            Ok(report) => {
                queue_info!(
                    "response finished after {} polls ({}s)",
                    report.polls,
                    report.elapsed.as_secs()
                );
                CycleOutcome::Completed
            }
            Err(err) => {
                queue_error!("{}; treating prompt as sent", err);
                CycleOutcome::TimedOut
            }
        }
    }

    async fn submit_prompt(&self, prompt: &Prompt) -> Result<(), RequeueReason> {
        let Some(target) = self.input.locate() else {
            queue_warn!("no input element");
            return Err(RequeueReason::InputMissing);
        };
        self.input
            .write(&target, prompt.as_str())
            .map_err(page_failure)?;

        // The host enables its send control asynchronously after the input event.
        self.timer.sleep(self.settings.settle_delay).await;

        let accepted = match self.submit.locate().filter(SubmitAdapter::is_ready) {
            Some(button) => {
                queue_info!("clicking send");
                self.submit.invoke(&button).map_err(page_failure)?
            }
            None => {
                queue_warn!("send control not ready, trying form submit");
                self.submit.submit_via_form().map_err(page_failure)?
            }
        };
        if accepted {
            Ok(())
        } else {
            queue_warn!("form submit was not accepted");
            Err(RequeueReason::SubmitUnavailable)
        }
    }

    fn refresh(&self) {
        refresh(
            &self.state,
            &self.input,
            self.probe.as_ref(),
            self.presenter.as_ref(),
        );
    }
}

fn page_failure(err: PageError) -> RequeueReason {
    queue_error!("page error during submission: {}", err);
    RequeueReason::PageFailure
}
