use std::time::Duration;

use queue_logging::{queue_debug, queue_error, queue_info};

use crate::busy::BusyProbe;
use crate::settings::CompletionSettings;
use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionReport {
    pub polls: u32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitError {
    #[error("timed out after {elapsed:?} ({polls} polls) waiting for the response to finish")]
    Timeout { elapsed: Duration, polls: u32 },
}

/// Polls `probe` until it reads idle `idle_confirmations` times in a row, then
/// waits out the grace period. Any busy read resets the streak.
pub async fn await_idle(
    probe: &dyn BusyProbe,
    timer: &dyn Timer,
    settings: &CompletionSettings,
) -> Result<CompletionReport, WaitError> {
    let start = timer.now();
    let mut consecutive_idle = 0u32;
    let mut polls = 0u32;

    loop {
        polls += 1;
        let busy = probe.is_busy();
        let elapsed = timer.now().saturating_sub(start);
        queue_debug!(
            "response check #{}: busy={} elapsed={}s",
            polls,
            busy,
            elapsed.as_secs()
        );

        if busy {
            consecutive_idle = 0;
        } else {
            consecutive_idle += 1;
            if consecutive_idle >= settings.idle_confirmations {
                queue_info!(
                    "idle confirmed after {} consecutive checks",
                    consecutive_idle
                );
                timer.sleep(settings.grace_period).await;
                return Ok(CompletionReport {
                    polls,
                    elapsed: timer.now().saturating_sub(start),
                });
            }
        }

        if elapsed > settings.timeout {
            queue_error!(
                "no idle confirmation within {}s",
                settings.timeout.as_secs()
            );
            return Err(WaitError::Timeout { elapsed, polls });
        }

        timer.sleep(settings.poll_interval).await;
    }
}
