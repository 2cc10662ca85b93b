use std::time::Duration;

use queue_core::WakeTrigger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSettings {
    pub poll_interval: Duration,
    /// Consecutive idle reads required before a response counts as finished.
    pub idle_confirmations: u32,
    /// Extra wait after confirmation so the host can settle its DOM.
    pub grace_period: Duration,
    pub timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            idle_confirmations: 3,
            grace_period: Duration::from_secs(1),
            timeout: Duration::from_secs(300),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSettings {
    /// Pause between writing the input and looking for the send control.
    pub settle_delay: Duration,
    pub completion: CompletionSettings,
    pub keystroke_wake_delay: Duration,
    pub request_wake_delay: Duration,
    pub mutation_wake_delay: Duration,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(150),
            completion: CompletionSettings::default(),
            keystroke_wake_delay: Duration::from_millis(100),
            request_wake_delay: Duration::from_millis(500),
            mutation_wake_delay: Duration::from_millis(500),
        }
    }
}

impl ProcessorSettings {
    pub fn wake_delay(&self, trigger: WakeTrigger) -> Duration {
        match trigger {
            WakeTrigger::Keystroke => self.keystroke_wake_delay,
            WakeTrigger::Request => self.request_wake_delay,
            WakeTrigger::Mutation => self.mutation_wake_delay,
        }
    }
}
