use crate::Response;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Empty the chat input after its text was queued.
    ClearInput,
    /// Transient user-facing notification.
    Notify(String),
    /// Wake the queue processor after the delay configured for `trigger`.
    ScheduleProcessing { trigger: WakeTrigger },
    /// Reply to the request that produced this update.
    Respond(Response),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeTrigger {
    Keystroke,
    Request,
    Mutation,
}
