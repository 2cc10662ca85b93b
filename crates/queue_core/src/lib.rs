//! Queue core: pure prompt-queue state machine, message protocol and view-model helpers.
mod chain;
mod effect;
mod msg;
mod prompt;
mod protocol;
mod queue;
mod state;
mod update;
mod view_model;

pub use chain::{split_chain, CHAIN_DELIMITER};
pub use effect::{Effect, WakeTrigger};
pub use msg::Msg;
pub use prompt::Prompt;
pub use protocol::{parse_request, Ack, ProtocolError, Request, Response, StatusReport};
pub use queue::PromptQueue;
pub use state::{CheckedOut, QueueState};
pub use update::update;
pub use view_model::{ItemStatus, QueueItemView, QueueViewModel, PREVIEW_CHARS};
