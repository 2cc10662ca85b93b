use crate::view_model::{ItemStatus, QueueItemView, QueueViewModel, PREVIEW_CHARS};
use crate::{Prompt, PromptQueue, StatusReport};

/// A prompt taken off the head for one submission cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedOut {
    pub cycle: u64,
    pub prompt: Prompt,
}

/// Pending prompts plus the "busy processing" flag.
///
/// Only enqueue entry points add prompts and only the processor removes them,
/// so the accessors below are the whole mutation surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueState {
    queue: PromptQueue,
    processing: bool,
    cycles_started: u64,
    dirty: bool,
}

impl QueueState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &PromptQueue {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn cycles_started(&self) -> u64 {
        self.cycles_started
    }

    pub fn enqueue(&mut self, prompt: Prompt) {
        self.queue.push(prompt);
        self.dirty = true;
    }

    pub fn enqueue_all(&mut self, prompts: impl IntoIterator<Item = Prompt>) {
        self.queue.extend(prompts);
        self.dirty = true;
    }

    /// Empties the queue. A prompt already checked out by a running cycle is unaffected.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.dirty = true;
    }

    /// Raises the processing flag and checks out the head.
    /// `None` when a cycle is already in flight or nothing is queued.
    pub fn begin_cycle(&mut self) -> Option<CheckedOut> {
        if self.processing {
            return None;
        }
        let prompt = self.queue.check_out()?;
        self.processing = true;
        self.cycles_started += 1;
        self.dirty = true;
        Some(CheckedOut {
            cycle: self.cycles_started,
            prompt,
        })
    }

    /// Hands a checked-out prompt back to the head of the queue.
    pub fn requeue(&mut self, prompt: Prompt) {
        self.queue.requeue_front(prompt);
        self.dirty = true;
    }

    /// Lowers the processing flag.
    pub fn end_cycle(&mut self) {
        self.processing = false;
        self.dirty = true;
    }

    /// Whether an idle host should be handed the next cycle right now.
    pub fn wants_cycle(&self, host_busy: bool) -> bool {
        !host_busy && !self.processing && !self.queue.is_empty()
    }

    pub fn status(&self, host_busy: bool) -> StatusReport {
        StatusReport {
            queue: self.queue.to_strings(),
            is_responding: host_busy,
            is_processing: self.processing,
        }
    }

    pub fn view(&self, input_has_text: bool, host_busy: bool) -> QueueViewModel {
        let items = self
            .queue
            .iter()
            .enumerate()
            .map(|(index, prompt)| {
                let status = if index != 0 {
                    ItemStatus::Queued
                } else if self.processing {
                    ItemStatus::Processing
                } else if input_has_text && !host_busy {
                    ItemStatus::WaitingForTyping
                } else {
                    ItemStatus::Queued
                };
                QueueItemView {
                    position: index + 1,
                    preview: prompt.preview(PREVIEW_CHARS),
                    status,
                }
            })
            .collect();
        QueueViewModel {
            count: self.queue.len(),
            is_processing: self.processing,
            items,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
