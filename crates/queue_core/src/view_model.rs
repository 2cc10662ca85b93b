/// Characters shown per queued prompt before `...`.
pub const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Processing,
    WaitingForTyping,
    Queued,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItemView {
    pub position: usize,
    pub preview: String,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueViewModel {
    pub count: usize,
    pub is_processing: bool,
    pub items: Vec<QueueItemView>,
}
