#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Enter pressed in the chat input without modifiers, carrying the raw input text.
    EnterPressed { text: String, host_busy: bool },
    /// A request arrived over the message channel.
    Request {
        request: crate::Request,
        host_busy: bool,
    },
    /// A batch of DOM mutations was observed.
    MutationsObserved { host_busy: bool },
}
