use std::collections::VecDeque;

use crate::Prompt;

/// FIFO of pending prompts. The head is the next (or current) prompt to submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptQueue {
    items: VecDeque<Prompt>,
}

impl PromptQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, prompt: Prompt) {
        self.items.push_back(prompt);
    }

    pub fn extend(&mut self, prompts: impl IntoIterator<Item = Prompt>) {
        self.items.extend(prompts);
    }

    /// Removes the head for processing. The caller owns it until it is either
    /// confirmed sent or handed back through [`PromptQueue::requeue_front`].
    pub fn check_out(&mut self) -> Option<Prompt> {
        self.items.pop_front()
    }

    /// Puts a checked-out prompt back at the head.
    pub fn requeue_front(&mut self, prompt: Prompt) {
        self.items.push_front(prompt);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn head(&self) -> Option<&Prompt> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prompt> {
        self.items.iter()
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.items.iter().map(|p| p.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::PromptQueue;
    use crate::Prompt;

    fn p(text: &str) -> Prompt {
        Prompt::parse(text).unwrap()
    }

    #[test]
    fn preserves_insertion_order() {
        let mut queue = PromptQueue::new();
        for text in ["a", "b", "c", "d"] {
            queue.push(p(text));
        }
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.to_strings(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn requeue_restores_head() {
        let mut queue = PromptQueue::new();
        queue.extend([p("first"), p("second")]);
        let head = queue.check_out().unwrap();
        assert_eq!(queue.len(), 1);
        queue.requeue_front(head);
        assert_eq!(queue.head().map(Prompt::as_str), Some("first"));
        assert_eq!(queue.len(), 2);
    }
}
