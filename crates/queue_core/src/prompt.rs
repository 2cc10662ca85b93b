use std::fmt;

/// A unit of text queued for submission. Never empty, never truncated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Prompt(String);

impl Prompt {
    /// Trims surrounding whitespace; `None` when nothing remains.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Display-only shortening: at most `max_chars` characters, `...` appended when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.0.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.0[..cut]),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
