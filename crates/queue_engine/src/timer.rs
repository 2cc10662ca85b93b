use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Clock and sleep used by every timed wait, so tests can drive time themselves.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Time elapsed since the timer was created.
    fn now(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy)]
pub struct TokioTimer {
    origin: Instant,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Timer for TokioTimer {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
