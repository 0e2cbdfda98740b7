use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{GatewayError, Rewriter};

/// A scripted rewriter for tests. Replies are consumed in order; once the
/// script runs out every call fails.
pub struct MockRewriter {
    replies: Mutex<VecDeque<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockRewriter {
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails on every call.
    pub fn failing() -> Self {
        Self::replying(Vec::<String>::new())
    }

    /// Sleep before answering, to hold an uplink open.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `rewrite` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Rewriter for MockRewriter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn rewrite(&self, _input: &str) -> Result<String, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| {
                GatewayError::Malformed(format!("MockRewriter: no reply for call {}", n + 1))
            })
    }
}
