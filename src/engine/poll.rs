//! Tick-driven pollers for asynchronously arriving essay state.
//!
//! Both pollers are plain values owned by the engine for the current page.
//! They hold no timers and spawn nothing: the host's tick loop drives them,
//! and rate limiting is done against `Instant`. Navigating away drops the
//! poller, which is the cancellation path — a stale poll can never write
//! into the store of a later page.

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::dom::metadata::EssayDataItem;
use crate::dom::DomTree;

/// Fixed delay between poll attempts. There is no attempt cap; polling ends
/// when the condition holds or the poller is dropped.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Waits for a specific element to exist in the mounted content.
pub struct ReadinessPoller {
    target_id: String,
    interval: Duration,
    next_check: Instant,
}

impl ReadinessPoller {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self::with_interval(target_id, POLL_INTERVAL)
    }

    /// The first check runs on the next poll; only retries are delayed.
    pub fn with_interval(target_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            target_id: target_id.into(),
            interval,
            next_check: Instant::now(),
        }
    }

    /// Check whether the target element has appeared. Returns `false` while
    /// rate-limited or while the element is still missing.
    pub fn poll(&mut self, content: Option<&DomTree>) -> bool {
        let now = Instant::now();
        if now < self.next_check {
            return false;
        }
        self.next_check = now + self.interval;

        match content {
            Some(tree) if tree.contains_id(&self.target_id) => true,
            _ => {
                log::debug!("waiting for #{} to mount", self.target_id);
                false
            }
        }
    }
}

/// Waits for essay metadata items from the injector's channel.
pub struct EssayMetadataPoller {
    rx: Receiver<Vec<EssayDataItem>>,
    interval: Duration,
    next_check: Instant,
}

impl EssayMetadataPoller {
    pub fn new(rx: Receiver<Vec<EssayDataItem>>) -> Self {
        Self::with_interval(rx, POLL_INTERVAL)
    }

    pub fn with_interval(rx: Receiver<Vec<EssayDataItem>>, interval: Duration) -> Self {
        Self {
            rx,
            interval,
            next_check: Instant::now(),
        }
    }

    /// Check the channel for delivered metadata.
    pub fn poll(&mut self) -> Option<Vec<EssayDataItem>> {
        let now = Instant::now();
        if now < self.next_check {
            return None;
        }
        self.next_check = now + self.interval;
        self.rx.try_recv().ok()
    }
}
