use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::mot::ConfigError;

/// What to throw away when the consumer falls behind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Evict the oldest queued item to make room (lowest latency)
    #[default]
    DropOldest,
    /// Reject the item being pushed
    DropNewest,
}

/// Bounded queue between the frame loop and a slower output stage.
/// `push` never blocks.
pub struct OverlayQueue<T> {
    tx: Sender<T>,
    // Kept to evict from the head on DropOldest
    rx: Receiver<T>,
    policy: OverflowPolicy,
    dropped: AtomicU64,
}

impl<T> OverlayQueue<T> {
    /// Creates new bounded queue
    ///
    /// Basic usage:
    ///
    /// ```
    /// use line_counter_rs::pipeline::{OverflowPolicy, OverlayQueue};
    /// let queue: OverlayQueue<u32> = OverlayQueue::bounded(2, OverflowPolicy::DropOldest).unwrap();
    /// let consumer = queue.receiver();
    /// for i in 0..5 {
    ///     queue.push(i);
    /// }
    /// assert_eq!(consumer.try_iter().collect::<Vec<_>>(), vec![3, 4]);
    /// assert_eq!(queue.dropped(), 3);
    /// ```
    pub fn bounded(capacity: usize, policy: OverflowPolicy) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Ok(OverlayQueue {
            tx,
            rx,
            policy,
            dropped: AtomicU64::new(0),
        })
    }
    /// Consumer end. May be cloned and moved to another thread.
    pub fn receiver(&self) -> Receiver<T> {
        self.rx.clone()
    }
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }
    /// Number of items discarded so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
    pub fn len(&self) -> usize {
        self.tx.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
    /// Enqueues `item`, dropping according to the policy when full.
    /// Returns `false` when an item had to be dropped.
    pub fn push(&self, item: T) -> bool {
        let mut item = item;
        let mut accepted_all = true;
        loop {
            match self.tx.try_send(item) {
                Ok(()) => return accepted_all,
                // Unreachable while `self.rx` is alive
                Err(TrySendError::Disconnected(_)) => return false,
                Err(TrySendError::Full(rejected)) => match self.policy {
                    OverflowPolicy::DropNewest => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        log::warn!("Overlay queue is full, dropping newest item");
                        return false;
                    }
                    OverflowPolicy::DropOldest => {
                        // Consumer may have drained it meanwhile: then just retry
                        if self.rx.try_recv().is_ok() {
                            self.dropped.fetch_add(1, Ordering::Relaxed);
                            accepted_all = false;
                            log::warn!("Overlay queue is full, dropped oldest item");
                        }
                        item = rejected;
                    }
                },
            }
        }
    }
}
