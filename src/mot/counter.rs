use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::mot::crossing::{CrossingEvent, Direction};

/// Running totals for one stream. Both counters only ever grow until `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountState {
    pub in_count: u64,
    pub out_count: u64,
}

impl CountState {
    pub fn total(&self) -> u64 {
        self.in_count + self.out_count
    }
    /// Overlay label, e.g. "IN: 3  OUT: 5"
    pub fn label(&self) -> String {
        format!("IN: {}  OUT: {}", self.in_count, self.out_count)
    }
}

/// Consumes crossing events. Clones share the same counters, so a clone can be
/// handed to another thread for polling while the producer records.
///
/// Basic usage:
///
/// ```
/// use line_counter_rs::mot::CountingAggregator;
/// let counter = CountingAggregator::new();
/// let observer = counter.clone();
/// assert_eq!(observer.snapshot().total(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CountingAggregator {
    state: Arc<RwLock<CountState>>,
}

impl CountingAggregator {
    pub fn new() -> Self {
        CountingAggregator {
            state: Arc::new(RwLock::new(CountState::default())),
        }
    }
    pub fn record(&self, event: &CrossingEvent) {
        let mut state = self.state.write();
        match event.direction {
            Direction::In => state.in_count += 1,
            Direction::Out => state.out_count += 1,
        }
    }
    /// Consistent (in, out) pair
    pub fn snapshot(&self) -> CountState {
        *self.state.read()
    }
    /// Starts counting a new stream from zero
    pub fn reset(&self) {
        *self.state.write() = CountState::default();
    }
}
