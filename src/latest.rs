//! Stale-result suppression for reactive fetches.
//!
//! A language switch or navigation can start a new fetch while an older one
//! is still outstanding. The older fetch may complete *after* the newer one,
//! and its result must never be applied. Each fetch takes a generation-tagged
//! ticket; a completion is only applied while its ticket is still the most
//! recently issued one. Last initiated wins, regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter shared by all fetches of one component instance.
#[derive(Debug, Clone, Default)]
pub struct Latest {
    counter: Arc<AtomicU64>,
}

/// A tag identifying one initiated fetch.
///
/// The ticket stays current until the next call to [`Latest::begin`] on the
/// same counter. Checking is racy-by-design in the benign direction: a ticket
/// observed as current may become stale immediately after, which only means a
/// fresher fetch will overwrite the applied result.
#[derive(Debug, Clone)]
pub struct Ticket {
    counter: Arc<AtomicU64>,
    id: u64,
}

impl Latest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch generation, invalidating all previously issued tickets.
    pub fn begin(&self) -> Ticket {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            counter: Arc::clone(&self.counter),
            id,
        }
    }
}

impl Ticket {
    /// Whether no newer fetch has been initiated since this ticket was issued.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.id
    }
}
