//! RAII guard that releases a task's in-flight entry when the task ends.

use std::sync::Arc;

use super::Inner;

/// Removes the entry it was created for, unless the entry has since been
/// cancelled and replaced by a newer admission of the same identifier.
pub(super) struct InFlightGuard {
    inner: Arc<Inner>,
    identifier: String,
    generation: u64,
}

impl InFlightGuard {
    pub(super) fn new(inner: Arc<Inner>, identifier: String, generation: u64) -> Self {
        Self {
            inner,
            identifier,
            generation,
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        {
            let mut in_flight = self.inner.lock_in_flight();
            if in_flight
                .get(&self.identifier)
                .is_some_and(|e| e.generation == self.generation)
            {
                in_flight.remove(&self.identifier);
            }
        }
        self.inner.running.send_modify(|n| *n = n.saturating_sub(1));
    }
}
