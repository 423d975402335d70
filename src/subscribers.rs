/// Subscriber registry for data-changed notifications.
///
/// Consumers register a callback and receive one invocation per completed
/// refresh cycle. Callbacks carry no payload — subscribers pull the current
/// snapshot from the coordinator when invoked, so success and failure cycles
/// deliver identically.
///
/// The registry itself only tracks registrations; the coordinator owns
/// locking and delivery. `callbacks()` hands out a point-in-time copy so
/// delivery can happen with no registry lock held, which makes it safe for a
/// subscriber to unsubscribe (itself or another) from inside its callback.

use std::sync::Arc;

/// Notification callback. `Arc` so a delivery-time copy of the list shares
/// the underlying closures instead of cloning them.
pub type SubscriberCallback = Arc<dyn Fn() + Send + Sync>;

/// Opaque ticket returned by `register`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberHandle(u64);

pub struct SubscriberRegistry {
    next_id: u64,
    entries: Vec<(SubscriberHandle, SubscriberCallback)>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Add a callback; the returned handle is never reused, even after
    /// removal.
    pub fn register(&mut self, callback: SubscriberCallback) -> SubscriberHandle {
        let handle = SubscriberHandle(self.next_id);
        self.next_id += 1;
        self.entries.push((handle, callback));
        handle
    }

    /// Remove a registration. Unknown or already-removed handles are a no-op.
    pub fn remove(&mut self, handle: SubscriberHandle) {
        self.entries.retain(|(h, _)| *h != handle);
    }

    /// Copy of the current callbacks, in registration order.
    pub fn callbacks(&self) -> Vec<SubscriberCallback> {
        self.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every registration (service teardown).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
