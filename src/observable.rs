//! Single-slot observable value
//!
//! Holds at most one value and an ordered list of subscribers. Publishing
//! calls every subscriber synchronously, in registration order, before
//! `publish` returns. Late subscribers do not see earlier values.

/// Subscriber callback
pub type Subscriber<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Single-slot publish/subscribe cell
pub struct Observable<T> {
    value: Option<T>,
    subscribers: Vec<Subscriber<T>>,
}

impl<T> Observable<T> {
    /// Create an empty cell with no subscribers
    pub fn new() -> Self {
        Self {
            value: None,
            subscribers: Vec::new(),
        }
    }

    /// Current value, if any
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Store a new value and notify every subscriber with it
    pub fn publish(&mut self, value: T) {
        let value = self.value.insert(value);
        for subscriber in &self.subscribers {
            subscriber(value);
        }
    }

    /// Clear the value without notifying anyone
    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }

    /// Register a callback for future publishes
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Drop every subscriber. The current value is left alone.
    pub fn unsubscribe_all(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T> Default for Observable<T> {
    fn default() -> Self {
        Self::new()
    }
}
