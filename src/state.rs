use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Holds a piece of UI-facing state and lets any number of observers
/// follow its changes without knowing who renders it.
#[derive(Debug)]
pub struct Observable<T> {
    sender: watch::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Observable { sender }
    }

    /// Returns a cloned snapshot of the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    pub fn update(&self, modify: impl FnOnce(&mut T)) {
        self.sender.send_modify(modify);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }
}

impl<T: Clone + Default> Default for Observable<T> {
    fn default() -> Self {
        Observable::new(T::default())
    }
}

/// Monotonic attempt counter. Each new attempt invalidates every token
/// handed out before it.
#[derive(Debug, Default)]
pub struct Generation {
    current: AtomicU64,
}

impl Generation {
    pub fn new() -> Self {
        Generation::default()
    }

    /// Starts a new attempt and returns its token.
    pub fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.current.load(Ordering::SeqCst) == token
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observers_see_latest_value() {
        let state = Observable::new(1u32);
        let mut rx = state.subscribe();
        state.set(2);
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), 2);
        state.update(|v| *v += 1);
        assert_eq!(state.get(), 3);
        assert_eq!(*rx.borrow(), 3);
    }

    #[test]
    fn set_without_observers_still_stores() {
        let state: Observable<Option<String>> = Observable::default();
        state.set(Some("x".to_string()));
        assert_eq!(state.get().as_deref(), Some("x"));
    }

    #[test]
    fn advancing_invalidates_older_tokens() {
        let generation = Generation::new();
        let first = generation.advance();
        assert!(generation.is_current(first));
        let second = generation.advance();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        assert_eq!(generation.current(), second);
    }
}
