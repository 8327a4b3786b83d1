use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::Notify;

/// Counting join barrier: `wait` resolves once every registered unit has
/// signalled `done`.
///
/// The counter is independent of any channel capacity, so producers can be
/// tracked no matter where they put their results.
#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<WaitGroupInner>,
}

#[derive(Debug, Default)]
struct WaitGroupInner {
    count: AtomicUsize,
    notify: Notify,
}

impl WaitGroup {
    pub fn new() -> Self {
        WaitGroup::default()
    }

    pub fn add(&self, units: usize) {
        self.inner.count.fetch_add(units, Ordering::SeqCst);
    }

    /// Signals one unit as finished. A no-op once the counter is at zero.
    pub fn done(&self) {
        let previous = self
            .inner
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| count.checked_sub(1));

        if previous == Ok(1) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Registers one unit and returns a guard that signals it when dropped,
    /// including during a panic unwind.
    pub fn guard(&self) -> WaitGroupGuard {
        self.add(1);
        WaitGroupGuard {
            group: self.clone(),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // register before reading the counter so a concurrent last `done` is not missed
            notified.as_mut().enable();

            if self.count() == 0 {
                return;
            }

            notified.await;
        }
    }
}

#[derive(Debug)]
pub struct WaitGroupGuard {
    group: WaitGroup,
}

impl Drop for WaitGroupGuard {
    fn drop(&mut self) {
        self.group.done();
    }
}
