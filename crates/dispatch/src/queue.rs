#![forbid(unsafe_code)]

use crate::target::Target;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Bounded FIFO of pending scan units, filled exactly once at construction.
///
/// Workers pull with [`try_take`] (never blocking; an empty queue ends the
/// worker) and acknowledge each pulled unit with exactly one [`mark_done`]
/// call, whatever the outcome was. [`join`] resolves once every unit has
/// been acknowledged, which is the dispatcher's only wait point.
///
/// [`try_take`]: WorkQueue::try_take
/// [`mark_done`]: WorkQueue::mark_done
/// [`join`]: WorkQueue::join
#[derive(Debug)]
pub struct WorkQueue {
    pending: Mutex<VecDeque<Target>>,
    remaining: AtomicUsize,
    drained: Notify,
}

impl WorkQueue {
    pub fn new(targets: Vec<Target>) -> Self {
        let remaining = AtomicUsize::new(targets.len());
        Self {
            pending: Mutex::new(VecDeque::from(targets)),
            remaining,
            drained: Notify::new(),
        }
    }

    /// Pop the next pending unit without waiting. `None` means the queue has
    /// handed out everything it will ever hold.
    pub fn try_take(&self) -> Option<Target> {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        pending.pop_front()
    }

    /// Acknowledge one previously taken unit. Must be called exactly once
    /// per successful [`try_take`], or [`join`] never resolves.
    ///
    /// [`try_take`]: WorkQueue::try_take
    /// [`join`]: WorkQueue::join
    pub fn mark_done(&self) {
        let prev = self.remaining.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "mark_done without a matching take");
        if prev == 1 {
            self.drained.notify_waiters();
        }
    }

    /// Wait until every unit has been acknowledged.
    pub async fn join(&self) {
        loop {
            if self.remaining.load(Ordering::Acquire) == 0 {
                return;
            }
            let drained = self.drained.notified();
            // Re-check after registering: the last mark_done may have slipped
            // in between the load and the registration.
            if self.remaining.load(Ordering::Acquire) == 0 {
                return;
            }
            drained.await;
        }
    }

    /// Units not yet acknowledged.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    fn targets(n: usize) -> Vec<Target> {
        (0..n)
            .map(|i| Target::Chroot(PathBuf::from(format!("/srv/chroots/{i}"))))
            .collect()
    }

    #[test]
    fn takes_in_fifo_order_then_empty() {
        let queue = WorkQueue::new(targets(3));
        assert_eq!(
            queue.try_take().unwrap().to_string(),
            "chroot:///srv/chroots/0"
        );
        assert_eq!(
            queue.try_take().unwrap().to_string(),
            "chroot:///srv/chroots/1"
        );
        assert_eq!(
            queue.try_take().unwrap().to_string(),
            "chroot:///srv/chroots/2"
        );
        assert!(queue.try_take().is_none());
    }

    #[tokio::test]
    async fn join_resolves_immediately_when_empty() {
        let queue = WorkQueue::new(Vec::new());
        queue.join().await;
    }

    #[tokio::test]
    async fn join_waits_for_every_mark_done() {
        let queue = Arc::new(WorkQueue::new(targets(8)));

        let workers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    while let Some(_target) = queue.try_take() {
                        tokio::time::sleep(Duration::from_millis(1)).await;
                        queue.mark_done();
                    }
                })
            })
            .collect();

        queue.join().await;
        assert_eq!(queue.remaining(), 0);
        assert!(queue.try_take().is_none());

        for worker in workers {
            worker.await.unwrap();
        }
    }

    #[tokio::test]
    async fn join_does_not_resolve_early() {
        let queue = Arc::new(WorkQueue::new(targets(2)));
        queue.try_take().unwrap();
        queue.try_take().unwrap();
        queue.mark_done();

        // One acknowledgement outstanding: join must still be pending.
        let pending =
            tokio::time::timeout(Duration::from_millis(50), queue.join()).await;
        assert!(pending.is_err());

        queue.mark_done();
        queue.join().await;
    }
}
