//! Callback-to-future bridge.
//!
//! [`channel`] returns a [`Callback`] to hand to a driver and a [`Pending`]
//! future that settles with whatever the driver passes to it. The callback is
//! backed by a oneshot sender, so the future settles at most once.

use std::future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::Callback;

type OrphanSlot<T, E> = Arc<Mutex<Option<Callback<T, E>>>>;

/// The receiving half of a [`channel`].
///
/// Dropping it before it settles routes any outcome the driver delivers,
/// now or later, to the `orphan` handler given to [`channel`].
pub struct Pending<T, E> {
    rx: oneshot::Receiver<Result<T, E>>,
    orphan: OrphanSlot<T, E>,
    operation: &'static str,
}

/// Creates a linked callback/future pair.
///
/// `orphan` receives the outcome if nobody is left to collect it: either the
/// driver fires the callback after the [`Pending`] side was dropped, or the
/// [`Pending`] side is dropped while the outcome sits uncollected. Resources
/// carried in the outcome (such as a freshly acquired connection) can then
/// still be cleaned up. Exactly one of the two sides sees the outcome.
pub fn channel<T, E, F>(operation: &'static str, orphan: F) -> (Callback<T, E>, Pending<T, E>)
where
    T: Send + 'static,
    E: Send + 'static,
    F: FnOnce(Result<T, E>) + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let handler: Callback<T, E> = Box::new(orphan);
    let orphan: OrphanSlot<T, E> = Arc::new(Mutex::new(Some(handler)));
    let sender_orphan = Arc::clone(&orphan);
    let callback: Callback<T, E> = Box::new(move |outcome| {
        if let Err(outcome) = tx.send(outcome) {
            debug!(operation, "callback fired after caller went away");
            hand_to_orphan(&sender_orphan, outcome);
        }
    });
    (callback, Pending { rx, orphan, operation })
}

fn hand_to_orphan<T, E>(slot: &OrphanSlot<T, E>, outcome: Result<T, E>) {
    let handler = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(handler) = handler {
        handler(outcome);
    }
}

impl<T, E> Pending<T, E> {
    /// Waits for the driver to invoke the callback.
    ///
    /// If the driver drops the callback without calling it, this never
    /// settles: the operation is treated as hung.
    pub async fn settled(mut self) -> Result<T, E> {
        match (&mut self.rx).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    operation = self.operation,
                    "driver dropped callback without settling it"
                );
                future::pending().await
            }
        }
    }
}

impl<T, E> Drop for Pending<T, E> {
    fn drop(&mut self) {
        // After close() a late send fails and goes to the orphan handler on
        // the sender side; anything already buffered is drained here.
        self.rx.close();
        if let Ok(outcome) = self.rx.try_recv() {
            debug!(operation = self.operation, "caller went away before collecting outcome");
            hand_to_orphan(&self.orphan, outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_handler(seen: &Arc<AtomicUsize>) -> impl FnOnce(Result<u8, String>) + Send + 'static {
        let seen = Arc::clone(seen);
        move |outcome| {
            assert_eq!(outcome, Ok(9));
            seen.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn settles_with_synchronous_callback() {
        let (cb, pending) = channel::<u8, String, _>("test", drop);
        cb(Ok(5));
        assert_eq!(pending.settled().await, Ok(5));
    }

    #[tokio::test]
    async fn settles_from_another_task() {
        let (cb, pending) = channel::<u8, String, _>("test", drop);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            cb(Err("boom".to_owned()));
        });
        assert_eq!(pending.settled().await, Err("boom".to_owned()));
    }

    #[tokio::test]
    async fn collected_outcome_skips_handler() {
        let seen = Arc::new(AtomicUsize::new(0));
        let (cb, pending) = channel("test", counting_handler(&seen));
        cb(Ok(9));
        assert_eq!(pending.settled().await, Ok(9));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn late_outcome_goes_to_handler() {
        let seen = Arc::new(AtomicUsize::new(0));
        let (cb, pending) = channel("test", counting_handler(&seen));
        drop(pending);
        cb(Ok(9));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn uncollected_outcome_goes_to_handler_on_drop() {
        let seen = Arc::new(AtomicUsize::new(0));
        let (cb, pending) = channel("test", counting_handler(&seen));
        cb(Ok(9));
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        drop(pending);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_callback_stays_pending() {
        let (cb, pending) = channel::<u8, String, _>("test", drop);
        drop(cb);
        let res = tokio::time::timeout(Duration::from_millis(20), pending.settled()).await;
        assert!(res.is_err());
    }
}
