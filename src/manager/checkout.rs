//! Scoped ownership of an acquired connection.

use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::driver::callback::{self, Pending};
use crate::driver::{Connection, Value};

/// An acquired connection with its query in flight.
///
/// The connection goes back to its pool exactly once, and never before the
/// driver has reported the query's outcome. Normally that happens through
/// [`Checkout::release`]. If the owning future is dropped first, the
/// connection is parked and released when the driver's callback fires.
pub(crate) struct Checkout<C: Connection> {
    // Only `None` once released or parked.
    conn: Option<C>,
    handoff: Arc<Handoff<C>>,
}

impl<C: Connection> Checkout<C> {
    /// Issues `sql` on `conn` and takes ownership of the connection until
    /// the returned [`Pending`] settles.
    pub(crate) fn start(conn: C, sql: &str, params: &[Value]) -> (Self, Pending<C::Output, C::Error>) {
        let handoff = Arc::new(Handoff::default());
        let finished = Arc::clone(&handoff);
        let (on_executed, executed) =
            callback::channel("query", move |_outcome: Result<C::Output, C::Error>| finished.query_finished());
        conn.query(sql, params, on_executed);
        let checkout = Self {
            conn: Some(conn),
            handoff,
        };
        (checkout, executed)
    }

    pub(crate) fn release(mut self) {
        if let Some(conn) = self.conn.take() {
            release(conn);
        }
    }
}

impl<C: Connection> Drop for Checkout<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("query abandoned, connection held until the driver reports back");
            self.handoff.abandon(conn);
        }
    }
}

enum Slot<C> {
    InFlight,
    Finished,
    Parked(C),
}

/// Meeting point between an abandoned [`Checkout`] and the late query
/// callback; whichever arrives second releases the connection.
struct Handoff<C> {
    slot: Mutex<Slot<C>>,
}

impl<C> Default for Handoff<C> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(Slot::InFlight),
        }
    }
}

impl<C: Connection> Handoff<C> {
    fn query_finished(&self) {
        let parked = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            mem::replace(&mut *slot, Slot::Finished)
        };
        if let Slot::Parked(conn) = parked {
            release(conn);
        }
    }

    fn abandon(&self, conn: C) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*slot, Slot::Finished) {
            drop(slot);
            release(conn);
        } else {
            *slot = Slot::Parked(conn);
        }
    }
}

/// Returns `conn` to its pool. A failed release is logged and otherwise
/// does not affect the caller.
pub(crate) fn release<C: Connection>(conn: C) {
    match conn.release() {
        Ok(()) => debug!("connection released"),
        Err(e) => warn!(error = ?e, "failed to release connection"),
    }
}
