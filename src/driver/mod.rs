//! Boundary with the underlying callback-style database client.
//!
//! The adapter never talks to a database itself. A driver plugs in by
//! implementing three traits:
//!
//! - [`PoolFactory`] — builds the pool once from the effective [`Settings`].
//! - [`Pool`] — hands out connections through a completion callback.
//! - [`Connection`] — runs one query through a completion callback and is
//!   released back to its pool afterwards.
//!
//! Result and error types are associated types of the driver and are passed
//! through the adapter untouched.

use std::fmt;

use crate::settings::Settings;

pub mod callback;
pub mod value;

pub use value::Value;

/// Completion callback handed to a driver.
///
/// Being `FnOnce`, a driver can settle an operation at most once. It may be
/// invoked synchronously from inside the call that received it or later from
/// any thread.
pub type Callback<T, E> = Box<dyn FnOnce(Result<T, E>) + Send + 'static>;

/// Creates connection pools from settings.
pub trait PoolFactory {
    type Pool: Pool;

    /// Builds a pool. Called exactly once per
    /// [`ConnectionManager`](crate::manager::ConnectionManager).
    fn create_pool(&self, settings: &Settings) -> Self::Pool;
}

/// A pool of reusable connections.
///
/// The pool arbitrates concurrent `get_connection` calls itself; the adapter
/// holds no locks around it.
pub trait Pool: Send + Sync + 'static {
    type Connection: Connection<Error = Self::Error>;
    type Error: fmt::Debug + Send + 'static;

    /// Checks out a connection and reports it, or the failure, to `callback`.
    fn get_connection(&self, callback: Callback<Self::Connection, Self::Error>);
}

/// A connection checked out of a [`Pool`].
pub trait Connection: Send + 'static {
    /// Whatever the driver produces for a successful query.
    type Output: Send + 'static;
    type Error: fmt::Debug + Send + 'static;

    /// Runs `sql` with positional `params` and reports the outcome to `callback`.
    fn query(&self, sql: &str, params: &[Value], callback: Callback<Self::Output, Self::Error>);

    /// Returns the connection to its pool.
    fn release(self) -> Result<(), Self::Error>;
}
