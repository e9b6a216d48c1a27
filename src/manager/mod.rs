//! Future-returning query interface over a callback-style connection pool.
//!
//! A [`ConnectionManager`] builds its pool once and then serves any number of
//! concurrent [`query`](ConnectionManager::query) calls. Each call walks the
//! same lifecycle:
//!
//! ```text
//! acquire ──err──────────────────────────────▶ QueryError::Acquire
//!    │ok
//! execute ──err──▶ release ──────────────────▶ QueryError::Execute
//!    │ok
//! release ───────────────────────────────────▶ Ok(output)
//! ```
//!
//! Once a connection has been acquired it is always released, and release
//! completes before the caller observes the outcome.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::driver::{Connection, Pool, PoolFactory, Value, callback};
use crate::settings::Settings;

mod checkout;

use checkout::Checkout;

/// Output type of a pool's connections.
pub type Output<P> = <<P as Pool>::Connection as Connection>::Output;

/// The two ways a query can fail.
///
/// Both variants carry the driver's error value exactly as the driver
/// reported it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError<E> {
    /// The pool could not hand out a connection. Nothing was released.
    #[error("failed to acquire connection: {0:?}")]
    Acquire(E),

    /// The query failed. The connection was released before this was returned.
    #[error("query failed: {0:?}")]
    Execute(E),
}

impl<E> QueryError<E> {
    /// Returns the driver's error value.
    pub fn into_inner(self) -> E {
        match self {
            QueryError::Acquire(e) | QueryError::Execute(e) => e,
        }
    }

    pub fn inner(&self) -> &E {
        match self {
            QueryError::Acquire(e) | QueryError::Execute(e) => e,
        }
    }

    pub fn is_acquire(&self) -> bool {
        matches!(self, QueryError::Acquire(_))
    }

    pub fn is_execute(&self) -> bool {
        matches!(self, QueryError::Execute(_))
    }
}

/// Owns a connection pool and runs queries against it.
///
/// Cloning is cheap and shares the same pool.
///
/// # Examples
///
/// ```rust,ignore
/// use easy_mysql::{ConnectionManager, Settings};
///
/// let manager = ConnectionManager::new(Settings::new().with_user("app"), &driver);
/// let rows = manager.query("SELECT * FROM users WHERE id = ?", &[42.into()]).await?;
/// ```
pub struct ConnectionManager<P: Pool> {
    pool: Arc<P>,
    settings: Arc<Settings>,
}

impl<P: Pool> ConnectionManager<P> {
    /// Applies defaults to `settings` and creates the pool through `factory`.
    ///
    /// `factory` is called exactly once; the pool it returns is kept for the
    /// lifetime of the manager and its clones.
    pub fn new<F>(settings: Settings, factory: &F) -> Self
    where
        F: PoolFactory<Pool = P>,
    {
        let settings = settings.with_defaults();
        debug!(
            host = settings.host.as_deref().unwrap_or_default(),
            port = settings.port,
            connection_limit = settings.connection_limit,
            database = settings.database.as_deref(),
            "creating connection pool"
        );
        let pool = factory.create_pool(&settings);
        Self {
            pool: Arc::new(pool),
            settings: Arc::new(settings),
        }
    }

    /// Runs `sql` with positional `params` on a pooled connection.
    ///
    /// The connection is acquired, the query is issued with `sql` and
    /// `params` unchanged, and the connection is released before this
    /// resolves, whether the query succeeded or not. Nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`QueryError::Acquire`] if the pool fails to hand out a connection.
    /// - [`QueryError::Execute`] if the query itself fails.
    ///
    /// If the driver never invokes its callback the returned future never
    /// resolves; timeouts belong to the driver.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Output<P>, QueryError<P::Error>> {
        debug!(sql, params = params.len(), "acquiring connection");

        // A connection that shows up after the caller gave up still goes back.
        let (on_acquired, acquired) = callback::channel("get_connection", |outcome: Result<P::Connection, P::Error>| {
            if let Ok(conn) = outcome {
                checkout::release::<P::Connection>(conn);
            }
        });
        self.pool.get_connection(on_acquired);
        let conn = acquired.settled().await.map_err(QueryError::Acquire)?;

        debug!(sql, "executing query");
        let (checkout, executed) = Checkout::start(conn, sql, params);
        let outcome = executed.settled().await;

        checkout.release();
        outcome.map_err(QueryError::Execute)
    }

    /// Returns the effective settings the pool was created with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the pool handle shared by this manager and its clones.
    pub fn pool(&self) -> &P {
        &self.pool
    }
}

impl<P: Pool> Clone for ConnectionManager<P> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl<P: Pool> fmt::Debug for ConnectionManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
