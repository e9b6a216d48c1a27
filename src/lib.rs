//! # easy-mysql
//!
//! Future-returning queries over a callback-style pooled MySQL client.
//!
//! The driver supplies the pool and connections through the traits in
//! [`driver`]; [`ConnectionManager`] turns its callbacks into futures and
//! makes sure every acquired connection is released.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use easy_mysql::{ConnectionManager, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_json(r#"{"user":"app","database":"shop"}"#)?;
//!     let manager = ConnectionManager::new(settings, &my_driver::Factory);
//!     let rows = manager.query("SELECT * FROM orders WHERE id = ?", &[7.into()]).await?;
//!     println!("{rows:?}");
//!     Ok(())
//! }
//! ```

pub mod driver;
pub mod manager;
pub mod settings;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use driver::{Callback, Connection, Pool, PoolFactory, Value};
pub use manager::{ConnectionManager, QueryError};
pub use settings::{Settings, SettingsError};
