//! Connection settings handed to the driver's pool factory.
//!
//! A [`Settings`] record is supplied by the caller, completed with
//! [`Settings::with_defaults`], and passed once to
//! [`PoolFactory::create_pool`](crate::driver::PoolFactory::create_pool).
//! Options this crate does not recognize travel in [`Settings::extra`] and
//! reach the driver untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// MySQL's standard port.
pub const DEFAULT_PORT: u16 = 3306;

/// Pool size used when none is configured.
pub const DEFAULT_CONNECTION_LIMIT: u32 = 10;

/// Errors produced while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings for a connection pool.
///
/// Every field is optional. `host`, `port` and `connection_limit` are filled
/// in by [`with_defaults`](Self::with_defaults); everything else is passed
/// through as given.
///
/// # Examples
///
/// ```
/// use easy_mysql::settings::Settings;
///
/// let settings = Settings::new().with_user("app").with_defaults();
/// assert_eq!(settings.host.as_deref(), Some("localhost"));
/// assert_eq!(settings.port, Some(3306));
/// assert_eq!(settings.user.as_deref(), Some("app"));
/// ```
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_limit: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Driver options not modelled above (charset, timezone, ...).
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Settings {
    /// Creates an empty settings record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from a JSON object using the driver's camelCase keys.
    ///
    /// `null` is treated the same as an absent key.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Json`] if the input is not a valid settings object.
    pub fn from_json(input: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Builds settings from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Json`] if the value is not a valid settings object.
    pub fn from_value(value: JsonValue) -> Result<Self, SettingsError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the effective settings: unset `host`, `port` and
    /// `connection_limit` are replaced by their defaults.
    pub fn with_defaults(mut self) -> Self {
        self.host.get_or_insert_with(|| DEFAULT_HOST.to_owned());
        self.port.get_or_insert(DEFAULT_PORT);
        self.connection_limit.get_or_insert(DEFAULT_CONNECTION_LIMIT);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_connection_limit(mut self, limit: u32) -> Self {
        self.connection_limit = Some(limit);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Adds a driver option that is passed through verbatim.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("connection_limit", &self.connection_limit)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("extra", &self.extra)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full() -> Settings {
        Settings::new()
            .with_host("localhost")
            .with_port(5555)
            .with_connection_limit(5)
            .with_user("")
            .with_password("")
            .with_database("")
    }

    #[test]
    fn defaults_fill_unset_fields() {
        let s = Settings::new().with_defaults();
        assert_eq!(s.host.as_deref(), Some(DEFAULT_HOST));
        assert_eq!(s.port, Some(DEFAULT_PORT));
        assert!(s.connection_limit.unwrap() > 0);
    }

    #[test]
    fn defaults_keep_explicit_values() {
        let s = full().with_defaults();
        assert_eq!(s, full());
    }

    #[test]
    fn defaults_leave_other_fields_alone() {
        let s = Settings::new()
            .with_user("root")
            .with_password("secret")
            .with_database("shop")
            .with_option("charset", "utf8mb4")
            .with_defaults();
        assert_eq!(s.user.as_deref(), Some("root"));
        assert_eq!(s.password.as_deref(), Some("secret"));
        assert_eq!(s.database.as_deref(), Some("shop"));
        assert_eq!(s.extra.get("charset"), Some(&json!("utf8mb4")));
        assert_eq!(s.extra.len(), 1);
    }

    #[test]
    fn from_json_uses_camel_case_keys() {
        let s = Settings::from_json(
            r#"{"host":"db","port":5555,"connectionLimit":5,"user":"","password":"","database":""}"#,
        )
        .unwrap();
        assert_eq!(s, full().with_host("db"));
    }

    #[test]
    fn from_json_null_counts_as_unset() {
        let s = Settings::from_json(r#"{"host":null,"port":null,"connectionLimit":null}"#)
            .unwrap()
            .with_defaults();
        assert_eq!(s.host.as_deref(), Some("localhost"));
        assert_eq!(s.port, Some(3306));
        assert_eq!(s.connection_limit, Some(DEFAULT_CONNECTION_LIMIT));
    }

    #[test]
    fn unknown_keys_pass_through() {
        let s = Settings::from_value(json!({ "timezone": "Z", "multipleStatements": true })).unwrap();
        assert_eq!(s.extra.get("timezone"), Some(&json!("Z")));
        assert_eq!(s.extra.get("multipleStatements"), Some(&json!(true)));

        let back = serde_json::to_value(&s).unwrap();
        assert_eq!(back, json!({ "timezone": "Z", "multipleStatements": true }));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = Settings::from_json(r#"{"port":"not a number"}"#).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
        assert!(err.to_string().starts_with("invalid settings"));
    }

    #[test]
    fn debug_redacts_password() {
        let s = Settings::new().with_password("hunter2");
        let out = format!("{s:?}");
        assert!(!out.contains("hunter2"));
        assert!(out.contains("<redacted>"));
    }
}
