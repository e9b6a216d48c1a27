//! Positional bind values.

use serde::Serialize;

/// A single bind parameter for a query.
///
/// Serializes to the plain JSON scalar (`null`, `true`, `5`, `"text"`) that
/// a driver expects, so the variant is not recoverable from the output:
/// `UInt(5)` and `Int(5)` both become `5`.
///
/// # Examples
///
/// ```
/// use easy_mysql::driver::Value;
///
/// let params: Vec<Value> = vec![42.into(), "alice".into(), Value::Null];
/// assert_eq!(params[0], Value::Int(42));
/// assert!(params[2].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// BLOB / VARBINARY
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::UInt(v.into())
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from(7_u32), Value::UInt(7));
        assert_eq!(Value::from("x"), Value::Text("x".into()));
        assert_eq!(Value::from(vec![1_u8, 2]), Value::Bytes(vec![1, 2]));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn serializes_as_plain_json() {
        let params = vec![Value::Null, Value::Bool(true), Value::Int(-3), Value::Text("t".into())];
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"[null,true,-3,"t"]"#);
    }

    #[test]
    fn signedness_is_not_kept_in_json() {
        let json = serde_json::to_string(&[Value::UInt(5), Value::Int(5)]).unwrap();
        assert_eq!(json, "[5,5]");
    }
}
