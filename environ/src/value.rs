//! Dynamically typed values produced by casting.

use crate::cast::Spec;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Result of casting a raw string with a [`Spec`].
///
/// Backend configuration records use the same type for their field values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Json(serde_json::Value),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Json(_) => "json",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and ints widened to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Elements of a list or tuple.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Spec that would produce a value of the same shape from a raw string.
    ///
    /// Used for smart casting, where the default decides how the raw value is read.
    pub fn inferred_spec(&self) -> Spec {
        match self {
            Value::Bool(_) => Spec::bool(),
            Value::Int(_) => Spec::int(),
            Value::Float(_) => Spec::float(),
            Value::Bytes(_) => Spec::bytes(),
            Value::Json(_) => Spec::json(),
            Value::List(_) => Spec::list(Spec::string()),
            Value::Tuple(_) => Spec::tuple(Spec::string()),
            Value::Map(_) => Spec::map(Spec::string()),
            Value::Str(_) => Spec::string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Json(j) => write!(f, "{j}"),
            Value::List(items) => write_joined(f, items),
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items)?;
                f.write_str(")")
            }
            Value::Map(map) => {
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                Ok(())
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}

/// Conversion from a cast [`Value`] into a concrete Rust type.
///
/// `spec` tells the store how to cast the raw string before `from_value`
/// runs, so `Vec<u16>` reads `"80,443"` as a list of ints and then narrows
/// each element.
pub trait FromValue: Sized {
    /// Spec used to cast the raw string for this type.
    fn spec() -> Spec;

    /// Convert the cast value. The error is a human-readable message.
    fn from_value(value: Value) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &Value) -> String {
    format!("expected {expected}, got {}", value.kind())
}

impl FromValue for Value {
    fn spec() -> Spec {
        Spec::string()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        Ok(value)
    }
}

impl FromValue for String {
    fn spec() -> Spec {
        Spec::string()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for PathBuf {
    fn spec() -> Spec {
        Spec::string()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        String::from_value(value).map(PathBuf::from)
    }
}

impl FromValue for bool {
    fn spec() -> Spec {
        Spec::bool()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl FromValue for f64 {
    fn spec() -> Spec {
        Spec::float()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        value.as_f64().ok_or_else(|| mismatch("float", &value))
    }
}

impl FromValue for f32 {
    fn spec() -> Spec {
        Spec::float()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        f64::from_value(value).map(|x| x as f32)
    }
}

macro_rules! impl_from_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn spec() -> Spec {
                    Spec::int()
                }

                fn from_value(value: Value) -> Result<Self, String> {
                    let i = value.as_i64().ok_or_else(|| mismatch("int", &value))?;
                    <$ty>::try_from(i).map_err(|e| format!("{i}: {e}"))
                }
            }
        )*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: FromValue> FromValue for Vec<T> {
    fn spec() -> Spec {
        Spec::list(T::spec())
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::List(items) | Value::Tuple(items) => {
                items.into_iter().map(T::from_value).collect()
            }
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T: FromValue> FromValue for IndexMap<String, T> {
    fn spec() -> Spec {
        Spec::map(T::spec())
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn spec() -> Spec {
        Spec::map(T::spec())
    }

    fn from_value(value: Value) -> Result<Self, String> {
        IndexMap::<String, T>::from_value(value).map(|map| map.into_iter().collect())
    }
}

impl FromValue for serde_json::Value {
    fn spec() -> Spec {
        Spec::json()
    }

    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Json(j) => Ok(j),
            other => Err(mismatch("json", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_narrowing() {
        assert_eq!(u16::from_value(Value::Int(8080)).unwrap(), 8080);
        assert!(u8::from_value(Value::Int(300)).is_err());
        assert!(u32::from_value(Value::Int(-1)).is_err());
    }

    #[test]
    fn test_vec_accepts_tuple() {
        let value = Value::Tuple(vec![Value::Int(42), Value::Int(33)]);
        assert_eq!(Vec::<i32>::from_value(value).unwrap(), vec![42, 33]);
    }

    #[test]
    fn test_mismatch_message() {
        let err = bool::from_value(Value::Str("x".into())).unwrap_err();
        assert_eq!(err, "expected bool, got string");
    }

    #[test]
    fn test_display_round_trips_lists() {
        let value = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(value.to_string(), "1,2,3");
    }

    #[test]
    fn test_inferred_spec() {
        assert_eq!(Value::Bool(true).inferred_spec(), Spec::bool());
        assert_eq!(Value::Float(1.2).inferred_spec(), Spec::float());
        assert_eq!(Value::from("x").inferred_spec(), Spec::string());
    }

    #[test]
    fn test_serializes_untagged() {
        let mut map = IndexMap::new();
        map.insert("PORT".to_string(), Value::Int(5432));
        map.insert("HOST".to_string(), Value::from("db"));
        let json = serde_json::to_string(&Value::Map(map)).unwrap();
        assert_eq!(json, r#"{"PORT":5432,"HOST":"db"}"#);
    }
}
