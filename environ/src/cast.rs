//! Recursive string-to-value casting.
//!
//! A [`Spec`] describes the shape a raw environment string should be read
//! as; a [`Caster`] applies it. Casting is pure: no I/O, no global state.
//!
//! ```rust
//! use environ::cast::{cast, Spec};
//! use environ::Value;
//!
//! # fn main() -> environ::Result<()> {
//! let ports = cast("80,443", &Spec::list(Spec::int()))?;
//! assert_eq!(ports, Value::List(vec![Value::Int(80), Value::Int(443)]));
//!
//! assert_eq!(cast("123.420.333,3", &Spec::float())?, Value::Float(123420333.3));
//! # Ok(())
//! # }
//! ```

use crate::error::{EnvironError, Result};
use crate::value::Value;
use indexmap::IndexMap;

/// Scalar kinds a raw string can be cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Str,
    Bytes,
    Int,
    Float,
    Bool,
    Json,
}

impl Kind {
    fn name(self) -> &'static str {
        match self {
            Kind::Str => "string",
            Kind::Bytes => "bytes",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Bool => "bool",
            Kind::Json => "json",
        }
    }
}

/// Recursive type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Scalar(Kind),
    /// Comma separated list, each element cast with the inner spec.
    Sequence(Box<Spec>),
    /// Like `Sequence`, but a single pair of enclosing parentheses is stripped first.
    Tuple(Box<Spec>),
    /// `key=value` pairs. `overrides` take precedence over `value` per key.
    Mapping {
        value: Box<Spec>,
        overrides: IndexMap<String, Spec>,
    },
}

impl Spec {
    pub fn string() -> Self {
        Spec::Scalar(Kind::Str)
    }

    pub fn bytes() -> Self {
        Spec::Scalar(Kind::Bytes)
    }

    pub fn int() -> Self {
        Spec::Scalar(Kind::Int)
    }

    pub fn float() -> Self {
        Spec::Scalar(Kind::Float)
    }

    pub fn bool() -> Self {
        Spec::Scalar(Kind::Bool)
    }

    pub fn json() -> Self {
        Spec::Scalar(Kind::Json)
    }

    pub fn list(element: Spec) -> Self {
        Spec::Sequence(Box::new(element))
    }

    pub fn tuple(element: Spec) -> Self {
        Spec::Tuple(Box::new(element))
    }

    pub fn map(value: Spec) -> Self {
        Spec::Mapping {
            value: Box::new(value),
            overrides: IndexMap::new(),
        }
    }

    /// Mapping with per-key specs.
    ///
    /// ```rust
    /// use environ::cast::Spec;
    ///
    /// let spec = Spec::map_with(Spec::int(), [("b", Spec::list(Spec::float()))]);
    /// # let _ = spec;
    /// ```
    pub fn map_with<I, K>(value: Spec, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, Spec)>,
        K: Into<String>,
    {
        Spec::Mapping {
            value: Box::new(value),
            overrides: overrides.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    fn is_sequence(&self) -> bool {
        matches!(self, Spec::Sequence(_) | Spec::Tuple(_))
    }
}

const DEFAULT_TRUTHY: [&str; 5] = ["1", "true", "yes", "y", "on"];
const DEFAULT_FALSY: [&str; 5] = ["0", "false", "no", "n", "off"];

/// Applies [`Spec`]s to raw strings.
///
/// The boolean token sets and the mapping separators are configurable; the
/// defaults match common environment conventions.
#[derive(Debug, Clone)]
pub struct Caster {
    truthy: Vec<String>,
    falsy: Vec<String>,
    primary: char,
    secondary: char,
}

impl Default for Caster {
    fn default() -> Self {
        Self {
            truthy: DEFAULT_TRUTHY.iter().map(|s| s.to_string()).collect(),
            falsy: DEFAULT_FALSY.iter().map(|s| s.to_string()).collect(),
            primary: ',',
            secondary: ';',
        }
    }
}

impl Caster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the truthy and falsy token sets. Tokens are matched case-insensitively.
    #[must_use]
    pub fn with_bool_tokens<T, F>(mut self, truthy: T, falsy: F) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        self.truthy = truthy
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();
        self.falsy = falsy
            .into_iter()
            .map(|s| s.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Set the separators used by sequences and mappings.
    ///
    /// `primary` splits sequences and mapping pairs, `secondary` splits
    /// list-typed values inside a mapping.
    #[must_use]
    pub fn with_separators(mut self, primary: char, secondary: char) -> Self {
        self.primary = primary;
        self.secondary = secondary;
        self
    }

    /// Cast `raw` according to `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironError::InvalidCast`] when a scalar cannot be parsed.
    pub fn cast(&self, raw: &str, spec: &Spec) -> Result<Value> {
        self.cast_with(raw, spec, self.primary)
    }

    fn cast_with(&self, raw: &str, spec: &Spec, list_sep: char) -> Result<Value> {
        match spec {
            Spec::Scalar(kind) => self.cast_scalar(raw, *kind),
            Spec::Sequence(element) => self.split(raw, element, list_sep).map(Value::List),
            Spec::Tuple(element) => {
                let inner = raw
                    .strip_prefix('(')
                    .and_then(|s| s.strip_suffix(')'))
                    .unwrap_or(raw);
                self.split(inner, element, list_sep).map(Value::Tuple)
            }
            Spec::Mapping { value, overrides } => self.cast_mapping(raw, value, overrides),
        }
    }

    fn split(&self, raw: &str, element: &Spec, sep: char) -> Result<Vec<Value>> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        raw.split(sep)
            .map(|item| self.cast_with(item, element, sep))
            .collect()
    }

    fn cast_mapping(
        &self,
        raw: &str,
        value: &Spec,
        overrides: &IndexMap<String, Spec>,
    ) -> Result<Value> {
        let mut map = IndexMap::new();
        for segment in raw.split(self.primary).filter(|s| !s.is_empty()) {
            let (key, item) = segment
                .split_once('=')
                .ok_or_else(|| EnvironError::invalid_cast(segment, "map", "expected key=value"))?;
            let spec = overrides.get(key).unwrap_or(value);
            let cast = if spec.is_sequence() {
                self.cast_with(item, spec, self.secondary)?
            } else {
                self.cast_with(item, spec, self.primary)?
            };
            map.insert(key.to_string(), cast);
        }
        Ok(Value::Map(map))
    }

    fn cast_scalar(&self, raw: &str, kind: Kind) -> Result<Value> {
        match kind {
            Kind::Str => Ok(Value::Str(raw.to_string())),
            Kind::Bytes => Ok(Value::Bytes(raw.as_bytes().to_vec())),
            Kind::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| EnvironError::invalid_cast(raw, kind.name(), e)),
            Kind::Float => parse_float(raw).map(Value::Float),
            Kind::Bool => self.parse_bool(raw).map(Value::Bool),
            Kind::Json => serde_json::from_str(raw)
                .map(Value::Json)
                .map_err(|e| EnvironError::invalid_cast(raw, kind.name(), e)),
        }
    }

    fn parse_bool(&self, raw: &str) -> Result<bool> {
        let token = raw.trim().to_lowercase();
        if self.truthy.contains(&token) {
            Ok(true)
        } else if self.falsy.contains(&token) {
            Ok(false)
        } else {
            Err(EnvironError::invalid_cast(
                raw,
                "bool",
                "not a recognised boolean token",
            ))
        }
    }
}

/// Cast with the default [`Caster`].
///
/// # Errors
///
/// See [`Caster::cast`].
pub fn cast(raw: &str, spec: &Spec) -> Result<Value> {
    Caster::default().cast(raw, spec)
}

/// Parse a float that may use `.` or `,` as decimal point.
///
/// The separator closest to the end is the decimal point; every other
/// separator is a thousands separator and is dropped.
fn parse_float(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let normalized = match trimmed.rfind(|c: char| c == '.' || c == ',') {
        Some(pos) => {
            let integral: String = trimmed[..pos]
                .chars()
                .filter(|c| *c != '.' && *c != ',')
                .collect();
            format!("{integral}.{}", &trimmed[pos + 1..])
        }
        None => trimmed.to_string(),
    };
    normalized
        .parse::<f64>()
        .map_err(|e| EnvironError::invalid_cast(raw, "float", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().copied().map(Value::Int).collect()
    }

    #[rstest]
    #[case("33.3", 33.3)]
    #[case("33,3", 33.3)]
    #[case("123,420,333.3", 123_420_333.3)]
    #[case("123.420.333,3", 123_420_333.3)]
    #[case("-1.0", -1.0)]
    #[case("-1,0", -1.0)]
    #[case("42", 42.0)]
    fn test_float_separators(#[case] raw: &str, #[case] expected: f64) {
        assert_eq!(cast(raw, &Spec::float()).unwrap(), Value::Float(expected));
    }

    #[test]
    fn test_float_invalid() {
        let err = cast("abc", &Spec::float()).unwrap_err();
        assert!(matches!(err, EnvironError::InvalidCast { kind: "float", .. }));
    }

    #[rstest]
    #[case("1", true)]
    #[case("True", true)]
    #[case("yes", true)]
    #[case("ON", true)]
    #[case("0", false)]
    #[case("False", false)]
    #[case("n", false)]
    #[case("off", false)]
    fn test_bool_tokens(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(cast(raw, &Spec::bool()).unwrap(), Value::Bool(expected));
    }

    #[test]
    fn test_bool_unknown_token() {
        let err = cast("maybe", &Spec::bool()).unwrap_err();
        assert!(matches!(err, EnvironError::InvalidCast { kind: "bool", .. }));
    }

    #[test]
    fn test_custom_bool_tokens() {
        let caster = Caster::new().with_bool_tokens(["Enabled"], ["Disabled"]);
        assert_eq!(caster.cast("enabled", &Spec::bool()).unwrap(), Value::Bool(true));
        assert_eq!(caster.cast("DISABLED", &Spec::bool()).unwrap(), Value::Bool(false));
        assert!(caster.cast("1", &Spec::bool()).is_err());
    }

    #[test]
    fn test_int() {
        assert_eq!(cast("42", &Spec::int()).unwrap(), Value::Int(42));
        assert!(cast("4.2", &Spec::int()).is_err());
    }

    #[test]
    fn test_string_and_bytes() {
        assert_eq!(cast("bar", &Spec::string()).unwrap(), Value::from("bar"));
        assert_eq!(
            cast("bar", &Spec::bytes()).unwrap(),
            Value::Bytes(b"bar".to_vec())
        );
    }

    #[test]
    fn test_json() {
        let value = cast(r#"{"one": "bar", "two": 2}"#, &Spec::json()).unwrap();
        assert_eq!(
            value,
            Value::Json(serde_json::json!({"one": "bar", "two": 2}))
        );
        assert!(matches!(
            cast("{not json", &Spec::json()),
            Err(EnvironError::InvalidCast { kind: "json", .. })
        ));
    }

    #[test]
    fn test_int_list_round_trip() {
        for raw in ["42,33", "1", "-5,0,17,9000"] {
            let value = cast(raw, &Spec::list(Spec::int())).unwrap();
            assert_eq!(value.to_string(), raw);
        }
    }

    #[test]
    fn test_list_keeps_whitespace() {
        let value = cast(" foo,  bar", &Spec::list(Spec::string())).unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::from(" foo"), Value::from("  bar")])
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(
            cast("", &Spec::list(Spec::int())).unwrap(),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn test_tuple_strips_parentheses() {
        let spec = Spec::tuple(Spec::int());
        assert_eq!(cast("(42,33)", &spec).unwrap(), Value::Tuple(ints(&[42, 33])));
        assert_eq!(cast("42,33", &spec).unwrap(), Value::Tuple(ints(&[42, 33])));
    }

    #[test]
    fn test_plain_mapping() {
        let value = cast("foo=bar,test=on", &Spec::map(Spec::string())).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["foo"], Value::from("bar"));
        assert_eq!(map["test"], Value::from("on"));
    }

    #[test]
    fn test_mapping_value_keeps_extra_equals() {
        let value = cast("url=a=b", &Spec::map(Spec::string())).unwrap();
        assert_eq!(value.as_map().unwrap()["url"], Value::from("a=b"));
    }

    #[test]
    fn test_mapping_with_overrides() {
        let spec = Spec::map_with(
            Spec::int(),
            [("b", Spec::list(Spec::float())), ("d", Spec::bool())],
        );
        let value = cast("a=1,b=1.1;2.2,c=3,d=True", &spec).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(
            map["b"],
            Value::List(vec![Value::Float(1.1), Value::Float(2.2)])
        );
        assert_eq!(map["c"], Value::Int(3));
        assert_eq!(map["d"], Value::Bool(true));
    }

    #[test]
    fn test_mapping_with_swapped_separators() {
        let caster = Caster::new().with_separators(';', ',');
        let spec = Spec::map_with(Spec::int(), [("b", Spec::list(Spec::float()))]);
        let value = caster.cast("a=1;b=1.1,2.2;c=3", &spec).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["a"], Value::Int(1));
        assert_eq!(
            map["b"],
            Value::List(vec![Value::Float(1.1), Value::Float(2.2)])
        );
        assert_eq!(map["c"], Value::Int(3));
    }

    #[test]
    fn test_mapping_segment_without_equals() {
        let err = cast("a=1,oops", &Spec::map(Spec::string())).unwrap_err();
        assert!(matches!(err, EnvironError::InvalidCast { kind: "map", .. }));
    }
}
