//! Name to raw-string store with typed accessors.
//!
//! ```rust
//! use environ::cast::Spec;
//! use environ::{Value, ValueStore};
//!
//! # fn main() -> environ::Result<()> {
//! let store = ValueStore::new([
//!     ("PORT", "8080"),
//!     ("HOSTS", "a.example,b.example"),
//!     ("PRIMARY", "$HOSTS"),
//! ]);
//! assert_eq!(store.int("PORT")?, 8080);
//! assert_eq!(store.int_or("WORKERS", 4)?, 4);
//! assert_eq!(
//!     store.get("PRIMARY", &Spec::list(Spec::string()))?,
//!     Value::List(vec![Value::from("a.example"), Value::from("b.example")])
//! );
//! # Ok(())
//! # }
//! ```

use crate::cast::{Caster, Spec};
use crate::error::{EnvironError, Result};
use crate::path::PathValue;
use crate::scheme::{cache, db, email, search, BackendConfig};
use crate::value::{FromValue, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::path::Path;
use url::Url;

pub const DEFAULT_DATABASE_ENV: &str = "DATABASE_URL";
pub const DEFAULT_CACHE_ENV: &str = "CACHE_URL";
pub const DEFAULT_EMAIL_ENV: &str = "EMAIL_URL";
pub const DEFAULT_SEARCH_ENV: &str = "SEARCH_URL";

/// Declared spec and default for one variable.
#[derive(Debug, Clone)]
struct Declaration {
    spec: Spec,
    default: Option<Value>,
}

/// Owned mapping from variable name to raw string.
///
/// Reads never mutate the store, so a shared `&ValueStore` can be used from
/// several threads once it is populated.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    vars: IndexMap<String, String>,
    caster: Caster,
    escape_proxy: bool,
    schema: IndexMap<String, Declaration>,
}

/// Builder for [`ValueStore`].
///
/// ```rust
/// use environ::cast::Spec;
/// use environ::{Value, ValueStore};
///
/// # fn main() -> environ::Result<()> {
/// let store = ValueStore::builder()
///     .vars([("DEBUG", "enabled")])
///     .bool_tokens(["enabled"], ["disabled"])
///     .declare_with_default("WORKERS", Spec::int(), 2)
///     .build();
/// assert!(store.bool("DEBUG")?);
/// assert_eq!(store.get_declared("WORKERS")?, Value::Int(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueStoreBuilder {
    vars: IndexMap<String, String>,
    caster: Caster,
    escape_proxy: bool,
    schema: IndexMap<String, Declaration>,
}

impl ValueStoreBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add variables. Later entries replace earlier ones with the same name.
    #[must_use]
    pub fn vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a snapshot of the process environment. Non-unicode entries are skipped.
    #[must_use]
    pub fn process_env(self) -> Self {
        self.vars(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    #[must_use]
    pub fn caster(mut self, caster: Caster) -> Self {
        self.caster = caster;
        self
    }

    /// Replace the truthy/falsy token sets used for bool casts.
    #[must_use]
    pub fn bool_tokens<T, F>(mut self, truthy: T, falsy: F) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        self.caster = self.caster.with_bool_tokens(truthy, falsy);
        self
    }

    /// Separators used by mapping casts. See [`Caster::with_separators`].
    #[must_use]
    pub fn separators(mut self, primary: char, secondary: char) -> Self {
        self.caster = self.caster.with_separators(primary, secondary);
        self
    }

    /// Treat a leading `\$` as a literal `$` instead of a proxy reference.
    #[must_use]
    pub fn escape_proxy(mut self, enabled: bool) -> Self {
        self.escape_proxy = enabled;
        self
    }

    /// Declare the spec `name` is read with by [`ValueStore::get_declared`].
    #[must_use]
    pub fn declare(mut self, name: impl Into<String>, spec: Spec) -> Self {
        self.schema.insert(name.into(), Declaration { spec, default: None });
        self
    }

    /// Declare a spec together with the value used when `name` is absent.
    #[must_use]
    pub fn declare_with_default(
        mut self,
        name: impl Into<String>,
        spec: Spec,
        default: impl Into<Value>,
    ) -> Self {
        self.schema.insert(
            name.into(),
            Declaration {
                spec,
                default: Some(default.into()),
            },
        );
        self
    }

    pub fn build(self) -> ValueStore {
        ValueStore {
            vars: self.vars,
            caster: self.caster,
            escape_proxy: self.escape_proxy,
            schema: self.schema,
        }
    }
}

impl ValueStore {
    /// Store over an explicit mapping.
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ValueStoreBuilder::new().vars(vars).build()
    }

    /// Snapshot of the current process environment.
    pub fn from_env() -> Self {
        ValueStoreBuilder::new().process_env().build()
    }

    pub fn builder() -> ValueStoreBuilder {
        ValueStoreBuilder::new()
    }

    pub fn caster(&self) -> &Caster {
        &self.caster
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Stored string for `name`, without proxy resolution.
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn insert(&mut self, name: impl Into<String>, raw: impl Into<String>) {
        self.vars.insert(name.into(), raw.into());
    }

    pub fn extend<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Stored string for `name` after following `$NAME` proxies.
    ///
    /// # Errors
    ///
    /// - [`EnvironError::Missing`] if `name`, or a variable it refers to, is absent
    /// - [`EnvironError::Resolution`] if the proxies form a cycle
    pub fn resolve(&self, name: &str) -> Result<String> {
        let mut chain = Vec::new();
        self.resolve_in(name, &mut chain)
    }

    fn resolve_in(&self, name: &str, chain: &mut Vec<String>) -> Result<String> {
        if chain.iter().any(|seen| seen == name) {
            chain.push(name.to_string());
            return Err(EnvironError::Resolution {
                chain: std::mem::take(chain),
            });
        }
        chain.push(name.to_string());

        let raw = self.raw(name).ok_or_else(|| EnvironError::missing(name))?;
        if self.escape_proxy {
            if let Some(literal) = raw.strip_prefix('\\').filter(|s| s.starts_with('$')) {
                return Ok(literal.to_string());
            }
        }
        let Some(reference) = raw.strip_prefix('$') else {
            return Ok(raw.to_string());
        };
        let end = reference
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(reference.len());
        if end == 0 {
            return Ok(raw.to_string());
        }
        let (target, rest) = reference.split_at(end);
        tracing::debug!(name, target, "Resolving proxy variable");
        let resolved = self.resolve_in(target, chain)?;
        Ok(format!("{resolved}{rest}"))
    }

    /// Read `name` and cast it with `spec`.
    ///
    /// # Errors
    ///
    /// Fails with [`EnvironError::Missing`] when `name` is absent, or with the
    /// proxy and cast errors of [`ValueStore::resolve`] and [`Caster::cast`].
    pub fn get(&self, name: &str, spec: &Spec) -> Result<Value> {
        let raw = self.resolve(name)?;
        self.caster.cast(&raw, spec)
    }

    /// Like [`ValueStore::get`], returning `default` unchanged when `name` is absent.
    pub fn get_or(&self, name: &str, spec: &Spec, default: impl Into<Value>) -> Result<Value> {
        if self.contains(name) {
            self.get(name, spec)
        } else {
            Ok(default.into())
        }
    }

    /// Like [`ValueStore::get`], casting `raw_default` with `spec` when `name` is absent.
    pub fn get_or_cast(&self, name: &str, spec: &Spec, raw_default: &str) -> Result<Value> {
        if self.contains(name) {
            self.get(name, spec)
        } else {
            self.caster.cast(raw_default, spec)
        }
    }

    /// Read `name` with the spec and default declared on the builder.
    ///
    /// Undeclared names are read as strings with no default.
    pub fn get_declared(&self, name: &str) -> Result<Value> {
        match self.schema.get(name) {
            Some(Declaration {
                spec,
                default: Some(default),
            }) => self.get_or(name, spec, default.clone()),
            Some(Declaration { spec, default: None }) => self.get(name, spec),
            None => self.get(name, &Spec::string()),
        }
    }

    /// Read `name` with the spec implied by `default`, or return `default`.
    ///
    /// ```rust
    /// # use environ::{Value, ValueStore};
    /// # fn main() -> environ::Result<()> {
    /// let store = ValueStore::new([("DEBUG", "yes")]);
    /// assert_eq!(store.get_inferred("DEBUG", false)?, Value::Bool(true));
    /// # Ok(())
    /// # }
    /// ```
    pub fn get_inferred(&self, name: &str, default: impl Into<Value>) -> Result<Value> {
        let default = default.into();
        let spec = default.inferred_spec();
        self.get_or(name, &spec, default)
    }

    /// Read `name` as `T`.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`ValueStore::get`], fails with
    /// [`EnvironError::Parse`] when the cast value does not fit `T`.
    pub fn parse<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get(name, &T::spec())?;
        T::from_value(value).map_err(|message| EnvironError::parse_error::<T>(name, message))
    }

    pub fn parse_or<T: FromValue>(&self, name: &str, default: T) -> Result<T> {
        if self.contains(name) {
            self.parse(name)
        } else {
            Ok(default)
        }
    }

    pub fn string(&self, name: &str) -> Result<String> {
        self.parse(name)
    }

    pub fn string_or(&self, name: &str, default: impl Into<String>) -> Result<String> {
        self.parse_or(name, default.into())
    }

    /// String with the literal escapes `\n`, `\r` and `\t` turned into control characters.
    pub fn string_multiline(&self, name: &str) -> Result<String> {
        let raw = self.string(name)?;
        Ok(raw
            .replace("\\n", "\n")
            .replace("\\r", "\r")
            .replace("\\t", "\t"))
    }

    pub fn bytes(&self, name: &str) -> Result<Vec<u8>> {
        match self.get(name, &Spec::bytes())? {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(EnvironError::parse_error::<Vec<u8>>(name, other.kind())),
        }
    }

    pub fn bytes_or(&self, name: &str, default: impl Into<Vec<u8>>) -> Result<Vec<u8>> {
        if self.contains(name) {
            self.bytes(name)
        } else {
            Ok(default.into())
        }
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        self.parse(name)
    }

    pub fn int_or(&self, name: &str, default: i64) -> Result<i64> {
        self.parse_or(name, default)
    }

    pub fn float(&self, name: &str) -> Result<f64> {
        self.parse(name)
    }

    pub fn float_or(&self, name: &str, default: f64) -> Result<f64> {
        self.parse_or(name, default)
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        self.parse(name)
    }

    pub fn bool_or(&self, name: &str, default: bool) -> Result<bool> {
        self.parse_or(name, default)
    }

    /// Decode `name` as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let raw = self.resolve(name)?;
        serde_json::from_str(&raw).map_err(|e| EnvironError::invalid_cast(raw, "json", e))
    }

    pub fn json_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T> {
        if self.contains(name) {
            self.json(name)
        } else {
            Ok(default)
        }
    }

    /// Comma separated list, each element cast with `element`.
    pub fn list(&self, name: &str, element: Spec) -> Result<Vec<Value>> {
        match self.get(name, &Spec::list(element))? {
            Value::List(items) => Ok(items),
            other => Err(EnvironError::parse_error::<Vec<Value>>(name, other.kind())),
        }
    }

    pub fn list_or(&self, name: &str, element: Spec, default: Vec<Value>) -> Result<Vec<Value>> {
        if self.contains(name) {
            self.list(name, element)
        } else {
            Ok(default)
        }
    }

    /// Like [`ValueStore::list`], with one pair of enclosing parentheses allowed.
    pub fn tuple(&self, name: &str, element: Spec) -> Result<Vec<Value>> {
        match self.get(name, &Spec::tuple(element))? {
            Value::Tuple(items) => Ok(items),
            other => Err(EnvironError::parse_error::<Vec<Value>>(name, other.kind())),
        }
    }

    pub fn tuple_or(&self, name: &str, element: Spec, default: Vec<Value>) -> Result<Vec<Value>> {
        if self.contains(name) {
            self.tuple(name, element)
        } else {
            Ok(default)
        }
    }

    /// `key=value` mapping. Keys in `overrides` are cast with their own spec.
    ///
    /// ```rust
    /// # use environ::cast::Spec;
    /// # use environ::{Value, ValueStore};
    /// # fn main() -> environ::Result<()> {
    /// let store = ValueStore::new([("LIMITS", "cpu=2,mem=512,tags=a;b")]);
    /// let limits = store.dict(
    ///     "LIMITS",
    ///     Spec::int(),
    ///     [("tags", Spec::list(Spec::string()))],
    /// )?;
    /// assert_eq!(limits["mem"], Value::Int(512));
    /// assert_eq!(limits["tags"], Value::List(vec![Value::from("a"), Value::from("b")]));
    /// # Ok(())
    /// # }
    /// ```
    pub fn dict<I, K>(&self, name: &str, value: Spec, overrides: I) -> Result<IndexMap<String, Value>>
    where
        I: IntoIterator<Item = (K, Spec)>,
        K: Into<String>,
    {
        match self.get(name, &Spec::map_with(value, overrides))? {
            Value::Map(map) => Ok(map),
            other => Err(EnvironError::parse_error::<IndexMap<String, Value>>(
                name,
                other.kind(),
            )),
        }
    }

    pub fn dict_or<I, K>(
        &self,
        name: &str,
        value: Spec,
        overrides: I,
        default: IndexMap<String, Value>,
    ) -> Result<IndexMap<String, Value>>
    where
        I: IntoIterator<Item = (K, Spec)>,
        K: Into<String>,
    {
        if self.contains(name) {
            self.dict(name, value, overrides)
        } else {
            Ok(default)
        }
    }

    pub fn path(&self, name: &str) -> Result<PathValue> {
        PathValue::new(self.resolve(name)?)
    }

    pub fn path_or(&self, name: &str, default: impl AsRef<Path>) -> Result<PathValue> {
        if self.contains(name) {
            self.path(name)
        } else {
            PathValue::new(default)
        }
    }

    pub fn url(&self, name: &str) -> Result<Url> {
        let raw = self.resolve(name)?;
        Url::parse(&raw).map_err(|source| EnvironError::InvalidUrl { url: raw, source })
    }

    pub fn url_or(&self, name: &str, default: &str) -> Result<Url> {
        if self.contains(name) {
            self.url(name)
        } else {
            Url::parse(default).map_err(|source| EnvironError::InvalidUrl {
                url: default.to_string(),
                source,
            })
        }
    }

    /// Database config from the URL in `name`.
    pub fn db(&self, name: &str) -> Result<BackendConfig> {
        self.db_with(name, None)
    }

    /// Like [`ValueStore::db`] with the engine identifier replaced.
    pub fn db_with(&self, name: &str, engine: Option<&str>) -> Result<BackendConfig> {
        db::parse(&self.resolve(name)?, engine)
    }

    /// Database config from `DATABASE_URL`.
    pub fn db_url(&self) -> Result<BackendConfig> {
        self.db(DEFAULT_DATABASE_ENV)
    }

    pub fn cache(&self, name: &str) -> Result<BackendConfig> {
        self.cache_with(name, None)
    }

    pub fn cache_with(&self, name: &str, backend: Option<&str>) -> Result<BackendConfig> {
        cache::parse(&self.resolve(name)?, backend)
    }

    /// Cache config from `CACHE_URL`.
    pub fn cache_url(&self) -> Result<BackendConfig> {
        self.cache(DEFAULT_CACHE_ENV)
    }

    pub fn email(&self, name: &str) -> Result<BackendConfig> {
        self.email_with(name, None)
    }

    pub fn email_with(&self, name: &str, backend: Option<&str>) -> Result<BackendConfig> {
        email::parse(&self.resolve(name)?, backend)
    }

    /// Mail config from `EMAIL_URL`.
    pub fn email_url(&self) -> Result<BackendConfig> {
        self.email(DEFAULT_EMAIL_ENV)
    }

    pub fn search(&self, name: &str) -> Result<BackendConfig> {
        self.search_with(name, None)
    }

    pub fn search_with(&self, name: &str, engine: Option<&str>) -> Result<BackendConfig> {
        search::parse(&self.resolve(name)?, engine)
    }

    /// Search config from `SEARCH_URL`.
    pub fn search_url(&self) -> Result<BackendConfig> {
        self.search(DEFAULT_SEARCH_ENV)
    }
}

impl<K, V> FromIterator<(K, V)> for ValueStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ValueStore::new(iter)
    }
}
