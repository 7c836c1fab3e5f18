//! Cache URLs: `memcache://127.0.0.1:11211`, `redis://:secret@host:6379/1`.

use super::{literal, BackendConfig, ParsedUrl};
use crate::error::{EnvironError, Result};
use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Database,
    Dummy,
    File,
    LocalMemory,
    Memcache,
    PyMemcache,
    PyLibMc,
    Redis,
}

impl Backend {
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        let backend = match scheme {
            "dbcache" => Backend::Database,
            "dummycache" => Backend::Dummy,
            "filecache" => Backend::File,
            "locmemcache" => Backend::LocalMemory,
            "memcache" => Backend::Memcache,
            "pymemcache" => Backend::PyMemcache,
            "pylibmc" => Backend::PyLibMc,
            "redis" | "rediss" | "rediscache" => Backend::Redis,
            _ => return None,
        };
        Some(backend)
    }

    pub fn id(self) -> &'static str {
        match self {
            Backend::Database => "django.core.cache.backends.db.DatabaseCache",
            Backend::Dummy => "django.core.cache.backends.dummy.DummyCache",
            Backend::File => "django.core.cache.backends.filebased.FileBasedCache",
            Backend::LocalMemory => "django.core.cache.backends.locmem.LocMemCache",
            Backend::Memcache => "django.core.cache.backends.memcached.MemcachedCache",
            Backend::PyMemcache => "django.core.cache.backends.memcached.PyMemcacheCache",
            Backend::PyLibMc => "django.core.cache.backends.memcached.PyLibMCCache",
            Backend::Redis => "django_redis.cache.RedisCache",
        }
    }

    fn is_memcache(self) -> bool {
        matches!(
            self,
            Backend::Memcache | Backend::PyMemcache | Backend::PyLibMc
        )
    }
}

/// Query parameters promoted to top-level fields instead of `OPTIONS`.
const BASE_OPTIONS: [&str; 5] = ["TIMEOUT", "KEY_PREFIX", "VERSION", "KEY_FUNCTION", "BINARY"];

/// Build a cache config from `url`. `backend` replaces the BACKEND identifier.
///
/// # Errors
///
/// - [`EnvironError::UnsupportedScheme`] for unknown schemes without `backend`
/// - [`EnvironError::InvalidUrl`] if `url` cannot be parsed
pub fn parse(url: &str, backend: Option<&str>) -> Result<BackendConfig> {
    let parsed = ParsedUrl::parse(url)?;
    let kind = Backend::from_scheme(&parsed.scheme);
    let backend_id = match (backend, kind) {
        (Some(id), _) => id.to_string(),
        (None, Some(kind)) => kind.id().to_string(),
        (None, None) => return Err(EnvironError::unsupported_scheme("cache", &parsed.scheme)),
    };

    let mut config = BackendConfig::new();
    config.set("BACKEND", backend_id);
    config.set("LOCATION", location(&parsed, kind));

    let mut options = IndexMap::new();
    for (key, value) in parsed.first_params() {
        let upper = key.to_uppercase();
        if BASE_OPTIONS.contains(&upper.as_str()) {
            config.set(&upper, literal(value));
        } else {
            options.insert(upper, literal(value));
        }
    }
    if !options.is_empty() {
        config.set("OPTIONS", Value::Map(options));
    }

    Ok(config)
}

fn location(parsed: &ParsedUrl, kind: Option<Backend>) -> Value {
    let path = super::decode(&parsed.path);
    match kind {
        Some(kind) if kind.is_memcache() => {
            if !path.is_empty() && path != "/" {
                return Value::Str(format!("unix:{path}"));
            }
            one_or_many(parsed.hosts.iter().map(|h| h.authority()).collect())
        }
        Some(Backend::Redis) => {
            let scheme = if parsed.host().is_empty() {
                "unix".to_string()
            } else {
                parsed.scheme.replace("cache", "")
            };
            one_or_many(
                parsed
                    .hosts
                    .iter()
                    .map(|h| {
                        format!(
                            "{scheme}://{}{}{}",
                            parsed.userinfo,
                            h.authority(),
                            parsed.path
                        )
                    })
                    .collect(),
            )
        }
        Some(Backend::File) => Value::Str(format!("{}{path}", parsed.netloc())),
        _ => Value::Str(parsed.netloc()),
    }
}

fn one_or_many(mut locations: Vec<String>) -> Value {
    if locations.len() == 1 {
        Value::Str(locations.remove(0))
    } else {
        Value::List(locations.into_iter().map(Value::Str).collect())
    }
}
