//! Mail URLs: `smtps://user@example.com:password@smtp.example.com:587`.

use super::{int_or_string, BackendConfig, ParsedUrl};
use crate::cast::{cast, Spec};
use crate::error::{EnvironError, Result};
use crate::value::Value;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Smtp,
    Console,
    File,
    Memory,
    Dummy,
}

/// Transport security implied by the scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    None,
    Tls,
    Ssl,
}

impl Security {
    fn field(self) -> Option<&'static str> {
        match self {
            Security::None => None,
            Security::Tls => Some(USE_TLS),
            Security::Ssl => Some(USE_SSL),
        }
    }
}

const USE_TLS: &str = "EMAIL_USE_TLS";
const USE_SSL: &str = "EMAIL_USE_SSL";

impl Backend {
    /// Backend and transport security for `scheme`.
    pub fn from_scheme(scheme: &str) -> Option<(Self, Security)> {
        let entry = match scheme {
            "smtp" => (Backend::Smtp, Security::None),
            "smtps" | "smtp+tls" => (Backend::Smtp, Security::Tls),
            "smtp+ssl" => (Backend::Smtp, Security::Ssl),
            "consolemail" => (Backend::Console, Security::None),
            "filemail" => (Backend::File, Security::None),
            "memorymail" => (Backend::Memory, Security::None),
            "dummymail" => (Backend::Dummy, Security::None),
            _ => return None,
        };
        Some(entry)
    }

    pub fn id(self) -> &'static str {
        match self {
            Backend::Smtp => "django.core.mail.backends.smtp.EmailBackend",
            Backend::Console => "django.core.mail.backends.console.EmailBackend",
            Backend::File => "django.core.mail.backends.filebased.EmailBackend",
            Backend::Memory => "django.core.mail.backends.locmem.EmailBackend",
            Backend::Dummy => "django.core.mail.backends.dummy.EmailBackend",
        }
    }
}

/// Build a mail config from `url`. `backend` replaces EMAIL_BACKEND.
///
/// At most one of `EMAIL_USE_TLS`/`EMAIL_USE_SSL` is set, and only ever to `true`.
/// A query flag turned on replaces the one implied by the scheme.
///
/// # Errors
///
/// - [`EnvironError::UnsupportedScheme`] for unknown schemes without `backend`
/// - [`EnvironError::InvalidUrl`] if `url` cannot be parsed
pub fn parse(url: &str, backend: Option<&str>) -> Result<BackendConfig> {
    let parsed = ParsedUrl::parse(url)?;
    let entry = Backend::from_scheme(&parsed.scheme);
    let backend_id = match (backend, entry) {
        (Some(id), _) => id.to_string(),
        (None, Some((kind, _))) => kind.id().to_string(),
        (None, None) => return Err(EnvironError::unsupported_scheme("email", &parsed.scheme)),
    };
    let file_path = match entry {
        Some((Backend::File, _)) => super::decode(&parsed.path),
        _ => String::new(),
    };

    let mut config = BackendConfig::new();
    config.set("EMAIL_BACKEND", backend_id);
    config.set("EMAIL_FILE_PATH", file_path);
    config.set("EMAIL_HOST_USER", parsed.user.as_str());
    config.set("EMAIL_HOST_PASSWORD", parsed.password.as_str());
    config.set("EMAIL_HOST", parsed.host());
    if let Some(port) = parsed.port() {
        config.set("EMAIL_PORT", int_or_string(port));
    }
    if let Some(field) = entry.and_then(|(_, security)| security.field()) {
        config.set(field, true);
    }

    let mut options = IndexMap::new();
    for (key, value) in parsed.first_params() {
        let upper = key.to_uppercase();
        if upper == USE_TLS || upper == USE_SSL {
            match cast(value, &Spec::bool())? {
                Value::Bool(true) => {
                    let other = if upper == USE_TLS { USE_SSL } else { USE_TLS };
                    config.remove(other);
                    config.set(&upper, true);
                }
                _ => config.remove(&upper),
            }
        } else {
            options.insert(upper, int_or_string(value));
        }
    }
    if !options.is_empty() {
        config.set("OPTIONS", Value::Map(options));
    }

    Ok(config)
}
