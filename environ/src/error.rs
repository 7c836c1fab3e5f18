//! Error types for environment configuration

use std::path::PathBuf;

/// Convenience alias used throughout the crate.
pub type Result<T, E = EnvironError> = std::result::Result<T, E>;

/// Errors that can occur while reading, casting or translating configuration.
///
/// Every variant is surfaced to the caller. The only condition recovered
/// locally is a missing env file, which is logged as a warning instead.
#[derive(Debug, thiserror::Error)]
pub enum EnvironError {
    /// Required variable is not set and no default was given.
    #[error("Set the {name} environment variable")]
    Missing {
        /// Name of the missing variable
        name: String,
    },

    /// Raw string could not be converted to the requested kind.
    #[error("Cannot cast '{value}' to {kind}: {message}")]
    InvalidCast {
        /// Raw value that failed to cast
        value: String,
        /// Target kind (`int`, `float`, `bool`, `json`, ...)
        kind: &'static str,
        /// Parser message
        message: String,
    },

    /// URL scheme is not in the backend family's table and no override was given.
    #[error("Invalid {family} scheme '{scheme}'")]
    UnsupportedScheme {
        /// Backend family (`database`, `cache`, `email`, `search`)
        family: &'static str,
        /// Scheme found in the URL
        scheme: String,
    },

    /// Connection URL could not be parsed at all.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Underlying parse error
        source: url::ParseError,
    },

    /// A path marked as required does not exist.
    #[error("Create required path: {}", path.display())]
    RequiredPathMissing {
        /// Absolute path that was expected to exist
        path: PathBuf,
    },

    /// A relative path could not be made absolute.
    #[error("Cannot resolve '{}' against the current directory: {source}", path.display())]
    Absolute {
        /// Relative path that was given
        path: PathBuf,
        /// Error reported while reading the current directory
        source: std::io::Error,
    },

    /// `trim_suffix` was called with a component the path does not end with.
    #[error(
        "Cannot trim '{operand}' from '{}': the path does not end with '{operand}'",
        path.display()
    )]
    ArgumentMismatch {
        /// Root of the path being trimmed
        path: PathBuf,
        /// Component that was requested to be removed
        operand: String,
    },

    /// Proxy variables reference each other in a cycle.
    #[error("Proxy variables form a cycle: {}", chain.join(" -> "))]
    Resolution {
        /// Names visited, ending with the repeated one
        chain: Vec<String>,
    },

    /// The env file exists but could not be read or parsed.
    #[error("Failed to read env file '{}': {source}", path.display())]
    EnvFile {
        /// Path of the env file
        path: PathBuf,
        /// Error reported by the env-file reader
        source: dotenvy::Error,
    },

    /// Failed to read from a file specified by a `{VAR}_FILE` variable.
    #[error("Failed to read file '{path}' for environment variable '{name}': {source}")]
    FileRead {
        /// Name of the `{VAR}_FILE` variable (e.g. "API_KEY_FILE")
        name: String,
        /// Path to the file that failed to be read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// A cast value could not be converted into the requested Rust type.
    #[error("Failed to parse environment variable '{name}' as {type_name}: {message}")]
    Parse {
        /// Name of the variable being parsed
        name: String,
        /// Fully qualified type name that parsing was attempted for
        type_name: String,
        /// Conversion message
        message: String,
    },
}

impl EnvironError {
    /// Create a parse error (used by macro-generated code)
    #[doc(hidden)]
    pub fn parse_error<T>(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            name: name.into(),
            type_name: std::any::type_name::<T>().to_string(),
            message: message.to_string(),
        }
    }

    /// Create a missing variable error
    pub fn missing(name: impl Into<String>) -> Self {
        Self::Missing { name: name.into() }
    }

    pub(crate) fn invalid_cast(
        value: impl Into<String>,
        kind: &'static str,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidCast {
            value: value.into(),
            kind,
            message: message.to_string(),
        }
    }

    pub(crate) fn unsupported_scheme(family: &'static str, scheme: impl Into<String>) -> Self {
        Self::UnsupportedScheme {
            family,
            scheme: scheme.into(),
        }
    }

    /// Whether this error means the variable was simply absent.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}
