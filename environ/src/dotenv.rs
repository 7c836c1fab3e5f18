//! Env-file loading.
//!
//! Lines are parsed by `dotenvy` (`KEY=VALUE`, quoting, `export` prefixes and
//! `#` comments). Values are kept raw: `$NAME` is not expanded here, so proxy
//! variables resolve in the store like any other value. Each pair is merged
//! into both the [`ValueStore`] and the process environment, so this is the
//! one place that writes the environment. Call it before any other thread
//! reads configuration.

use crate::error::{EnvironError, Result};
use crate::store::ValueStore;
use std::fs;
use std::io;
use std::path::Path;

/// Default env-file name, looked up in the current directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Merge the pairs in `path`, then `overrides`, into `store` and the process environment.
///
/// A variable already present in the process environment keeps its value
/// unless `overwrite` is set; the store then receives the ambient value too.
/// A missing file is logged and leaves everything unchanged.
///
/// # Errors
///
/// Returns [`EnvironError::EnvFile`] when the file exists but cannot be read or parsed.
pub fn read_env<I, K, V>(
    store: &mut ValueStore,
    path: impl AsRef<Path>,
    overrides: I,
    overwrite: bool,
) -> Result<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let path = path.as_ref();
    let env_file_error = |source| EnvironError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Env file not found, no variables loaded");
            return Ok(());
        }
        Err(e) => return Err(env_file_error(dotenvy::Error::Io(e))),
    };
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(&contents);
    let pairs = dotenvy::from_read_iter(escape_substitutions(contents).as_bytes())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(env_file_error)?;

    tracing::debug!(path = %path.display(), count = pairs.len(), "Read environment variables from file");
    for (key, value) in pairs {
        merge(store, key, value, overwrite);
    }
    for (key, value) in overrides {
        merge(store, key.into(), value.into(), overwrite);
    }
    Ok(())
}

/// [`read_env`] on `.env` in the current directory, without overrides.
pub fn read_env_default(store: &mut ValueStore) -> Result<()> {
    read_env(
        store,
        DEFAULT_ENV_FILE,
        std::iter::empty::<(String, String)>(),
        false,
    )
}

/// Escape every `$` that `dotenvy` would expand.
///
/// Single-quoted text is already literal. Elsewhere `\$` reads back as `$`,
/// both bare and inside double quotes.
fn escape_substitutions(contents: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum Quote {
        None,
        Strong,
        Weak,
    }

    let mut out = String::with_capacity(contents.len());
    let mut quote = Quote::None;
    let mut escaped = false;
    let mut comment = false;
    let mut prev: Option<char> = None;

    for c in contents.chars() {
        if comment {
            comment = c != '\n';
        } else if escaped {
            escaped = false;
        } else {
            match (quote, c) {
                (Quote::Strong, '\'') => quote = Quote::None,
                (Quote::Strong, _) => {}
                (_, '$') => {
                    out.push_str("\\$");
                    prev = Some(c);
                    continue;
                }
                (_, '\\') => escaped = true,
                (Quote::Weak, '"') => quote = Quote::None,
                (Quote::Weak, _) => {}
                (Quote::None, '\'') => quote = Quote::Strong,
                (Quote::None, '"') => quote = Quote::Weak,
                (Quote::None, '#') if prev.is_none_or(char::is_whitespace) => comment = true,
                (Quote::None, _) => {}
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

fn merge(store: &mut ValueStore, key: String, value: String, overwrite: bool) {
    match std::env::var(&key) {
        Ok(ambient) if !overwrite => store.insert(key, ambient),
        _ => {
            std::env::set_var(&key, &value);
            store.insert(key, value);
        }
    }
}
