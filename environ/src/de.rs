//! Field loaders called by `#[derive(Environ)]`.

use crate::error::{EnvironError, Result};
use crate::store::ValueStore;
use crate::value::FromValue;
use std::fs;

/// Load a required field.
#[doc(hidden)]
pub fn required<T: FromValue>(store: &ValueStore, name: &str, from_file: bool) -> Result<T> {
    match lookup(store, name, from_file)? {
        Source::Store => store.parse(name),
        Source::File(contents) => cast_contents(store, name, &contents),
        Source::Absent => Err(EnvironError::missing(name)),
    }
}

/// Load a field that falls back to `default` when unset.
#[doc(hidden)]
pub fn with_default<T: FromValue>(
    store: &ValueStore,
    name: &str,
    from_file: bool,
    default: T,
) -> Result<T> {
    match lookup(store, name, from_file)? {
        Source::Store => store.parse(name),
        Source::File(contents) => cast_contents(store, name, &contents),
        Source::Absent => Ok(default),
    }
}

/// Load an `Option<T>` field; `None` when unset.
#[doc(hidden)]
pub fn optional<T: FromValue>(
    store: &ValueStore,
    name: &str,
    from_file: bool,
) -> Result<Option<T>> {
    match lookup(store, name, from_file)? {
        Source::Store => store.parse(name).map(Some),
        Source::File(contents) => cast_contents(store, name, &contents).map(Some),
        Source::Absent => Ok(None),
    }
}

enum Source {
    Store,
    File(String),
    Absent,
}

/// `name` itself wins over `{name}_FILE`.
fn lookup(store: &ValueStore, name: &str, from_file: bool) -> Result<Source> {
    if store.contains(name) {
        return Ok(Source::Store);
    }
    if from_file {
        let file_var = format!("{name}_FILE");
        if store.contains(&file_var) {
            let path = store.resolve(&file_var)?;
            let contents = fs::read_to_string(&path).map_err(|source| EnvironError::FileRead {
                name: file_var,
                path,
                source,
            })?;
            return Ok(Source::File(contents.trim().to_string()));
        }
    }
    Ok(Source::Absent)
}

fn cast_contents<T: FromValue>(store: &ValueStore, name: &str, contents: &str) -> Result<T> {
    let value = store.caster().cast(contents, &T::spec())?;
    T::from_value(value).map_err(|message| EnvironError::parse_error::<T>(name, message))
}
