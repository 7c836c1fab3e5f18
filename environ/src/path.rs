//! Immutable filesystem path values.
//!
//! [`PathValue`] wraps an absolute, lexically normalized root. Every
//! operation returns a new value; nothing touches the filesystem except the
//! explicit required-existence checks and [`PathValue::open`].
//!
//! ```rust
//! use environ::PathValue;
//!
//! # fn main() -> environ::Result<()> {
//! let root = PathValue::new("/home")?;
//! let assets = root.join(["public", "assets"]);
//! assert_eq!(assets.to_string(), "/home/public/assets");
//! assert_eq!(assets.parent().to_string(), "/home/public");
//! assert_eq!(assets.truncate(2), root);
//! assert!(root.contains(&assets));
//! # Ok(())
//! # }
//! ```

use crate::cast::Spec;
use crate::error::{EnvironError, Result};
use crate::value::{FromValue, Value};
use std::fmt;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

/// Options for [`PathValue::with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathOptions {
    /// Treat `start` as a file and use its directory.
    pub is_file: bool,
    /// Fail with [`EnvironError::RequiredPathMissing`] unless the result exists.
    pub required: bool,
}

/// Absolute filesystem path with composition helpers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathValue {
    root: PathBuf,
}

impl PathValue {
    /// Absolute path for `start`, resolved against the current directory if relative.
    ///
    /// # Errors
    ///
    /// Fails only when a relative `start` cannot be made absolute.
    pub fn new(start: impl AsRef<Path>) -> Result<Self> {
        Self::with(start, std::iter::empty::<&Path>(), PathOptions::default())
    }

    /// Directory containing `file`.
    ///
    /// ```rust
    /// # use environ::PathValue;
    /// # fn main() -> environ::Result<()> {
    /// let dir = PathValue::from_file("/srv/app/settings.rs")?;
    /// assert_eq!(dir.to_string(), "/srv/app");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file(file: impl AsRef<Path>) -> Result<Self> {
        Self::with(
            file,
            std::iter::empty::<&Path>(),
            PathOptions {
                is_file: true,
                ..PathOptions::default()
            },
        )
    }

    /// Join `segments` onto `start` with the given options.
    ///
    /// # Errors
    ///
    /// - [`EnvironError::RequiredPathMissing`] if `options.required` is set and the
    ///   resulting path does not exist
    /// - [`EnvironError::Absolute`] if the current directory is unavailable
    pub fn with<I, S>(start: impl AsRef<Path>, segments: I, options: PathOptions) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut start = start.as_ref();
        if options.is_file {
            start = start.parent().unwrap_or(start);
        }
        let absolute = std::path::absolute(start).map_err(|source| EnvironError::Absolute {
            path: start.to_path_buf(),
            source,
        })?;
        let value = PathValue {
            root: normalize(&absolute),
        }
        .join(segments);
        if options.required {
            value.require()
        } else {
            Ok(value)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// New value with `segments` appended. Absolute segments replace the root.
    pub fn join<I, S>(&self, segments: I) -> PathValue
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        PathValue {
            root: normalize(&self.resolve(segments)),
        }
    }

    /// Like [`join`](Self::join), but the result must exist.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironError::RequiredPathMissing`] naming the expected path.
    pub fn join_required<I, S>(&self, segments: I) -> Result<PathValue>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        self.join(segments).require()
    }

    /// Check that the root exists on the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironError::RequiredPathMissing`] naming the root.
    pub fn require(self) -> Result<Self> {
        if self.root.exists() {
            Ok(self)
        } else {
            Err(EnvironError::RequiredPathMissing { path: self.root })
        }
    }

    /// Normalized path for `segments` below the root, without wrapping it.
    pub fn resolve<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.root.clone();
        for segment in segments {
            path.push(segment);
        }
        normalize(&path)
    }

    /// Append another value's root.
    pub fn join_value(&self, other: &PathValue) -> PathValue {
        self.join([other.root()])
    }

    /// Drop `n` trailing components, stopping at the filesystem root.
    pub fn truncate(&self, n: usize) -> PathValue {
        let mut root = self.root.clone();
        for _ in 0..n {
            if !root.pop() {
                break;
            }
        }
        PathValue { root }
    }

    /// Remove `suffix` from the end of the root.
    ///
    /// `suffix` is compared component-wise, so `"dev/public"` trims two components.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironError::ArgumentMismatch`] if the root does not end with `suffix`.
    pub fn trim_suffix(&self, suffix: &str) -> Result<PathValue> {
        let suffix_path = Path::new(suffix);
        let depth = suffix_path.components().count();
        if depth == 0 || suffix_path.is_absolute() || !self.root.ends_with(suffix_path) {
            return Err(EnvironError::ArgumentMismatch {
                path: self.root.clone(),
                operand: suffix.to_string(),
            });
        }
        Ok(self.truncate(depth))
    }

    /// Immediate parent; the filesystem root is its own parent.
    pub fn parent(&self) -> PathValue {
        self.truncate(1)
    }

    /// Whether `other` is this path or lies below it.
    pub fn contains(&self, other: &PathValue) -> bool {
        other.root.starts_with(&self.root)
    }

    /// Open `name` relative to the root for reading.
    pub fn open(&self, name: impl AsRef<Path>) -> std::io::Result<File> {
        File::open(self.resolve([name]))
    }
}

/// Fold `.` and `..` without consulting the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

impl fmt::Display for PathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

impl AsRef<Path> for PathValue {
    fn as_ref(&self) -> &Path {
        &self.root
    }
}

impl From<PathValue> for PathBuf {
    fn from(value: PathValue) -> Self {
        value.root
    }
}

impl FromValue for PathValue {
    fn spec() -> Spec {
        Spec::string()
    }

    fn from_value(value: Value) -> std::result::Result<Self, String> {
        let raw = String::from_value(value)?;
        PathValue::new(raw).map_err(|e| e.to_string())
    }
}
