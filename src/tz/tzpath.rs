//! Configuration of where TZif files are looked up.
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the search path.
/// Its value is a list of absolute directories, separated like `PATH`.
/// An empty value disables lookups from the filesystem entirely.
pub const TZPATH_ENV: &str = "ZONEINFO_TZPATH";

const DEFAULT_TZPATH: &[&str] = &[
    "/usr/share/zoneinfo",
    "/usr/lib/zoneinfo",
    "/usr/share/lib/zoneinfo",
    "/etc/zoneinfo",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("zone keys may not be empty")]
    Empty,
    #[error("zone keys may not be absolute paths, got: {0}")]
    Absolute(String),
    #[error("zone keys must be normalized relative paths, got: {0}")]
    NotNormalized(String),
}

/// An ordered list of directories to search for TZif files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TzPath {
    dirs: Vec<PathBuf>,
}

impl TzPath {
    /// Use the given directories, in order.
    /// Relative directories are ignored, since lookups would depend on the working directory.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs
                .into_iter()
                .map(Into::into)
                .filter(|d: &PathBuf| d.is_absolute())
                .collect(),
        }
    }

    /// Read the search path from [`TZPATH_ENV`], falling back to the
    /// platform defaults. Existing directories are tried first.
    pub fn from_env() -> Self {
        match env::var_os(TZPATH_ENV) {
            Some(value) => {
                let tzpath = Self::new(env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()));
                debug!(dirs = ?tzpath.dirs, "using search path from {TZPATH_ENV}");
                tzpath
            }
            None if cfg!(windows) => Self::default(),
            None => {
                let mut dirs: Vec<_> = DEFAULT_TZPATH.iter().map(PathBuf::from).collect();
                // stable sort: existing directories first, otherwise in order
                dirs.sort_by_key(|d| !d.is_dir());
                Self { dirs }
            }
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Find the file for the given key, if any.
    pub fn find(&self, key: &str) -> Result<Option<PathBuf>, KeyError> {
        validate_key(key)?;
        Ok(self.dirs.iter().map(|d| d.join(key)).find(|p| p.is_file()))
    }
}

/// Check a key is a plain relative path (e.g. `Europe/Amsterdam`),
/// which can't point outside the search directory.
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }
    let path = Path::new(key);
    if path.is_absolute() || key.starts_with('/') || key.starts_with('\\') {
        return Err(KeyError::Absolute(key.to_string()));
    }
    let not_normalized = key.contains('\0')
        || key
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");
    if not_normalized {
        return Err(KeyError::NotNormalized(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        for key in ["UTC", "Europe/Amsterdam", "America/Argentina/Buenos_Aires", "Etc/GMT+5"] {
            assert_eq!(validate_key(key), Ok(()), "{key}");
        }
    }

    #[test]
    fn test_invalid_keys() {
        assert_eq!(validate_key(""), Err(KeyError::Empty));
        assert_eq!(
            validate_key("/etc/passwd"),
            Err(KeyError::Absolute("/etc/passwd".to_string()))
        );
        for key in [
            "../zoneinfo/UTC",
            "Europe/../UTC",
            "./UTC",
            "Europe/",
            "Europe//Amsterdam",
            "Europe/./Amsterdam",
            "UTC\0",
            "..",
        ] {
            assert_eq!(
                validate_key(key),
                Err(KeyError::NotNormalized(key.to_string())),
                "{key:?}"
            );
        }
    }

    #[test]
    fn test_relative_dirs_ignored() {
        let tzpath = TzPath::new(["zoneinfo", "/usr/share/zoneinfo"]);
        assert_eq!(tzpath.dirs(), [PathBuf::from("/usr/share/zoneinfo")]);
    }

    #[test]
    fn test_find() {
        let dir = env::temp_dir().join(format!("zoneinfo-tzpath-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("Test")).unwrap();
        std::fs::write(dir.join("Test/Zone"), b"TZif").unwrap();

        let tzpath = TzPath::new([PathBuf::from("/nonexistent-zoneinfo"), dir.clone()]);
        assert_eq!(tzpath.find("Test/Zone"), Ok(Some(dir.join("Test/Zone"))));
        assert_eq!(tzpath.find("Test/Missing"), Ok(None));
        // directories don't count
        assert_eq!(tzpath.find("Test"), Ok(None));
        assert!(tzpath.find("../Test/Zone").is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
