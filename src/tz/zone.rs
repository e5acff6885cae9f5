//! A time zone loaded from a TZif file or from memory.
use crate::tz::builder::{self, BuildError};
use crate::tz::table::{Fold, TransitionTable};
use crate::tz::ttinfo::TTInfo;
use crate::tz::tzif::{self, DecodeError};
use crate::tz::tzpath::{KeyError, TzPath};
use crate::{EpochSeconds, Offset};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("No time zone found with key {0}")]
    NotFound(String),
    #[error(transparent)]
    InvalidKey(#[from] KeyError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TZif data: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid zone data: {0}")]
    Build(#[from] BuildError),
}

/// A time zone: an optional key (e.g. `Europe/Amsterdam`) and its transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneInfo {
    key: Option<String>,
    file: Option<PathBuf>,
    table: TransitionTable,
}

impl ZoneInfo {
    /// Load the zone with the given key from the first matching file in the search path.
    pub fn load(key: &str, tzpath: &TzPath) -> Result<Self, LoadError> {
        let path = tzpath
            .find(key)?
            .ok_or_else(|| LoadError::NotFound(key.to_string()))?;
        Self::from_file(&path, Some(key))
    }

    /// Load a zone from the given TZif file.
    pub fn from_file(path: &Path, key: Option<&str>) -> Result<Self, LoadError> {
        debug!(path = %path.display(), "reading TZif file");
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut zone = Self::from_tzif(&bytes, key)?;
        zone.file = Some(path.to_path_buf());
        Ok(zone)
    }

    /// Build a zone from the raw content of a TZif file.
    pub fn from_tzif(bytes: &[u8], key: Option<&str>) -> Result<Self, LoadError> {
        let table = builder::build(tzif::decode(bytes)?)?;
        Ok(Self {
            key: key.map(str::to_string),
            file: None,
            table,
        })
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The file this zone was read from, if any
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// The ttinfo for a wall time, given as seconds since 1970-01-01 *local time*
    pub fn ttinfo_for_local(&self, t: EpochSeconds, fold: Fold) -> Option<&TTInfo> {
        self.table.resolve_wall(t, fold)
    }

    /// The UTC offset at the given wall time
    pub fn utcoffset(&self, t: EpochSeconds, fold: Fold) -> Option<Offset> {
        self.ttinfo_for_local(t, fold).map(TTInfo::utcoff)
    }

    /// The DST amount at the given wall time
    pub fn dst(&self, t: EpochSeconds, fold: Fold) -> Option<Offset> {
        self.ttinfo_for_local(t, fold).map(TTInfo::dstoff)
    }

    /// The abbreviation in use at the given wall time
    pub fn tzname(&self, t: EpochSeconds, fold: Fold) -> Option<&str> {
        self.ttinfo_for_local(t, fold).map(TTInfo::abbreviation)
    }

    pub fn offset_for_instant(&self, t: EpochSeconds) -> Option<Offset> {
        self.table.offset_for_instant(t)
    }

    /// Convert a UTC instant to wall time and the fold it's in.
    pub fn fromutc(&self, t: EpochSeconds) -> Option<(EpochSeconds, Fold)> {
        self.table.local_from_utc(t)
    }
}

impl fmt::Display for ZoneInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.key, &self.file) {
            (Some(key), _) => f.write_str(key),
            (None, Some(file)) => write!(f, "ZoneInfo(file={})", file.display()),
            (None, None) => f.write_str("ZoneInfo(key=None)"),
        }
    }
}
