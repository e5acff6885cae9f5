//! In-memory models of IANA time zones.
//!
//! A zone is built from its decoded transition data into a [`TransitionTable`]:
//! a set of parallel arrays which answer "which UTC offset applies?" for both
//! absolute instants and (possibly ambiguous) wall-clock times.
//!
//! ```no_run
//! use zoneinfo::{Fold, ZoneStore};
//!
//! let store = ZoneStore::from_env();
//! let zone = store.get("America/New_York")?;
//! // 2023-11-05 01:30 local time happens twice
//! let earlier = zone.utcoffset(1_699_147_800, Fold::Earlier);
//! let later = zone.utcoffset(1_699_147_800, Fold::Later);
//! assert_eq!(earlier, Some(-4 * 3_600));
//! assert_eq!(later, Some(-5 * 3_600));
//! # Ok::<(), zoneinfo::LoadError>(())
//! ```
pub(crate) mod common;
pub mod tz;

pub use tz::builder::{BuildError, DecodedZone, build};
pub use tz::table::{Fold, TransitionTable, TzRule};
pub use tz::ttinfo::{TTInfo, TTInfoId, TTInfoPool};
pub use tz::store::ZoneStore;
pub use tz::tzpath::{KeyError, TzPath};
pub use tz::tzif::DecodeError;
pub use tz::zone::{LoadError, ZoneInfo};

/// Seconds since 1970-01-01T00:00:00, either in UTC or in local ("wall") time.
pub type EpochSeconds = i64;

/// A UTC offset (or an adjustment of one) in seconds.
/// Positive values are east of Greenwich.
pub type Offset = i32;
