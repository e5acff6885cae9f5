//! Assembly of a [`TransitionTable`] from decoded zone data.
//!
//! Every intermediate array is owned by a local until the final table is
//! assembled. On any error, whatever has been built so far is simply dropped,
//! so a partially built table is never observable.
use crate::tz::dst::infer_dst_offsets;
use crate::tz::posix::{self, PosixTz};
use crate::tz::table::{TransitionTable, TzRule};
use crate::tz::ttinfo::{TTInfo, TTInfoId, TTInfoPool};
use crate::tz::wall::project_wall;
use crate::{EpochSeconds, Offset};
use ahash::AHashMap;
use std::collections::TryReserveError;
use std::sync::Arc;
use tracing::debug;

/// UTC offsets must be strictly within one day
const MAX_ABS_OFFSET: Offset = 86_400;

/// The content of a zone's data file, decoded but not yet interpreted.
/// Transitions must be sorted by time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedZone {
    /// Per transition: index of the ttinfo starting at that transition
    pub trans_idx: Vec<usize>,
    /// Per transition: the UTC instant of the transition
    pub trans_utc: Vec<EpochSeconds>,
    /// Per ttinfo: the UTC offset
    pub utcoff: Vec<Offset>,
    /// Per ttinfo: whether it's daylight saving time
    pub isdst: Vec<bool>,
    /// Per ttinfo: the abbreviation, e.g. "CEST"
    pub abbr: Vec<String>,
    /// Rule for times after the last transition, as a POSIX TZ string
    pub tz_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("transition {position} refers to ttinfo {index}, but there are only {count}")]
    InvalidIndex {
        position: usize,
        index: usize,
        count: usize,
    },
    #[error("expected {expected} values for {what}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{what} out of range: {value}")]
    OutOfRange { what: &'static str, value: i64 },
    #[error("invalid POSIX TZ string: {0:?}")]
    InvalidRule(String),
    #[error("failed to allocate transition table")]
    Alloc(#[from] TryReserveError),
}

/// Build a transition table from decoded zone data.
pub fn build(zone: DecodedZone) -> Result<TransitionTable, BuildError> {
    let DecodedZone {
        trans_idx,
        trans_utc,
        utcoff,
        isdst,
        abbr,
        tz_string,
    } = zone;
    validate(&trans_idx, &trans_utc, &utcoff, &isdst, &abbr)?;

    let dstoff = infer_dst_offsets(&trans_idx, &utcoff, &isdst);
    let pool = build_pool(&utcoff, &dstoff, abbr)?;
    let trans_wall = project_wall(&trans_utc, &trans_idx, &utcoff)?;

    let mut trans_ttinfo = Vec::new();
    trans_ttinfo.try_reserve_exact(trans_idx.len())?;
    trans_ttinfo.extend(trans_idx.iter().map(|&i| ttinfo_id(&pool, i)));

    // The first standard-time ttinfo, else the first ttinfo of any kind
    let ttinfo_before = isdst
        .iter()
        .position(|&dst| !dst)
        .or((!pool.is_empty()).then_some(0))
        .map(|i| ttinfo_id(&pool, i));

    let tzrule_after = match tz_string.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_rule(s)?),
        // Without a rule, the last period continues indefinitely
        None => trans_ttinfo
            .last()
            .copied()
            .or(ttinfo_before)
            .map(|id| TzRule::Fixed(pool[id].clone())),
    };

    debug!(
        transitions = trans_utc.len(),
        ttinfos = pool.len(),
        "built transition table"
    );
    Ok(TransitionTable::from_parts(
        pool,
        trans_utc,
        trans_wall,
        trans_ttinfo,
        ttinfo_before,
        tzrule_after,
    ))
}

fn validate(
    trans_idx: &[usize],
    trans_utc: &[EpochSeconds],
    utcoff: &[Offset],
    isdst: &[bool],
    abbr: &[String],
) -> Result<(), BuildError> {
    let count = utcoff.len();
    for (what, found, expected) in [
        ("transition times", trans_utc.len(), trans_idx.len()),
        ("DST flags", isdst.len(), count),
        ("abbreviations", abbr.len(), count),
    ] {
        if found != expected {
            return Err(BuildError::LengthMismatch {
                what,
                expected,
                found,
            });
        }
    }
    // Ids are stored as u32
    if count > u32::MAX as usize {
        return Err(BuildError::OutOfRange {
            what: "number of ttinfos",
            value: count as i64,
        });
    }
    if let Some((position, &index)) = trans_idx.iter().enumerate().find(|&(_, &i)| i >= count) {
        return Err(BuildError::InvalidIndex {
            position,
            index,
            count,
        });
    }
    if let Some(&off) = utcoff.iter().find(|o| o.abs() >= MAX_ABS_OFFSET) {
        return Err(BuildError::OutOfRange {
            what: "UTC offset",
            value: off.into(),
        });
    }
    Ok(())
}

/// One pool entry per input ttinfo, in input order.
/// Equal abbreviations share their allocation.
fn build_pool(
    utcoff: &[Offset],
    dstoff: &[Offset],
    abbr: Vec<String>,
) -> Result<TTInfoPool, BuildError> {
    let mut pool = TTInfoPool::with_capacity(utcoff.len())?;
    let mut names = abbreviation_table(abbr.len())?;
    for ((&off, &dst), name) in utcoff.iter().zip(dstoff).zip(abbr) {
        let name = names
            .entry(name)
            .or_insert_with_key(|n| Arc::from(n.as_str()))
            .clone();
        pool.push(TTInfo::new(off, dst, name));
    }
    Ok(pool)
}

/// Interned abbreviations by name.
/// The strings themselves (and the interned offsets) are allocated infallibly.
fn abbreviation_table(n: usize) -> Result<AHashMap<String, Arc<str>>, BuildError> {
    let mut names = AHashMap::default();
    names.try_reserve(n)?;
    Ok(names)
}

fn ttinfo_id(pool: &TTInfoPool, index: usize) -> TTInfoId {
    // Indices have been validated against the pool size
    pool.id(index).unwrap_or_else(|| unreachable!("ttinfo {index} not in pool"))
}

fn parse_rule(s: &str) -> Result<TzRule, BuildError> {
    let PosixTz { std, dst } =
        posix::parse(s.as_bytes()).ok_or_else(|| BuildError::InvalidRule(s.to_string()))?;
    for offset in [Some(std.offset), dst.as_ref().map(|d| d.name.offset)]
        .into_iter()
        .flatten()
    {
        if offset.abs() >= MAX_ABS_OFFSET {
            return Err(BuildError::OutOfRange {
                what: "UTC offset",
                value: offset.into(),
            });
        }
    }
    let std_tti = TTInfo::new(std.offset, 0, Arc::from(std.abbr));
    Ok(match dst {
        None => TzRule::Fixed(std_tti),
        Some(dst) => TzRule::Dst {
            dst: TTInfo::new(
                dst.name.offset,
                dst.name.offset - std.offset,
                Arc::from(dst.name.abbr),
            ),
            std: std_tti,
            start: dst.start,
            end: dst.end,
        },
    })
}
