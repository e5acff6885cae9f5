//! Local time type records ("ttinfo") and the pool that owns them.
use crate::Offset;
use crate::tz::intern::{self, Delta};
use std::collections::TryReserveError;
use std::ops::Index;
use std::sync::Arc;

/// The offset, DST amount and abbreviation of one kind of period in a zone,
/// e.g. "EDT, UTC-4, one hour of DST".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TTInfo {
    utcoff: Delta,
    dstoff: Delta,
    abbr: Arc<str>,
}

impl TTInfo {
    pub(crate) fn new(utcoff: Offset, dstoff: Offset, abbr: Arc<str>) -> Self {
        Self {
            utcoff: intern::delta(utcoff),
            dstoff: intern::delta(dstoff),
            abbr,
        }
    }

    /// Offset added to UTC to get local time
    pub fn utcoff(&self) -> Offset {
        self.utcoff.seconds()
    }

    /// Portion of [`utcoff`](Self::utcoff) attributable to daylight saving time
    pub fn dstoff(&self) -> Offset {
        self.dstoff.seconds()
    }

    pub fn abbreviation(&self) -> &str {
        &self.abbr
    }

    pub fn is_dst(&self) -> bool {
        self.dstoff() != 0
    }

    pub(crate) fn utcoff_delta(&self) -> &Delta {
        &self.utcoff
    }

    pub(crate) fn dstoff_delta(&self) -> &Delta {
        &self.dstoff
    }
}

/// Position of a [`TTInfo`] in its [`TTInfoPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TTInfoId(u32);

impl TTInfoId {
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// The ttinfos of a single zone, in the order of the source data.
/// Transitions refer to its entries by [`TTInfoId`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TTInfoPool {
    entries: Vec<TTInfo>,
}

impl TTInfoPool {
    pub(crate) fn with_capacity(n: usize) -> Result<Self, TryReserveError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(n)?;
        Ok(Self { entries })
    }

    /// Add an entry. The caller guarantees the pool stays below `u32::MAX` entries,
    /// which holds since ids are validated against the input length beforehand.
    pub(crate) fn push(&mut self, tti: TTInfo) -> TTInfoId {
        let id = TTInfoId(self.entries.len() as u32);
        self.entries.push(tti);
        id
    }

    pub(crate) fn id(&self, index: usize) -> Option<TTInfoId> {
        (index < self.entries.len()).then_some(TTInfoId(index as u32))
    }

    pub fn get(&self, id: TTInfoId) -> Option<&TTInfo> {
        self.entries.get(id.get())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TTInfoId, &TTInfo)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, tti)| (TTInfoId(i as u32), tti))
    }
}

impl Index<TTInfoId> for TTInfoPool {
    type Output = TTInfo;

    fn index(&self, id: TTInfoId) -> &TTInfo {
        &self.entries[id.get()]
    }
}
