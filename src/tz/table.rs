//! The transition table: the in-memory model of a single zone.
use crate::tz::posix::{Rule, TransitionTime};
use crate::tz::ttinfo::{TTInfo, TTInfoId, TTInfoPool};
use crate::tz::wall::WallTransitions;
use crate::{EpochSeconds, Offset};

/// Disambiguation of wall-clock times which occur twice (or not at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Fold {
    /// The first occurrence of a repeated time,
    /// or the offset before a gap.
    #[default]
    Earlier = 0,
    /// The second occurrence of a repeated time,
    /// or the offset after a gap.
    Later = 1,
}

impl Fold {
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<bool> for Fold {
    fn from(later: bool) -> Self {
        if later { Fold::Later } else { Fold::Earlier }
    }
}

/// What applies after the last explicit transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TzRule {
    /// A single offset forever
    Fixed(TTInfo),
    /// Yearly alternation between standard and daylight time.
    /// The rules are stored, but not evaluated.
    Dst {
        std: TTInfo,
        dst: TTInfo,
        start: (Rule, TransitionTime),
        end: (Rule, TransitionTime),
    },
}

/// A fully built zone model. Read each transition `i` as:
/// "from `trans_utc[i]` onwards, `trans_ttinfo[i]` applies".
///
/// Invariants:
/// - all four per-transition arrays have the same length
/// - every ttinfo id refers to an entry in the pool
/// - `trans_wall[0][i] >= trans_wall[1][i]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    pool: TTInfoPool,
    trans_utc: Vec<EpochSeconds>,
    trans_wall: WallTransitions,
    trans_ttinfo: Vec<TTInfoId>,
    ttinfo_before: Option<TTInfoId>,
    tzrule_after: Option<TzRule>,
}

impl TransitionTable {
    pub(crate) fn from_parts(
        pool: TTInfoPool,
        trans_utc: Vec<EpochSeconds>,
        trans_wall: WallTransitions,
        trans_ttinfo: Vec<TTInfoId>,
        ttinfo_before: Option<TTInfoId>,
        tzrule_after: Option<TzRule>,
    ) -> Self {
        debug_assert_eq!(trans_utc.len(), trans_wall[0].len());
        debug_assert_eq!(trans_utc.len(), trans_wall[1].len());
        debug_assert_eq!(trans_utc.len(), trans_ttinfo.len());
        debug_assert!(trans_ttinfo.iter().all(|&id| pool.get(id).is_some()));
        Self {
            pool,
            trans_utc,
            trans_wall,
            trans_ttinfo,
            ttinfo_before,
            tzrule_after,
        }
    }

    /// The number of transitions
    pub fn len(&self) -> usize {
        self.trans_utc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trans_utc.is_empty()
    }

    pub fn pool(&self) -> &TTInfoPool {
        &self.pool
    }

    pub fn trans_utc(&self) -> &[EpochSeconds] {
        &self.trans_utc
    }

    pub fn trans_wall(&self, fold: Fold) -> &[EpochSeconds] {
        &self.trans_wall[fold.index()]
    }

    pub fn trans_ttinfo(&self) -> &[TTInfoId] {
        &self.trans_ttinfo
    }

    /// The ttinfo applicable before the first transition
    pub fn ttinfo_before(&self) -> Option<&TTInfo> {
        self.ttinfo_before.map(|id| &self.pool[id])
    }

    /// The rule applicable after the last transition
    pub fn tzrule_after(&self) -> Option<&TzRule> {
        self.tzrule_after.as_ref()
    }

    /// Index of the latest transition at or before the given UTC instant
    pub fn transition_index_utc(&self, t: EpochSeconds) -> Option<usize> {
        latest_at_or_before(&self.trans_utc, t)
    }

    /// Index of the latest transition at or before the given wall time
    pub fn transition_index_wall(&self, t: EpochSeconds, fold: Fold) -> Option<usize> {
        latest_at_or_before(self.trans_wall(fold), t)
    }

    /// The ttinfo in effect at the given UTC instant
    pub fn resolve_utc(&self, t: EpochSeconds) -> Option<&TTInfo> {
        self.resolve_in(&self.trans_utc, t)
    }

    /// The ttinfo in effect at the given wall time.
    /// The fold determines the result for repeated or skipped times.
    pub fn resolve_wall(&self, t: EpochSeconds, fold: Fold) -> Option<&TTInfo> {
        self.resolve_in(self.trans_wall(fold), t)
    }

    fn resolve_in(&self, transitions: &[EpochSeconds], t: EpochSeconds) -> Option<&TTInfo> {
        match transitions.last() {
            Some(&last) if t <= last => match latest_at_or_before(transitions, t) {
                Some(i) => Some(&self.pool[self.trans_ttinfo[i]]),
                None => self.ttinfo_before(),
            },
            _ => self.ttinfo_after(),
        }
    }

    fn ttinfo_after(&self) -> Option<&TTInfo> {
        match &self.tzrule_after {
            Some(TzRule::Fixed(tti)) => Some(tti),
            // DST rules aren't evaluated: the last known period continues
            _ => self
                .trans_ttinfo
                .last()
                .map(|&id| &self.pool[id])
                .or_else(|| self.ttinfo_before()),
        }
    }

    /// Convert a UTC instant to wall time, detecting whether the result
    /// is the second occurrence of a repeated wall time.
    pub fn local_from_utc(&self, t: EpochSeconds) -> Option<(EpochSeconds, Fold)> {
        let tti = self.resolve_utc(t)?;
        let wall = t.checked_add(tti.utcoff().into())?;
        let fold = match self.transition_index_utc(t) {
            Some(i) => {
                let prev = match i.checked_sub(1) {
                    Some(p) => Some(&self.pool[self.trans_ttinfo[p]]),
                    None => self.ttinfo_before(),
                };
                let shift = prev.map_or(0, |p| p.utcoff() - tti.utcoff());
                // Far from the transition, the distance may not fit in an i64
                let in_fold = t
                    .checked_sub(self.trans_utc[i])
                    .is_some_and(|since| i64::from(shift) > since);
                Fold::from(in_fold)
            }
            None => Fold::Earlier,
        };
        Some((wall, fold))
    }

    /// The UTC offset at the given UTC instant
    pub fn offset_for_instant(&self, t: EpochSeconds) -> Option<Offset> {
        self.resolve_utc(t).map(TTInfo::utcoff)
    }
}

#[inline]
fn latest_at_or_before(arr: &[EpochSeconds], t: EpochSeconds) -> Option<usize> {
    arr.partition_point(|&x| x <= t).checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tz::builder::{DecodedZone, build};
    use crate::tz::testing::{self, *};

    #[test]
    fn test_binary_search() {
        let arr = &[4, 9, 12, 16, 24];
        // middle of the array
        assert_eq!(latest_at_or_before(arr, 10), Some(1));
        assert_eq!(latest_at_or_before(arr, 12), Some(2));
        assert_eq!(latest_at_or_before(arr, 15), Some(2));
        assert_eq!(latest_at_or_before(arr, 16), Some(3));
        // end of the array
        assert_eq!(latest_at_or_before(arr, 24), Some(4));
        assert_eq!(latest_at_or_before(arr, 30), Some(4));
        // start of the array
        assert_eq!(latest_at_or_before(arr, -99), None);
        assert_eq!(latest_at_or_before(arr, 3), None);
        assert_eq!(latest_at_or_before(arr, 4), Some(0));
        assert_eq!(latest_at_or_before(arr, 5), Some(0));
        // empty case
        assert_eq!(latest_at_or_before(&[], 25), None);
    }

    #[test]
    fn test_resolve_utc() {
        let table = build(testing::new_york()).unwrap();
        let cases = &[
            // before the first transition
            (-2_800_000_000, LMT),
            (NY_LMT_END - 1, LMT),
            // ties belong to the new period
            (NY_LMT_END, EST),
            (NY_DST_2023 - 1, EST),
            (NY_DST_2023, EDT),
            (NY_STD_2023 - 1, EDT),
            (NY_STD_2023, EST),
            (NY_DST_2024, EDT),
            (NY_STD_2024 - 1, EDT),
            (NY_STD_2024, EST),
            // DST rules past the end aren't evaluated
            (NY_STD_2024 + 300 * 86_400, EST),
        ];
        for &(t, expect) in cases {
            assert_eq!(table.offset_for_instant(t), Some(expect), "t={t}");
        }
        assert_eq!(table.resolve_utc(NY_DST_2023).unwrap().abbreviation(), "EDT");
        assert_eq!(table.resolve_utc(NY_DST_2023).unwrap().dstoff(), 3_600);
    }

    #[test]
    fn test_resolve_wall_gap() {
        let table = build(testing::new_york()).unwrap();
        // 2023-03-12 02:30 doesn't exist on the wall clock
        let t = NY_DST_2023 + EST as i64 + 1_800;
        assert_eq!(table.resolve_wall(t, Fold::Earlier).unwrap().utcoff(), EST);
        assert_eq!(table.resolve_wall(t, Fold::Later).unwrap().utcoff(), EDT);
        // outside of the gap, fold doesn't matter
        for t in [t - 3_600, t + 3_600] {
            assert_eq!(
                table.resolve_wall(t, Fold::Earlier),
                table.resolve_wall(t, Fold::Later)
            );
        }
    }

    #[test]
    fn test_resolve_wall_fold() {
        let table = build(testing::new_york()).unwrap();
        // 2023-11-05 01:30 occurs twice
        let t = NY_STD_2023 + EST as i64 + 1_800;
        assert_eq!(table.resolve_wall(t, Fold::Earlier).unwrap().abbreviation(), "EDT");
        assert_eq!(table.resolve_wall(t, Fold::Later).unwrap().abbreviation(), "EST");
        // the fold ends at 02:00 local time
        let t = NY_STD_2023 + EDT as i64;
        assert_eq!(table.resolve_wall(t, Fold::Earlier).unwrap().utcoff(), EST);
        assert_eq!(table.resolve_wall(t, Fold::Later).unwrap().utcoff(), EST);
        // before the first transition
        assert_eq!(
            table.resolve_wall(NY_LMT_END - 86_400, Fold::Later).unwrap().utcoff(),
            LMT
        );
    }

    #[test]
    fn test_local_from_utc() {
        let table = build(testing::new_york()).unwrap();
        // The first 01:30 (EDT)
        assert_eq!(
            table.local_from_utc(NY_STD_2023 - 1_800),
            Some((NY_STD_2023 - 1_800 + EDT as i64, Fold::Earlier))
        );
        // The second 01:30 (EST)
        assert_eq!(
            table.local_from_utc(NY_STD_2023 + 1_800),
            Some((NY_STD_2023 + 1_800 + EST as i64, Fold::Later))
        );
        // 02:00 EST is unambiguous again
        assert_eq!(
            table.local_from_utc(NY_STD_2023 + 3_600),
            Some((NY_STD_2023 + 3_600 + EST as i64, Fold::Earlier))
        );
        // a gap never produces fold=1
        assert_eq!(
            table.local_from_utc(NY_DST_2023),
            Some((NY_DST_2023 + EDT as i64, Fold::Earlier))
        );
    }

    #[test]
    fn test_local_from_utc_extremes() {
        // A single transition in 1912 from local mean time to GMT
        let table = build(DecodedZone {
            trans_idx: vec![1],
            trans_utc: vec![-1_830_383_032],
            utcoff: vec![-968, 0],
            isdst: vec![false, false],
            abbr: vec!["LMT".into(), "GMT".into()],
            tz_string: Some("GMT0".into()),
        })
        .unwrap();
        assert_eq!(
            table.local_from_utc(EpochSeconds::MAX),
            Some((EpochSeconds::MAX, Fold::Earlier))
        );
        // The offset after the transition would overflow the wall time
        let ny = build(testing::new_york()).unwrap();
        assert_eq!(ny.local_from_utc(EpochSeconds::MIN), None);
        assert_eq!(
            ny.local_from_utc(EpochSeconds::MAX),
            Some((EpochSeconds::MAX + EST as i64, Fold::Earlier))
        );
    }

    #[test]
    fn test_wall_index_is_monotonic() {
        let table = build(testing::new_york()).unwrap();
        for fold in [Fold::Earlier, Fold::Later] {
            let wall = table.trans_wall(fold);
            let probes: Vec<EpochSeconds> = (-3_000_000_000..2_000_000_000)
                .step_by(7_777_777)
                .chain(wall.iter().flat_map(|&t| [t - 1, t, t + 1]))
                .collect();
            for &a in &probes {
                for &b in &probes {
                    if a < b {
                        assert!(
                            table.transition_index_wall(a, fold) <= table.transition_index_wall(b, fold)
                        );
                    }
                }
            }
            // each transition starts exactly at its own wall time
            for (i, &t) in wall.iter().enumerate() {
                assert_eq!(table.transition_index_wall(t, fold), Some(i));
                assert_eq!(table.transition_index_wall(t - 1, fold), i.checked_sub(1));
            }
        }
    }

    #[test]
    fn test_resolve_is_monotonic() {
        let table = build(testing::new_york()).unwrap();
        let probes: Vec<EpochSeconds> = (-3_000_000_000..2_000_000_000)
            .step_by(7_777_777)
            .chain(table.trans_utc().iter().flat_map(|&t| [t - 1, t, t + 1]))
            .collect();
        for &a in &probes {
            for &b in &probes {
                if a < b {
                    assert!(table.transition_index_utc(a) <= table.transition_index_utc(b));
                }
            }
        }
    }

    #[test]
    fn test_fixed_rule_after() {
        let mut zone = testing::new_york();
        zone.tz_string = Some("EST5".to_string());
        let table = build(zone).unwrap();
        let after = table.resolve_utc(NY_STD_2024 + 1).unwrap();
        assert_eq!(after.utcoff(), EST);
        assert!(matches!(table.tzrule_after(), Some(TzRule::Fixed(tti)) if tti == after));
    }

    #[test]
    fn test_fold_from_bool() {
        assert_eq!(Fold::from(false), Fold::Earlier);
        assert_eq!(Fold::from(true).index(), 1);
        assert_eq!(Fold::default().index(), 0);
    }
}
