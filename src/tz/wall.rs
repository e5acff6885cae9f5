//! Projection of UTC transitions onto the local ("wall") clock.
//!
//! Around a transition, a wall time may occur twice (a fold) or not at all
//! (a gap). Each transition is therefore projected twice: index 0 with the
//! larger of the offsets before and after it, index 1 with the smaller.
//! Looking up a wall time in array `fold` then gives the earlier (`fold=0`)
//! or later (`fold=1`) interpretation:
//!
//! ```text
//!          fold (-1h)                    gap (+1h)
//! wall:  01:00    02:00          wall:  02:00    03:00
//!          |--------|                     |--------|
//!     [1] -^        ^- [0]           [1] -^        ^- [0]
//! ```
use crate::tz::builder::BuildError;
use crate::{EpochSeconds, Offset};

/// Transition times in wall-clock seconds, for fold 0 and 1 respectively.
pub type WallTransitions = [Vec<EpochSeconds>; 2];

/// Project the UTC transition times into wall time.
///
/// The offset before the first transition is taken from ttinfo 0.
/// All indices in `trans_idx` must be valid for `utcoff`.
pub fn project_wall(
    trans_utc: &[EpochSeconds],
    trans_idx: &[usize],
    utcoff: &[Offset],
) -> Result<WallTransitions, BuildError> {
    debug_assert_eq!(trans_utc.len(), trans_idx.len());
    if trans_utc.is_empty() {
        return Ok([Vec::new(), Vec::new()]);
    }
    let mut wall0 = Vec::new();
    let mut wall1 = Vec::new();
    wall0.try_reserve_exact(trans_utc.len())?;
    wall1.try_reserve_exact(trans_utc.len())?;

    let mut offset_prev = utcoff[0];
    for (&t, &idx) in trans_utc.iter().zip(trans_idx) {
        let offset = utcoff[idx];
        let (larger, smaller) = if offset > offset_prev {
            (offset, offset_prev)
        } else {
            (offset_prev, offset)
        };
        wall0.push(shift(t, larger)?);
        wall1.push(shift(t, smaller)?);
        offset_prev = offset;
    }
    Ok([wall0, wall1])
}

fn shift(t: EpochSeconds, offset: Offset) -> Result<EpochSeconds, BuildError> {
    t.checked_add(offset.into())
        .ok_or(BuildError::OutOfRange {
            what: "transition time",
            value: t,
        })
}
