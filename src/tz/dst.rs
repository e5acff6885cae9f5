//! Inference of DST amounts.
//!
//! TZif files record, for each local time type, the total UTC offset and
//! whether it is DST, but not *how much* of the offset is DST. We infer it
//! by comparing each DST type to a neighbouring standard-time type in the
//! transition sequence. Countries occasionally shift their base offset and
//! DST at once, so this is a heuristic that can be wrong for some zones.
use crate::Offset;
use tracing::warn;

/// Assumed DST amount when no standard-time neighbour can be found.
pub const DEFAULT_DST: Offset = 3_600;

/// Compute the DST amount for each ttinfo.
///
/// `trans_idx` maps each transition to its ttinfo; `utcoff` and `isdst`
/// are indexed by ttinfo. All indices must be valid.
/// Offsets are expected within one day (`|offset| < 86400`);
/// differences between out-of-range offsets saturate.
/// Non-DST ttinfos always get 0; DST ttinfos always get a non-zero amount.
pub fn infer_dst_offsets(trans_idx: &[usize], utcoff: &[Offset], isdst: &[bool]) -> Vec<Offset> {
    debug_assert_eq!(utcoff.len(), isdst.len());
    debug_assert!(trans_idx.iter().all(|&i| i < isdst.len()));
    let mut found = scan_neighbours(trans_idx, utcoff, isdst);
    fill_unresolved(&mut found, isdst);
    found.into_iter().map(|d| d.unwrap_or(0)).collect()
}

/// First pass: walk the transitions in order and resolve each DST ttinfo
/// from its neighbours at the first transition where that is possible.
/// Later occurrences of a resolved ttinfo are not reconsidered.
fn scan_neighbours(trans_idx: &[usize], utcoff: &[Offset], isdst: &[bool]) -> Vec<Option<Offset>> {
    let mut dstoff = vec![None; isdst.len()];
    let dst_count = isdst.iter().filter(|&&d| d).count();
    let mut dst_found = 0;

    for i in 1..trans_idx.len() {
        if dst_found == dst_count {
            break;
        }
        let idx = trans_idx[i];
        if !isdst[idx] || dstoff[idx].is_some() {
            continue;
        }
        let utcoff_dst = utcoff[idx];

        // Preferably compare to the period we transitioned from
        let prev = trans_idx[i - 1];
        let mut delta = if isdst[prev] {
            0
        } else {
            utcoff_dst.saturating_sub(utcoff[prev])
        };

        // Otherwise, compare to the period we transition into next.
        if delta == 0 {
            if let Some(&next) = trans_idx.get(i + 1) {
                if isdst[next] {
                    // No baseline here. Hope for a later occurrence.
                    continue;
                }
                delta = utcoff_dst.saturating_sub(utcoff[next]);
            }
        }

        if delta != 0 {
            dst_found += 1;
            dstoff[idx] = Some(delta);
        }
    }
    dstoff
}

/// Second pass: a DST flag must correspond to a non-zero DST amount.
/// One hour is a much better guess than zero.
fn fill_unresolved(dstoff: &mut [Option<Offset>], isdst: &[bool]) {
    for (idx, (d, &is_dst)) in dstoff.iter_mut().zip(isdst).enumerate() {
        if is_dst && d.is_none() {
            warn!(ttinfo = idx, "could not infer DST amount, assuming one hour");
            *d = Some(DEFAULT_DST);
        }
    }
}
