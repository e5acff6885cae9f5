//! Zone fixtures shared by the tests.
use crate::tz::builder::DecodedZone;
use crate::{EpochSeconds, Offset};

pub(crate) const LMT: Offset = -17_762;
pub(crate) const EST: Offset = -5 * 3_600;
pub(crate) const EDT: Offset = -4 * 3_600;

/// 1883-11-18 17:00 UTC: railway time replaces local mean time
pub(crate) const NY_LMT_END: EpochSeconds = -2_717_650_800;
/// 2023-03-12 07:00 UTC
pub(crate) const NY_DST_2023: EpochSeconds = 1_678_604_400;
/// 2023-11-05 06:00 UTC
pub(crate) const NY_STD_2023: EpochSeconds = 1_699_164_000;
/// 2024-03-10 07:00 UTC
pub(crate) const NY_DST_2024: EpochSeconds = 1_710_054_000;
/// 2024-11-03 06:00 UTC
pub(crate) const NY_STD_2024: EpochSeconds = 1_730_613_600;

/// An abridged America/New_York
pub(crate) fn new_york() -> DecodedZone {
    DecodedZone {
        trans_idx: vec![2, 1, 2, 1, 2],
        trans_utc: vec![NY_LMT_END, NY_DST_2023, NY_STD_2023, NY_DST_2024, NY_STD_2024],
        utcoff: vec![LMT, EDT, EST],
        isdst: vec![false, true, false],
        abbr: vec!["LMT".into(), "EDT".into(), "EST".into()],
        tz_string: Some("EST5EDT,M3.2.0,M11.1.0".into()),
    }
}

/// Encode a zone as a version 2 TZif file.
/// The version 1 block is left empty, as modern readers skip it anyway.
pub(crate) fn encode_tzif(zone: &DecodedZone) -> Vec<u8> {
    let mut chars = Vec::new();
    let mut abbrind = Vec::new();
    for abbr in &zone.abbr {
        let existing = chars
            .windows(abbr.len() + 1)
            .position(|w: &[u8]| &w[..abbr.len()] == abbr.as_bytes() && w[abbr.len()] == 0);
        let pos = match existing {
            Some(pos) => pos,
            None => {
                let pos = chars.len();
                chars.extend_from_slice(abbr.as_bytes());
                chars.push(0);
                pos
            }
        };
        abbrind.push(pos as u8);
    }

    let mut out = Vec::new();
    write_header(&mut out, [0; 6]);
    write_header(
        &mut out,
        [
            0,
            0,
            0,
            zone.trans_utc.len() as u32,
            zone.utcoff.len() as u32,
            chars.len() as u32,
        ],
    );
    for t in &zone.trans_utc {
        out.extend_from_slice(&t.to_be_bytes());
    }
    out.extend(zone.trans_idx.iter().map(|&i| i as u8));
    for ((off, dst), ind) in zone.utcoff.iter().zip(&zone.isdst).zip(&abbrind) {
        out.extend_from_slice(&off.to_be_bytes());
        out.push(*dst as u8);
        out.push(*ind);
    }
    out.extend_from_slice(&chars);
    out.push(b'\n');
    out.extend_from_slice(zone.tz_string.as_deref().unwrap_or("").as_bytes());
    out.push(b'\n');
    out
}

/// isutcnt, isstdcnt, leapcnt, timecnt, typecnt, charcnt
fn write_header(out: &mut Vec<u8>, counts: [u32; 6]) {
    out.extend_from_slice(b"TZif2");
    out.extend_from_slice(&[0; 15]);
    for c in counts {
        out.extend_from_slice(&c.to_be_bytes());
    }
}
