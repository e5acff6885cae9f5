//! Decoding of time zone information files (TZif, RFC 9636).
use crate::common::parse::Scan;
use crate::tz::builder::DecodedZone;
use crate::{EpochSeconds, Offset};

#[derive(Debug, Clone, PartialEq, Eq, Copy, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid magic value")]
    MagicValue,
    #[error("Invalid header")]
    Version,
    #[error("Invalid or corrupted data")]
    Body,
    #[error("Abbreviation index {0} out of range")]
    Abbreviation(u8),
    #[error("Invalid POSIX TZ string")]
    TzString,
}

type DecodeResult<T> = Result<T, DecodeError>;

/// Decode the raw content of a TZif file.
/// The result is not validated further: that's up to the builder.
pub fn decode(s: &[u8]) -> DecodeResult<DecodedZone> {
    let mut scan = Scan::new(s);
    let header = parse_header(&mut scan)?;
    if header.version == 1 {
        return parse_content::<4>(header, &mut scan, false);
    }
    // Version 2+ starts with a version 1 header and data, which we skip
    scan.take(header.v1_block_len()).ok_or(DecodeError::Body)?;
    // This "second" header is not the same as the first one
    let header = parse_header(&mut scan)?;
    parse_content::<8>(header, &mut scan, true)
}

/// Quick check whether the data looks like a TZif file
pub fn is_tzif(s: &[u8]) -> bool {
    s.starts_with(b"TZif")
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
struct Header {
    version: u8,
    isutcnt: usize,
    isstdcnt: usize,
    leapcnt: usize,
    timecnt: usize,
    typecnt: usize,
    charcnt: usize,
}

impl Header {
    fn v1_block_len(&self) -> usize {
        self.timecnt * 5
            + self.typecnt * 6
            + self.charcnt
            + self.leapcnt * 8
            + self.isstdcnt
            + self.isutcnt
    }
}

fn check_magic_bytes(s: &mut Scan) -> bool {
    s.take(4) == Some(b"TZif")
}

fn parse_version(s: &mut Scan) -> Option<u8> {
    let version = match s.next()? {
        0 => 1,
        n @ b'2'..=b'9' => n - b'0',
        _ => None?,
    };
    s.take(15)?;
    Some(version)
}

fn parse_count(s: &mut Scan) -> DecodeResult<usize> {
    let n = u32::from_be_bytes(s.take_array().ok_or(DecodeError::Body)?);
    usize::try_from(n).map_err(|_| DecodeError::Body)
}

fn parse_header(s: &mut Scan) -> DecodeResult<Header> {
    if !check_magic_bytes(s) {
        return Err(DecodeError::MagicValue);
    }
    let version = parse_version(s).ok_or(DecodeError::Version)?;
    Ok(Header {
        version,
        isutcnt: parse_count(s)?,
        isstdcnt: parse_count(s)?,
        leapcnt: parse_count(s)?,
        timecnt: parse_count(s)?,
        typecnt: parse_count(s)?,
        charcnt: parse_count(s)?,
    })
}

/// Parse the data block, with transition times of `TIME_SIZE` bytes.
fn parse_content<const TIME_SIZE: usize>(
    header: Header,
    s: &mut Scan,
    has_footer: bool,
) -> DecodeResult<DecodedZone> {
    // Check the size up front, so a corrupt header can't trigger huge allocations
    let data_len = header.timecnt * (TIME_SIZE + 1) + header.typecnt * 6 + header.charcnt;
    if s.rest().len() < data_len {
        return Err(DecodeError::Body);
    }
    // NOTE: we assume the values are sorted
    let trans_utc = (0..header.timecnt)
        .map(|_| parse_time::<TIME_SIZE>(s))
        .collect::<DecodeResult<Vec<_>>>()?;
    let trans_idx = s
        .take(header.timecnt)
        .ok_or(DecodeError::Body)?
        .iter()
        .map(|&i| usize::from(i))
        .collect();

    let mut utcoff = Vec::with_capacity(header.typecnt);
    let mut isdst = Vec::with_capacity(header.typecnt);
    let mut abbrind = Vec::with_capacity(header.typecnt);
    for _ in 0..header.typecnt {
        let [a, b, c, d, dst, ind] = s.take_array().ok_or(DecodeError::Body)?;
        utcoff.push(Offset::from_be_bytes([a, b, c, d]));
        isdst.push(dst != 0);
        abbrind.push(ind);
    }
    let chars = s.take(header.charcnt).ok_or(DecodeError::Body)?;
    let abbr = abbrind
        .into_iter()
        .map(|i| abbreviation(chars, i))
        .collect::<DecodeResult<_>>()?;

    // Skip leap seconds and the standard/wall and UT/local indicators
    s.take(header.leapcnt * (TIME_SIZE + 4) + header.isstdcnt + header.isutcnt)
        .ok_or(DecodeError::Body)?;

    let tz_string = if has_footer {
        parse_footer(s)?
    } else {
        None
    };
    Ok(DecodedZone {
        trans_idx,
        trans_utc,
        utcoff,
        isdst,
        abbr,
        tz_string,
    })
}

fn parse_time<const TIME_SIZE: usize>(s: &mut Scan) -> DecodeResult<EpochSeconds> {
    let bytes = s.take(TIME_SIZE).ok_or(DecodeError::Body)?;
    Ok(match TIME_SIZE {
        4 => i32::from_be_bytes(bytes.try_into().map_err(|_| DecodeError::Body)?).into(),
        _ => EpochSeconds::from_be_bytes(bytes.try_into().map_err(|_| DecodeError::Body)?),
    })
}

/// Abbreviations are NUL-terminated, indexed by byte position
/// in the designation block. They may overlap (e.g. "EST" inside "AEST").
fn abbreviation(chars: &[u8], index: u8) -> DecodeResult<String> {
    let tail = chars
        .get(usize::from(index)..)
        .ok_or(DecodeError::Abbreviation(index))?;
    let name = Scan::new(tail)
        .take_until(|b| b == 0)
        .ok_or(DecodeError::Abbreviation(index))?;
    String::from_utf8(name.to_vec()).map_err(|_| DecodeError::Abbreviation(index))
}

/// The footer is a POSIX TZ string enclosed in newlines.
/// An empty string means there is no rule.
fn parse_footer(s: &mut Scan) -> DecodeResult<Option<String>> {
    s.expect(b'\n').ok_or(DecodeError::TzString)?;
    let tz_str = s.take_until(|b| b == b'\n').ok_or(DecodeError::TzString)?;
    if tz_str.is_empty() {
        return Ok(None);
    }
    std::str::from_utf8(tz_str)
        .map(|s| Some(s.to_string()))
        .map_err(|_| DecodeError::TzString)
}
