//! Parsing of POSIX TZ strings, as found in the footer of TZif files.
//! Note this includes extensions to the POSIX standard as part of the TZif format.
//!
//! Only the structure is parsed. The DST rules are kept as data, and are not
//! evaluated to concrete transitions.
//!
//! Resources:
//! - [POSIX TZ strings](https://pubs.opengroup.org/onlinepubs/9699919799/basedefs/V1_chap08.html)
//! - [GNU libc manual](https://www.gnu.org/software/libc/manual/html_node/TZ-Variable.html)
use crate::Offset;
use crate::common::parse::Scan;
use std::num::{NonZeroU8, NonZeroU16};

const DEFAULT_DST: Offset = 3_600;
// Offsets in TZ strings are limited to 24:59:59
const MAX_OFFSET: i32 = 24 * 3_600 + 59 * 60 + 59;

// RFC 9636: the transition time may range from -167 to 167 hours! (not just 24)
pub type TransitionTime = i32;
const DEFAULT_RULE_TIME: TransitionTime = 2 * 3_600; // 2 AM

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosixTz {
    pub std: Designation,
    pub dst: Option<Dst>,
}

/// A named offset, e.g. `CET` at +1 hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Designation {
    pub abbr: String,
    pub offset: Offset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dst {
    pub name: Designation,
    pub start: (Rule, TransitionTime),
    pub end: (Rule, TransitionTime),
}

/// A rule for the date when DST starts or ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Last occurrence of a weekday (0 is Sunday) in a month (1..=12)
    LastWeekday(u8, u8),
    /// N-th (1..=4) occurrence of a weekday (0 is Sunday) in a month (1..=12)
    NthWeekday(NonZeroU8, u8, u8),
    /// 1..=366, accounts for leap days
    DayOfYear(NonZeroU16),
    /// 1..=365, ignores leap days
    JulianDayOfYear(NonZeroU16),
}

pub fn parse(s: &[u8]) -> Option<PosixTz> {
    let mut scan = Scan::new(s);
    let std_abbr = parse_tzname(&mut scan)?;
    let std = Designation {
        abbr: std_abbr,
        offset: parse_offset(&mut scan)?,
    };

    // If there's nothing else, it's a fixed offset without DST
    if scan.is_done() {
        return Some(PosixTz { std, dst: None });
    };
    let dst_abbr = parse_tzname(&mut scan)?;

    let dst_offset = match scan.peek()? {
        // If the offset is omitted, the default is 1 hour ahead
        b',' => {
            scan.take_unchecked(1);
            std.offset + DEFAULT_DST
        }
        // Otherwise, parse the offset
        _ => {
            let offset = parse_offset(&mut scan)?;
            scan.expect(b',')?;
            offset
        }
    };

    // Expect two rules separated by a comma
    let start = parse_rule(&mut scan)?;
    scan.expect(b',')?;
    let end = parse_rule(&mut scan)?;

    // No content should remain after parsing
    scan.is_done().then_some(PosixTz {
        std,
        dst: Some(Dst {
            name: Designation {
                abbr: dst_abbr,
                offset: dst_offset,
            },
            start,
            end,
        }),
    })
}

/// Parse the TZ name, either bare (`CET`) or quoted (`<+0330>`)
fn parse_tzname(s: &mut Scan) -> Option<String> {
    let tzname = match s.peek() {
        Some(b'<') => {
            let name = s.take_until_inclusive(|c| c == b'>')?;
            &name[1..name.len() - 1]
        }
        _ => s.take_until(|c| matches!(c, b'+' | b'-' | b',' | b'0'..=b'9'))?,
    };
    (!tzname.is_empty() && tzname.is_ascii())
        .then(|| String::from_utf8_lossy(tzname).into_owned())
}

/// Parse an offset like `[+|-]h[h][:mm[:ss]]`
fn parse_offset(s: &mut Scan) -> Option<Offset> {
    parse_hms(s, MAX_OFFSET)
        // POSIX offsets are inverted from how we store them
        .map(|s| -s)
}

/// Parse `[+|-]h[hh][:mm[:ss]]` into seconds, at most `max` in magnitude
fn parse_hms(s: &mut Scan, max: i32) -> Option<i32> {
    let negative = match s.peek()? {
        b'-' | b'+' => s.next()? == b'-',
        _ => false,
    };
    // Three-digit hours are only allowed in transition times
    let hours = match max {
        m if m >= 100 * 3_600 => s.up_to_3_digits()?,
        _ => s.up_to_2_digits()?.into(),
    };
    let mut secs = i32::from(hours) * 3_600;
    for multiplier in [60, 1] {
        if s.advance_on(b':') != Some(true) {
            break;
        }
        secs += i32::from(s.digits00_59()?) * multiplier;
    }
    if secs > max {
        return None;
    }
    Some(if negative { -secs } else { secs })
}

/// Parse the `m[m].w.d` part of a rule: month, week, day of the week.
fn parse_weekday_rule(scan: &mut Scan) -> Option<Rule> {
    let month = scan.up_to_2_digits()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    scan.expect(b'.')?;
    let week = scan.digit_ranged(b'1'..=b'5')?;
    scan.expect(b'.')?;
    // Sunday is 0
    let weekday = scan.digit_ranged(b'0'..=b'6')?;

    // Week 5 means "the last one", since not every month has a fifth
    Some(match NonZeroU8::new(week) {
        Some(nth) if week < 5 => Rule::NthWeekday(nth, weekday, month),
        _ => Rule::LastWeekday(weekday, month),
    })
}

fn parse_rule(scan: &mut Scan) -> Option<(Rule, TransitionTime)> {
    let rule = match scan.peek()? {
        b'M' => {
            scan.next();
            parse_weekday_rule(scan)
        }
        b'J' => {
            scan.next();
            NonZeroU16::new(scan.up_to_3_digits()?)
                .filter(|&d| d.get() <= 365)
                .map(Rule::JulianDayOfYear)
        }
        _ => NonZeroU16::new(scan.up_to_3_digits()? + 1)
            .filter(|&d| d.get() <= 366)
            .map(Rule::DayOfYear),
    }?;

    let time = match scan.advance_on(b'/') {
        Some(true) => parse_hms(scan, 167 * 3_600)?,
        _ => DEFAULT_RULE_TIME,
    };
    Some((rule, time))
}
