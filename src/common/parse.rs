//! A cursor over bytes, for the binary and textual zone formats.
use std::ops::RangeInclusive;

/// Consumes a byte slice from the front. All methods leave the
/// cursor untouched when they return `None`.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Scan<'a>(&'a [u8]);

impl<'a> Scan<'a> {
    pub(crate) fn new(inner: &'a [u8]) -> Self {
        Self(inner)
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.0.first().copied()
    }

    pub(crate) fn next(&mut self) -> Option<u8> {
        let (&first, rest) = self.0.split_first()?;
        self.0 = rest;
        Some(first)
    }

    /// The unconsumed input
    pub(crate) fn rest(&self) -> &'a [u8] {
        self.0
    }

    /// Panics if fewer than `n` bytes remain.
    pub(crate) fn take_unchecked(&mut self, n: usize) -> &'a [u8] {
        let (head, tail) = self.0.split_at(n);
        self.0 = tail;
        head
    }

    pub(crate) fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let (head, tail) = self.0.split_at_checked(n)?;
        self.0 = tail;
        Some(head)
    }

    /// Fixed-width fields, e.g. big-endian integers
    pub(crate) fn take_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let (head, tail) = self.0.split_first_chunk::<N>()?;
        self.0 = tail;
        Some(*head)
    }

    /// Consume `x` if it's next. `None` only at the end of input.
    pub(crate) fn advance_on(&mut self, x: u8) -> Option<bool> {
        let found = self.peek()? == x;
        if found {
            self.0 = &self.0[1..];
        }
        Some(found)
    }

    /// Consume `c`, which must be next.
    pub(crate) fn expect(&mut self, c: u8) -> Option<()> {
        self.advance_on(c)?.then_some(())
    }

    pub(crate) fn digit(&mut self) -> Option<u8> {
        self.digit_ranged(b'0'..=b'9')
    }

    /// A digit whose ASCII byte lies in the given range
    pub(crate) fn digit_ranged(&mut self, range: RangeInclusive<u8>) -> Option<u8> {
        self.transform(|c| (c.is_ascii_digit() && range.contains(&c)).then(|| c - b'0'))
    }

    /// Minutes or seconds: exactly two digits, 00-59
    pub(crate) fn digits00_59(&mut self) -> Option<u8> {
        let [tens @ b'0'..=b'5', ones @ b'0'..=b'9', ..] = *self.0 else {
            return None;
        };
        self.0 = &self.0[2..];
        Some((tens - b'0') * 10 + (ones - b'0'))
    }

    /// A number of 1 to `max_len` digits, stopping at the first non-digit
    fn up_to_n_digits(&mut self, max_len: usize) -> Option<u16> {
        let first = self.digit()?;
        let mut total = u16::from(first);
        for _ in 1..max_len {
            let Some(d) = self.digit() else { break };
            total = total * 10 + u16::from(d);
        }
        Some(total)
    }

    pub(crate) fn up_to_3_digits(&mut self) -> Option<u16> {
        self.up_to_n_digits(3)
    }

    pub(crate) fn up_to_2_digits(&mut self) -> Option<u8> {
        // at most 99, always fits
        self.up_to_n_digits(2).map(|n| n as u8)
    }

    /// Consume the next byte if `f` maps it to something.
    pub(crate) fn transform<F, T>(&mut self, f: F) -> Option<T>
    where
        F: FnOnce(u8) -> Option<T>,
    {
        let result = f(self.peek()?)?;
        self.0 = &self.0[1..];
        Some(result)
    }

    /// Consume everything before the first byte matching `f`.
    /// Nothing is consumed if no byte matches.
    pub(crate) fn take_until<F>(&mut self, f: F) -> Option<&'a [u8]>
    where
        F: FnMut(u8) -> bool,
    {
        let end = self.find(f)?;
        Some(self.take_unchecked(end))
    }

    /// Like [`take_until`](Self::take_until), including the matching byte
    pub(crate) fn take_until_inclusive<F>(&mut self, f: F) -> Option<&'a [u8]>
    where
        F: FnMut(u8) -> bool,
    {
        let end = self.find(f)?;
        Some(self.take_unchecked(end + 1))
    }

    fn find<F>(&self, mut f: F) -> Option<usize>
    where
        F: FnMut(u8) -> bool,
    {
        self.0.iter().position(|&b| f(b))
    }

    pub(crate) fn is_done(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take() {
        let mut s = Scan::new(b"TZif2");
        assert_eq!(s.take(4), Some(&b"TZif"[..]));
        assert_eq!(s.take(2), None);
        assert_eq!(s.take_array::<2>(), None);
        assert_eq!(s.take_array::<1>(), Some([b'2']));
        assert!(s.is_done());
        assert_eq!(s.next(), None);
    }

    #[test]
    fn test_digits() {
        let mut s = Scan::new(b"167:05x");
        assert_eq!(s.up_to_3_digits(), Some(167));
        assert_eq!(s.expect(b':'), Some(()));
        assert_eq!(s.digits00_59(), Some(5));
        assert_eq!(s.digit(), None);
        assert_eq!(s.expect(b':'), None);
        assert_eq!(s.next(), Some(b'x'));
        assert_eq!(s.advance_on(b'x'), None);
    }

    #[test]
    fn test_digit_limits() {
        assert_eq!(Scan::new(b"60").digits00_59(), None);
        assert_eq!(Scan::new(b"5").digits00_59(), None);
        assert_eq!(Scan::new(b"1234").up_to_2_digits(), Some(12));
        assert_eq!(Scan::new(b"7").digit_ranged(b'1'..=b'5'), None);
        assert_eq!(Scan::new(b"3").digit_ranged(b'1'..=b'5'), Some(3));
    }

    #[test]
    fn test_take_until() {
        let mut s = Scan::new(b"<+0330>-3:30");
        assert_eq!(s.take_until_inclusive(|c| c == b'>'), Some(&b"<+0330>"[..]));
        assert_eq!(s.take_until(|c| c == b'\n'), None);
        assert_eq!(s.rest(), b"-3:30");
    }
}
