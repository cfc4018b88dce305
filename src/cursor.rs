//! A cursor over the input buffer that traces everything it reads.
//!
//! Each read consumes a fixed number of bytes at the current offset,
//! returns the decoded value alongside the [`Span`] it came from,
//! and moves the offset past it.
//! Reads past the end are errors, never zero-filled.
//!
//! [`Span`]: ../traced/struct.Span.html

use std::borrow::Cow;

use codepage_437::{BorrowFromCp437, CP437_CONTROL};

use crate::result::*;
use crate::traced::*;

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

macro_rules! int_reads {
    ($($t:ty, $n:literal => $le:ident, $be:ident;)+) => {
        $(
            #[doc = concat!("Reads a little-endian ", stringify!($t), ".")]
            pub fn $le(&mut self) -> DecodeResult<Traced<$t>> {
                let (bytes, span) = self.take::<$n>()?;
                Ok(Traced::new(<$t>::from_le_bytes(bytes), span))
            }

            #[doc = concat!("Reads a big-endian ", stringify!($t), ".")]
            pub fn $be(&mut self) -> DecodeResult<Traced<$t>> {
                let (bytes, span) = self.take::<$n>()?;
                Ok(Traced::new(<$t>::from_be_bytes(bytes), span))
            }
        )+
    };
}

impl<'a> Reader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes left between the offset and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// Moves the cursor to an absolute offset.
    ///
    /// Seeking past the end is fine; the next read will fail.
    pub fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Consumes `amount` bytes, returning them and where they were.
    fn bytes(&mut self, amount: usize) -> DecodeResult<(&'a [u8], Span)> {
        let out_of_bounds = DecodeError::OutOfBounds {
            offset: self.offset,
            wanted: amount,
            len: self.buffer.len(),
        };
        let end = match self.offset.checked_add(amount) {
            Some(end) if end <= self.buffer.len() => end,
            _ => return Err(out_of_bounds),
        };
        let span = Span::new(self.offset, end);
        self.offset = end;
        Ok((&self.buffer[span.start..span.end], span))
    }

    fn take<const N: usize>(&mut self) -> DecodeResult<([u8; N], Span)> {
        let (bytes, span) = self.bytes(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok((array, span))
    }

    pub fn u8(&mut self) -> DecodeResult<Traced<u8>> {
        let ([b], span) = self.take::<1>()?;
        Ok(Traced::new(b, span))
    }

    int_reads! {
        u16, 2 => u16, u16_be;
        u32, 4 => u32, u32_be;
        i32, 4 => i32, i32_be;
        u64, 8 => u64, u64_be;
    }

    /// Looks at the little-endian u32 at the cursor without consuming it.
    pub fn peek_u32(&self) -> Option<u32> {
        let end = self.offset.checked_add(4)?;
        let bytes = self.buffer.get(self.offset..end)?;
        Some(u32::from_le_bytes(bytes.try_into().ok()?))
    }

    /// Steps over `amount` bytes without interpreting them.
    pub fn skip(&mut self, amount: usize) -> DecodeResult<TracedValue> {
        let (_, span) = self.bytes(amount)?;
        Ok(Traced::new(Scalar::Text(octets(amount)), span))
    }

    /// Like [`skip()`](#method.skip), but hands back the skipped bytes too.
    pub fn raw(&mut self, amount: usize) -> DecodeResult<(&'a [u8], TracedValue)> {
        let (bytes, span) = self.bytes(amount)?;
        Ok((bytes, Traced::new(Scalar::Text(octets(amount)), span)))
    }

    /// Reads `amount` bytes of UTF-8 text.
    ///
    /// Invalid sequences are replaced with U+FFFD rather than failing the read;
    /// the inspector should still show what's there.
    pub fn utf8(&mut self, amount: usize) -> DecodeResult<TracedValue> {
        let (bytes, span) = self.bytes(amount)?;
        let text = String::from_utf8_lossy(bytes);
        Ok(Traced::new(Scalar::Text(labeled(amount, &text)), span))
    }

    /// Reads `amount` bytes of text encoded with IBM code page 437,
    /// the fallback encoding of ZIP names and comments.
    pub fn cp437(&mut self, amount: usize) -> DecodeResult<TracedValue> {
        let (bytes, span) = self.bytes(amount)?;
        let text: Cow<str> = Cow::borrow_from_cp437(bytes, &CP437_CONTROL);
        Ok(Traced::new(Scalar::Text(labeled(amount, &text)), span))
    }
}

fn octets(amount: usize) -> String {
    format!("[{amount} octets]")
}

fn labeled(amount: usize, text: &str) -> String {
    format!("[{amount} octets] {text}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_advance_the_cursor() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut r = Reader::new(&bytes);

        let a = r.u8().unwrap();
        assert_eq!(a.value, 0x01);
        assert_eq!(a.span, Some(Span::new(0, 1)));

        let b = r.u16().unwrap();
        assert_eq!(b.value, 0x0302);
        assert_eq!(b.span, Some(Span::new(1, 3)));

        let c = r.u32_be().unwrap();
        assert_eq!(c.value, 0x04050607);
        assert_eq!(c.span, Some(Span::new(3, 7)));
        assert_eq!(r.offset(), 7);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn wide_and_signed() {
        let mut bytes = vec![0xff, 0xff, 0xff, 0xff];
        bytes.extend_from_slice(&0x0102030405060708u64.to_le_bytes());
        let mut r = Reader::new(&bytes);
        assert_eq!(r.i32().unwrap().value, -1);
        assert_eq!(r.u64().unwrap().value, 0x0102030405060708);
    }

    #[test]
    fn reading_past_the_end_fails() {
        let bytes = [0u8; 3];
        let mut r = Reader::new(&bytes);
        r.u16().unwrap();
        match r.u16() {
            Err(DecodeError::OutOfBounds {
                offset: 2,
                wanted: 2,
                len: 3,
            }) => {}
            other => panic!("Expected an out-of-bounds read, got {other:?}"),
        }
        // A failed read doesn't move the cursor.
        assert_eq!(r.offset(), 2);
    }

    #[test]
    fn seek_past_end_then_read() {
        let bytes = [0u8; 4];
        let mut r = Reader::new(&bytes);
        r.seek(100);
        assert_eq!(r.remaining(), 0);
        assert!(r.u8().is_err());
        assert!(r.skip(usize::MAX).is_err());
    }

    #[test]
    fn skip_labels_octets() {
        let bytes = [0u8; 10];
        let mut r = Reader::new(&bytes);
        r.seek(2);
        let s = r.skip(5).unwrap();
        assert_eq!(s.value, Scalar::Text("[5 octets]".into()));
        assert_eq!(s.span, Some(Span::new(2, 7)));
        assert!(r.skip(4).is_err());
        let empty = r.skip(0).unwrap();
        assert_eq!(empty.span, Some(Span::new(7, 7)));
    }

    #[test]
    fn text() {
        let bytes = b"hi.txt\x80\x82";
        let mut r = Reader::new(bytes);
        let name = r.utf8(6).unwrap();
        assert_eq!(name.value, Scalar::Text("[6 octets] hi.txt".into()));
        let old = r.cp437(2).unwrap();
        assert_eq!(old.value, Scalar::Text("[2 octets] Çé".into()));
    }

    #[test]
    fn peek_does_not_consume() {
        let bytes = 0x08074b50u32.to_le_bytes();
        let r = Reader::new(&bytes);
        assert_eq!(r.peek_u32(), Some(0x08074b50));
        assert_eq!(r.offset(), 0);
        let mut r = Reader::new(&bytes[..3]);
        assert_eq!(r.peek_u32(), None);
        r.seek(usize::MAX);
        assert_eq!(r.peek_u32(), None);
    }
}
