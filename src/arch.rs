use crate::result::*;

/// A checked cast from u64 to usize
///
/// We could use the `cast` crate,
/// (https://docs.rs/cast/0.2.3/cast/)
/// but this is the only one we really need.
pub fn usize<I: Into<u64>>(i: I) -> DecodeResult<usize> {
    let i: u64 = i.into();
    usize::try_from(i).map_err(|_| DecodeError::InsufficientAddressSpace)
}

/// Turns an offset recorded in the file into a position in the buffer,
/// accounting for any data prepended to it.
pub fn seek_target<I: Into<u64>>(nominal: I, prefix_length: usize) -> DecodeResult<usize> {
    usize(nominal)?
        .checked_add(prefix_length)
        .ok_or(DecodeError::OffsetOverflow)
}
