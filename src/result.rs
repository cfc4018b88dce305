//! Error types and the related `Result<T>`

use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// A read would have run past the end of the buffer.
    ///
    /// Usually the result of a truncated file,
    /// or of a length field that claims more bytes than there are.
    #[error("Read of {wanted} bytes at offset {offset} runs past the end of a {len}-byte buffer")]
    OutOfBounds {
        offset: usize,
        wanted: usize,
        len: usize,
    },

    /// The ZIP archive contained invalid data per the spec.
    #[error("Invalid Zip archive: {0}")]
    InvalidArchive(&'static str),

    /// The Zucchini patch contained invalid data.
    #[error("Invalid Zucchini patch: {0}")]
    InvalidPatch(&'static str),

    /// An offset stored in the file plus the prepended data overflowed.
    #[error("Offset arithmetic overflowed")]
    OffsetOverflow,

    /// A cast from a 64-bit int to a usize failed,
    /// probably on a 32-bit system.
    #[error("File too large for address space")]
    InsufficientAddressSpace,
}
