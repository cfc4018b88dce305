//! file_inspector decodes the structure of binary container formats
//! (ZIP archives and Zucchini patches) into a tree of values,
//! each of which remembers the exact bytes it was read from:
//!
//! ```no_run
//! # use std::fs;
//! # use file_inspector::*;
//! let bytes = fs::read("foo.zip")?;
//! match decode(&bytes, "zip")? {
//!     Inspection::Tree(tree) => {
//!         // The tree serializes to plain JSON...
//!         println!("{}", tree.to_json_pretty()?);
//!         // ...and every leaf knows where it came from.
//!         for (path, value) in tree.leaves() {
//!             if let Some(span) = value.span {
//!                 println!("{span} {path} = {}", value.value);
//!             }
//!         }
//!     }
//!     unknown => println!("{unknown}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Nothing is decompressed or otherwise interpreted past the container:
//! file contents and patch payloads show up as opaque `[N octets]` spans.
//!
//! Decoding is synchronous and only borrows the input,
//! so independent buffers can be decoded from as many threads as you like.
//! Memory-map larger files!

pub mod cursor;
pub mod format;
pub mod result;
pub mod spec;
pub mod traced;
pub mod zip;
pub mod zucchini;

pub use format::{decode, Format, Inspection};
pub use result::{DecodeError, DecodeResult};
pub use traced::{Node, Scalar, Span, Traced, TracedValue};

mod arch;
