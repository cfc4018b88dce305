//! Picks a decoder for a file.

use std::fmt;
use std::path::Path;

use log::*;

use crate::result::*;
use crate::traced::Node;
use crate::{zip, zucchini};

/// The formats we know how to decode
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Format {
    Zip,
    Zucchini,
}

/// Format tags, as given by callers, and what they map to
const FORMATS: [(&str, Format); 2] = [("zip", Format::Zip), ("zucc", Format::Zucchini)];

/// File extensions commonly used for each format
const EXTENSIONS: [(&str, Format); 6] = [
    ("zip", Format::Zip),
    ("crx", Format::Zip),
    ("jar", Format::Zip),
    ("apk", Format::Zip),
    ("zucc", Format::Zucchini),
    ("puff", Format::Zucchini),
];

impl Format {
    pub fn from_tag(tag: &str) -> Option<Self> {
        FORMATS.iter().find(|(t, _)| *t == tag).map(|(_, f)| *f)
    }

    /// Guesses the format from a path's extension (case-insensitive).
    pub fn from_path_extension<P: AsRef<Path>>(path: P) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == extension)
            .map(|(_, f)| *f)
    }

    pub fn tag(self) -> &'static str {
        FORMATS
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(t, _)| *t)
            .unwrap_or_default()
    }

    pub fn decode(self, buffer: &[u8]) -> DecodeResult<Node> {
        debug!("Decoding {} bytes as {}", buffer.len(), self.tag());
        match self {
            Format::Zip => zip::decode(buffer),
            Format::Zucchini => zucchini::decode(buffer),
        }
    }
}

/// What came of trying to decode a file
#[derive(Debug, PartialEq, Eq)]
pub enum Inspection {
    /// The decoded structure
    Tree(Node),
    /// Nobody knows how to decode the given format tag.
    ///
    /// Unlike a malformed file, this isn't an error;
    /// there's just nothing to show.
    UnknownFileType(String),
}

impl Inspection {
    pub fn tree(&self) -> Option<&Node> {
        match self {
            Inspection::Tree(t) => Some(t),
            Inspection::UnknownFileType(_) => None,
        }
    }

    pub fn into_tree(self) -> Option<Node> {
        match self {
            Inspection::Tree(t) => Some(t),
            Inspection::UnknownFileType(_) => None,
        }
    }
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inspection::Tree(t) => {
                let json = t.to_json_pretty().map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Inspection::UnknownFileType(_) => f.write_str("Unknown file type"),
        }
    }
}

/// Decodes `buffer` as the format named by `tag` (`"zip"` or `"zucc"`).
///
/// An unrecognized tag isn't an error: it gives
/// [`Inspection::UnknownFileType`](enum.Inspection.html#variant.UnknownFileType).
/// A malformed file is.
pub fn decode(buffer: &[u8], tag: &str) -> DecodeResult<Inspection> {
    match Format::from_tag(tag) {
        Some(format) => format.decode(buffer).map(Inspection::Tree),
        None => {
            info!("Unknown file type {:?}", tag);
            Ok(Inspection::UnknownFileType(tag.to_owned()))
        }
    }
}
