//! Decodes the container structure of a Zucchini patch.
//!
//! Zucchini is Chromium's binary diff format. A patch is a fixed header
//! followed by a list of elements, one for each executable (or raw region)
//! that was diffed. Each element carries a handful of length-prefixed buffers;
//! we trace their sizes and spans but don't interpret their contents.
//!
//! ```text
//! { header: { magic, major_version, ... }, elements_count, elements: [...] }
//! ```

use log::*;

use crate::arch::usize;
use crate::cursor::Reader;
use crate::result::*;
use crate::traced::*;

/// Patch magic: "Zucc"
const PATCH_MAGIC: u32 = u32::from_le_bytes(*b"Zucc");

/// Executable types an element can be, keyed by their packed four-character tag
const EXE_TYPES: [&str; 9] = [
    "NoOp", "Px86", "Px64", "Ex86", "Ex64", "EA32", "EA64", "DEX ", "ZTF ",
];

/// Looks up the four-character tag of an executable type.
pub fn exe_type(tag: u32) -> String {
    EXE_TYPES
        .iter()
        .find(|t| u32::from_le_bytes(t.as_bytes().try_into().unwrap_or_default()) == tag)
        .map(|t| String::from(*t))
        .unwrap_or_else(|| format!("???? ({tag})"))
}

/// Reads a length-prefixed buffer: `{ size, content }`
fn buffer(r: &mut Reader) -> DecodeResult<Object> {
    let mut node = Object::new();
    let size = node.field("size", r.u32()?);
    node.insert("content", r.skip(usize(size)?)?);
    Ok(node)
}

fn header(r: &mut Reader) -> DecodeResult<Object> {
    let mut node = Object::new();
    let magic = r.u32()?;
    if magic.value != PATCH_MAGIC {
        warn!("Unexpected Zucchini magic {:#010x}", magic.value);
    }
    // The magic goes through the same tag table as element types,
    // where "Zucc" isn't listed.
    node.insert("magic", magic.map(exe_type));
    node.field("major_version", r.u16()?);
    node.field("minor_version", r.u16()?);
    node.field("old_size", r.u32()?);
    node.insert("old_crc", r.u32()?.map(hex(4)));
    node.field("new_size", r.u32()?);
    node.insert("new_crc", r.u32()?.map(hex(4)));
    Ok(node)
}

fn element_header(r: &mut Reader) -> DecodeResult<Object> {
    let mut node = Object::new();
    let old_offset = node.field("old_offset", r.u32()?);
    let old_length = node.field("old_length", r.u32()?);
    let new_offset = node.field("new_offset", r.u32()?);
    let new_length = node.field("new_length", r.u32()?);
    // Element ranges are 32-bit offsets into the old and new files.
    if old_offset.checked_add(old_length).is_none() {
        return Err(DecodeError::InvalidPatch("Old element range overflows"));
    }
    if new_offset.checked_add(new_length).is_none() {
        return Err(DecodeError::InvalidPatch("New element range overflows"));
    }
    node.insert("exe_type", r.u32()?.map(exe_type));
    node.field("version", r.u16()?);
    Ok(node)
}

/// Builds an object out of consecutive buffers.
fn buffers(r: &mut Reader, names: &[&'static str]) -> DecodeResult<Object> {
    let mut node = Object::new();
    for &name in names {
        node.insert(name, buffer(r)?);
    }
    Ok(node)
}

fn element(r: &mut Reader) -> DecodeResult<Object> {
    let mut node = Object::new();
    node.insert("header", element_header(r)?);
    node.insert(
        "equivalences",
        buffers(r, &["src_skip", "dst_skip", "copy_count"])?,
    );
    node.insert("extra_data", buffers(r, &["extra_data"])?);
    node.insert(
        "raw_deltas",
        buffers(r, &["raw_delta_skip", "raw_delta_diff"])?,
    );
    node.insert("reference_deltas", buffers(r, &["reference_delta"])?);

    let pool_count = node.field("pool_count", r.u32()?);
    let mut extra_targets = Vec::new();
    for _ in 0..pool_count {
        let mut pool = Object::new();
        pool.field("pool_tag", r.u8()?);
        pool.insert("extra_targets", buffer(r)?);
        extra_targets.push(Node::from(pool));
    }
    node.insert("extra_targets", extra_targets);
    Ok(node)
}

/// Decodes the given buffer as a Zucchini patch.
///
/// There's no recovery from nonsense counts or lengths:
/// they run the reader off the end of the buffer and fail the whole decode.
pub fn decode(buffer: &[u8]) -> DecodeResult<Node> {
    let mut r = Reader::new(buffer);

    let header = header(&mut r)?;
    trace!("{:?}", header);

    let mut root = Object::new();
    root.insert("header", header);
    let elements_count = root.field("elements_count", r.u32()?);

    let mut elements = Vec::new();
    for i in 0..elements_count {
        let e = element(&mut r)?;
        debug!("Element {} ends at offset {}", i, r.offset());
        elements.push(Node::from(e));
    }
    root.insert("elements", elements);

    if r.remaining() != 0 {
        debug!("{} bytes after the last element", r.remaining());
    }
    Ok(root.into())
}
