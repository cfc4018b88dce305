//! Builds small ZIP archives byte by byte,
//! so tests know exactly where everything landed.

#![allow(dead_code)]

use file_inspector::{Node, Span};

pub trait Put {
    fn put_u16(&mut self, v: u16);
    fn put_u32(&mut self, v: u32);
    fn put_u64(&mut self, v: u64);
}

impl Put for Vec<u8> {
    fn put_u16(&mut self, v: u16) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u32(&mut self, v: u32) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn put_u64(&mut self, v: u64) {
        self.extend_from_slice(&v.to_le_bytes());
    }
}

/// One extra field record
pub fn extra_field(id: u16, body: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.put_u16(id);
    v.put_u16(body.len() as u16);
    v.extend_from_slice(body);
    v
}

/// An extended timestamp ("UT") extra field with the given times.
pub fn extended_timestamp(times: &[i32]) -> Vec<u8> {
    let mut body = vec![(1u8 << times.len()) - 1];
    for t in times {
        body.extend_from_slice(&t.to_le_bytes());
    }
    extra_field(0x5455, &body)
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub data: Vec<u8>,
    pub flags: u16,
    pub time: u16,
    pub date: u16,
    pub local_extra: Vec<u8>,
    pub central_extra: Vec<u8>,
    pub comment: String,
    /// Overrides the CRC written to both headers.
    pub crc32: Option<u32>,
    /// Overrides the name written to the local header.
    pub local_name: Option<String>,
}

impl Entry {
    /// A stored file
    pub fn new(name: &str, data: &[u8]) -> Self {
        Self {
            name: name.to_owned(),
            data: data.to_vec(),
            flags: 0,
            // 15:40:56
            time: 0x7D1C,
            // 2017-1-1
            date: 0x4A21,
            local_extra: Vec::new(),
            central_extra: Vec::new(),
            comment: String::new(),
            crc32: None,
            local_name: None,
        }
    }

    fn crc(&self) -> u32 {
        self.crc32.unwrap_or_else(|| crc32fast::hash(&self.data))
    }

    fn deferred(&self) -> bool {
        self.flags & (1 << 3) != 0
    }
}

#[derive(Debug, Default)]
pub struct ZipBuilder {
    pub prefix: Vec<u8>,
    pub entries: Vec<Entry>,
    pub comment: String,
    pub zip64: bool,
}

/// A built archive and where its parts ended up
#[derive(Debug)]
pub struct Built {
    pub bytes: Vec<u8>,
    pub prefix_length: usize,
    /// Offsets of each local header, relative to the start of the archive
    pub local_header_offsets: Vec<u32>,
    /// Offset of the central directory, relative to the start of the archive
    pub cd_offset: u32,
    pub cd_size: u32,
    /// Absolute position of the End of central directory record
    pub eocdr_posit: usize,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, e: Entry) -> Self {
        self.entries.push(e);
        self
    }

    pub fn build(&self) -> Built {
        let mut out = self.prefix.clone();
        let base = out.len();
        let relative = |out: &Vec<u8>| (out.len() - base) as u32;

        let mut local_header_offsets = Vec::new();
        for e in &self.entries {
            local_header_offsets.push(relative(&out));
            let local_name = e.local_name.as_deref().unwrap_or(&e.name);
            let (crc, size) = if e.deferred() {
                (0, 0)
            } else {
                (e.crc(), e.data.len() as u32)
            };
            out.put_u32(0x04034b50);
            out.put_u16(20);
            out.put_u16(e.flags);
            out.put_u16(0);
            out.put_u16(e.time);
            out.put_u16(e.date);
            out.put_u32(crc);
            out.put_u32(size);
            out.put_u32(size);
            out.put_u16(local_name.len() as u16);
            out.put_u16(e.local_extra.len() as u16);
            out.extend_from_slice(local_name.as_bytes());
            out.extend_from_slice(&e.local_extra);
            out.extend_from_slice(&e.data);
            if e.deferred() {
                out.put_u32(0x08074b50);
                out.put_u32(e.crc());
                out.put_u32(e.data.len() as u32);
                out.put_u32(e.data.len() as u32);
            }
        }

        let cd_offset = relative(&out);
        for (e, offset) in self.entries.iter().zip(&local_header_offsets) {
            out.put_u32(0x02014b50);
            out.put_u16(0x031e);
            out.put_u16(20);
            out.put_u16(e.flags);
            out.put_u16(0);
            out.put_u16(e.time);
            out.put_u16(e.date);
            out.put_u32(e.crc());
            out.put_u32(e.data.len() as u32);
            out.put_u32(e.data.len() as u32);
            out.put_u16(e.name.len() as u16);
            out.put_u16(e.central_extra.len() as u16);
            out.put_u16(e.comment.len() as u16);
            out.put_u16(0);
            out.put_u16(0);
            out.put_u32(0o100644 << 16);
            out.put_u32(*offset);
            out.extend_from_slice(e.name.as_bytes());
            out.extend_from_slice(&e.central_extra);
            out.extend_from_slice(e.comment.as_bytes());
        }
        let cd_size = relative(&out) - cd_offset;
        let entries = self.entries.len() as u16;

        if self.zip64 {
            let zip64_eocdr_offset = relative(&out);
            out.put_u32(0x06064b50);
            out.put_u64(44);
            out.put_u16(45);
            out.put_u16(45);
            out.put_u32(0);
            out.put_u32(0);
            out.put_u64(entries.into());
            out.put_u64(entries.into());
            out.put_u64(cd_size.into());
            out.put_u64(cd_offset.into());

            out.put_u32(0x07064b50);
            out.put_u32(0);
            out.put_u64(zip64_eocdr_offset.into());
            out.put_u32(1);
        }

        let eocdr_posit = out.len();
        out.put_u32(0x06054b50);
        out.put_u16(0);
        out.put_u16(0);
        if self.zip64 {
            out.put_u16(u16::MAX);
            out.put_u16(u16::MAX);
            out.put_u32(u32::MAX);
            out.put_u32(u32::MAX);
        } else {
            out.put_u16(entries);
            out.put_u16(entries);
            out.put_u32(cd_size);
            out.put_u32(cd_offset);
        }
        out.put_u16(self.comment.len() as u16);
        out.extend_from_slice(self.comment.as_bytes());

        Built {
            bytes: out,
            prefix_length: base,
            local_header_offsets,
            cd_offset,
            cd_size,
            eocdr_posit,
        }
    }
}

/// Asserts that the spans of the tree's leaves tile `[0, len)`:
/// no gaps, no overlaps. Synthetic leaves (no span) are ignored.
pub fn assert_spans_tile(tree: &Node, len: usize) {
    let mut spans: Vec<(Span, String)> = tree
        .leaves()
        .into_iter()
        .filter_map(|(path, t)| t.span.map(|s| (s, path)))
        .collect();
    spans.sort();
    let mut expected_start = 0;
    for (span, path) in spans {
        assert_eq!(
            span.start, expected_start,
            "{path} at {span} doesn't start where the last field ended"
        );
        expected_start = span.end;
    }
    assert_eq!(expected_start, len, "Leaves don't reach the end of the buffer");
}

pub fn text(node: &Node) -> &str {
    node.value()
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("{node:?} isn't text"))
}

pub fn number(node: &Node) -> u64 {
    node.value()
        .and_then(|v| v.as_u64())
        .unwrap_or_else(|| panic!("{node:?} isn't a number"))
}
