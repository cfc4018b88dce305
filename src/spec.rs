//! Code specific to the ZIP file format specification.
//!
//! We try to keep the nitty gritty of each record's layout here,
//! and the business of finding those records in the [`zip`] module.
//!
//! Most comments quote the ZIP spec, [`APPNOTE.TXT`].
//!
//! [_Zip Files: History, Explanation and Implementation_]
//! is also a fantastic resource and a great read.
//!
//! [`zip`]: ../zip/index.html
//! [`APPNOTE.TXT`]: https://pkware.cachefly.net/webdocs/APPNOTE/APPNOTE-6.3.6.TXT
//! [_Zip Files: History, Explanation and Implementation_]: https://www.hanshq.net/zip.html

use chrono::{DateTime, SecondsFormat};
use log::*;

use crate::arch::usize;
use crate::cursor::Reader;
use crate::result::*;
use crate::traced::*;

// Magic numbers denoting various sections of a ZIP archive

/// Local file header magic number
pub const LOCAL_FILE_HEADER_MAGIC: [u8; 4] = [b'P', b'K', 3, 4];
/// Archive extra data record magic number
pub const ARCHIVE_EXTRA_DATA_MAGIC: [u8; 4] = [b'P', b'K', 6, 8];
/// Central directory magic number
pub const CENTRAL_DIRECTORY_MAGIC: [u8; 4] = [b'P', b'K', 1, 2];
/// Zip64 end of central directory magic number
pub const ZIP64_EOCDR_MAGIC: [u8; 4] = [b'P', b'K', 6, 6];
/// Zip64 end of central directory locator magic number
pub const ZIP64_EOCDR_LOCATOR_MAGIC: [u8; 4] = [b'P', b'K', 6, 7];
/// End of central directory magic number
pub const EOCDR_MAGIC: [u8; 4] = [b'P', b'K', 5, 6];
/// Data descriptor magic number (optional, but nearly everyone writes it)
pub const DATA_DESCRIPTOR_MAGIC: [u8; 4] = [b'P', b'K', 7, 8];

/// Extra field header ID of the Zip64 extended information field
const ZIP64_EXTRA_FIELD: u16 = 0x0001;
/// Extra field header ID of Info-ZIP's extended timestamp field ("UT")
const EXTENDED_TIMESTAMP_FIELD: u16 = 0x5455;

const fn magic(m: [u8; 4]) -> u32 {
    u32::from_le_bytes(m)
}

/// Extracts the "is this text UTF-8?" bit from the 16-bit flags field.
///
/// If false, text is assumed to be CP437.
fn is_utf8(flags: u16) -> bool {
    // Bit 11: Language encoding flag (EFS).  If this bit is set,
    //         the filename and comment fields for this file
    //         MUST be encoded using UTF-8. (see APPENDIX D)
    flags & (1 << 11) != 0
}

/// Extracts the "sizes and CRC come after the data" bit from the flags field.
fn has_data_descriptor(flags: u16) -> bool {
    // Bit 3: If this bit is set, the fields crc-32, compressed
    //        size and uncompressed size are set to zero in the
    //        local header.  The correct values are put in the
    //        data descriptor immediately following the compressed
    //        data.
    flags & (1 << 3) != 0
}

fn text(r: &mut Reader, length: u16, flags: u16) -> DecodeResult<TracedValue> {
    if is_utf8(flags) {
        r.utf8(length.into())
    } else {
        r.cp437(length.into())
    }
}

/// Renders an MS-DOS time as `H:M:S`.
pub fn msdos_time(time: u16) -> String {
    let seconds = (0b0000_0000_0001_1111 & time) as u32 * 2; // MSDOS uses 2-second precision
    let minutes = (0b0000_0111_1110_0000 & time) as u32 >> 5;
    let hours = (0b1111_1000_0000_0000 & time) as u32 >> 11;
    format!("{hours}:{minutes}:{seconds}")
}

/// Renders an MS-DOS date as `Y-M-D`.
pub fn msdos_date(date: u16) -> String {
    let days = (0b0000_0000_0001_1111 & date) as u32;
    let months = (0b0000_0001_1110_0000 & date) as u32 >> 5;
    // MSDOS uses years since 1980; Always interpreted as a positive value
    let years = ((0b1111_1110_0000_0000 & date) >> 9) as u32 + 1980;
    format!("{years}-{months}-{days}")
}

/// Renders seconds since the Unix epoch as an ISO 8601 UTC timestamp.
pub fn unix_time(seconds: i32) -> String {
    DateTime::from_timestamp(seconds.into(), 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| seconds.to_string())
}

/// Data from the End of central directory record
///
/// Found at the back of the ZIP archive and provides offsets for finding
/// its central directory, along with lots of stuff that stopped being relevant
/// when we stopped breaking ZIP archives onto multiple floppies.
#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_central_directory: u16,
    pub entries_on_this_disk: u16,
    pub entries: u16,
    pub central_directory_offset: u32,
    pub node: Object,
}

impl EndOfCentralDirectory {
    pub fn parse(r: &mut Reader) -> DecodeResult<Self> {
        // 4.3.16  End of central directory record:
        //
        // end of central dir signature    4 bytes  (0x06054b50)
        // number of this disk             2 bytes
        // number of the disk with the
        // start of the central directory  2 bytes
        // total number of entries in
        // the central dir on this disk    2 bytes
        // total number of entries in
        // the central dir                 2 bytes
        // size of the central directory   4 bytes
        // offset of start of central
        // directory with respect to
        // the starting disk number        4 bytes
        // zipfile comment length          2 bytes
        // .ZIP file comment       (variable size)

        // Don't check the magic; the search found it.
        let mut node = Object::new();
        node.insert("signature", r.u32()?.map(hex(4)));
        let disk_number = node.field("disk_number", r.u16()?);
        let disk_with_central_directory = node.field("cd_start_disk", r.u16()?);
        let entries_on_this_disk = node.field("disk_entries", r.u16()?);
        let entries = node.field("total_entries", r.u16()?);
        node.field("cd_size", r.u32()?);
        let central_directory_offset = node.field("cd_start_offset", r.u32()?);
        let comment_length = node.field("comment_length", r.u16()?);
        node.insert("comment", r.utf8(comment_length.into())?);

        Ok(Self {
            disk_number,
            disk_with_central_directory,
            entries_on_this_disk,
            entries,
            central_directory_offset,
            node,
        })
    }
}

/// Data from the Zip64 end of central directory locator
///
/// This should immediately precede the End of central directory record
/// on Zip64 files and tell us where to find the Zip64 end of central directory record.
#[derive(Debug)]
pub struct Zip64EndOfCentralDirectoryLocator {
    pub disk_with_central_directory: u32,
    pub zip64_eocdr_offset: u64,
    pub disks: u32,
    pub node: Object,
}

impl Zip64EndOfCentralDirectoryLocator {
    /// Returns true if the reader is sitting on a locator.
    pub fn is_at(r: &Reader) -> bool {
        r.peek_u32() == Some(magic(ZIP64_EOCDR_LOCATOR_MAGIC))
    }

    pub fn parse(r: &mut Reader) -> DecodeResult<Self> {
        // 4.3.15 Zip64 end of central directory locator
        //
        // zip64 end of central dir locator
        // signature                       4 bytes  (0x07064b50)
        // number of the disk with the
        // start of the zip64 end of
        // central directory               4 bytes
        // relative offset of the zip64
        // end of central directory record 8 bytes
        // total number of disks           4 bytes
        let mut node = Object::new();
        node.insert("signature", r.u32()?.map(hex(4)));
        let disk_with_central_directory = node.field("eocdr_disk", r.u32()?);
        let zip64_eocdr_offset = node.field("eocdr_offset", r.u64()?);
        let disks = node.field("total_disks", r.u32()?);

        Ok(Self {
            disk_with_central_directory,
            zip64_eocdr_offset,
            disks,
            node,
        })
    }

    pub fn size_in_file() -> usize {
        20
    }
}

/// Data from the Zip64 end of central directory record
///
/// Wherever the locator says it is, this replaces the 16- and 32-bit counts
/// and offsets of the End of central directory record with 64-bit ones.
#[derive(Debug)]
pub struct Zip64EndOfCentralDirectory {
    pub disk_number: u32,
    pub disk_with_central_directory: u32,
    pub entries_on_this_disk: u64,
    pub entries: u64,
    pub central_directory_offset: u64,
    pub node: Object,
}

impl Zip64EndOfCentralDirectory {
    pub fn parse(r: &mut Reader) -> DecodeResult<Self> {
        // 4.3.14  Zip64 end of central directory record
        //
        // zip64 end of central dir
        // signature                       4 bytes  (0x06064b50)
        // size of zip64 end of central
        // directory record                8 bytes
        // version made by                 2 bytes
        // version needed to extract       2 bytes
        // number of this disk             4 bytes
        // number of the disk with the
        // start of the central directory  4 bytes
        // total number of entries in the
        // central directory on this disk  8 bytes
        // total number of entries in the
        // central directory               8 bytes
        // size of the central directory   8 bytes
        // offset of start of central
        // directory with respect to
        // the starting disk number        8 bytes
        // zip64 extensible data sector    (variable size)
        let signature = r.u32()?;
        if signature.value != magic(ZIP64_EOCDR_MAGIC) {
            return Err(DecodeError::InvalidArchive(
                "Couldn't find zip64 End Of Central Directory Record",
            ));
        }
        let mut node = Object::new();
        node.insert("signature", signature.map(hex(4)));
        let eocdr_size = node.field("record_size", r.u64()?);
        node.field("version_made_by", r.u16()?);
        node.field("version_needed", r.u16()?);
        let disk_number = node.field("disk_number", r.u32()?);
        let disk_with_central_directory = node.field("cd_start_disk", r.u32()?);
        let entries_on_this_disk = node.field("disk_entries", r.u64()?);
        let entries = node.field("total_entries", r.u64()?);
        node.field("cd_size", r.u64()?);
        let central_directory_offset = node.field("cd_start_offset", r.u64()?);

        // 4.3.14.1 The value stored into the "size of zip64 end of central
        // directory record" SHOULD be the size of the remaining
        // record and SHOULD NOT include the leading 12 bytes.
        //
        // Size = SizeOfFixedFields + SizeOfVariableData - 12.
        // (SizeOfVariableData = Size - SizeOfFixedFields + 12)
        let extensible_data_length = usize(eocdr_size)?
            .checked_add(12)
            .and_then(|s| s.checked_sub(Self::fixed_size_in_file()))
            .ok_or(DecodeError::InvalidArchive(
                "Invalid extensible data length in Zip64 End Of Central Directory Record",
            ))?;
        node.insert("extensible_data", r.skip(extensible_data_length)?);

        Ok(Self {
            disk_number,
            disk_with_central_directory,
            entries_on_this_disk,
            entries,
            central_directory_offset,
            node,
        })
    }

    fn fixed_size_in_file() -> usize {
        56
    }
}

/// Which 32-bit (or 16-bit) header fields were saturated,
/// and so should be found in the Zip64 extended information extra field.
#[derive(Debug, Clone, Copy, Default)]
struct Saturated {
    uncompressed_size: bool,
    compressed_size: bool,
    header_offset: bool,
    disk_number: bool,
}

impl Saturated {
    fn expected_length(&self) -> usize {
        [
            (self.uncompressed_size, 8),
            (self.compressed_size, 8),
            (self.header_offset, 8),
            (self.disk_number, 4),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, len)| len)
        .sum()
    }
}

/// Values pulled out of a Zip64 extended information extra field
#[derive(Debug, Clone, Copy, Default)]
struct Zip64Info {
    uncompressed_size: Option<u64>,
    compressed_size: Option<u64>,
    header_offset: Option<u64>,
}

impl Zip64Info {
    fn is_present(&self) -> bool {
        self.uncompressed_size.is_some()
            || self.compressed_size.is_some()
            || self.header_offset.is_some()
    }
}

/// Parses the "extra fields" found in central directory entries
/// and local file headers, consuming exactly `length` bytes.
fn parse_extra_fields(
    r: &mut Reader,
    length: u16,
    saturated: Saturated,
) -> DecodeResult<(Vec<Node>, Zip64Info)> {
    // 4.5.1 In order to allow different programs and different types
    // of information to be stored in the 'extra' field in .ZIP
    // files, the following structure MUST be used for all
    // programs storing data in this field:
    //
    //     header1+data1 + header2+data2 . . .
    //
    // Each header MUST consist of:
    //
    //     Header ID - 2 bytes
    //     Data Size - 2 bytes
    let end = r
        .offset()
        .checked_add(length.into())
        .ok_or(DecodeError::OffsetOverflow)?;
    let mut fields = Vec::new();
    let mut zip64 = Zip64Info::default();

    while r.offset() < end {
        let left = end - r.offset();
        if left < 4 {
            // zipalign and friends pad the extra field out to some alignment.
            warn!("{} bytes of padding at the end of an extra field", left);
            let mut padding = Object::new();
            padding.insert("padding", r.skip(left)?);
            fields.push(padding.into());
            break;
        }

        let mut field = Object::new();
        let header_id = r.u16()?;
        let kind = header_id.value;
        field.insert("header_id", header_id.map(hex(2)));
        let size = field.field("size", r.u16()?);
        if usize::from(size) > end - r.offset() {
            return Err(DecodeError::InvalidArchive(
                "Extra field record overruns its extra field",
            ));
        }

        match (kind, size) {
            // 4.5.3 -Zip64 Extended Information Extra Field (0x0001):
            //
            // Original
            // Size       8 bytes    Original uncompressed file size
            // Compressed
            // Size       8 bytes    Size of compressed data
            // Relative Header
            // Offset     8 bytes    Offset of local header record
            // Disk Start
            // Number     4 bytes    Number of the disk on which
            //                       this file starts
            //
            // The order of the fields in the zip64 extended
            // information record is fixed, but the fields MUST
            // only appear if the corresponding Local or Central
            // directory record field is set to 0xFFFF or 0xFFFFFFFF.
            (ZIP64_EXTRA_FIELD, s)
                if s != 0 && usize::from(s) == saturated.expected_length() =>
            {
                if saturated.uncompressed_size {
                    zip64.uncompressed_size =
                        Some(field.field("uncompressed_size", r.u64()?));
                }
                if saturated.compressed_size {
                    zip64.compressed_size = Some(field.field("compressed_size", r.u64()?));
                }
                if saturated.header_offset {
                    zip64.header_offset =
                        Some(field.field("relative_offset_of_local_header", r.u64()?));
                }
                if saturated.disk_number {
                    field.field("disk_number_start", r.u32()?);
                }
            }
            // Info-ZIP's extended timestamp, where the flags byte
            // is followed by signed 32-bit Unix times.
            (EXTENDED_TIMESTAMP_FIELD, 5) | (EXTENDED_TIMESTAMP_FIELD, 13) => {
                field.field("flags", r.u8()?);
                field.insert("modification_time", r.i32()?.map(unix_time));
                if size == 13 {
                    field.insert("access_time", r.i32()?.map(unix_time));
                    field.insert("creation_time", r.i32()?.map(unix_time));
                }
            }
            _ => {
                field.insert("content", r.skip(size.into())?);
            }
        }
        trace!("Extra field {:?}", field);
        fields.push(field.into());
    }

    Ok((fields, zip64))
}

/// Data from a central directory entry
///
/// Each of these records contains information about a file or folder
/// stored in the ZIP archive.
/// Sizes and the header offset are resolved from the Zip64 extra field
/// when their 32-bit fields are saturated.
#[derive(Debug)]
pub struct CentralDirectoryEntry {
    pub flags: u16,
    pub compression_method: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub header_offset: u64,
    pub file_name: Scalar,
    pub node: Object,
}

impl CentralDirectoryEntry {
    pub fn parse(r: &mut Reader) -> DecodeResult<Self> {
        // 4.3.12  Central directory structure:
        //
        // [central directory header 1]
        // .
        // .
        // .
        // [central directory header n]
        // [digital signature]
        //
        // File header:
        //
        //   central file header signature   4 bytes  (0x02014b50)
        //   version made by                 2 bytes
        //   version needed to extract       2 bytes
        //   general purpose bit flag        2 bytes
        //   compression method              2 bytes
        //   last mod file time              2 bytes
        //   last mod file date              2 bytes
        //   crc-32                          4 bytes
        //   compressed size                 4 bytes
        //   uncompressed size               4 bytes
        //   file name length                2 bytes
        //   extra field length              2 bytes
        //   file comment length             2 bytes
        //   disk number start               2 bytes
        //   internal file attributes        2 bytes
        //   external file attributes        4 bytes
        //   relative offset of local header 4 bytes
        //
        //   file name (variable size)
        //   extra field (variable size)
        //   file comment (variable size)
        let signature = r.u32()?;
        if signature.value != magic(CENTRAL_DIRECTORY_MAGIC) {
            return Err(DecodeError::InvalidArchive("Invalid central directory entry"));
        }
        let mut node = Object::new();
        node.insert("signature", signature.map(hex(4)));
        node.field("version_made_by", r.u16()?);
        node.field("version_needed", r.u16()?);
        let flags = r.u16()?;
        let raw_flags = flags.value;
        node.insert("general_purpose_flag", flags.map(hex(2)));
        let compression_method = node.field("compression_method", r.u16()?);
        node.insert("last_mod_file_time", r.u16()?.map(msdos_time));
        node.insert("last_mod_file_date", r.u16()?.map(msdos_date));
        let crc32 = r.u32()?;
        let raw_crc32 = crc32.value;
        node.insert("crc32", crc32.map(hex(4)));
        let compressed_size = node.field("compressed_size", r.u32()?);
        let uncompressed_size = node.field("uncompressed_size", r.u32()?);
        let file_name_length = node.field("file_name_length", r.u16()?);
        let extra_field_length = node.field("extra_field_length", r.u16()?);
        let file_comment_length = node.field("file_comment_length", r.u16()?);
        let disk_number = node.field("disk_number_start", r.u16()?);
        node.field("internal_file_attributes", r.u16()?);
        node.field("external_file_attributes", r.u32()?);
        let header_offset = node.field("relative_offset_of_local_header", r.u32()?);

        let file_name = text(r, file_name_length, raw_flags)?;
        let name = file_name.value.clone();
        node.insert("file_name", file_name);

        let saturated = Saturated {
            uncompressed_size: uncompressed_size == u32::MAX,
            compressed_size: compressed_size == u32::MAX,
            header_offset: header_offset == u32::MAX,
            disk_number: disk_number == u16::MAX,
        };
        let (extra_fields, zip64) = parse_extra_fields(r, extra_field_length, saturated)?;
        node.insert("extra_fields", extra_fields);
        node.insert("file_comment", text(r, file_comment_length, raw_flags)?);

        if disk_number != 0 && disk_number != u16::MAX {
            warn!(
                "No support for multi-disk archives: file {} claims to be on disk {}",
                name, disk_number
            );
        }

        Ok(Self {
            flags: raw_flags,
            compression_method,
            crc32: raw_crc32,
            compressed_size: zip64.compressed_size.unwrap_or(compressed_size.into()),
            uncompressed_size: zip64.uncompressed_size.unwrap_or(uncompressed_size.into()),
            header_offset: zip64.header_offset.unwrap_or(header_offset.into()),
            file_name: name,
            node,
        })
    }
}

/// Data from a local file header, along with the file contents it precedes
///
/// Each files' actual contents is preceded by this header.
/// These headers allow for "streaming" decompression without
/// the use of the central directory,
/// so we note where they disagree with it.
pub struct LocalFileHeader;

impl LocalFileHeader {
    /// Parses the local file header the reader is sitting on,
    /// along with the (still compressed) contents and data descriptor that follow.
    ///
    /// `central` is the central directory entry that pointed us here;
    /// it provides sizes the local header might defer to the data descriptor.
    pub fn parse(r: &mut Reader, central: &CentralDirectoryEntry) -> DecodeResult<Object> {
        // 4.3.7  Local file header:
        //
        // local file header signature     4 bytes  (0x04034b50)
        // version needed to extract       2 bytes
        // general purpose bit flag        2 bytes
        // compression method              2 bytes
        // last mod file time              2 bytes
        // last mod file date              2 bytes
        // crc-32                          4 bytes
        // compressed size                 4 bytes
        // uncompressed size               4 bytes
        // file name length                2 bytes
        // extra field length              2 bytes
        //
        // file name (variable size)
        // extra field (variable size)
        let signature = r.u32()?;
        if signature.value != magic(LOCAL_FILE_HEADER_MAGIC) {
            return Err(DecodeError::InvalidArchive("Invalid local file header"));
        }
        let mut node = Object::new();
        node.insert("signature", signature.map(hex(4)));
        node.field("version_needed", r.u16()?);
        let flags = r.u16()?;
        let raw_flags = flags.value;
        node.insert("general_purpose_flag", flags.map(hex(2)));
        let compression_method = node.field("compression_method", r.u16()?);
        node.insert("last_mod_file_time", r.u16()?.map(msdos_time));
        node.insert("last_mod_file_date", r.u16()?.map(msdos_date));
        let crc32 = r.u32()?;
        let raw_crc32 = crc32.value;
        node.insert("crc32", crc32.map(hex(4)));
        let compressed_size = node.field("compressed_size", r.u32()?);
        let uncompressed_size = node.field("uncompressed_size", r.u32()?);
        let file_name_length = node.field("file_name_length", r.u16()?);
        let extra_field_length = node.field("extra_field_length", r.u16()?);

        let file_name = text(r, file_name_length, raw_flags)?;
        let name = file_name.value.clone();
        node.insert("file_name", file_name);

        // 4.5.3: ...If one of the size or
        // offset fields in the Local or Central directory
        // record is too small to hold the required data,
        // a Zip64 extended information record is created.
        // ... When extracting, if the zip64 extended information
        // extra field is present for the file the compressed
        // and uncompressed sizes will be 8 byte values.
        let zip64_sizes = compressed_size == u32::MAX || uncompressed_size == u32::MAX;
        let saturated = Saturated {
            uncompressed_size: zip64_sizes,
            compressed_size: zip64_sizes,
            ..Default::default()
        };
        let (extra_fields, zip64) = parse_extra_fields(r, extra_field_length, saturated)?;
        node.insert("extra_fields", extra_fields);

        let deferred = has_data_descriptor(raw_flags);
        let content_length = if deferred {
            central.compressed_size
        } else {
            zip64.compressed_size.unwrap_or(compressed_size.into())
        };

        // A disagreement is noted in the tree, not raised as an error.
        let local_header_check = if cfg!(feature = "check-local-metadata") {
            let mut mismatches = Vec::new();
            if name != central.file_name {
                mismatches.push("file_name");
            }
            if compression_method != central.compression_method {
                mismatches.push("compression_method");
            }
            if !deferred {
                if raw_crc32 != central.crc32 {
                    mismatches.push("crc32");
                }
                if content_length != central.compressed_size {
                    mismatches.push("compressed_size");
                }
                if zip64.uncompressed_size.unwrap_or(uncompressed_size.into())
                    != central.uncompressed_size
                {
                    mismatches.push("uncompressed_size");
                }
            }
            if !mismatches.is_empty() {
                warn!(
                    "Local header of {} disagrees with the central directory: {}",
                    central.file_name,
                    mismatches.join(", ")
                );
            }
            Some(local_check(&mismatches))
        } else {
            None
        };

        if compression_method == 0 {
            // Stored files are cheap to check; we have all the bytes right here.
            let (contents, skipped) = r.raw(usize(content_length)?)?;
            node.insert("content", skipped);
            let expected = if deferred { central.crc32 } else { raw_crc32 };
            let actual = crc32fast::hash(contents);
            let check = if actual == expected {
                String::from("ok")
            } else {
                format!("mismatch ({actual:#010x})")
            };
            node.insert("crc32_check", Traced::synthetic(check));
        } else {
            node.insert("content", r.skip(usize(content_length)?)?);
        }

        if let Some(check) = local_header_check {
            node.insert("local_header_check", Traced::synthetic(check));
        }

        if deferred {
            node.insert("data_descriptor", parse_data_descriptor(r, zip64.is_present())?);
        }

        Ok(node)
    }
}

/// Renders the fields a local header disagrees with its central entry on.
fn local_check(mismatches: &[&str]) -> String {
    if mismatches.is_empty() {
        String::from("ok")
    } else {
        format!("mismatch ({})", mismatches.join(", "))
    }
}

fn parse_data_descriptor(r: &mut Reader, zip64: bool) -> DecodeResult<Object> {
    // 4.3.9  Data descriptor:
    //
    //     crc-32                          4 bytes
    //     compressed size                 4 bytes
    //     uncompressed size               4 bytes
    //
    // 4.3.9.1 ...For ZIP64(tm) format archives, the compressed
    // and uncompressed sizes are 8 bytes each.
    //
    // 4.3.9.3 Although not originally assigned a signature, the value
    // 0x08074b50 has commonly been adopted as a signature value
    // for the data descriptor record.
    let mut node = Object::new();
    if r.peek_u32() == Some(magic(DATA_DESCRIPTOR_MAGIC)) {
        node.insert("signature", r.u32()?.map(hex(4)));
    }
    node.insert("crc32", r.u32()?.map(hex(4)));
    if zip64 {
        node.field("compressed_size", r.u64()?);
        node.field("uncompressed_size", r.u64()?);
    } else {
        node.field("compressed_size", r.u32()?);
        node.field("uncompressed_size", r.u32()?);
    }
    Ok(node)
}
