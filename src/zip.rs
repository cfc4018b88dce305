//! Decodes the structure of a ZIP archive.
//!
//! ZIP archives are read from the back: the End of central directory record
//! tells us where the central directory is, which tells us where each file's
//! local header is. We decode all of it (but never decompress anything)
//! into a [`Node`] tree shaped like
//!
//! ```text
//! { prefix, files: [...], archive_decryption_header: {},
//!   archive_extra_data_record: {}, central_directory: { headers: [...], signature: {} },
//!   zip64_eocd_record, zip64_eocd_locator, eocd_record }
//! ```
//!
//! Zip files can be prepended by arbitrary junk (self-extracting executables,
//! Chrome extensions, ...), so all offsets stored in the archive are relative
//! to wherever the archive actually starts.
//!
//! [`Node`]: ../traced/enum.Node.html

use log::*;
use memchr::memmem;

use crate::arch::seek_target;
use crate::cursor::Reader;
use crate::result::*;
use crate::spec::*;
use crate::traced::*;

/// Finds how many bytes of junk precede the archive.
///
/// This is the position of the first ZIP signature in the buffer.
/// Signatures needn't be aligned, so it's a byte-wise search.
/// The end-of-central-directory signatures count too,
/// since an empty archive has nothing else.
pub fn find_prefix(buffer: &[u8]) -> DecodeResult<usize> {
    [
        LOCAL_FILE_HEADER_MAGIC,
        ARCHIVE_EXTRA_DATA_MAGIC,
        CENTRAL_DIRECTORY_MAGIC,
        ZIP64_EOCDR_MAGIC,
        EOCDR_MAGIC,
    ]
    .iter()
    .filter_map(|magic| memmem::find(buffer, magic))
    .min()
    .ok_or(DecodeError::InvalidArchive("No ZIP signature found"))
}

/// Searches backward through `buffer` to find the
/// End of central directory record.
///
/// It should be right at the end of the file,
/// but its variable-length comment means we can't jump to a known offset.
/// We step back ten bytes at a time, checking each window (plus enough overlap
/// to catch a signature straddling two windows) front to back.
///
/// A comment containing the signature will fool this.
/// The format is ambiguous there, so we take the first hit.
pub fn find_eocdr(buffer: &[u8]) -> DecodeResult<usize> {
    const STEP: usize = 10;
    const WINDOW: usize = STEP + 4;

    let mut window_start = buffer.len().saturating_sub(STEP);
    loop {
        let window_end = (window_start + WINDOW).min(buffer.len());
        if let Some(found) = memmem::find(&buffer[window_start..window_end], &EOCDR_MAGIC) {
            return Ok(window_start + found);
        }
        if window_start == 0 {
            break;
        }
        window_start = window_start.saturating_sub(STEP);
    }
    Err(DecodeError::InvalidArchive("No EOCD record found."))
}

/// Decodes the given buffer as a ZIP archive.
pub fn decode(buffer: &[u8]) -> DecodeResult<Node> {
    let mut r = Reader::new(buffer);

    let prefix_length = find_prefix(buffer)?;
    if prefix_length != 0 {
        debug!("Archive prepended with {} bytes of junk", prefix_length);
    }
    let prefix = r.skip(prefix_length)?;

    let eocdr_posit = find_eocdr(buffer)?;
    r.seek(eocdr_posit);
    let eocdr = EndOfCentralDirectory::parse(&mut r)?;
    trace!("{:?}", eocdr);

    if eocdr.disk_number != eocdr.disk_with_central_directory {
        warn!(
            "No support for multi-disk archives: disk ({}) != disk with central directory ({})",
            eocdr.disk_number, eocdr.disk_with_central_directory
        );
    }
    if eocdr.entries != eocdr.entries_on_this_disk {
        warn!(
            "No support for multi-disk archives: entries ({}) != entries this disk ({})",
            eocdr.entries, eocdr.entries_on_this_disk
        );
    }

    let mut nominal_central_directory_offset = u64::from(eocdr.central_directory_offset);
    let mut entry_count = u64::from(eocdr.entries);
    let mut zip64_eocdr_locator_node = Node::empty();
    let mut zip64_eocdr_node = Node::empty();

    // The Zip64 locator, if any, sits right before the EOCDR.
    // Its record's 64-bit values win over the EOCDR's.
    if let Some(locator_posit) =
        eocdr_posit.checked_sub(Zip64EndOfCentralDirectoryLocator::size_in_file())
    {
        r.seek(locator_posit);
        if Zip64EndOfCentralDirectoryLocator::is_at(&r) {
            let locator = Zip64EndOfCentralDirectoryLocator::parse(&mut r)?;
            trace!("{:?}", locator);

            if u32::from(eocdr.disk_number) != locator.disk_with_central_directory {
                warn!(
                    "No support for multi-disk archives: disk ({}) != disk with zip64 central directory ({})",
                    eocdr.disk_number, locator.disk_with_central_directory
                );
            }
            if locator.disks > 1 {
                warn!(
                    "No support for multi-disk archives: Zip64 EOCDR locator reports {} disks",
                    locator.disks
                );
            }

            r.seek(seek_target(locator.zip64_eocdr_offset, prefix_length)?);
            let zip64_eocdr = Zip64EndOfCentralDirectory::parse(&mut r)?;
            trace!("{:?}", zip64_eocdr);

            if zip64_eocdr.disk_number != zip64_eocdr.disk_with_central_directory
                || zip64_eocdr.entries != zip64_eocdr.entries_on_this_disk
            {
                warn!("No support for multi-disk archives: Zip64 EOCDR spans disks");
            }

            nominal_central_directory_offset = zip64_eocdr.central_directory_offset;
            entry_count = zip64_eocdr.entries;
            zip64_eocdr_locator_node = locator.node.into();
            zip64_eocdr_node = zip64_eocdr.node.into();
        }
    }

    trace!(
        "{} entries at nominal offset {}",
        entry_count,
        nominal_central_directory_offset
    );

    r.seek(seek_target(nominal_central_directory_offset, prefix_length)?);
    // Don't trust entry_count for an allocation; it might be nonsense,
    // in which case we'll run off the end of the buffer soon enough.
    let mut central_entries = Vec::new();
    for _ in 0..entry_count {
        let entry = CentralDirectoryEntry::parse(&mut r)?;
        debug!(
            "{} at nominal offset {}",
            entry.file_name, entry.header_offset
        );
        central_entries.push(entry);
    }

    let mut files = Vec::with_capacity(central_entries.len());
    for entry in &central_entries {
        r.seek(seek_target(entry.header_offset, prefix_length)?);
        files.push(Node::from(LocalFileHeader::parse(&mut r, entry)?));
    }

    let mut central_directory = Object::new();
    central_directory.insert(
        "headers",
        central_entries
            .into_iter()
            .map(|e| Node::from(e.node))
            .collect::<Vec<_>>(),
    );
    // Digital signatures aren't decoded.
    central_directory.insert("signature", Node::empty());

    let mut root = Object::new();
    root.insert("prefix", prefix);
    root.insert("files", files);
    // Nor is central directory encryption.
    root.insert("archive_decryption_header", Node::empty());
    root.insert("archive_extra_data_record", Node::empty());
    root.insert("central_directory", central_directory);
    root.insert("zip64_eocd_record", zip64_eocdr_node);
    root.insert("zip64_eocd_locator", zip64_eocdr_locator_node);
    root.insert("eocd_record", eocdr.node);
    Ok(root.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_first_signature() {
        let mut buffer = b"MZ junk PK\x03".to_vec();
        buffer.extend_from_slice(&CENTRAL_DIRECTORY_MAGIC);
        buffer.extend_from_slice(&LOCAL_FILE_HEADER_MAGIC);
        assert_eq!(find_prefix(&buffer).unwrap(), 11);
    }

    #[test]
    fn prefix_of_empty_archive() {
        let mut buffer = vec![0xAA; 3];
        buffer.extend_from_slice(&EOCDR_MAGIC);
        buffer.extend_from_slice(&[0; 18]);
        assert_eq!(find_prefix(&buffer).unwrap(), 3);
    }

    #[test]
    fn no_signature_at_all() {
        assert!(matches!(
            find_prefix(b"just some text"),
            Err(DecodeError::InvalidArchive("No ZIP signature found"))
        ));
        assert!(find_prefix(&[]).is_err());
    }

    #[test]
    fn eocdr_search_covers_every_position() {
        for len in 4..64 {
            for posit in 0..=(len - 4) {
                let mut buffer = vec![0u8; len];
                buffer[posit..posit + 4].copy_from_slice(&EOCDR_MAGIC);
                assert_eq!(find_eocdr(&buffer).unwrap(), posit, "len {len}");
            }
        }
    }

    #[test]
    fn eocdr_search_prefers_the_back() {
        let mut buffer = vec![0u8; 100];
        buffer[10..14].copy_from_slice(&EOCDR_MAGIC);
        buffer[70..74].copy_from_slice(&EOCDR_MAGIC);
        assert_eq!(find_eocdr(&buffer).unwrap(), 70);
    }

    #[test]
    fn missing_eocdr() {
        match find_eocdr(&[0u8; 50]) {
            Err(DecodeError::InvalidArchive(msg)) => assert_eq!(msg, "No EOCD record found."),
            other => panic!("Expected a missing EOCDR, got {other:?}"),
        }
        assert!(find_eocdr(&[]).is_err());
    }

    #[test]
    fn empty_archive() {
        let mut buffer = EOCDR_MAGIC.to_vec();
        buffer.extend_from_slice(&[0; 18]);
        let tree = decode(&buffer).unwrap();
        assert_eq!(tree["prefix"].value(), Some(&Scalar::from("[0 octets]")));
        assert_eq!(tree["files"].as_list().map(<[Node]>::len), Some(0));
        assert_eq!(tree["eocd_record"]["comment"].span(), Some(Span::new(22, 22)));
        assert_eq!(tree["zip64_eocd_record"], Node::empty());
    }
}
