//! Label header reading and delta detection

use super::entry::{entry_position, read_entry};
use super::types::{DiskLabelHeader, LABEL_HEADER_SIZE, LABEL_MAGIC, WHOLE_DISK_PARTITION};
use disklabel_core::{Disk, Error, Result};

/// A validated label header plus the start correction for its entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelInfo {
    pub header: DiskLabelHeader,
    /// Start sector of the whole-disk entry in embedded mode, 0 otherwise
    pub delta: u64,
}

impl LabelInfo {
    pub fn num_partitions(&self) -> u32 {
        u32::from(self.header.num_partitions)
    }
}

/// Read the label header at `sector` and validate its magic.
///
/// In `embedded` mode (a FreeBSD label inside its slice) the entries carry
/// disk-absolute start sectors; the whole-disk entry's start is returned as
/// `delta` so callers can rebase them onto the slice.
pub fn read_label(disk: &mut dyn Disk, sector: u64, embedded: bool) -> Result<LabelInfo> {
    let mut bytes = [0u8; LABEL_HEADER_SIZE];
    disk.read(sector, 0, &mut bytes)?;

    let header = DiskLabelHeader::decode(&bytes)?;
    if !header.has_valid_magic() {
        tracing::debug!(
            "bad signature (found 0x{:08x}, expected 0x{:08x})",
            header.magic,
            LABEL_MAGIC
        );
        return Err(Error::bad_partition_table("no signature"));
    }

    let mut delta = 0;
    if embedded && u32::from(header.num_partitions) > WHOLE_DISK_PARTITION {
        let pos = entry_position(sector, WHOLE_DISK_PARTITION)?;
        delta = u64::from(read_entry(disk, pos)?.offset);
    }

    Ok(LabelInfo { header, delta })
}
