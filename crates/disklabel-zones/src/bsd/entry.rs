//! Partition entry decoding

use super::types::{BsdPartitionEntry, ENTRY_SIZE, LABEL_HEADER_SIZE, WHOLE_DISK_PARTITION};
use disklabel_core::{
    checked_add_u64, checked_multiply_u64, Disk, ParentPartition, Partition, PartitionMapKind,
    Result, SECTOR_SIZE,
};

/// Absolute byte position of entry `number` of the label at `label_sector`.
///
/// Entries are packed after the header and are not sector-aligned.
pub fn entry_position(label_sector: u64, number: u32) -> Result<u64> {
    let label_start = checked_multiply_u64(label_sector, SECTOR_SIZE, "label position")?;
    let header_end = checked_add_u64(label_start, LABEL_HEADER_SIZE as u64, "label position")?;
    checked_add_u64(
        header_end,
        u64::from(number) * ENTRY_SIZE as u64,
        "entry position",
    )
}

/// Split an absolute byte position into `(sector, offset within sector)`
pub fn split_position(pos: u64) -> (u64, usize) {
    (pos / SECTOR_SIZE, (pos % SECTOR_SIZE) as usize)
}

/// Read the raw entry at an absolute byte position
pub fn read_entry(disk: &mut dyn Disk, pos: u64) -> Result<BsdPartitionEntry> {
    let (sector, offset) = split_position(pos);
    let mut bytes = [0u8; ENTRY_SIZE];
    disk.read(sector, offset, &mut bytes)?;
    BsdPartitionEntry::decode(&bytes)
}

/// What became of one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The whole-disk entry; never read or reported
    Reserved,
    /// Zero-length entry
    Unused,
    /// Starts before the delta, so it cannot belong to the enclosing slice
    Nested { raw_start: u64 },
    /// A usable partition with its start already delta-corrected
    Partition(Partition),
}

/// Decodes the entries of one label
#[derive(Debug, Clone, Copy)]
pub struct EntryDecoder<'p> {
    /// Sector the label header was read from
    pub label_sector: u64,
    /// Subtracted from every entry's start sector
    pub delta: u64,
    /// Map reported partitions are tagged with
    pub map: PartitionMapKind,
    /// Partition the disk is scoped to, for diagnostics
    pub parent: Option<&'p ParentPartition>,
}

impl EntryDecoder<'_> {
    /// Read and classify entry `number`.
    ///
    /// Device errors are returned as-is; the caller must stop iterating.
    pub fn decode(&self, disk: &mut dyn Disk, number: u32) -> Result<EntryOutcome> {
        if number == WHOLE_DISK_PARTITION {
            return Ok(EntryOutcome::Reserved);
        }

        let pos = entry_position(self.label_sector, number)?;
        let (sector, offset) = split_position(pos);
        let entry = read_entry(disk, pos)?;

        let start = u64::from(entry.offset);
        let length = u64::from(entry.size);

        tracing::debug!(
            "partition {}: type 0x{:x}, start 0x{:x}, len 0x{:x}",
            number,
            entry.fs_type,
            start,
            length
        );

        if entry.is_unused() {
            return Ok(EntryOutcome::Unused);
        }

        if start < self.delta {
            tracing::debug!(
                "partition {}: invalid start (found 0x{:x}, wanted >= 0x{:x})",
                number,
                start,
                self.delta
            );
            tracing::warn!(
                "Discarding improperly nested partition ({},{},{}{})",
                disk.name(),
                self.parent.map(ParentPartition::name).unwrap_or_default(),
                self.map.name(),
                number + 1
            );
            return Ok(EntryOutcome::Nested { raw_start: start });
        }

        Ok(EntryOutcome::Partition(Partition {
            number,
            start: start - self.delta,
            length,
            offset: sector,
            index: offset,
            map: self.map,
            fs_type: entry.fs_type,
        }))
    }
}
