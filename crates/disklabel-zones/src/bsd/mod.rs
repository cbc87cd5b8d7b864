//! BSD disklabel partition maps
//!
//! Three dialects share one on-disk format and differ only in how the label
//! is found:
//!
//! - **bsd**: at sector 1 of the disk, or at sector 1 of the FreeBSD slice the
//!   disk is scoped to (entries then hold disk-absolute starts and are rebased)
//! - **netbsd** / **openbsd**: at sector 1 of the first MBR slice of the
//!   dialect's type that holds a valid label

pub mod dialect;
pub mod entry;
pub mod label;
pub mod table;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dialect::BsdDialect;
pub use entry::{EntryDecoder, EntryOutcome};
pub use label::{read_label, LabelInfo};
pub use table::BsdZoneTable;
pub use types::{
    BsdFsType, BsdPartitionEntry, DiskLabelHeader, ENTRY_SIZE, LABEL_HEADER_SIZE, LABEL_MAGIC,
    LABEL_SECTOR, WHOLE_DISK_PARTITION,
};

use disklabel_core::{Disk, ParentPartition, PartitionHook, PartitionMapKind, Result};
use std::ops::ControlFlow;

/// Report every usable partition of the label at `sector`.
///
/// `embedded` enables delta correction from the whole-disk entry. Fails with
/// `BadPartitionTable` before touching any entry if the magic is wrong; a
/// device error while reading entries aborts the walk, leaving already
/// reported partitions reported.
pub fn iterate_label(
    disk: &mut dyn Disk,
    sector: u64,
    embedded: bool,
    map: PartitionMapKind,
    parent: Option<&ParentPartition>,
    hook: &mut PartitionHook<'_>,
) -> Result<ControlFlow<()>> {
    let label = read_label(disk, sector, embedded)?;

    tracing::debug!(
        "bsdlabel with {} partitions detected",
        label.header.num_partitions
    );

    let decoder = EntryDecoder {
        label_sector: sector,
        delta: label.delta,
        map,
        parent,
    };

    for number in 0..label.num_partitions() {
        if let EntryOutcome::Partition(partition) = decoder.decode(disk, number)? {
            if hook(&mut *disk, &partition).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
    }

    Ok(ControlFlow::Continue(()))
}
