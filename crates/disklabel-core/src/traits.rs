//! Core traits for disks and partition maps

use crate::{
    error::Result,
    types::{ParentPartition, Partition, PartitionMapKind, Zone},
};
use std::io::{Read, Seek};
use std::ops::ControlFlow;

/// A sector-addressed block device
///
/// Reads are addressed as `(sector, offset)` where `offset` is a byte offset
/// from the start of `sector`. Implementations must fail rather than return
/// a short buffer.
pub trait Disk {
    /// Human-readable name of this disk (e.g. `"disk.img"` or `"disk.img,msdos1"`)
    fn name(&self) -> &str;

    /// Fill `buf` with bytes starting at `sector * SECTOR_SIZE + offset`
    fn read(&mut self, sector: u64, offset: usize, buf: &mut [u8]) -> Result<()>;

    /// Size of the disk in sectors, if known
    fn total_sectors(&self) -> Option<u64> {
        None
    }
}

/// Consumer invoked once per reported partition.
///
/// Returning [`ControlFlow::Break`] stops the iteration after this entry.
pub type PartitionHook<'a> = dyn FnMut(&mut dyn Disk, &Partition) -> ControlFlow<()> + 'a;

/// A partition map format that can enumerate the partitions on a disk
pub trait PartitionMap: Send + Sync {
    /// Which map this is
    fn kind(&self) -> PartitionMapKind;

    /// Registry name of this map (`"bsd"`, `"netbsd"`, ...)
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Enumerate partitions, calling `hook` for each one.
    ///
    /// `parent` describes the partition `disk` is scoped to, if any.
    /// Returns `Ok(ControlFlow::Break(()))` when the hook asked to stop.
    fn iterate(
        &self,
        disk: &mut dyn Disk,
        parent: Option<&ParentPartition>,
        hook: &mut PartitionHook<'_>,
    ) -> Result<ControlFlow<()>>;
}

/// Trait for fully-read partition tables (zone tables)
pub trait ZoneTable: Send + Sync {
    /// Get a human-readable identifier for this zone table type
    fn identify(&self) -> &str;

    /// Get all zones in this partition table
    fn enumerate_zones(&self) -> &[Zone];

    /// Get a specific zone by index
    fn get_zone(&self, index: usize) -> Option<&Zone> {
        self.enumerate_zones().get(index)
    }
}

/// Combined trait for Read + Seek
pub trait ReadSeek: Read + Seek + Send {}

/// Blanket implementation for any type that implements Read + Seek
impl<T: Read + Seek + Send> ReadSeek for T {}
