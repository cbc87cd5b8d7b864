//! Core types shared by the partition maps

use serde::Serialize;
use std::fmt;

/// Size of a disk sector in bytes. All partition map addresses are in these units.
pub const SECTOR_SIZE: u64 = 512;

/// Identifies which partition map format produced (or contains) a partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionMapKind {
    /// DOS/MBR slice table
    Msdos,
    /// Generic BSD disklabel (FreeBSD and friends)
    Bsd,
    /// NetBSD disklabel inside a NetBSD MBR slice
    NetBsd,
    /// OpenBSD disklabel inside an OpenBSD MBR slice
    OpenBsd,
    /// Any other map, by name
    Other(&'static str),
}

impl PartitionMapKind {
    /// Registry name of the map
    pub fn name(&self) -> &'static str {
        match self {
            Self::Msdos => "msdos",
            Self::Bsd => "bsd",
            Self::NetBsd => "netbsd",
            Self::OpenBsd => "openbsd",
            Self::Other(name) => name,
        }
    }

    /// True for the three disklabel dialects
    pub fn is_bsd_family(&self) -> bool {
        matches!(self, Self::Bsd | Self::NetBsd | Self::OpenBsd)
    }
}

impl fmt::Display for PartitionMapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A partition reported by a partition map
///
/// `start` and `length` are in sectors relative to the disk the map was
/// iterated on. `offset` and `index` record where the entry itself was read
/// from and are only useful for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    /// Zero-based entry number within the table
    pub number: u32,

    /// First sector of the partition
    pub start: u64,

    /// Length in sectors
    pub length: u64,

    /// Sector the entry was read from
    pub offset: u64,

    /// Byte offset of the entry within `offset`
    pub index: usize,

    /// Map that produced this partition
    pub map: PartitionMapKind,

    /// Raw filesystem type tag from the entry
    pub fs_type: u8,
}

impl Partition {
    /// Name of the partition within its map, e.g. `bsd1` for entry 0
    pub fn name(&self) -> String {
        format!("{}{}", self.map.name(), self.number + 1)
    }

    /// Traditional BSD partition letter (`a` for entry 0)
    pub fn letter(&self) -> Option<char> {
        ('a' as u32)
            .checked_add(self.number)
            .and_then(char::from_u32)
            .filter(char::is_ascii_lowercase)
    }

    /// Start of the partition in bytes
    pub fn byte_offset(&self) -> u64 {
        self.start.saturating_mul(SECTOR_SIZE)
    }

    /// Length of the partition in bytes
    pub fn byte_length(&self) -> u64 {
        self.length.saturating_mul(SECTOR_SIZE)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [start {} len {} ({})]",
            self.name(),
            self.start,
            self.length,
            format_size(self.byte_length())
        )
    }
}

/// The partition a disk is scoped to, when iterating inside a slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentPartition {
    /// Map the parent partition belongs to
    pub map: PartitionMapKind,

    /// MBR slice type byte, when `map` is [`PartitionMapKind::Msdos`]
    pub msdos_type: Option<u8>,

    /// Zero-based number of the parent within its map
    pub number: u32,

    /// First sector of the parent on the outer disk
    pub start: u64,

    /// Length of the parent in sectors
    pub length: u64,
}

impl ParentPartition {
    /// Describe an MBR slice
    pub fn msdos(number: u32, msdos_type: u8, start: u64, length: u64) -> Self {
        Self {
            map: PartitionMapKind::Msdos,
            msdos_type: Some(msdos_type),
            number,
            start,
            length,
        }
    }

    /// Describe a partition of any other map
    pub fn of(map: PartitionMapKind, number: u32, start: u64, length: u64) -> Self {
        Self {
            map,
            msdos_type: None,
            number,
            start,
            length,
        }
    }

    /// True when the parent is an MBR slice
    pub fn is_msdos(&self) -> bool {
        self.map == PartitionMapKind::Msdos
    }

    /// Name of the parent within its map, e.g. `msdos1`
    pub fn name(&self) -> String {
        format!("{}{}", self.map.name(), self.number + 1)
    }
}

/// Format size in human-readable format
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// A zone (partition) of a fully-read table, in bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    /// Index of this zone within its table
    pub index: usize,

    /// Offset from start of the disk in bytes
    pub offset: u64,

    /// Length of zone in bytes
    pub length: u64,

    /// Type of zone (e.g. "FreeBSD slice", "4.2BSD")
    pub zone_type: String,
}

impl Zone {
    /// Create a new zone
    pub fn new(index: usize, offset: u64, length: u64, zone_type: String) -> Self {
        Self {
            index,
            offset,
            length,
            zone_type,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zone {} [{} @ 0x{:08X}, {} bytes]",
            self.index, self.zone_type, self.offset, self.length
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(number: u32) -> Partition {
        Partition {
            number,
            start: 64,
            length: 2048,
            offset: 1,
            index: 148,
            map: PartitionMapKind::Bsd,
            fs_type: 7,
        }
    }

    #[test]
    fn test_map_kind_names() {
        assert_eq!(PartitionMapKind::Msdos.name(), "msdos");
        assert_eq!(PartitionMapKind::NetBsd.name(), "netbsd");
        assert_eq!(PartitionMapKind::Other("gpt").name(), "gpt");
        assert!(PartitionMapKind::OpenBsd.is_bsd_family());
        assert!(!PartitionMapKind::Msdos.is_bsd_family());
    }

    #[test]
    fn test_partition_naming() {
        let p = partition(0);
        assert_eq!(p.name(), "bsd1");
        assert_eq!(p.letter(), Some('a'));
        assert_eq!(partition(3).letter(), Some('d'));
        assert_eq!(partition(26).letter(), None);
    }

    #[test]
    fn test_partition_bytes() {
        let p = partition(0);
        assert_eq!(p.byte_offset(), 64 * 512);
        assert_eq!(p.byte_length(), 1024 * 1024);
        assert_eq!(p.to_string(), "bsd1 [start 64 len 2048 (1.00 MB)]");
    }

    #[test]
    fn test_parent_partition() {
        let parent = ParentPartition::msdos(0, 0xA5, 63, 1000);
        assert!(parent.is_msdos());
        assert_eq!(parent.msdos_type, Some(0xA5));
        assert_eq!(parent.name(), "msdos1");

        let nested = ParentPartition::of(PartitionMapKind::Bsd, 1, 0, 10);
        assert!(!nested.is_msdos());
        assert_eq!(nested.msdos_type, None);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536 * 1024), "1.50 MB");
    }

    #[test]
    fn test_zone_creation() {
        let zone = Zone::new(0, 0x1000, 0x10000, "FreeBSD slice".to_string());
        assert_eq!(zone.index, 0);
        assert_eq!(zone.offset, 0x1000);
        assert_eq!(zone.to_string(), "Zone 0 [FreeBSD slice @ 0x00001000, 65536 bytes]");
    }
}
