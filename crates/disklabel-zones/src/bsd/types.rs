//! On-disk disklabel structures
//!
//! ```text
//! Label header (148 bytes)
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     d_magic (0x82564557)
//! 4       128   drive type, geometry, ...
//! 132     4     d_magic2
//! 136     2     d_checksum
//! 138     2     d_npartitions
//! 140     4     d_bbsize
//! 144     4     d_sbsize
//!
//! Partition entry (16 bytes), repeated d_npartitions times from offset 148
//! 0       4     p_size (sectors, 0 = unused)
//! 4       4     p_offset (start sector)
//! 8       4     p_fsize
//! 12      1     p_fstype
//! 13      1     p_frag
//! 14      2     p_cpg
//! ```
//!
//! All fields are little-endian.

use disklabel_core::{Error, Result};
use std::fmt;

/// Sector (relative to the start of the label's disk or slice) holding the label
pub const LABEL_SECTOR: u64 = 1;

/// `d_magic` value of a valid label
pub const LABEL_MAGIC: u32 = 0x8256_4557;

/// Index of the `c` partition, which covers the whole disk or slice
pub const WHOLE_DISK_PARTITION: u32 = 2;

/// Size of the label header; entries start right after it
pub const LABEL_HEADER_SIZE: usize = 148;

/// Size of one partition entry
pub const ENTRY_SIZE: usize = 16;

const MAGIC2_OFFSET: usize = 132;
const CHECKSUM_OFFSET: usize = 136;
const NUM_PARTITIONS_OFFSET: usize = 138;
const BOOT_SIZE_OFFSET: usize = 140;
const SUPERBLOCK_SIZE_OFFSET: usize = 144;

fn le_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// The fixed-size disklabel header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskLabelHeader {
    pub magic: u32,
    pub magic2: u32,
    pub checksum: u16,
    /// Number of entries following the header
    pub num_partitions: u16,
    pub boot_size: u32,
    pub superblock_size: u32,
}

impl DiskLabelHeader {
    /// Decode a header from at least [`LABEL_HEADER_SIZE`] bytes.
    ///
    /// Does not check the magic; see [`DiskLabelHeader::has_valid_magic`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LABEL_HEADER_SIZE {
            return Err(Error::bad_partition_table(format!(
                "disklabel header needs {} bytes, got {}",
                LABEL_HEADER_SIZE,
                bytes.len()
            )));
        }

        Ok(Self {
            magic: le_u32(bytes, 0),
            magic2: le_u32(bytes, MAGIC2_OFFSET),
            checksum: le_u16(bytes, CHECKSUM_OFFSET),
            num_partitions: le_u16(bytes, NUM_PARTITIONS_OFFSET),
            boot_size: le_u32(bytes, BOOT_SIZE_OFFSET),
            superblock_size: le_u32(bytes, SUPERBLOCK_SIZE_OFFSET),
        })
    }

    pub fn has_valid_magic(&self) -> bool {
        self.magic == LABEL_MAGIC
    }
}

/// One raw partition entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsdPartitionEntry {
    /// Length in sectors
    pub size: u32,
    /// Start sector, before any delta correction
    pub offset: u32,
    pub fragment_size: u32,
    pub fs_type: u8,
    pub fs_fragments: u8,
    pub fs_cylinders: u16,
}

impl BsdPartitionEntry {
    /// Decode an entry from at least [`ENTRY_SIZE`] bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ENTRY_SIZE {
            return Err(Error::bad_partition_table(format!(
                "disklabel entry needs {} bytes, got {}",
                ENTRY_SIZE,
                bytes.len()
            )));
        }

        Ok(Self {
            size: le_u32(bytes, 0),
            offset: le_u32(bytes, 4),
            fragment_size: le_u32(bytes, 8),
            fs_type: bytes[12],
            fs_fragments: bytes[13],
            fs_cylinders: le_u16(bytes, 14),
        })
    }

    pub fn is_unused(&self) -> bool {
        self.size == 0
    }
}

/// `p_fstype` values common to the BSD dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsdFsType {
    Unused,
    Swap,
    V6,
    V7,
    SysV,
    V71K,
    V8,
    Ffs,
    Msdos,
    Lfs,
    Other,
    Hpfs,
    Iso9660,
    Boot,
    Ados,
    Hfs,
    Adfs,
    Ext2,
    Ccd,
    Raid,
    Ntfs,
    Unknown(u8),
}

impl BsdFsType {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0 => Self::Unused,
            1 => Self::Swap,
            2 => Self::V6,
            3 => Self::V7,
            4 => Self::SysV,
            5 => Self::V71K,
            6 => Self::V8,
            7 => Self::Ffs,
            8 => Self::Msdos,
            9 => Self::Lfs,
            10 => Self::Other,
            11 => Self::Hpfs,
            12 => Self::Iso9660,
            13 => Self::Boot,
            14 => Self::Ados,
            15 => Self::Hfs,
            16 => Self::Adfs,
            17 => Self::Ext2,
            18 => Self::Ccd,
            19 => Self::Raid,
            20 => Self::Ntfs,
            _ => Self::Unknown(b),
        }
    }

    /// Name as printed by `disklabel(8)`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Swap => "swap",
            Self::V6 => "Version 6",
            Self::V7 => "Version 7",
            Self::SysV => "System V",
            Self::V71K => "4.1BSD",
            Self::V8 => "Eighth Edition",
            Self::Ffs => "4.2BSD",
            Self::Msdos => "MSDOS",
            Self::Lfs => "4.4LFS",
            Self::Other => "unknown",
            Self::Hpfs => "HPFS",
            Self::Iso9660 => "ISO9660",
            Self::Boot => "boot",
            Self::Ados => "ADOS",
            Self::Hfs => "HFS",
            Self::Adfs => "ADFS",
            Self::Ext2 => "ext2fs",
            Self::Ccd => "ccd",
            Self::Raid => "RAID",
            Self::Ntfs => "NTFS",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for BsdFsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(b) => write!(f, "unknown ({})", b),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_header() {
        let mut bytes = vec![0u8; LABEL_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&LABEL_MAGIC.to_le_bytes());
        bytes[132..136].copy_from_slice(&LABEL_MAGIC.to_le_bytes());
        bytes[136..138].copy_from_slice(&0xBEEFu16.to_le_bytes());
        bytes[138..140].copy_from_slice(&8u16.to_le_bytes());
        bytes[140..144].copy_from_slice(&8192u32.to_le_bytes());
        bytes[144..148].copy_from_slice(&65536u32.to_le_bytes());

        let header = DiskLabelHeader::decode(&bytes).unwrap();
        assert!(header.has_valid_magic());
        assert_eq!(header.magic2, LABEL_MAGIC);
        assert_eq!(header.checksum, 0xBEEF);
        assert_eq!(header.num_partitions, 8);
        assert_eq!(header.boot_size, 8192);
        assert_eq!(header.superblock_size, 65536);
    }

    #[test]
    fn test_magic_is_little_endian() {
        let mut bytes = vec![0u8; LABEL_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&[0x57, 0x45, 0x56, 0x82]);
        assert!(DiskLabelHeader::decode(&bytes).unwrap().has_valid_magic());

        bytes[0..4].copy_from_slice(&LABEL_MAGIC.to_be_bytes());
        assert!(!DiskLabelHeader::decode(&bytes).unwrap().has_valid_magic());
    }

    #[test]
    fn test_short_buffers_rejected() {
        assert!(DiskLabelHeader::decode(&[0u8; 147])
            .unwrap_err()
            .is_bad_partition_table());
        assert!(BsdPartitionEntry::decode(&[0u8; 15])
            .unwrap_err()
            .is_bad_partition_table());
    }

    #[test]
    fn test_decode_entry() {
        let mut bytes = [0u8; ENTRY_SIZE];
        bytes[0..4].copy_from_slice(&2048u32.to_le_bytes());
        bytes[4..8].copy_from_slice(&63u32.to_le_bytes());
        bytes[8..12].copy_from_slice(&2048u32.to_le_bytes());
        bytes[12] = 7;
        bytes[13] = 8;
        bytes[14..16].copy_from_slice(&16u16.to_le_bytes());

        let entry = BsdPartitionEntry::decode(&bytes).unwrap();
        assert_eq!(entry.size, 2048);
        assert_eq!(entry.offset, 63);
        assert_eq!(entry.fragment_size, 2048);
        assert_eq!(BsdFsType::from_byte(entry.fs_type), BsdFsType::Ffs);
        assert_eq!(entry.fs_fragments, 8);
        assert_eq!(entry.fs_cylinders, 16);
        assert!(!entry.is_unused());
        assert!(BsdPartitionEntry::decode(&[0u8; ENTRY_SIZE]).unwrap().is_unused());
    }

    #[test]
    fn test_fs_type_names() {
        assert_eq!(BsdFsType::from_byte(1).to_string(), "swap");
        assert_eq!(BsdFsType::from_byte(7).to_string(), "4.2BSD");
        assert_eq!(BsdFsType::from_byte(200).to_string(), "unknown (200)");
    }
}
