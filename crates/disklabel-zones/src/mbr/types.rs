//! MBR slice type codes

use std::fmt;

/// MBR slice type codes
///
/// Only the types this crate cares about get their own variant; everything
/// else round-trips through [`MbrPartitionType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbrPartitionType {
    /// Empty/unused slice entry
    Empty,
    /// FAT32, LBA
    Fat32Lba,
    /// Extended partition, CHS
    Extended,
    /// Extended partition, LBA
    ExtendedLba,
    /// Linux native
    LinuxNative,
    /// FreeBSD slice, holds an embedded BSD label
    FreeBsd,
    /// OpenBSD slice
    OpenBsd,
    /// NetBSD slice
    NetBsd,
    /// GPT protective MBR
    GptProtective,
    /// Any other type byte
    Unknown(u8),
}

impl MbrPartitionType {
    /// Create a slice type from a byte value
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Empty,
            0x05 => Self::Extended,
            0x0C => Self::Fat32Lba,
            0x0F => Self::ExtendedLba,
            0x83 => Self::LinuxNative,
            0xA5 => Self::FreeBsd,
            0xA6 => Self::OpenBsd,
            0xA9 => Self::NetBsd,
            0xEE => Self::GptProtective,
            _ => Self::Unknown(b),
        }
    }

    /// Get the byte value of this slice type
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Empty => 0x00,
            Self::Extended => 0x05,
            Self::Fat32Lba => 0x0C,
            Self::ExtendedLba => 0x0F,
            Self::LinuxNative => 0x83,
            Self::FreeBsd => 0xA5,
            Self::OpenBsd => 0xA6,
            Self::NetBsd => 0xA9,
            Self::GptProtective => 0xEE,
            Self::Unknown(b) => b,
        }
    }

    /// Human-readable name for this slice type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Fat32Lba => "FAT32 (LBA)",
            Self::Extended => "Extended",
            Self::ExtendedLba => "Extended (LBA)",
            Self::LinuxNative => "Linux",
            Self::FreeBsd => "FreeBSD slice",
            Self::OpenBsd => "OpenBSD slice",
            Self::NetBsd => "NetBSD slice",
            Self::GptProtective => "GPT Protective",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// True for slices that carry a disklabel of one of the BSD dialects
    pub fn is_bsd_slice(&self) -> bool {
        matches!(self, Self::FreeBsd | Self::OpenBsd | Self::NetBsd)
    }
}

impl fmt::Display for MbrPartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(b) => write!(f, "Unknown (0x{:02X})", b),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bsd_slice_types() {
        assert_eq!(MbrPartitionType::from_byte(0xA5), MbrPartitionType::FreeBsd);
        assert_eq!(MbrPartitionType::from_byte(0xA6), MbrPartitionType::OpenBsd);
        assert_eq!(MbrPartitionType::from_byte(0xA9), MbrPartitionType::NetBsd);
        assert!(MbrPartitionType::NetBsd.is_bsd_slice());
        assert!(!MbrPartitionType::LinuxNative.is_bsd_slice());
    }

    #[test]
    fn test_type_byte_round_trip_for_unknown() {
        let t = MbrPartitionType::from_byte(0x42);
        assert_eq!(t, MbrPartitionType::Unknown(0x42));
        assert_eq!(t.to_byte(), 0x42);
        assert_eq!(t.to_string(), "Unknown (0x42)");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(MbrPartitionType::FreeBsd.to_string(), "FreeBSD slice");
        assert_eq!(MbrPartitionType::Fat32Lba.name(), "FAT32 (LBA)");
    }
}
