//! MBR (Master Boot Record) slice table
//!
//! Only what the BSD maps consume: the four primary slice records (type and
//! start) and the boot signature.

pub mod types;

use disklabel_core::{
    Disk, Error, ParentPartition, Result, Zone, ZoneTable, SECTOR_SIZE,
};
use types::MbrPartitionType;

/// Size of the MBR in bytes
pub const MBR_SIZE: usize = 512;

/// Offset of the first slice entry
pub const PARTITION_TABLE_OFFSET: usize = 0x1BE;

/// Size of each slice entry
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// Number of slice entries in the MBR
pub const NUM_PARTITIONS: usize = 4;

/// One of the four primary slice records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbrSlice {
    /// Zero-based slot in the table
    pub index: usize,
    /// Boot indicator (0x80 = active)
    pub status: u8,
    /// Slice type byte
    pub partition_type: MbrPartitionType,
    /// First sector (LBA)
    pub start: u32,
    /// Length in sectors
    pub length: u32,
}

impl MbrSlice {
    fn decode(index: usize, entry: &[u8]) -> Self {
        Self {
            index,
            status: entry[0],
            partition_type: MbrPartitionType::from_byte(entry[4]),
            start: u32::from_le_bytes([entry[8], entry[9], entry[10], entry[11]]),
            length: u32::from_le_bytes([entry[12], entry[13], entry[14], entry[15]]),
        }
    }

    /// Raw slice type byte
    pub fn type_byte(&self) -> u8 {
        self.partition_type.to_byte()
    }

    /// True if the slot is unused
    pub fn is_empty(&self) -> bool {
        self.partition_type == MbrPartitionType::Empty || self.length == 0
    }

    /// Describe this slice as the parent of a disk scoped to it
    pub fn parent(&self) -> ParentPartition {
        ParentPartition::msdos(
            self.index as u32,
            self.type_byte(),
            u64::from(self.start),
            u64::from(self.length),
        )
    }
}

/// Decode the four slice records of an MBR sector without checking its signature
pub fn decode_slices(sector: &[u8]) -> Result<[MbrSlice; NUM_PARTITIONS]> {
    if sector.len() < MBR_SIZE {
        return Err(Error::bad_partition_table(format!(
            "MBR needs {} bytes, got {}",
            MBR_SIZE,
            sector.len()
        )));
    }

    Ok(std::array::from_fn(|i| {
        let offset = PARTITION_TABLE_OFFSET + i * PARTITION_ENTRY_SIZE;
        MbrSlice::decode(i, &sector[offset..offset + PARTITION_ENTRY_SIZE])
    }))
}

/// Read sector 0 of `disk` and decode its slice records.
///
/// The boot signature is not required: BSD installers are known to leave
/// tables without it.
pub fn read_slices(disk: &mut dyn Disk) -> Result<[MbrSlice; NUM_PARTITIONS]> {
    let mut sector = [0u8; MBR_SIZE];
    disk.read(0, 0, &mut sector)?;
    decode_slices(&sector)
}

/// MBR slice table
///
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0x000   440   Bootstrap code
/// 0x1B8   4     Disk signature
/// 0x1BE   16    Slice entry 1
/// 0x1CE   16    Slice entry 2
/// 0x1DE   16    Slice entry 3
/// 0x1EE   16    Slice entry 4
/// 0x1FE   2     Boot signature (0xAA55)
/// ```
#[derive(Debug, Clone)]
pub struct MbrZoneTable {
    slices: [MbrSlice; NUM_PARTITIONS],
    zones: Vec<Zone>,
    disk_signature: u32,
    boot_signature: u16,
}

impl MbrZoneTable {
    /// The boot signature that must be present at offset 0x1FE
    pub const BOOT_SIGNATURE: u16 = 0xAA55;

    /// Offset of the disk signature
    pub const DISK_SIGNATURE_OFFSET: usize = 0x1B8;

    /// Offset of the boot signature
    pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

    /// Read and validate the MBR at sector 0 of `disk`
    ///
    /// # Errors
    ///
    /// Returns [`Error::BadPartitionTable`] if the boot signature is invalid,
    /// or the device error if sector 0 cannot be read.
    pub fn read(disk: &mut dyn Disk) -> Result<Self> {
        let mut sector = [0u8; MBR_SIZE];
        disk.read(0, 0, &mut sector)?;
        Self::decode(&sector)
    }

    /// Decode and validate an MBR sector
    pub fn decode(sector: &[u8]) -> Result<Self> {
        let slices = decode_slices(sector)?;

        let sig = Self::BOOT_SIGNATURE_OFFSET;
        let boot_signature = u16::from_le_bytes([sector[sig], sector[sig + 1]]);
        if boot_signature != Self::BOOT_SIGNATURE {
            return Err(Error::bad_partition_table(format!(
                "Invalid MBR boot signature: expected 0x{:04X}, got 0x{:04X}",
                Self::BOOT_SIGNATURE,
                boot_signature
            )));
        }

        let ds = Self::DISK_SIGNATURE_OFFSET;
        let disk_signature =
            u32::from_le_bytes([sector[ds], sector[ds + 1], sector[ds + 2], sector[ds + 3]]);

        let zones = slices
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| {
                Zone::new(
                    s.index,
                    u64::from(s.start) * SECTOR_SIZE,
                    u64::from(s.length) * SECTOR_SIZE,
                    s.partition_type.to_string(),
                )
            })
            .collect();

        Ok(Self {
            slices,
            zones,
            disk_signature,
            boot_signature,
        })
    }

    /// All four slice records, including empty ones
    pub fn slices(&self) -> &[MbrSlice; NUM_PARTITIONS] {
        &self.slices
    }

    /// Non-empty slices of the given type, in table order
    pub fn slices_of_type(
        &self,
        partition_type: MbrPartitionType,
    ) -> impl Iterator<Item = &MbrSlice> + '_ {
        self.slices
            .iter()
            .filter(move |s| !s.is_empty() && s.partition_type == partition_type)
    }

    /// Get the disk signature
    pub fn disk_signature(&self) -> u32 {
        self.disk_signature
    }

    /// Get the boot signature (always 0xAA55 once decoded)
    pub fn boot_signature(&self) -> u16 {
        self.boot_signature
    }

    /// True if this is the protective MBR of a GPT disk
    pub fn is_gpt_protective(&self) -> bool {
        self.slices
            .iter()
            .any(|s| s.partition_type == MbrPartitionType::GptProtective)
    }
}

impl ZoneTable for MbrZoneTable {
    fn identify(&self) -> &str {
        "Master Boot Record"
    }

    fn enumerate_zones(&self) -> &[Zone] {
        &self.zones
    }
}
