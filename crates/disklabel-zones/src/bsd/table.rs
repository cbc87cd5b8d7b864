//! BSD disklabel as a fully-read zone table

use super::{types::BsdFsType, BsdDialect};
use disklabel_core::{
    checked_multiply_u64, Disk, ParentPartition, Partition, PartitionMap, Result, Zone, ZoneTable,
    SECTOR_SIZE,
};
use std::ops::ControlFlow;

/// Every partition of one disklabel, collected up front
#[derive(Debug, Clone)]
pub struct BsdZoneTable {
    dialect: BsdDialect,
    partitions: Vec<Partition>,
    zones: Vec<Zone>,
}

impl BsdZoneTable {
    /// Run `dialect` over `disk` to completion
    ///
    /// # Errors
    ///
    /// Whatever the dialect reports: [`disklabel_core::Error::BadPartitionTable`]
    /// when no label is found, or the device error that stopped the walk.
    pub fn read(
        disk: &mut dyn Disk,
        dialect: BsdDialect,
        parent: Option<&ParentPartition>,
    ) -> Result<Self> {
        let mut partitions = Vec::new();
        dialect.iterate(disk, parent, &mut |_disk, partition| {
            partitions.push(partition.clone());
            ControlFlow::Continue(())
        })?;

        let zones = partitions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Ok(Zone::new(
                    i,
                    checked_multiply_u64(p.start, SECTOR_SIZE, "zone offset")?,
                    checked_multiply_u64(p.length, SECTOR_SIZE, "zone length")?,
                    BsdFsType::from_byte(p.fs_type).name().to_string(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("{}: {} partitions read", dialect, partitions.len());

        Ok(Self {
            dialect,
            partitions,
            zones,
        })
    }

    /// Partitions in label order
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn dialect(&self) -> BsdDialect {
        self.dialect
    }
}

impl ZoneTable for BsdZoneTable {
    fn identify(&self) -> &str {
        match self.dialect {
            BsdDialect::Bsd => "BSD disklabel",
            BsdDialect::NetBsd => "NetBSD disklabel",
            BsdDialect::OpenBsd => "OpenBSD disklabel",
        }
    }

    fn enumerate_zones(&self) -> &[Zone] {
        &self.zones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsd::fixtures::ImageBuilder;

    #[test]
    fn test_read_bsd_table() {
        let mut disk = ImageBuilder::new(8)
            .label(1, &[(100, 16, 7), (0, 0, 0), (1000, 0, 0), (50, 116, 1)])
            .disk();

        let table = BsdZoneTable::read(&mut disk, BsdDialect::Bsd, None).unwrap();
        assert_eq!(table.identify(), "BSD disklabel");
        assert_eq!(table.dialect(), BsdDialect::Bsd);

        let numbers: Vec<_> = table.partitions().iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![0, 3]);

        let zones = table.enumerate_zones();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].offset, 16 * 512);
        assert_eq!(zones[0].length, 100 * 512);
        assert_eq!(zones[0].zone_type, "4.2BSD");
        assert_eq!(zones[1].index, 1);
        assert_eq!(zones[1].zone_type, "swap");
        assert_eq!(table.get_zone(1), Some(&zones[1]));
        assert!(table.get_zone(2).is_none());
    }

    #[test]
    fn test_read_openbsd_table() {
        let mut disk = ImageBuilder::new(64)
            .mbr_slice(3, 0xA6, 40, 20)
            .label(41, &[(10, 42, 7)])
            .disk();

        let table = BsdZoneTable::read(&mut disk, BsdDialect::OpenBsd, None).unwrap();
        assert_eq!(table.identify(), "OpenBSD disklabel");
        assert_eq!(table.partitions()[0].name(), "openbsd1");
    }

    #[test]
    fn test_missing_label() {
        let mut disk = ImageBuilder::new(8).disk();
        let err = BsdZoneTable::read(&mut disk, BsdDialect::NetBsd, None).unwrap_err();
        assert!(err.is_bad_partition_table());
    }
}
