//! The three disklabel dialects and how each one finds its label

use super::{iterate_label, LABEL_SECTOR};
use crate::mbr::{self, types::MbrPartitionType};
use disklabel_core::{
    Disk, Error, ParentPartition, PartitionHook, PartitionMap, PartitionMapKind, Result,
};
use std::fmt;
use std::ops::ControlFlow;

/// A disklabel dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BsdDialect {
    /// Plain BSD label, optionally embedded in a FreeBSD slice
    Bsd,
    /// NetBSD label found through a NetBSD MBR slice
    NetBsd,
    /// OpenBSD label found through an OpenBSD MBR slice
    OpenBsd,
}

impl BsdDialect {
    /// All dialects, in registration order
    pub const ALL: [BsdDialect; 3] = [BsdDialect::Bsd, BsdDialect::NetBsd, BsdDialect::OpenBsd];

    /// Look a dialect up by its map name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.kind().name() == name)
    }

    pub fn kind(&self) -> PartitionMapKind {
        match self {
            Self::Bsd => PartitionMapKind::Bsd,
            Self::NetBsd => PartitionMapKind::NetBsd,
            Self::OpenBsd => PartitionMapKind::OpenBsd,
        }
    }

    /// MBR slice type that carries this dialect's label.
    ///
    /// For `Bsd` this is the slice type it accepts as an embedding parent.
    pub fn slice_type(&self) -> MbrPartitionType {
        match self {
            Self::Bsd => MbrPartitionType::FreeBsd,
            Self::NetBsd => MbrPartitionType::NetBsd,
            Self::OpenBsd => MbrPartitionType::OpenBsd,
        }
    }

    fn iterate_bsd(
        &self,
        disk: &mut dyn Disk,
        parent: Option<&ParentPartition>,
        hook: &mut PartitionHook<'_>,
    ) -> Result<ControlFlow<()>> {
        match parent {
            Some(p) if p.is_msdos() && p.msdos_type == Some(self.slice_type().to_byte()) => {
                tracing::debug!("FreeBSD embedded iterating");
                iterate_label(disk, LABEL_SECTOR, true, self.kind(), parent, hook)
            }
            Some(p) if p.is_msdos() || p.map.is_bsd_family() => {
                tracing::debug!("no embedded iterating");
                Err(Error::bad_partition_table("no embedding supported"))
            }
            _ => iterate_label(disk, LABEL_SECTOR, false, self.kind(), parent, hook),
        }
    }

    fn iterate_sliced(
        &self,
        disk: &mut dyn Disk,
        parent: Option<&ParentPartition>,
        hook: &mut PartitionHook<'_>,
    ) -> Result<ControlFlow<()>> {
        if parent.is_some_and(ParentPartition::is_msdos) {
            return Err(Error::bad_partition_table("no embedding supported"));
        }

        let wanted = self.slice_type();
        for slice in mbr::read_slices(disk)? {
            if slice.partition_type != wanted {
                continue;
            }

            let sector = u64::from(slice.start) + LABEL_SECTOR;
            match iterate_label(disk, sector, false, self.kind(), parent, hook) {
                Err(e) if e.is_bad_partition_table() => {
                    tracing::debug!(
                        "{}: no label in slice {} at sector {}: {}",
                        self,
                        slice.index + 1,
                        slice.start,
                        e
                    );
                }
                other => return other,
            }
        }

        Err(Error::bad_partition_table("no bsdlabel found"))
    }
}

impl fmt::Display for BsdDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().name())
    }
}

impl PartitionMap for BsdDialect {
    fn kind(&self) -> PartitionMapKind {
        BsdDialect::kind(self)
    }

    fn iterate(
        &self,
        disk: &mut dyn Disk,
        parent: Option<&ParentPartition>,
        hook: &mut PartitionHook<'_>,
    ) -> Result<ControlFlow<()>> {
        match self {
            Self::Bsd => self.iterate_bsd(disk, parent, hook),
            Self::NetBsd | Self::OpenBsd => self.iterate_sliced(disk, parent, hook),
        }
    }
}
