//! Partition map registry
//!
//! Maps are tried in registration order. Registering and unregistering are
//! the only mutations and both are idempotent.

use crate::bsd::BsdDialect;
use disklabel_core::{
    Disk, Error, ParentPartition, PartitionHook, PartitionMap, PartitionMapKind, Result,
};
use std::ops::ControlFlow;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The set of partition maps a disk can be probed with
pub struct PartitionMapRegistry {
    maps: RwLock<Vec<Arc<dyn PartitionMap>>>,
}

impl PartitionMapRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            maps: RwLock::new(Vec::new()),
        }
    }

    fn read_maps(&self) -> Result<RwLockReadGuard<'_, Vec<Arc<dyn PartitionMap>>>> {
        self.maps
            .read()
            .map_err(|_| Error::custom("Registry lock poisoned"))
    }

    fn write_maps(&self) -> Result<RwLockWriteGuard<'_, Vec<Arc<dyn PartitionMap>>>> {
        self.maps
            .write()
            .map_err(|_| Error::custom("Registry lock poisoned"))
    }

    /// Register a map. A map whose name is already registered is left alone.
    pub fn register(&self, map: Arc<dyn PartitionMap>) -> Result<()> {
        let mut maps = self.write_maps()?;

        if maps.iter().any(|m| m.name() == map.name()) {
            tracing::debug!("Partition map already registered: {}", map.name());
            return Ok(());
        }

        tracing::info!("Registering partition map: {}", map.name());
        maps.push(map);
        Ok(())
    }

    /// Unregister a map by name. Unknown names are ignored.
    pub fn unregister(&self, name: &str) -> Result<()> {
        let mut maps = self.write_maps()?;

        let before = maps.len();
        maps.retain(|m| m.name() != name);

        if maps.len() == before {
            tracing::debug!("Partition map not registered: {}", name);
        } else {
            tracing::info!("Unregistered partition map: {}", name);
        }
        Ok(())
    }

    /// Get a map by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn PartitionMap>> {
        self.read_maps()?
            .iter()
            .find(|m| m.name() == name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("partition map {}", name)))
    }

    /// Names of all registered maps, in probe order
    pub fn names(&self) -> Result<Vec<&'static str>> {
        Ok(self.read_maps()?.iter().map(|m| m.name()).collect())
    }

    /// Try every registered map in order until one recognises the disk.
    ///
    /// A map failing with `BadPartitionTable` passes the disk on to the next
    /// one; any other error ends the probe. Returns the kind of the map that
    /// took the disk together with its iteration result.
    pub fn probe(
        &self,
        disk: &mut dyn Disk,
        parent: Option<&ParentPartition>,
        hook: &mut PartitionHook<'_>,
    ) -> Result<(PartitionMapKind, ControlFlow<()>)> {
        // The lock is not held while maps call back into the hook
        let maps: Vec<_> = self.read_maps()?.iter().cloned().collect();

        for map in maps {
            match map.iterate(disk, parent, &mut *hook) {
                Ok(flow) => {
                    tracing::debug!("{}: recognised as {}", disk.name(), map.name());
                    return Ok((map.kind(), flow));
                }
                Err(e) if e.is_bad_partition_table() => {
                    tracing::debug!("{}: not {}: {}", disk.name(), map.name(), e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::bad_partition_table("no partition map recognised"))
    }
}

impl Default for PartitionMapRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the `bsd`, `netbsd` and `openbsd` maps
pub fn register_bsd_maps(registry: &PartitionMapRegistry) -> Result<()> {
    for dialect in BsdDialect::ALL {
        registry.register(Arc::new(dialect))?;
    }
    Ok(())
}

/// Remove the maps added by [`register_bsd_maps`]
pub fn unregister_bsd_maps(registry: &PartitionMapRegistry) -> Result<()> {
    for dialect in BsdDialect::ALL {
        registry.unregister(dialect.kind().name())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsd::fixtures::{ImageBuilder, RecordingDisk};
    use disklabel_core::Partition;

    /// A map that always fails with a fixed error
    struct Failing {
        bad_table: bool,
    }

    impl PartitionMap for Failing {
        fn kind(&self) -> PartitionMapKind {
            PartitionMapKind::Other("failing")
        }

        fn iterate(
            &self,
            _disk: &mut dyn Disk,
            _parent: Option<&ParentPartition>,
            _hook: &mut PartitionHook<'_>,
        ) -> Result<ControlFlow<()>> {
            if self.bad_table {
                Err(Error::bad_partition_table("never matches"))
            } else {
                Err(Error::unsupported("broken map"))
            }
        }
    }

    fn bsd_registry() -> PartitionMapRegistry {
        let registry = PartitionMapRegistry::new();
        register_bsd_maps(&registry).unwrap();
        registry
    }

    #[test]
    fn test_register_in_order() {
        let registry = bsd_registry();
        assert_eq!(registry.names().unwrap(), vec!["bsd", "netbsd", "openbsd"]);
        assert_eq!(registry.get("netbsd").unwrap().kind(), PartitionMapKind::NetBsd);
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = bsd_registry();
        register_bsd_maps(&registry).unwrap();
        registry.register(Arc::new(BsdDialect::Bsd)).unwrap();
        assert_eq!(registry.names().unwrap().len(), 3);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = bsd_registry();

        registry.unregister("netbsd").unwrap();
        registry.unregister("netbsd").unwrap();
        registry.unregister("gpt").unwrap();
        assert_eq!(registry.names().unwrap(), vec!["bsd", "openbsd"]);

        unregister_bsd_maps(&registry).unwrap();
        assert!(registry.names().unwrap().is_empty());
        assert!(matches!(registry.get("bsd"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_probe_falls_through_bad_table() {
        let registry = PartitionMapRegistry::default();
        registry.register(Arc::new(Failing { bad_table: true })).unwrap();
        register_bsd_maps(&registry).unwrap();

        // Only a NetBSD slice; `bsd` finds no label at sector 1
        let mut disk = ImageBuilder::new(64)
            .mbr_slice(0, 0xA9, 32, 16)
            .label(33, &[(8, 34, 7)])
            .disk();

        let mut seen: Vec<Partition> = Vec::new();
        let (kind, flow) = registry
            .probe(&mut disk, None, &mut |_disk, p| {
                seen.push(p.clone());
                ControlFlow::Continue(())
            })
            .unwrap();

        assert_eq!(kind, PartitionMapKind::NetBsd);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name(), "netbsd1");
    }

    #[test]
    fn test_probe_stops_on_other_errors() {
        let registry = PartitionMapRegistry::new();
        registry.register(Arc::new(Failing { bad_table: false })).unwrap();
        register_bsd_maps(&registry).unwrap();

        let image = ImageBuilder::new(8).label(1, &[(8, 2, 7)]).disk();
        let mut disk = RecordingDisk::new(image);

        let err = registry
            .probe(&mut disk, None, &mut |_disk, _p| ControlFlow::Continue(()))
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert!(disk.reads().is_empty());
    }

    #[test]
    fn test_probe_nothing_recognised() {
        let registry = bsd_registry();
        let mut disk = ImageBuilder::new(8).disk();

        let err = registry
            .probe(&mut disk, None, &mut |_disk, _p| ControlFlow::Continue(()))
            .unwrap_err();
        assert!(err.is_bad_partition_table());
        assert!(err.to_string().contains("no partition map recognised"));
    }

    #[test]
    fn test_probe_empty_registry() {
        let registry = PartitionMapRegistry::new();
        let mut disk = ImageBuilder::new(8).label(1, &[(8, 2, 7)]).disk();

        let result = registry.probe(&mut disk, None, &mut |_disk, _p| ControlFlow::Continue(()));
        assert!(result.unwrap_err().is_bad_partition_table());
    }
}
