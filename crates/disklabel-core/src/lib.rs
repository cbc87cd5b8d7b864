//! # Disklabel Core
//!
//! Core traits, types, and error handling shared by the disklabel crates.
//!
//! - **Disk**: sector-addressed read access to an image or device
//! - **PartitionMap**: a format that enumerates partitions through a hook
//! - **ZoneTable**: a fully-read partition table
//!
//! ## Example
//!
//! ```rust,no_run
//! use disklabel_core::{Disk, Partition, PartitionMap, Result};
//! use std::ops::ControlFlow;
//!
//! fn list(map: &dyn PartitionMap, disk: &mut dyn Disk) -> Result<Vec<Partition>> {
//!     let mut found = Vec::new();
//!     map.iterate(disk, None, &mut |_disk, p| {
//!         found.push(p.clone());
//!         ControlFlow::Continue(())
//!     })?;
//!     Ok(found)
//! }
//! ```

pub mod error;
pub mod security;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use error::{Error, Result};
pub use security::*;
pub use traits::{Disk, PartitionHook, PartitionMap, ReadSeek, ZoneTable};
pub use types::{
    format_size, ParentPartition, Partition, PartitionMapKind, Zone, SECTOR_SIZE,
};
