//! # Disklabel Zones
//!
//! Partition maps for BSD disklabels and the MBR slice table they live in.
//!
//! - **bsd**: BSD disklabel, plain or embedded in a FreeBSD slice
//! - **netbsd** / **openbsd**: disklabels found through their MBR slice
//! - **mbr**: the slice table itself, as far as the BSD maps need it
//!
//! ## Example
//!
//! ```rust,no_run
//! use disklabel_core::Disk;
//! use disklabel_pipeline::{open_image, DiskConfig};
//! use disklabel_zones::{register_bsd_maps, PartitionMapRegistry};
//! use std::ops::ControlFlow;
//! use std::path::Path;
//!
//! let mut disk = open_image(Path::new("disk.img"), &DiskConfig::default()).unwrap();
//!
//! let registry = PartitionMapRegistry::new();
//! register_bsd_maps(&registry).unwrap();
//!
//! let (kind, _) = registry
//!     .probe(&mut disk, None, &mut |disk, p| {
//!         println!("{},{} {}", disk.name(), p.name(), p);
//!         ControlFlow::Continue(())
//!     })
//!     .unwrap();
//! println!("Partition map: {}", kind);
//! ```

pub mod bsd;
pub mod mbr;
pub mod registry;

pub use bsd::{BsdDialect, BsdZoneTable};
pub use mbr::MbrZoneTable;
pub use registry::{register_bsd_maps, unregister_bsd_maps, PartitionMapRegistry};
