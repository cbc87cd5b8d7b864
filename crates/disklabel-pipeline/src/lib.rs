//! # Disklabel Pipeline
//!
//! I/O plumbing between image files and the partition maps.
//!
//! - **StreamDisk**: the [`Disk`](disklabel_core::Disk) implementation over any `Read + Seek`
//! - **PartialPipeline**: window into a subset of a stream (for slices)
//! - **MmapPipeline**: memory-mapped image access
//!
//! ## Example
//!
//! ```rust,no_run
//! use disklabel_core::Disk;
//! use disklabel_pipeline::{open_image, DiskConfig};
//! use std::path::Path;
//!
//! let mut disk = open_image(Path::new("disk.img"), &DiskConfig::default()).unwrap();
//!
//! // Read the BSD label sector
//! let mut buf = [0u8; 512];
//! disk.read(1, 0, &mut buf).unwrap();
//!
//! // Scope a second disk to a slice starting at sector 63
//! let mut slice = disk.scoped("disk.img,msdos1", 63, 2048).unwrap();
//! slice.read(0, 0, &mut buf).unwrap();
//! ```

pub mod disk;
pub mod mmap;
pub mod partial;

pub use disk::{open_image, DiskConfig, ImageDisk, StreamDisk};
pub use mmap::MmapPipeline;
pub use partial::PartialPipeline;
