//! Sector-addressed disks over byte streams

use crate::{MmapPipeline, PartialPipeline};
use disklabel_core::{
    checked_add_u64, checked_multiply_u64, Disk, Error, ReadSeek, Result, SECTOR_SIZE,
};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Configuration for opening an image
#[derive(Debug, Clone)]
pub struct DiskConfig {
    /// Memory-map regular files instead of reading through the file handle
    pub use_mmap: bool,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self { use_mmap: true }
    }
}

/// A [`Disk`] backed by any seekable byte stream
///
/// # Example
///
/// ```rust
/// use disklabel_core::Disk;
/// use disklabel_pipeline::StreamDisk;
/// use std::io::Cursor;
///
/// let mut disk = StreamDisk::new("mem", Cursor::new(vec![0u8; 4096]));
/// assert_eq!(disk.total_sectors(), Some(8));
///
/// let mut buf = [0u8; 16];
/// disk.read(1, 148, &mut buf).unwrap();
/// ```
pub struct StreamDisk<R: Read + Seek> {
    name: String,
    stream: R,
    length: Option<u64>,
}

/// An image opened from the filesystem by [`open_image`]
pub type ImageDisk = StreamDisk<Box<dyn ReadSeek>>;

impl<R: Read + Seek> StreamDisk<R> {
    /// Wrap a stream, measuring its length by seeking to the end
    pub fn new(name: impl Into<String>, mut stream: R) -> Self {
        let length = stream.seek(SeekFrom::End(0)).ok();
        Self {
            name: name.into(),
            stream,
            length,
        }
    }

    /// Wrap a stream whose length is already known
    pub fn with_length(name: impl Into<String>, stream: R, length: u64) -> Self {
        Self {
            name: name.into(),
            stream,
            length: Some(length),
        }
    }

    /// Length of the disk in bytes, if known
    pub fn length(&self) -> Option<u64> {
        self.length
    }

    /// Give back the underlying stream
    pub fn into_inner(self) -> R {
        self.stream
    }

    /// Borrow a disk that covers only `length` sectors starting at `start`.
    ///
    /// Sector 0 of the returned disk is sector `start` of this one. Reads past
    /// the end of the window fail.
    pub fn scoped(
        &mut self,
        name: impl Into<String>,
        start: u64,
        length: u64,
    ) -> Result<StreamDisk<PartialPipeline<&mut R>>> {
        let byte_start = checked_multiply_u64(start, SECTOR_SIZE, "slice start")?;
        let byte_length = checked_multiply_u64(length, SECTOR_SIZE, "slice length")?;

        let window = PartialPipeline::new(&mut self.stream, byte_start, byte_length)?;
        Ok(StreamDisk::with_length(name, window, byte_length))
    }
}

impl<R: Read + Seek> Disk for StreamDisk<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, sector: u64, offset: usize, buf: &mut [u8]) -> Result<()> {
        let base = checked_multiply_u64(sector, SECTOR_SIZE, "read position")?;
        let position = checked_add_u64(base, offset as u64, "read position")?;

        self.stream
            .seek(SeekFrom::Start(position))
            .and_then(|_| self.stream.read_exact(buf))
            .map_err(|e| {
                tracing::debug!(
                    "{}: read of {} bytes at sector {} offset {} failed: {}",
                    self.name,
                    buf.len(),
                    sector,
                    offset,
                    e
                );
                Error::read(sector, offset, e)
            })
    }

    fn total_sectors(&self) -> Option<u64> {
        self.length.map(|len| len / SECTOR_SIZE)
    }
}

/// Open an image file or block device as a [`Disk`]
///
/// Regular files are memory-mapped when `config.use_mmap` is set; anything
/// else (block devices, or mmap disabled) is read through the file handle.
pub fn open_image(path: &Path, config: &DiskConfig) -> Result<ImageDisk> {
    let file = File::open(path)?;
    let name = path.display().to_string();
    let is_file = file.metadata()?.is_file();

    let stream: Box<dyn ReadSeek> = if config.use_mmap && is_file {
        Box::new(MmapPipeline::from_file(&file)?)
    } else {
        Box::new(file)
    };

    tracing::debug!(
        "Opened {} ({})",
        name,
        if config.use_mmap && is_file { "mmap" } else { "file" }
    );

    Ok(StreamDisk::new(name, stream))
}
