//! Memory-mapped image access

use disklabel_core::MAX_MMAP_SIZE;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// A read-only, seekable view of a memory-mapped image file.
///
/// Partition maps issue many small reads (one per label entry), so mapping
/// the image avoids a syscall per entry.
///
/// # Example
///
/// ```rust,no_run
/// use disklabel_pipeline::MmapPipeline;
/// use std::path::Path;
///
/// let pipeline = MmapPipeline::open(Path::new("disk.img")).unwrap();
/// println!("{} bytes mapped", pipeline.len());
/// ```
pub struct MmapPipeline {
    mmap: Mmap,
    position: u64,
}

impl MmapPipeline {
    /// Open and map an image file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not a regular file,
    /// exceeds [`MAX_MMAP_SIZE`], or cannot be mapped.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Self::from_file(&file)
    }

    /// Map an already-open image file
    ///
    /// # Safety
    ///
    /// Uses `unsafe` for the mapping itself. Only regular files are mapped,
    /// the mapping is read-only, and the file must not be truncated while
    /// the pipeline is alive (caller responsibility).
    pub fn from_file(file: &File) -> io::Result<Self> {
        let metadata = file.metadata()?;

        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Only regular files can be memory-mapped",
            ));
        }

        if metadata.len() > MAX_MMAP_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "File size {} exceeds memory mapping limit {}",
                    metadata.len(),
                    MAX_MMAP_SIZE
                ),
            ));
        }

        // SAFETY: regular file, bounded size, read-only private mapping.
        let mmap = unsafe { Mmap::map(file)? };
        Ok(Self { mmap, position: 0 })
    }

    /// Length of the mapped region
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Check if the mapped region is empty
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.position
    }
}

impl Read for MmapPipeline {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.len() {
            return Ok(0);
        }

        let start = self.position as usize;
        let to_read = buf.len().min(self.mmap.len() - start);

        buf[..to_read].copy_from_slice(&self.mmap[start..start + to_read]);
        self.position += to_read as u64;

        Ok(to_read)
    }
}

impl Seek for MmapPipeline {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        // Seeking past the end is allowed; reads there return EOF
        match new_pos {
            Some(pos) => {
                self.position = pos;
                Ok(pos)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Seek before beginning of mapping",
            )),
        }
    }
}
