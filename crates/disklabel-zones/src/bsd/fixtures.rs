//! Disk images and instrumented disks for the disklabel tests

use super::types::{ENTRY_SIZE, LABEL_HEADER_SIZE, LABEL_MAGIC};
use crate::mbr::{PARTITION_ENTRY_SIZE, PARTITION_TABLE_OFFSET};
use disklabel_core::{Disk, Error, Result, SECTOR_SIZE};
use disklabel_pipeline::StreamDisk;
use std::io::{self, Cursor};

/// Builds a zero-filled image sector by sector
pub struct ImageBuilder {
    data: Vec<u8>,
}

impl ImageBuilder {
    pub fn new(sectors: usize) -> Self {
        Self {
            data: vec![0u8; sectors * SECTOR_SIZE as usize],
        }
    }

    /// Set MBR slot `index` and the boot signature
    pub fn mbr_slice(mut self, index: usize, type_byte: u8, start: u32, length: u32) -> Self {
        let entry = PARTITION_TABLE_OFFSET + index * PARTITION_ENTRY_SIZE;
        self.data[entry + 4] = type_byte;
        self.data[entry + 8..entry + 12].copy_from_slice(&start.to_le_bytes());
        self.data[entry + 12..entry + 16].copy_from_slice(&length.to_le_bytes());
        self.data[0x1FE] = 0x55;
        self.data[0x1FF] = 0xAA;
        self
    }

    /// Write a label at `sector` whose entries are `(size, offset, fs_type)`
    pub fn label(self, sector: u64, entries: &[(u32, u32, u8)]) -> Self {
        let count = u16::try_from(entries.len()).expect("too many entries");
        self.label_with_count(sector, count, entries)
    }

    /// Write a label with an explicit `d_npartitions`
    pub fn label_with_count(mut self, sector: u64, count: u16, entries: &[(u32, u32, u8)]) -> Self {
        let base = sector as usize * SECTOR_SIZE as usize;
        self.data[base..base + 4].copy_from_slice(&LABEL_MAGIC.to_le_bytes());
        self.data[base + 132..base + 136].copy_from_slice(&LABEL_MAGIC.to_le_bytes());
        self.data[base + 138..base + 140].copy_from_slice(&count.to_le_bytes());

        for (i, (size, offset, fs_type)) in entries.iter().enumerate() {
            let at = base + LABEL_HEADER_SIZE + i * ENTRY_SIZE;
            self.data[at..at + 4].copy_from_slice(&size.to_le_bytes());
            self.data[at + 4..at + 8].copy_from_slice(&offset.to_le_bytes());
            self.data[at + 12] = *fs_type;
        }
        self
    }

    pub fn bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn disk(self) -> StreamDisk<Cursor<Vec<u8>>> {
        StreamDisk::new("test.img", Cursor::new(self.data))
    }
}

/// Wraps a disk, records every read and optionally fails reads past a byte position
pub struct RecordingDisk<D: Disk> {
    inner: D,
    reads: Vec<(u64, usize, usize)>,
    fail_from: Option<u64>,
}

impl<D: Disk> RecordingDisk<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            reads: Vec::new(),
            fail_from: None,
        }
    }

    /// Fail any read that touches bytes at or beyond `pos`
    pub fn fail_from(mut self, pos: u64) -> Self {
        self.fail_from = Some(pos);
        self
    }

    /// `(sector, offset, len)` of every read so far
    pub fn reads(&self) -> &[(u64, usize, usize)] {
        &self.reads
    }
}

impl<D: Disk> Disk for RecordingDisk<D> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn read(&mut self, sector: u64, offset: usize, buf: &mut [u8]) -> Result<()> {
        self.reads.push((sector, offset, buf.len()));

        let end = sector * SECTOR_SIZE + offset as u64 + buf.len() as u64;
        if matches!(self.fail_from, Some(limit) if end > limit) {
            return Err(Error::read(
                sector,
                offset,
                io::Error::new(io::ErrorKind::Other, "injected failure"),
            ));
        }

        self.inner.read(sector, offset, buf)
    }
}
