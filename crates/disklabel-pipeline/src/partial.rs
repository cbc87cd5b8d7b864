//! Partial pipeline - a window into a subset of a stream

use std::io::{self, Read, Seek, SeekFrom};

/// A stream that exposes only `length` bytes of `inner`, starting at `start`.
///
/// Used to present an MBR slice as a disk of its own, so that a label found
/// inside it is addressed relative to the slice.
///
/// # Example
///
/// ```rust
/// use disklabel_pipeline::PartialPipeline;
/// use std::io::{Cursor, Read};
///
/// let data: Vec<u8> = (0..100).collect();
/// let mut partial = PartialPipeline::new(Cursor::new(data), 20, 10).unwrap();
///
/// let mut buf = Vec::new();
/// partial.read_to_end(&mut buf).unwrap();
/// assert_eq!(buf, (20..30).collect::<Vec<u8>>());
/// ```
pub struct PartialPipeline<R: Read + Seek> {
    inner: R,
    start: u64,
    length: u64,
    position: u64,
}

impl<R: Read + Seek> PartialPipeline<R> {
    /// Create a new window of `length` bytes at `start`
    ///
    /// # Errors
    ///
    /// Returns an error if `start` is not reachable in `inner`
    pub fn new(mut inner: R, start: u64, length: u64) -> io::Result<Self> {
        inner.seek(SeekFrom::Start(start))?;

        Ok(Self {
            inner,
            start,
            length,
            position: 0,
        })
    }

    /// Offset of the window in the underlying stream
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Length of the window
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Current position within the window
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes left between the current position and the end of the window
    pub fn remaining(&self) -> u64 {
        self.length.saturating_sub(self.position)
    }

    /// Give back the underlying stream
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Read for PartialPipeline<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 {
            return Ok(0);
        }

        let to_read = usize::try_from(remaining).map_or(buf.len(), |r| buf.len().min(r));

        // Another window over the same stream may have moved it
        self.inner.seek(SeekFrom::Start(self.start + self.position))?;
        let bytes_read = self.inner.read(&mut buf[..to_read])?;
        self.position += bytes_read as u64;

        Ok(bytes_read)
    }
}

impl<R: Read + Seek> Seek for PartialPipeline<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(delta) => self.length.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
        };

        match new_pos {
            Some(pos) if pos <= self.length => {
                self.position = pos;
                Ok(pos)
            }
            Some(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Seek beyond end of partial pipeline",
            )),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Seek before beginning of partial pipeline",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn window() -> PartialPipeline<Cursor<Vec<u8>>> {
        let data: Vec<u8> = (0..100).collect();
        PartialPipeline::new(Cursor::new(data), 20, 10).unwrap()
    }

    #[test]
    fn test_partial_pipeline_basic() {
        let partial = window();
        assert_eq!(partial.start(), 20);
        assert_eq!(partial.length(), 10);
        assert_eq!(partial.position(), 0);
        assert_eq!(partial.remaining(), 10);
    }

    #[test]
    fn test_partial_pipeline_read_clamped() {
        let mut partial = window();
        let mut buf = [0u8; 20];

        let n = partial.read(&mut buf).unwrap();
        assert_eq!(n, 10);
        assert_eq!(&buf[..n], &[20, 21, 22, 23, 24, 25, 26, 27, 28, 29]);
        assert_eq!(partial.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_partial_pipeline_seek() {
        let mut partial = window();

        partial.seek(SeekFrom::Start(5)).unwrap();
        let mut buf = [0u8; 2];
        partial.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [25, 26]);

        partial.seek(SeekFrom::End(-3)).unwrap();
        assert_eq!(partial.position(), 7);
        partial.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [27, 28]);
    }

    #[test]
    fn test_partial_pipeline_seek_out_of_bounds() {
        let mut partial = window();
        assert!(partial.seek(SeekFrom::Start(15)).is_err());
        assert!(partial.seek(SeekFrom::Current(-1)).is_err());
        assert!(partial.seek(SeekFrom::Start(10)).is_ok());
    }

    #[test]
    fn test_partial_pipeline_over_borrowed_stream() {
        let data: Vec<u8> = (0..100).collect();
        let mut cursor = Cursor::new(data);
        {
            let mut partial = PartialPipeline::new(&mut cursor, 90, 10).unwrap();
            let mut buf = [0u8; 3];
            partial.read_exact(&mut buf).unwrap();
            assert_eq!(buf, [90, 91, 92]);
        }
        assert_eq!(cursor.position(), 93);
    }
}
