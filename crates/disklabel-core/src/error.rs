//! Disklabel error types

use thiserror::Error;

/// The main error type for partition map operations
#[derive(Error, Debug)]
pub enum Error {
    /// The partition table is missing, malformed, or not usable in this context.
    ///
    /// This is the kind a caller probing several maps should fall through on.
    #[error("Bad partition table: {0}")]
    BadPartitionTable(String),

    /// A device read failed
    #[error("Read error at sector {sector} offset {offset}: {source}")]
    Read {
        sector: u64,
        offset: usize,
        #[source]
        source: std::io::Error,
    },

    /// I/O error outside of a sector read (opening, mapping)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arithmetic on on-disk values overflowed
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Unsupported format or feature
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Partition map or partition not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid path or file name
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for partition map operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error from a string
    pub fn custom(msg: impl Into<String>) -> Self {
        Error::Custom(msg.into())
    }

    /// Create a bad partition table error
    pub fn bad_partition_table(msg: impl Into<String>) -> Self {
        Error::BadPartitionTable(msg.into())
    }

    /// Create a read error for the given disk position
    pub fn read(sector: u64, offset: usize, source: std::io::Error) -> Self {
        Error::Read {
            sector,
            offset,
            source,
        }
    }

    /// Create an overflow error
    pub fn overflow(msg: impl Into<String>) -> Self {
        Error::Overflow(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create an unsupported error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Error::Unsupported(msg.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Error::InvalidPath(msg.into())
    }

    /// True if this is a [`Error::BadPartitionTable`]
    pub fn is_bad_partition_table(&self) -> bool {
        matches!(self, Error::BadPartitionTable(_))
    }
}
