//! Validated loading of save records.
//!
//! Every fixed-size record goes through [`load_record`]; the variable-length friend list goes
//! through [`load_flex_record`]. Both check size, magic and schema version before handing out
//! the parsed value. Callers decide what to substitute on failure.

mod friend_list;

pub use self::friend_list::{
    FriendDirectory, FriendList, FriendListFull, FriendListRevision, FriendRecord,
};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::raw::{
    FRIEND_LIST_CAPACITY, MAGIC_ACCOUNT, MAGIC_CONFIG, MAGIC_MY_DATA, RecordHeader,
    SCHEMA_VERSION,
    account::{Account, Config, MyData},
};

/// A self-describing, fixed-size save record.
pub trait FixedRecord: FromBytes + IntoBytes + KnownLayout + Immutable + Sized {
    /// Magic number expected in the record header.
    const MAGIC: u32;

    /// Schema version expected in the record header.
    const VERSION: u32 = SCHEMA_VERSION;

    fn header(&self) -> &RecordHeader;

    /// Record used when the persisted one is missing or unusable.
    fn default_record() -> Self;

    /// Checks the header against [`Self::MAGIC`] and [`Self::VERSION`].
    fn verify(&self) -> Result<(), LoadError> {
        verify_header(self.header(), Self::MAGIC, Self::VERSION)
    }
}

impl FixedRecord for MyData {
    const MAGIC: u32 = MAGIC_MY_DATA;

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn default_record() -> Self {
        Self::default()
    }
}

impl FixedRecord for Account {
    const MAGIC: u32 = MAGIC_ACCOUNT;

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn default_record() -> Self {
        Self::default()
    }
}

impl FixedRecord for Config {
    const MAGIC: u32 = MAGIC_CONFIG;

    fn header(&self) -> &RecordHeader {
        &self.header
    }

    fn default_record() -> Self {
        Self::default()
    }
}

/// Parses a fixed-size record, requiring the exact record size.
pub fn load_record<T: FixedRecord>(bytes: &[u8]) -> Result<T, LoadError> {
    if bytes.len() != size_of::<T>() {
        return Err(LoadError::SizeMismatch {
            expected: size_of::<T>(),
            actual: bytes.len(),
        });
    }

    let record = T::read_from_bytes(bytes).map_err(|_| LoadError::SizeMismatch {
        expected: size_of::<T>(),
        actual: bytes.len(),
    })?;
    record.verify()?;

    Ok(record)
}

/// Parses a header followed by a whole number of `E` entries.
///
/// Returns the header and the entries. The entry count is derived from the file size and must
/// not exceed [`FRIEND_LIST_CAPACITY`].
pub fn load_flex_record<E>(bytes: &[u8], magic: u32) -> Result<(RecordHeader, Vec<E>), LoadError>
where
    E: FromBytes + KnownLayout + Immutable,
{
    let header_len = size_of::<RecordHeader>();
    let entry_len = size_of::<E>();

    if bytes.len() < header_len || (bytes.len() - header_len) % entry_len != 0 {
        return Err(LoadError::FlexSizeMismatch {
            header: header_len,
            entry: entry_len,
            actual: bytes.len(),
        });
    }

    let count = (bytes.len() - header_len) / entry_len;
    if count > FRIEND_LIST_CAPACITY {
        return Err(LoadError::TooManyEntries {
            count,
            capacity: FRIEND_LIST_CAPACITY,
        });
    }

    let (header, body) = RecordHeader::read_from_prefix(bytes).map_err(|_| {
        LoadError::FlexSizeMismatch {
            header: header_len,
            entry: entry_len,
            actual: bytes.len(),
        }
    })?;
    verify_header(&header, magic, SCHEMA_VERSION)?;

    let entries = body
        .chunks_exact(entry_len)
        .filter_map(|chunk| E::read_from_bytes(chunk).ok())
        .collect();

    Ok((header, entries))
}

fn verify_header(header: &RecordHeader, magic: u32, version: u32) -> Result<(), LoadError> {
    if header.magic.get() != magic {
        return Err(LoadError::BadMagic {
            expected: magic,
            actual: header.magic.get(),
        });
    }
    if header.version.get() != version {
        return Err(LoadError::BadVersion {
            expected: version,
            actual: header.version.get(),
        });
    }
    Ok(())
}

/// Error loading a save record.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Fixed-size record has the wrong length
    #[error("record size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Flexible record is not a header plus whole entries
    #[error("record size {actual} is not {header} + n * {entry} bytes")]
    FlexSizeMismatch {
        header: usize,
        entry: usize,
        actual: usize,
    },

    /// More entries than the list can hold
    #[error("{count} entries exceed the capacity of {capacity}")]
    TooManyEntries { count: usize, capacity: usize },

    /// Header magic does not identify this record
    #[error("bad magic: expected {expected:#010x}, got {actual:#010x}")]
    BadMagic { expected: u32, actual: u32 },

    /// Header carries an unsupported schema version
    #[error("bad schema version: expected {expected:#010x}, got {actual:#010x}")]
    BadVersion { expected: u32, actual: u32 },
}
