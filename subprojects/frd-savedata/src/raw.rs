//! Raw binary structure definitions for the friend services save data.
//!
//! This module contains zero-copy struct definitions using the `zerocopy` crate.
//! All structures are defined with `#[repr(C)]`, use align-1 little-endian integer types and
//! spell out padding explicitly, so every field sits at the offset the console uses.
//!
//! Use these types when you need direct access to binary fields without parsing overhead.
//! For validated loading with error handling, see the `read` module.

pub mod account;
pub mod auth;
pub mod friend;
pub mod mii;

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

/// Schema version shared by every top-level record.
pub const SCHEMA_VERSION: u32 = 0x2010_1021;

/// `FPMD`
pub const MAGIC_MY_DATA: u32 = 0x444D_5046;
/// `FPAC`
pub const MAGIC_ACCOUNT: u32 = 0x4341_5046;
/// `FPFL`
pub const MAGIC_FRIEND_LIST: u32 = 0x4C46_5046;
/// `FPCF`
pub const MAGIC_CONFIG: u32 = 0x4643_5046;

/// Maximum number of entries a friend list can hold.
pub const FRIEND_LIST_CAPACITY: usize = 100;

/// Screen name length in UTF-16 units, including the terminator.
pub const SCREEN_NAME_LEN: usize = 11;

/// Comment length in UTF-16 units, including the terminator.
pub const COMMENT_LEN: usize = 16;

/// Header prepended to every save record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct RecordHeader {
    pub magic: U32,
    pub version: U32,
    pub _reserved: [u8; 8],
}

const_assert_eq!(size_of::<RecordHeader>(), 0x10);

impl RecordHeader {
    pub fn new(magic: u32) -> Self {
        Self {
            magic: U32::new(magic),
            version: U32::new(SCHEMA_VERSION),
            _reserved: [0; 8],
        }
    }
}

/// UTF-16 screen name as stored on disk and returned over IPC.
pub type ScreenName = [U16; SCREEN_NAME_LEN];

const_assert_eq!(size_of::<ScreenName>(), 0x16);

/// UTF-16 comment shown on the friend card.
pub type Comment = [U16; COMMENT_LEN];

const_assert_eq!(size_of::<Comment>(), 0x20);

/// Encodes `s` as NUL-padded UTF-16, truncating to leave room for a terminator.
pub fn utf16_from_str<const N: usize>(s: &str) -> [U16; N] {
    let mut out = [U16::ZERO; N];
    for (slot, unit) in out.iter_mut().take(N.saturating_sub(1)).zip(s.encode_utf16()) {
        *slot = U16::new(unit);
    }
    out
}

/// Decodes NUL-terminated UTF-16, replacing invalid sequences.
pub fn utf16_to_string(units: &[U16]) -> String {
    let units: Vec<u16> = units
        .iter()
        .map(|unit| unit.get())
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Selects which account directory of the save area is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LocalAccountId {
    #[default]
    Prod = 1,
    Test = 2,
    Dev = 3,
}

impl TryFrom<u8> for LocalAccountId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Prod),
            2 => Ok(Self::Test),
            3 => Ok(Self::Dev),
            other => Err(other),
        }
    }
}

/// NASC server an account authenticates against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NascEnvironment {
    #[default]
    Prod = 0,
    Test = 1,
    Dev = 2,
}

impl TryFrom<u8> for NascEnvironment {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Prod),
            1 => Ok(Self::Test),
            2 => Ok(Self::Dev),
            other => Err(other),
        }
    }
}

/// Font set needed to render a screen name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum CharacterSet {
    #[default]
    JapanUsaEuropeAustralia = 0,
    Korea = 1,
    China = 2,
    Taiwan = 3,
}

impl TryFrom<u8> for CharacterSet {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::JapanUsaEuropeAustralia),
            1 => Ok(Self::Korea),
            2 => Ok(Self::China),
            3 => Ok(Self::Taiwan),
            other => Err(other),
        }
    }
}

/// State of the friendship as seen by the local console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum FriendRelationship {
    #[default]
    Incomplete = 0,
    Complete = 1,
    NotFound = 2,
    Deleted = 3,
    LocalOnly = 4,
}

impl TryFrom<u8> for FriendRelationship {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Incomplete),
            1 => Ok(Self::Complete),
            2 => Ok(Self::NotFound),
            3 => Ok(Self::Deleted),
            4 => Ok(Self::LocalOnly),
            other => Err(other),
        }
    }
}

bitflags::bitflags! {
    /// Attribute bits reported per friend.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct AttributeFlags: u32 {
        /// Both sides registered each other.
        const ESTABLISHED = 1 << 0;
        /// Registered locally, waiting for the other side.
        const PROVISIONAL = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magics_spell_their_tags() {
        assert_eq!(&MAGIC_MY_DATA.to_le_bytes(), b"FPMD");
        assert_eq!(&MAGIC_ACCOUNT.to_le_bytes(), b"FPAC");
        assert_eq!(&MAGIC_FRIEND_LIST.to_le_bytes(), b"FPFL");
        assert_eq!(&MAGIC_CONFIG.to_le_bytes(), b"FPCF");
    }

    #[test]
    fn test_header_bytes() {
        let header = RecordHeader::new(MAGIC_CONFIG);
        let bytes = header.as_bytes();
        assert_eq!(&bytes[0..4], b"FPCF");
        assert_eq!(&bytes[4..8], &SCHEMA_VERSION.to_le_bytes());
        assert_eq!(&bytes[8..], &[0u8; 8]);
    }

    #[test]
    fn test_utf16_truncates_and_terminates() {
        let name: ScreenName = utf16_from_str("ABCDEFGHIJKLMNOP");
        assert_eq!(name[10].get(), 0);
        assert_eq!(utf16_to_string(&name), "ABCDEFGHIJ");

        let short: ScreenName = utf16_from_str("Ann");
        assert_eq!(utf16_to_string(&short), "Ann");
    }

    #[test]
    fn test_enum_conversions() {
        assert_eq!(LocalAccountId::try_from(2), Ok(LocalAccountId::Test));
        assert_eq!(LocalAccountId::try_from(0), Err(0));
        assert_eq!(NascEnvironment::try_from(2), Ok(NascEnvironment::Dev));
        assert_eq!(CharacterSet::try_from(3), Ok(CharacterSet::Taiwan));
        assert_eq!(FriendRelationship::try_from(4), Ok(FriendRelationship::LocalOnly));
        assert_eq!(FriendRelationship::try_from(5), Err(5));
    }
}
