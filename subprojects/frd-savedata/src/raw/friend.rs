//! Friend identity, presence and friend-list entry layouts.
//!
//! [`FriendInfo`] is both the legacy on-disk friend-list entry and the structure handed to
//! applications over IPC. [`FriendEntry`] is the current on-disk entry: same field offsets,
//! millisecond timestamps instead of packed calendar ones.

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::{
    raw::{Comment, ScreenName, mii::ChecksummedMii},
    timestamp::{FormattedTimestamp, SystemTimestamp},
};

/// Number of UTF-16 units in a game mode description.
pub const GAME_MODE_DESCRIPTION_LEN: usize = 0x80;

/// Identifies a friend.
///
/// Two keys are equal when their principal ids are; the local friend code is ignored.
#[derive(Debug, Clone, Copy, Default, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FriendKey {
    pub principal_id: U32,
    pub _reserved: U32,
    pub local_friend_code: U64,
}

const_assert_eq!(size_of::<FriendKey>(), 0x10);

impl FriendKey {
    pub fn new(principal_id: u32, local_friend_code: u64) -> Self {
        Self {
            principal_id: U32::new(principal_id),
            _reserved: U32::ZERO,
            local_friend_code: U64::new(local_friend_code),
        }
    }
}

impl PartialEq for FriendKey {
    fn eq(&self, other: &Self) -> bool {
        self.principal_id == other.principal_id
    }
}

/// Where a user lives and which console they use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FriendProfile {
    pub region: u8,
    pub country: u8,
    pub area: u8,
    pub language: u8,
    pub platform: u8,
    pub _padding: [u8; 3],
}

const_assert_eq!(size_of::<FriendProfile>(), 0x8);

/// A title reference, used for the favorite game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct TitleData {
    pub title_id: U64,
    pub version: U32,
    pub _reserved: U32,
}

const_assert_eq!(size_of::<TitleData>(), 0x10);

/// Joinable session state advertised by a running title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GameMode {
    pub join_flags: U32,
    pub kind: U32,
    pub game_id: U32,
    pub game_mode: U32,
    pub host_principal_id: U32,
    pub gathering_id: U32,
    pub app_args: [u8; 20],
}

const_assert_eq!(size_of::<GameMode>(), 0x2C);

/// Presence reported for a friend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FriendPresence {
    pub game_mode: GameMode,
    pub _reserved: U32,
}

const_assert_eq!(size_of::<FriendPresence>(), 0x30);

/// Presence advertised by the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct MyPresence {
    pub game_mode: GameMode,
    pub description: [U16; GAME_MODE_DESCRIPTION_LEN],
}

const_assert_eq!(size_of::<MyPresence>(), 0x12C);

impl Default for MyPresence {
    fn default() -> Self {
        Self {
            game_mode: GameMode::default(),
            description: [U16::ZERO; GAME_MODE_DESCRIPTION_LEN],
        }
    }
}

/// Friend-list entry in its IPC shape (0x100 bytes).
#[derive(Debug, Clone, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FriendInfo {
    pub key: FriendKey,
    pub _padding1: U32,
    pub relationship: u8,
    pub profile: FriendProfile,
    pub _padding2: [u8; 3],
    pub favorite_game: TitleData,
    pub comment: Comment,
    pub _padding3: U64,
    pub added: FormattedTimestamp,
    pub updated: FormattedTimestamp,
    pub last_online: FormattedTimestamp,
    pub mii: ChecksummedMii,
    pub screen_name: ScreenName,
    pub _unknown: u8,
    pub character_set: u8,
    pub mii_changed: FormattedTimestamp,
    pub profile_changed: FormattedTimestamp,
    pub comment_changed: FormattedTimestamp,
}

// Verify struct size - https://www.3dbrew.org/wiki/FRD:GetFriendInfo
const_assert_eq!(size_of::<FriendInfo>(), 0x100);

/// Friend-list entry as written by current system versions (0x100 bytes).
#[derive(Debug, Clone, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct FriendEntry {
    pub key: FriendKey,
    pub _padding1: U32,
    pub relationship: u8,
    pub profile: FriendProfile,
    pub _padding2: [u8; 3],
    pub favorite_game: TitleData,
    pub comment: Comment,
    pub _padding3: U64,
    pub added: SystemTimestamp,
    pub updated: SystemTimestamp,
    pub last_online: SystemTimestamp,
    pub mii: ChecksummedMii,
    pub screen_name: ScreenName,
    pub _unknown: u8,
    pub character_set: u8,
    pub mii_changed: SystemTimestamp,
    pub profile_changed: SystemTimestamp,
    pub comment_changed: SystemTimestamp,
}

const_assert_eq!(size_of::<FriendEntry>(), 0x100);

#[cfg(test)]
mod tests {
    use core::mem::offset_of;

    use super::*;

    #[test]
    fn test_friend_key_equality_ignores_code() {
        assert_eq!(FriendKey::new(7, 1), FriendKey::new(7, 2));
        assert_ne!(FriendKey::new(7, 1), FriendKey::new(8, 1));
    }

    #[test]
    fn test_friend_info_offsets() {
        assert_eq!(offset_of!(FriendInfo, relationship), 0x14);
        assert_eq!(offset_of!(FriendInfo, profile), 0x15);
        assert_eq!(offset_of!(FriendInfo, favorite_game), 0x20);
        assert_eq!(offset_of!(FriendInfo, comment), 0x30);
        assert_eq!(offset_of!(FriendInfo, added), 0x58);
        assert_eq!(offset_of!(FriendInfo, mii), 0x70);
        assert_eq!(offset_of!(FriendInfo, screen_name), 0xD0);
        assert_eq!(offset_of!(FriendInfo, character_set), 0xE7);
        assert_eq!(offset_of!(FriendInfo, comment_changed), 0xF8);
    }

    #[test]
    fn test_revisions_share_offsets() {
        assert_eq!(offset_of!(FriendEntry, mii), offset_of!(FriendInfo, mii));
        assert_eq!(offset_of!(FriendEntry, screen_name), offset_of!(FriendInfo, screen_name));
        assert_eq!(offset_of!(FriendEntry, last_online), offset_of!(FriendInfo, last_online));
    }
}
