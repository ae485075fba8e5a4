//! Per-account records: `mydata`, `account` and the save-wide `config`.

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

use crate::raw::{
    Comment, LocalAccountId, MAGIC_ACCOUNT, MAGIC_CONFIG, MAGIC_MY_DATA, NascEnvironment,
    RecordHeader, ScreenName,
    friend::{FriendProfile, TitleData},
    mii::ChecksummedMii,
};

/// Own profile, preferences and Mii (0x120 bytes).
#[derive(Debug, Clone, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct MyData {
    pub header: RecordHeader,
    pub nc_principal_id: U32,
    pub _unknown14: U32,
    pub changed_bit_flags: U32,
    pub public_mode: u8,
    pub public_game_name: u8,
    pub public_played_game: u8,
    pub _padding1: u8,
    pub favorite_game: TitleData,
    pub comment: Comment,
    pub _padding2: U64,
    pub profile: FriendProfile,
    pub local_friend_code_seed: U64,
    pub _unknown68: [U16; 13],
    /// Console serial number, UTF-16
    pub serial_number: [U16; 16],
    pub screen_name: ScreenName,
    pub _padding3: [u8; 3],
    pub mii: ChecksummedMii,
    pub _padding4: [u8; 5],
}

const_assert_eq!(size_of::<MyData>(), 0x120);

impl Default for MyData {
    fn default() -> Self {
        Self {
            header: RecordHeader::new(MAGIC_MY_DATA),
            nc_principal_id: U32::ZERO,
            _unknown14: U32::ZERO,
            changed_bit_flags: U32::ZERO,
            public_mode: 0,
            public_game_name: 0,
            public_played_game: 0,
            _padding1: 0,
            favorite_game: TitleData::default(),
            comment: Comment::default(),
            _padding2: U64::ZERO,
            profile: FriendProfile::default(),
            local_friend_code_seed: U64::ZERO,
            _unknown68: [U16::ZERO; 13],
            serial_number: [U16::ZERO; 16],
            screen_name: ScreenName::default(),
            _padding3: [0; 3],
            mii: ChecksummedMii::default(),
            _padding4: [0; 5],
        }
    }
}

impl MyData {
    /// Serial number as it is sent to the authentication server.
    pub fn serial_number(&self) -> String {
        crate::raw::utf16_to_string(&self.serial_number)
    }
}

/// Online identity and credentials of the active account (0x58 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Account {
    pub header: RecordHeader,
    pub local_account_id: u8,
    pub _padding1: [u8; 3],
    pub principal_id: U32,
    pub local_friend_code: U64,
    /// NEX server password, UTF-16
    pub nex_password: [U16; 16],
    pub _unknown40: U16,
    /// HMAC of the principal id, UTF-16 hex
    pub principal_id_hmac: [U16; 9],
    pub nasc_environment: u8,
    pub server_type_1: u8,
    pub server_type_2: u8,
    pub _padding2: u8,
}

const_assert_eq!(size_of::<Account>(), 0x58);

impl Default for Account {
    fn default() -> Self {
        Self {
            header: RecordHeader::new(MAGIC_ACCOUNT),
            local_account_id: LocalAccountId::default() as u8,
            _padding1: [0; 3],
            principal_id: U32::ZERO,
            local_friend_code: U64::ZERO,
            nex_password: [U16::ZERO; 16],
            _unknown40: U16::ZERO,
            principal_id_hmac: [U16::ZERO; 9],
            nasc_environment: NascEnvironment::default() as u8,
            server_type_1: 0,
            server_type_2: 0,
            _padding2: 0,
        }
    }
}

impl Account {
    pub fn nex_password(&self) -> String {
        crate::raw::utf16_to_string(&self.nex_password)
    }

    pub fn principal_id_hmac(&self) -> String {
        crate::raw::utf16_to_string(&self.principal_id_hmac)
    }

    /// Unknown environment bytes fall back to production.
    pub fn nasc_environment(&self) -> NascEnvironment {
        NascEnvironment::try_from(self.nasc_environment).unwrap_or_default()
    }
}

/// Save-wide configuration (0x11 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct Config {
    pub header: RecordHeader,
    pub local_account_id: u8,
}

const_assert_eq!(size_of::<Config>(), 0x11);

impl Default for Config {
    fn default() -> Self {
        Self {
            header: RecordHeader::new(MAGIC_CONFIG),
            local_account_id: LocalAccountId::default() as u8,
        }
    }
}

impl Config {
    /// Unknown ids fall back to the production account.
    pub fn local_account_id(&self) -> LocalAccountId {
        LocalAccountId::try_from(self.local_account_id).unwrap_or_default()
    }

    pub fn set_local_account_id(&mut self, id: LocalAccountId) {
        self.local_account_id = id as u8;
    }
}
