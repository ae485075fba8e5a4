//! Protocol constants and types for the friend services.

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::U16};

/// User-facing friend service.
pub const SERVICE_NAME_USER: &str = "frd:u";

/// Administrative friend service, a superset of `frd:u`.
pub const SERVICE_NAME_ADMIN: &str = "frd:a";

/// Maximum number of sessions per service.
pub const MAX_SESSIONS: u32 = 8;

/// Notification mask in effect until a title sets one.
pub const DEFAULT_NOTIFICATION_MASK: u32 = 0xF7;

pub const CMD_HAS_LOGGED_IN: u16 = 0x0001;
pub const CMD_IS_ONLINE: u16 = 0x0002;
pub const CMD_LOGIN: u16 = 0x0003;
pub const CMD_LOGOUT: u16 = 0x0004;
pub const CMD_GET_MY_FRIEND_KEY: u16 = 0x0005;
pub const CMD_GET_MY_PREFERENCE: u16 = 0x0006;
pub const CMD_GET_MY_PROFILE: u16 = 0x0007;
pub const CMD_GET_MY_PRESENCE: u16 = 0x0008;
pub const CMD_GET_MY_SCREEN_NAME: u16 = 0x0009;
pub const CMD_GET_MY_MII: u16 = 0x000A;
pub const CMD_GET_MY_LOCAL_ACCOUNT_ID: u16 = 0x000B;
pub const CMD_GET_MY_FAVORITE_GAME: u16 = 0x000D;
pub const CMD_GET_MY_NC_PRINCIPAL_ID: u16 = 0x000E;
pub const CMD_GET_MY_COMMENT: u16 = 0x000F;
pub const CMD_GET_MY_PASSWORD: u16 = 0x0010;
pub const CMD_GET_FRIEND_KEY_LIST: u16 = 0x0011;
pub const CMD_GET_FRIEND_PRESENCE: u16 = 0x0012;
pub const CMD_GET_FRIEND_SCREEN_NAME: u16 = 0x0013;
pub const CMD_GET_FRIEND_MII: u16 = 0x0014;
pub const CMD_GET_FRIEND_PROFILE: u16 = 0x0015;
pub const CMD_GET_FRIEND_RELATIONSHIP: u16 = 0x0016;
pub const CMD_GET_FRIEND_ATTRIBUTE_FLAGS: u16 = 0x0017;
pub const CMD_GET_FRIEND_FAVORITE_GAME: u16 = 0x0019;
pub const CMD_GET_FRIEND_INFO: u16 = 0x001A;
pub const CMD_IS_INCLUDED_IN_FRIEND_LIST: u16 = 0x001B;
pub const CMD_UNSCRAMBLE_LOCAL_FRIEND_CODE: u16 = 0x001C;
pub const CMD_UPDATE_GAME_MODE_DESCRIPTION: u16 = 0x001D;
pub const CMD_UPDATE_GAME_MODE: u16 = 0x001E;
pub const CMD_ATTACH_TO_EVENT_NOTIFICATION: u16 = 0x0020;
pub const CMD_SET_NOTIFICATION_MASK: u16 = 0x0021;
pub const CMD_GET_LAST_RESPONSE_RESULT: u16 = 0x0023;
pub const CMD_PRINCIPAL_ID_TO_FRIEND_CODE: u16 = 0x0024;
pub const CMD_FRIEND_CODE_TO_PRINCIPAL_ID: u16 = 0x0025;
pub const CMD_IS_VALID_FRIEND_CODE: u16 = 0x0026;
pub const CMD_REQUEST_GAME_AUTHENTICATION: u16 = 0x0028;
pub const CMD_GET_GAME_AUTHENTICATION_DATA: u16 = 0x0029;
pub const CMD_GET_SERVER_TYPES: u16 = 0x0030;
pub const CMD_GET_FRIEND_COMMENT: u16 = 0x0031;
pub const CMD_SET_CLIENT_SDK_VERSION: u16 = 0x0032;
/// `frd:a` only
pub const CMD_SET_LOCAL_ACCOUNT_ID: u16 = 0x0403;

/// Screen name as passed in request words: 11 units plus one unit of padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct ScreenNameArg {
    pub name: [U16; 12],
}

const_assert_eq!(size_of::<ScreenNameArg>(), 0x18);

impl ScreenNameArg {
    pub fn to_string_lossy(&self) -> String {
        frd_savedata::raw::utf16_to_string(&self.name)
    }
}
