//! Game server authentication records.

use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, little_endian::*};

/// Capacity of the server address field, including the terminator.
pub const SERVER_ADDRESS_LEN: usize = 32;

/// Capacity of the token field, including the terminator.
pub const AUTH_TOKEN_LEN: usize = 256;

/// Outcome of the last game authentication request (0x138 bytes).
///
/// String fields are NUL-terminated ASCII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct GameAuthenticationData {
    /// Server result code; 1 on success
    pub result: I32,
    pub http_status_code: I32,
    pub server_address: [u8; SERVER_ADDRESS_LEN],
    pub server_port: U16,
    pub _padding: U16,
    pub _unused: U32,
    pub auth_token: [u8; AUTH_TOKEN_LEN],
    /// Server time in seconds
    pub server_time: U64,
}

// Verify struct size - https://www.3dbrew.org/wiki/FRDU:GetGameAuthenticationData
const_assert_eq!(size_of::<GameAuthenticationData>(), 0x138);

impl Default for GameAuthenticationData {
    fn default() -> Self {
        Self {
            result: I32::ZERO,
            http_status_code: I32::ZERO,
            server_address: [0; SERVER_ADDRESS_LEN],
            server_port: U16::ZERO,
            _padding: U16::ZERO,
            _unused: U32::ZERO,
            auth_token: [0; AUTH_TOKEN_LEN],
            server_time: U64::ZERO,
        }
    }
}

impl GameAuthenticationData {
    /// Stores `address`, truncated to leave room for the terminator.
    pub fn set_server_address(&mut self, address: &str) {
        self.server_address = [0; SERVER_ADDRESS_LEN];
        copy_truncated(&mut self.server_address, address.as_bytes());
    }

    /// Stores `token`, truncated to leave room for the terminator.
    pub fn set_auth_token(&mut self, token: &str) {
        self.auth_token = [0; AUTH_TOKEN_LEN];
        copy_truncated(&mut self.auth_token, token.as_bytes());
    }

    pub fn server_address(&self) -> &[u8] {
        until_nul(&self.server_address)
    }

    pub fn auth_token(&self) -> &[u8] {
        until_nul(&self.auth_token)
    }
}

fn copy_truncated(dst: &mut [u8], src: &[u8]) {
    let len = src.len().min(dst.len() - 1);
    dst[..len].copy_from_slice(&src[..len]);
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}

/// Signed local friend code seed certificate (0x110 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C)]
pub struct LocalFriendCodeSeedB {
    pub signature: [u8; 0x100],
    pub _reserved: U64,
    pub seed: U64,
}

// Verify struct size - https://www.3dbrew.org/wiki/Nandrw/sys/LocalFriendCodeSeed_B
const_assert_eq!(size_of::<LocalFriendCodeSeedB>(), 0x110);

impl Default for LocalFriendCodeSeedB {
    fn default() -> Self {
        Self {
            signature: [0; 0x100],
            _reserved: U64::ZERO,
            seed: U64::ZERO,
        }
    }
}
