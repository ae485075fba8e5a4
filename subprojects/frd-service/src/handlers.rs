//! Command handlers.
//!
//! Each handler parses a fixed-shape request, answers from the module state and returns a
//! fixed-shape response. Bulk friend queries clamp the requested count to the friend list
//! capacity and default-fill entries for unknown keys.

mod account;
mod auth;
mod codes;
mod friends;
mod notification;
mod presence;

use frd_savedata::raw::{FRIEND_LIST_CAPACITY, friend::FriendKey};
use zerocopy::{FromBytes, Immutable, IntoBytes};

pub(crate) use self::{account::*, auth::*, codes::*, friends::*, notification::*, presence::*};
use crate::{
    ipc::{RequestParser, Response},
    module::Module,
};

/// Signature shared by every command handler.
pub(crate) type Handler = fn(&mut Module, &mut RequestParser) -> Response;

/// Clamps a caller-supplied entry count to the friend list capacity.
fn bounded_count(count: u32) -> usize {
    (count as usize).min(FRIEND_LIST_CAPACITY)
}

/// Pops the static buffer holding `count` friend keys.
///
/// # Panics
/// If the buffer is not exactly `count` keys long.
fn pop_friend_keys(rp: &mut RequestParser, count: usize) -> Vec<FriendKey> {
    let buffer = rp.pop_static_buffer();
    assert_eq!(
        buffer.len(),
        count * size_of::<FriendKey>(),
        "command {:#06x}: friend key buffer size mismatch",
        rp.command_id()
    );
    buffer
        .chunks_exact(size_of::<FriendKey>())
        .filter_map(|chunk| FriendKey::read_from_bytes(chunk).ok())
        .collect()
}

/// Concatenates one fixed-size value per key.
fn per_key<T, F>(keys: &[FriendKey], mut value: F) -> Vec<u8>
where
    T: IntoBytes + Immutable,
    F: FnMut(&FriendKey) -> T,
{
    let mut bytes = Vec::with_capacity(keys.len() * size_of::<T>());
    for key in keys {
        bytes.extend_from_slice(value(key).as_bytes());
    }
    bytes
}
