//! Bulk queries over the friend list.
//!
//! Per-key queries answer in request order. Keys that do not name a friend yield a zeroed
//! entry rather than an error.

use frd_savedata::{
    raw::{
        ScreenName,
        friend::{FriendInfo, FriendKey, FriendPresence},
        mii::ChecksummedMii,
    },
    read::FriendRecord,
};
use tracing::{debug, warn};
use zerocopy::{IntoBytes, little_endian::U32};

use super::{bounded_count, per_key, pop_friend_keys};
use crate::{
    ipc::{MappedBuffer, RequestParser, Response},
    module::Module,
    result::ResultCode,
};

fn lookup(module: &Module, key: &FriendKey) -> Option<FriendInfo> {
    module.friends.lookup_info(key)
}

pub(crate) fn get_friend_key_list(module: &mut Module, rp: &mut RequestParser) -> Response {
    let offset = rp.pop_u32() as usize;
    let count = bounded_count(rp.pop_u32());

    let keys = module.friends.keys(offset, count);
    debug!(offset, count, filled = keys.len(), "GetFriendKeyList");

    let mut rb = rp.make_builder(2, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_u32(keys.len() as u32);
    rb.push_static_buffer(keys.as_bytes().to_vec(), 0);
    rb.build()
}

/// Presence is not tracked for friends.
pub(crate) fn get_friend_presence(_module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let keys = pop_friend_keys(rp, count);

    warn!(count, "(STUBBED) GetFriendPresence");

    let mut rb = rp.make_builder(1, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_static_buffer(per_key(&keys, |_| FriendPresence::default()), 0);
    rb.build()
}

/// Returns one screen name and one character set byte per key.
///
/// The number of entries is capped by both caller-side limits.
pub(crate) fn get_friend_screen_name(module: &mut Module, rp: &mut RequestParser) -> Response {
    let max_names = rp.pop_u32() as usize;
    let max_character_sets = rp.pop_u32() as usize;
    let key_count = bounded_count(rp.pop_u32());
    let _unknown1 = rp.pop_u32();
    let _unknown2 = rp.pop_u32();
    let keys = pop_friend_keys(rp, key_count);

    let count = key_count.min(max_names).min(max_character_sets);
    let mut names = Vec::with_capacity(count * size_of::<ScreenName>());
    let mut character_sets = Vec::with_capacity(count);
    for key in &keys[..count] {
        match lookup(module, key) {
            Some(info) => {
                names.extend_from_slice(info.screen_name.as_bytes());
                character_sets.push(info.character_set);
            }
            None => {
                names.extend_from_slice(ScreenName::default().as_bytes());
                character_sets.push(0);
            }
        }
    }

    let mut rb = rp.make_builder(1, 4);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_static_buffer(names, 0);
    rb.push_static_buffer(character_sets, 1);
    rb.build()
}

pub(crate) fn get_friend_mii(module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let keys = pop_friend_keys(rp, count);
    let mut buffer = rp.pop_mapped_buffer();
    assert_eq!(
        buffer.len(),
        count * size_of::<ChecksummedMii>(),
        "mii buffer size mismatch"
    );

    for (index, key) in keys.iter().enumerate() {
        let mii = lookup(module, key).map(|info| info.mii).unwrap_or_default();
        buffer.write(index * size_of::<ChecksummedMii>(), mii.as_bytes());
    }

    respond_mapped(rp, buffer)
}

pub(crate) fn get_friend_profile(module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let keys = pop_friend_keys(rp, count);

    let profiles = per_key(&keys, |key| {
        lookup(module, key).map(|info| info.profile).unwrap_or_default()
    });
    respond_static(rp, profiles)
}

pub(crate) fn get_friend_relationship(module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let keys = pop_friend_keys(rp, count);

    let relationships = per_key(&keys, |key| {
        lookup(module, key).map(|info| info.relationship).unwrap_or_default()
    });
    respond_static(rp, relationships)
}

pub(crate) fn get_friend_attribute_flags(module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let keys = pop_friend_keys(rp, count);

    let flags = per_key(&keys, |key| {
        let bits = lookup(module, key)
            .map(|info| info.attribute_flags().bits())
            .unwrap_or_default();
        U32::new(bits)
    });
    respond_static(rp, flags)
}

pub(crate) fn get_friend_favorite_game(module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let keys = pop_friend_keys(rp, count);

    let games = per_key(&keys, |key| {
        lookup(module, key).map(|info| info.favorite_game).unwrap_or_default()
    });
    respond_static(rp, games)
}

pub(crate) fn get_friend_comment(module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let keys = pop_friend_keys(rp, count);

    let comments = per_key(&keys, |key| {
        lookup(module, key).map(|info| info.comment).unwrap_or_default()
    });
    respond_static(rp, comments)
}

pub(crate) fn get_friend_info(module: &mut Module, rp: &mut RequestParser) -> Response {
    let count = bounded_count(rp.pop_u32());
    let _unknown = rp.pop_u32();
    let character_set = rp.pop_u32();
    let keys = pop_friend_keys(rp, count);
    let mut buffer = rp.pop_mapped_buffer();
    assert_eq!(
        buffer.len(),
        count * size_of::<FriendInfo>(),
        "friend info buffer size mismatch"
    );

    debug!(count, character_set, "GetFriendInfo");

    for (index, key) in keys.iter().enumerate() {
        let info = lookup(module, key).unwrap_or_default();
        buffer.write(index * size_of::<FriendInfo>(), info.as_bytes());
    }

    respond_mapped(rp, buffer)
}

fn respond_static(rp: &RequestParser, data: Vec<u8>) -> Response {
    let mut rb = rp.make_builder(1, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_static_buffer(data, 0);
    rb.build()
}

fn respond_mapped(rp: &RequestParser, buffer: MappedBuffer) -> Response {
    let mut rb = rp.make_builder(1, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_mapped_buffer(buffer);
    rb.build()
}
