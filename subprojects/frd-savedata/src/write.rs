//! Serialization of records back into save-file blobs.

use zerocopy::IntoBytes;

use crate::read::{FixedRecord, FriendDirectory, FriendList, FriendRecord};

/// Serializes a fixed-size record.
pub fn record_to_bytes<T: FixedRecord>(record: &T) -> Vec<u8> {
    record.as_bytes().to_vec()
}

/// Serializes a friend list as its header followed by the active entries only.
pub fn friend_list_to_bytes<E: FriendRecord>(list: &FriendList<E>) -> Vec<u8> {
    list.to_bytes()
}

/// Serializes a friend directory in the revision it was loaded with.
pub fn directory_to_bytes(directory: &FriendDirectory) -> Vec<u8> {
    directory.to_bytes()
}
