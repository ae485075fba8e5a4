//! Friend code conversions and friend list membership.

use frd_savedata::friend_code::{
    SCRAMBLED_LOCAL_FRIEND_CODE_SIZE, friend_code_to_principal_id, is_valid_friend_code,
    principal_id_to_friend_code, unscramble_local_friend_code,
};
use tracing::debug;

use super::bounded_count;
use crate::{
    ipc::{RequestParser, Response},
    module::Module,
    result::ResultCode,
};

pub(crate) fn principal_id_to_friend_code_handler(
    _module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let principal_id = rp.pop_u32();
    let friend_code = principal_id_to_friend_code(principal_id);

    let mut rb = rp.make_builder(3, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_u64(friend_code);
    rb.build()
}

pub(crate) fn friend_code_to_principal_id_handler(
    _module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let friend_code = rp.pop_u64();

    let mut rb = rp.make_builder(2, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_u32(friend_code_to_principal_id(friend_code));
    rb.build()
}

pub(crate) fn is_valid_friend_code_handler(
    _module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let friend_code = rp.pop_u64();

    let mut rb = rp.make_builder(2, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_bool(is_valid_friend_code(friend_code));
    rb.build()
}

/// The checksum bits are ignored; membership is decided by principal id.
pub(crate) fn is_included_in_friend_list(module: &mut Module, rp: &mut RequestParser) -> Response {
    let friend_code = rp.pop_u64();
    let principal_id = friend_code_to_principal_id(friend_code);
    let included = module.friends.contains_principal_id(principal_id);

    debug!(principal_id, included, "IsIncludedInFriendList");

    let mut rb = rp.make_builder(2, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_bool(included);
    rb.build()
}

/// Unscrambles each code and keeps it only if it belongs to a friend; others become 0.
pub(crate) fn unscramble_local_friend_code_handler(
    module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let count = bounded_count(rp.pop_u32());
    let scrambled = rp.pop_static_buffer();
    assert_eq!(
        scrambled.len(),
        count * SCRAMBLED_LOCAL_FRIEND_CODE_SIZE,
        "scrambled friend code buffer size mismatch"
    );

    let mut codes = Vec::with_capacity(count * size_of::<u64>());
    for chunk in scrambled.chunks_exact(SCRAMBLED_LOCAL_FRIEND_CODE_SIZE) {
        let mut entry = [0u8; SCRAMBLED_LOCAL_FRIEND_CODE_SIZE];
        entry.copy_from_slice(chunk);

        let code = unscramble_local_friend_code(&entry);
        let code = if module.friends.contains_local_friend_code(code) {
            code
        } else {
            0
        };
        codes.extend_from_slice(&code.to_le_bytes());
    }

    let mut rb = rp.make_builder(1, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_static_buffer(codes, 0);
    rb.build()
}

#[cfg(test)]
mod tests {
    use frd_savedata::read::{FriendDirectory, FriendList};

    use super::*;
    use crate::{
        handlers::tests::call,
        ipc::TranslatedItem,
        module::tests::{friend, module_with},
        proto::*,
        storage::MemoryArchive,
    };

    fn module() -> (tokio::runtime::Runtime, Module) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut module = module_with(MemoryArchive::new(), rt.handle().clone());
        module.set_friends(FriendDirectory::Current(FriendList::from_entries([
            friend(1),
            friend(42),
        ])));
        (rt, module)
    }

    fn scramble(code: u64, key: u16) -> [u8; 12] {
        let mut out = [0u8; 12];
        for i in 0..4 {
            let word = (code >> (i * 16)) as u16 ^ key;
            out[i * 2..i * 2 + 2].copy_from_slice(&word.to_le_bytes());
        }
        out[10..].copy_from_slice(&key.to_le_bytes());
        out
    }

    #[test]
    fn test_principal_id_to_friend_code() {
        let (_rt, mut module) = module();
        let response = call(&mut module, CMD_PRINCIPAL_ID_TO_FRIEND_CODE, vec![1], vec![]);
        assert_eq!(response.values(), [1, 0x1E]);
    }

    #[test]
    fn test_friend_code_to_principal_id_truncates() {
        let (_rt, mut module) = module();
        let response = call(
            &mut module,
            CMD_FRIEND_CODE_TO_PRINCIPAL_ID,
            vec![0xDEAD_BEEF, 0x7F],
            vec![],
        );
        assert_eq!(response.values(), [0xDEAD_BEEF]);
    }

    #[test]
    fn test_is_valid_friend_code() {
        let (_rt, mut module) = module();
        let response = call(&mut module, CMD_IS_VALID_FRIEND_CODE, vec![1, 0x1E], vec![]);
        assert_eq!(response.values(), [1]);
        let response = call(&mut module, CMD_IS_VALID_FRIEND_CODE, vec![1, 0x1F], vec![]);
        assert_eq!(response.values(), [0]);
    }

    #[test]
    fn test_is_included_in_friend_list() {
        let (_rt, mut module) = module();
        let code = principal_id_to_friend_code(42);
        let response = call(
            &mut module,
            CMD_IS_INCLUDED_IN_FRIEND_LIST,
            vec![code as u32, (code >> 32) as u32],
            vec![],
        );
        assert_eq!(response.values(), [1]);

        let response = call(&mut module, CMD_IS_INCLUDED_IN_FRIEND_LIST, vec![43, 0], vec![]);
        assert_eq!(response.values(), [0]);
    }

    #[test]
    fn test_unscramble_keeps_only_known_codes() {
        let (_rt, mut module) = module();
        let known = 0x1000 + 42;
        let mut data = scramble(known, 0x5A5A).to_vec();
        data.extend_from_slice(&scramble(0x9999, 0x1234));

        let response = call(
            &mut module,
            CMD_UNSCRAMBLE_LOCAL_FRIEND_CODE,
            vec![2],
            vec![TranslatedItem::StaticBuffer { id: 1, data }],
        );

        let codes = response.static_buffer(0).unwrap();
        assert_eq!(codes.len(), 16);
        assert_eq!(u64::from_le_bytes(codes[..8].try_into().unwrap()), known);
        assert_eq!(u64::from_le_bytes(codes[8..].try_into().unwrap()), 0);
    }
}
