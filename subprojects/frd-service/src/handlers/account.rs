//! Session state and the local user's own records.

use frd_savedata::raw::{LocalAccountId, friend::FriendKey};
use tracing::{info, warn};

use crate::{
    ipc::{RequestParser, Response},
    module::Module,
    result::ResultCode,
};

pub(crate) fn has_logged_in(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(2, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_bool(module.logged_in);
    rb.build()
}

/// No server connection is made; the session is online whenever it is logged in.
pub(crate) fn is_online(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(2, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_bool(module.logged_in);
    rb.build()
}

pub(crate) fn login(module: &mut Module, rp: &mut RequestParser) -> Response {
    let event = rp.pop_event();

    module.logged_in = true;
    event.signal();

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

pub(crate) fn logout(module: &mut Module, rp: &mut RequestParser) -> Response {
    module.logged_in = false;

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

pub(crate) fn get_my_friend_key(module: &mut Module, rp: &mut RequestParser) -> Response {
    let key = FriendKey::new(
        module.account.principal_id.get(),
        module.account.local_friend_code.get(),
    );

    let mut rb = rp.make_builder(5, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_raw(&key);
    rb.build()
}

pub(crate) fn get_my_preference(module: &mut Module, rp: &mut RequestParser) -> Response {
    let my_data = &module.my_data;

    let mut rb = rp.make_builder(4, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_u32(my_data.public_mode.into());
    rb.push_u32(my_data.public_game_name.into());
    rb.push_u32(my_data.public_played_game.into());
    rb.build()
}

pub(crate) fn get_my_profile(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(3, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_raw(&module.my_data.profile);
    rb.build()
}

pub(crate) fn get_my_screen_name(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(7, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_raw(&module.my_data.screen_name);
    rb.build()
}

pub(crate) fn get_my_mii(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(25, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_raw(&module.my_data.mii);
    rb.build()
}

pub(crate) fn get_my_local_account_id(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(2, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_u32(module.account.local_account_id.into());
    rb.build()
}

pub(crate) fn get_my_favorite_game(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(5, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_raw(&module.my_data.favorite_game);
    rb.build()
}

pub(crate) fn get_my_nc_principal_id(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(2, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_u32(module.my_data.nc_principal_id.get());
    rb.build()
}

pub(crate) fn get_my_comment(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(9, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_raw(&module.my_data.comment);
    rb.build()
}

/// Returns the NEX password as NUL-terminated ASCII in a buffer of the requested length.
pub(crate) fn get_my_password(module: &mut Module, rp: &mut RequestParser) -> Response {
    let len = rp.pop_u32() as usize;

    let mut buffer = vec![0u8; len];
    let password = module.account.nex_password();
    let ascii = password.bytes().filter(u8::is_ascii);
    for (slot, byte) in buffer.iter_mut().take(len.saturating_sub(1)).zip(ascii) {
        *slot = byte;
    }

    let mut rb = rp.make_builder(1, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_static_buffer(buffer, 0);
    rb.build()
}

/// Environment and server type bytes of the account.
pub(crate) fn get_server_types(module: &mut Module, rp: &mut RequestParser) -> Response {
    let account = &module.account;

    let mut rb = rp.make_builder(4, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_u32(account.nasc_environment.into());
    rb.push_u32(account.server_type_1.into());
    rb.push_u32(account.server_type_2.into());
    rb.build()
}

pub(crate) fn set_client_sdk_version(_module: &mut Module, rp: &mut RequestParser) -> Response {
    let version = rp.pop_u32();
    let process_id = rp.pop_pid();

    warn!(version = format_args!("{version:#010x}"), process_id, "(STUBBED) SetClientSdkVersion");

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

pub(crate) fn set_local_account_id(module: &mut Module, rp: &mut RequestParser) -> Response {
    let raw_id = rp.pop_u32();

    let id = u8::try_from(raw_id)
        .ok()
        .and_then(|id| LocalAccountId::try_from(id).ok());
    let Some(id) = id else {
        warn!(local_account_id = raw_id, "invalid local account id");
        return Response::error(rp.command_id(), ResultCode::FRIENDS_INVALID_ENUM_VALUE);
    };

    module.set_local_account_id(id);
    info!(local_account_id = raw_id, "account records reloaded");

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use frd_savedata::raw::{
        NascEnvironment,
        account::Account,
        friend::{FriendKey, FriendProfile},
        utf16_from_str,
    };
    use zerocopy::{
        FromBytes, IntoBytes,
        little_endian::{U32, U64},
    };

    use super::*;
    use crate::{
        handlers::tests::{CountingEvent, call, event_item},
        ipc::TranslatedItem,
        module::tests::module_with,
        proto::*,
        storage::MemoryArchive,
    };

    fn module() -> (tokio::runtime::Runtime, Module) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let module = module_with(MemoryArchive::new(), rt.handle().clone());
        (rt, module)
    }

    fn words_as_bytes(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }

    #[test]
    fn test_login_logout() {
        let (_rt, mut module) = module();
        let event = Arc::new(CountingEvent::default());

        let response = call(&mut module, CMD_HAS_LOGGED_IN, vec![], vec![]);
        assert_eq!(response.values(), [0]);

        let response = call(&mut module, CMD_LOGIN, vec![], vec![event_item(&event)]);
        assert!(response.result().is_success());
        assert_eq!(event.count(), 1);

        let response = call(&mut module, CMD_HAS_LOGGED_IN, vec![], vec![]);
        assert_eq!(response.values(), [1]);
        let response = call(&mut module, CMD_IS_ONLINE, vec![], vec![]);
        assert_eq!(response.values(), [1]);

        call(&mut module, CMD_LOGOUT, vec![], vec![]);
        assert!(!module.is_logged_in());
    }

    #[test]
    fn test_my_friend_key() {
        let (_rt, mut module) = module();
        module.account.principal_id = U32::new(0x1234_5678);
        module.account.local_friend_code = U64::new(0xAABB_CCDD_EEFF_0011);

        let response = call(&mut module, CMD_GET_MY_FRIEND_KEY, vec![], vec![]);
        let key = FriendKey::read_from_bytes(&words_as_bytes(response.values())).unwrap();
        assert_eq!(key.principal_id.get(), 0x1234_5678);
        assert_eq!(key.local_friend_code.get(), 0xAABB_CCDD_EEFF_0011);
    }

    #[test]
    fn test_my_records_fill_declared_words() {
        let (_rt, mut module) = module();
        module.my_data.public_mode = 1;
        module.my_data.public_played_game = 1;
        module.my_data.profile = FriendProfile {
            region: 1,
            country: 49,
            language: 1,
            ..FriendProfile::default()
        };
        module.my_data.screen_name = utf16_from_str("Ann");
        module.my_data.comment = utf16_from_str("hello");
        module.my_data.nc_principal_id = U32::new(99);

        let response = call(&mut module, CMD_GET_MY_PREFERENCE, vec![], vec![]);
        assert_eq!(response.values(), [1, 0, 1]);

        let response = call(&mut module, CMD_GET_MY_PROFILE, vec![], vec![]);
        assert_eq!(
            &words_as_bytes(response.values())[..8],
            module.my_data.profile.as_bytes()
        );

        let response = call(&mut module, CMD_GET_MY_SCREEN_NAME, vec![], vec![]);
        let bytes = words_as_bytes(response.values());
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[..0x16], module.my_data.screen_name.as_bytes());

        let response = call(&mut module, CMD_GET_MY_MII, vec![], vec![]);
        assert_eq!(words_as_bytes(response.values()), module.my_data.mii.as_bytes());

        let response = call(&mut module, CMD_GET_MY_COMMENT, vec![], vec![]);
        assert_eq!(words_as_bytes(response.values()), module.my_data.comment.as_bytes());

        let response = call(&mut module, CMD_GET_MY_FAVORITE_GAME, vec![], vec![]);
        assert_eq!(response.values().len(), 4);

        let response = call(&mut module, CMD_GET_MY_NC_PRINCIPAL_ID, vec![], vec![]);
        assert_eq!(response.values(), [99]);

        let response = call(&mut module, CMD_GET_MY_LOCAL_ACCOUNT_ID, vec![], vec![]);
        assert_eq!(response.values(), [1]);
    }

    #[test]
    fn test_password_is_truncated_and_terminated() {
        let (_rt, mut module) = module();
        module.account.nex_password = utf16_from_str("secret1234");

        let response = call(&mut module, CMD_GET_MY_PASSWORD, vec![5], vec![]);
        assert_eq!(response.static_buffer(0), Some(&b"secr\0"[..]));

        let response = call(&mut module, CMD_GET_MY_PASSWORD, vec![16], vec![]);
        assert_eq!(
            response.static_buffer(0),
            Some(&b"secret1234\0\0\0\0\0\0"[..])
        );

        let response = call(&mut module, CMD_GET_MY_PASSWORD, vec![0], vec![]);
        assert_eq!(response.static_buffer(0), Some(&[][..]));
    }

    #[test]
    fn test_server_types() {
        let (_rt, mut module) = module();
        module.account.nasc_environment = NascEnvironment::Test as u8;
        module.account.server_type_1 = 2;
        module.account.server_type_2 = 3;

        let response = call(&mut module, CMD_GET_SERVER_TYPES, vec![], vec![]);
        assert_eq!(response.values(), [1, 2, 3]);
    }

    #[test]
    fn test_set_client_sdk_version() {
        let (_rt, mut module) = module();
        let response = call(
            &mut module,
            CMD_SET_CLIENT_SDK_VERSION,
            vec![0x7000_00C8],
            vec![TranslatedItem::ProcessId(12)],
        );
        assert!(response.result().is_success());
    }

    #[test]
    fn test_set_local_account_id() {
        let (_rt, mut module) = module();
        module.account.principal_id = U32::new(5);

        let response = call(&mut module, CMD_SET_LOCAL_ACCOUNT_ID, vec![2], vec![]);
        assert!(response.result().is_success());
        assert_eq!(module.local_account_id(), LocalAccountId::Test);
        assert_eq!(module.account(), &Account::default());

        let response = call(&mut module, CMD_SET_LOCAL_ACCOUNT_ID, vec![9], vec![]);
        assert_eq!(response.result(), ResultCode::FRIENDS_INVALID_ENUM_VALUE);
        assert_eq!(module.local_account_id(), LocalAccountId::Test);
    }
}
