//! Game server authentication commands.

use tracing::{debug, warn};
use zerocopy::IntoBytes;

use crate::{
    auth::{LoginContext, device_time, login_client},
    ipc::{RequestParser, Response},
    module::Module,
    proto::ScreenNameArg,
    result::ResultCode,
};

/// Starts a login for the calling title. The caller's event is signalled once the result is
/// available, or right away when the request cannot be made.
pub(crate) fn request_game_authentication(
    module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let game_id = rp.pop_u32();
    let screen_name = rp.pop_raw::<ScreenNameArg>();
    let sdk_major = rp.pop_u32();
    let sdk_minor = rp.pop_u32();
    let process_id = rp.pop_pid();
    let event = rp.pop_event();

    debug!(
        game_id = format_args!("{game_id:#010x}"),
        screen_name = %screen_name.to_string_lossy(),
        sdk_major,
        sdk_minor,
        process_id,
        "RequestGameAuthentication"
    );

    if module.account.nex_password().is_empty() || module.account.principal_id_hmac().is_empty() {
        warn!("no NEX credentials stored, skipping game authentication");
        event.signal();
        return Response::error(rp.command_id(), ResultCode::FRIENDS_NO_DATA);
    }

    let Some(title) = module.platform.title_info(process_id) else {
        warn!(process_id, "no title metadata for caller, skipping game authentication");
        event.signal();
        return Response::error(rp.command_id(), ResultCode::FRIENDS_NO_DATA);
    };

    let local_friend_code_seed = module.platform.local_friend_code_seed();
    let device_time = device_time();
    let context = LoginContext {
        game_id,
        sdk_major,
        sdk_minor,
        title: &title,
        my_data: &module.my_data,
        account: &module.account,
        local_friend_code_seed: &local_friend_code_seed,
        fpd_version: module.config.fpd_version,
        device_time: &device_time,
    };
    let host = module.config.nasc.host(module.account.nasc_environment());
    let client = login_client(host, module.platform.client_certificate(), &context);

    module.auth.start(client, event);

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

/// Collects a finished login. Login failures are reported through the stored record, never
/// through this result.
pub(crate) fn get_last_response_result(module: &mut Module, rp: &mut RequestParser) -> Response {
    module.auth.poll();

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

pub(crate) fn get_game_authentication_data(
    module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let data = module.auth.last_result().as_bytes().to_vec();

    let mut rb = rp.make_builder(1, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_static_buffer(data, 0);
    rb.build()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use frd_savedata::raw::{auth::GameAuthenticationData, utf16_from_str};
    use tokio::runtime::Handle;
    use zerocopy::FromBytes;

    use super::*;
    use crate::{
        auth::{
            AuthBridge,
            tests::{FakeTransport, success_body},
        },
        config::ServiceConfig,
        handlers::tests::{CountingEvent, call, event_item},
        ipc::TranslatedItem,
        module::tests::{TestPlatform, UnreachableTransport, module_with},
        platform::TitleInfo,
        proto::*,
        storage::MemoryArchive,
    };

    fn request_words(game_id: u32) -> Vec<u32> {
        let mut words = vec![game_id];
        words.extend([0u32; 6]);
        words.extend([0x7, 0x1003]);
        words
    }

    fn title() -> TitleInfo {
        TitleInfo {
            program_id: 0x0004_0000_0005_5D00,
            product_code: "CTR-P-ECLA".to_owned(),
            remaster_version: 1,
            maker_code: u16::from_le_bytes(*b"01"),
        }
    }

    fn with_credentials(module: &mut Module) {
        module.account.nex_password = utf16_from_str("password");
        module.account.principal_id_hmac = utf16_from_str("0123abcd");
    }

    fn stored_result(module: &mut Module) -> GameAuthenticationData {
        let response = call(module, CMD_GET_GAME_AUTHENTICATION_DATA, vec![], vec![]);
        GameAuthenticationData::read_from_bytes(response.static_buffer(0).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_credentials_short_circuit() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut module = module_with(MemoryArchive::new(), rt.handle().clone());
        let event = Arc::new(CountingEvent::default());

        let response = call(
            &mut module,
            CMD_REQUEST_GAME_AUTHENTICATION,
            request_words(0x0005_5D00),
            vec![TranslatedItem::ProcessId(1), event_item(&event)],
        );
        assert_eq!(response.result(), ResultCode::FRIENDS_NO_DATA);
        assert_eq!(event.count(), 1);
        assert!(!module.auth.is_pending());
    }

    #[test]
    fn test_missing_title_short_circuits() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut module = module_with(MemoryArchive::new(), rt.handle().clone());
        with_credentials(&mut module);
        let event = Arc::new(CountingEvent::default());

        let response = call(
            &mut module,
            CMD_REQUEST_GAME_AUTHENTICATION,
            request_words(0x0005_5D00),
            vec![TranslatedItem::ProcessId(1), event_item(&event)],
        );
        assert_eq!(response.result(), ResultCode::FRIENDS_NO_DATA);
        assert_eq!(event.count(), 1);

        assert_eq!(stored_result(&mut module), GameAuthenticationData::default());
    }

    #[tokio::test]
    async fn test_login_result_is_delivered() {
        let transport = FakeTransport::new(&success_body());
        let mut module = Module::new(
            ServiceConfig::default(),
            Box::new(MemoryArchive::new()),
            Arc::new(TestPlatform {
                title: Some(title()),
            }),
            AuthBridge::new(Handle::current(), transport.clone()),
        );
        with_credentials(&mut module);
        let event = Arc::new(CountingEvent::default());

        let response = call(
            &mut module,
            CMD_REQUEST_GAME_AUTHENTICATION,
            request_words(0x0005_5D00),
            vec![TranslatedItem::ProcessId(1), event_item(&event)],
        );
        assert!(response.result().is_success());
        assert!(module.auth.is_pending());

        event.notify.notified().await;
        assert_eq!(event.count(), 1);

        let response = call(&mut module, CMD_GET_LAST_RESPONSE_RESULT, vec![], vec![]);
        assert!(response.result().is_success());
        assert!(!module.auth.is_pending());

        let data = stored_result(&mut module);
        assert_eq!(data.result.get(), 1);
        assert_eq!(data.server_address(), b"1.2.3.4");
        assert_eq!(data.server_port.get(), 12345);
        assert_eq!(data.auth_token(), b"abc");

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].host, "nasc.nintendowifi.net");
        assert_eq!(seen[0].header("X-GameId"), Some("00055D00"));
    }

    #[test]
    fn test_nothing_pending_reports_success() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut module = Module::new(
            ServiceConfig::default(),
            Box::new(MemoryArchive::new()),
            Arc::new(TestPlatform::default()),
            AuthBridge::new(rt.handle().clone(), Arc::new(UnreachableTransport)),
        );

        let response = call(&mut module, CMD_GET_LAST_RESPONSE_RESULT, vec![], vec![]);
        assert!(response.result().is_success());
        assert_eq!(stored_result(&mut module), GameAuthenticationData::default());
    }
}
