//! Game server authentication.
//!
//! A login request is assembled from the account records and the calling title's metadata,
//! then performed on a spawned task. The task reports back over a oneshot channel and signals
//! the caller's event when it is done. The result is picked up the next time a handler asks
//! for it.

use std::{error::Error as _, sync::Arc};

use frd_nasc::{ClientCertificate, NascClient, NascTransport};
use frd_savedata::raw::{
    SCREEN_NAME_LEN,
    account::{Account, MyData},
    auth::{GameAuthenticationData, LocalFriendCodeSeedB},
};
use tokio::{
    runtime::Handle,
    sync::oneshot::{self, error::TryRecvError},
};
use tracing::{debug, error, info, warn};
use zerocopy::{
    IntoBytes,
    little_endian::{I32, U16, U64},
};

use crate::platform::{Event, TitleInfo};

/// Runs authentication requests and keeps the last result.
pub struct AuthBridge {
    runtime: Handle,
    transport: Arc<dyn NascTransport>,
    pending: Option<oneshot::Receiver<GameAuthenticationData>>,
    last: GameAuthenticationData,
}

impl AuthBridge {
    pub fn new(runtime: Handle, transport: Arc<dyn NascTransport>) -> Self {
        Self {
            runtime,
            transport,
            pending: None,
            last: GameAuthenticationData::default(),
        }
    }

    /// Spawns the login. A request still in flight is superseded; its result is discarded.
    pub fn start(&mut self, client: NascClient, event: Arc<dyn Event>) {
        if self.pending.take().is_some() {
            warn!("superseding pending game authentication request");
        }

        let (tx, rx) = oneshot::channel();
        let transport = Arc::clone(&self.transport);
        self.runtime.spawn(async move {
            let data = authenticate(&client, transport.as_ref()).await;
            if tx.send(data).is_err() {
                debug!(host = client.host(), "game authentication result discarded");
            }
            event.signal();
        });
        self.pending = Some(rx);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Collects a finished result, if any. Returns whether the stored result changed.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        match pending.try_recv() {
            Ok(data) => {
                self.last = data;
                self.pending = None;
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Closed) => {
                warn!("game authentication task ended without a result");
                self.pending = None;
                false
            }
        }
    }

    /// Result of the last completed request.
    pub fn last_result(&mut self) -> &GameAuthenticationData {
        self.poll();
        &self.last
    }
}

/// Performs one login and converts the outcome into its record form.
pub async fn authenticate(
    client: &NascClient,
    transport: &dyn NascTransport,
) -> GameAuthenticationData {
    let mut data = GameAuthenticationData::default();

    match client.perform(transport).await {
        Ok(login) => {
            info!(
                host = client.host(),
                server = %login.server_address,
                port = login.server_port,
                "game authentication succeeded"
            );
            data.result = I32::new(login.result.into());
            data.http_status_code = I32::new(login.http_status.into());
            data.set_server_address(&login.server_address);
            data.server_port = U16::new(login.server_port);
            data.set_auth_token(&login.auth_token);
            data.server_time = U64::new(login.server_time);
        }
        Err(failure) => {
            let mut message = failure.to_string();
            let mut source = failure.error.source();
            while let Some(cause) = source {
                message.push_str(": ");
                message.push_str(&cause.to_string());
                source = cause.source();
            }
            error!(host = client.host(), result = failure.result, "NASC error: {message}");

            data.result = I32::new(failure.result.into());
            if let Some(status) = failure.http_status {
                data.http_status_code = I32::new(status.into());
            }
        }
    }

    data
}

/// Everything a login request is built from.
#[derive(Debug, Clone, Copy)]
pub struct LoginContext<'a> {
    pub game_id: u32,
    pub sdk_major: u32,
    pub sdk_minor: u32,
    pub title: &'a TitleInfo,
    pub my_data: &'a MyData,
    pub account: &'a Account,
    pub local_friend_code_seed: &'a LocalFriendCodeSeedB,
    pub fpd_version: u16,
    /// Local time as `YYMMDDhhmmss`
    pub device_time: &'a str,
}

/// Current local time in the form the server expects.
pub fn device_time() -> String {
    chrono::Local::now().format("%y%m%d%H%M%S").to_string()
}

/// Assembles the `LOGIN` request.
pub fn login_client(
    host: &str,
    certificate: ClientCertificate,
    context: &LoginContext<'_>,
) -> NascClient {
    let LoginContext {
        my_data, account, ..
    } = context;
    let mac = &my_data.mii.data().mac;

    let mut client = NascClient::new(host, certificate);
    client.set_parameter("gameid", format!("{:08X}", context.game_id));
    client.set_parameter(
        "sdkver",
        format!("{:03}{:03}", context.sdk_major as u8, context.sdk_minor as u8),
    );
    client.set_parameter("titleid", format!("{:016X}", context.title.program_id));
    client.set_parameter("gamecd", context.title.game_code());
    client.set_parameter("gamever", format!("{:04X}", context.title.remaster_version));
    client.set_parameter("mediatype", "1");
    client.set_parameter("makercd", context.title.maker_code_str());
    client.set_parameter("unitcd", my_data.profile.platform.to_string());
    client.set_parameter(
        "macadr",
        format!(
            "{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
        ),
    );
    client.set_parameter("bssid", "000000000000");
    client.set_parameter("apinfo", "01:0000000000");
    client.set_parameter("fcdcert", context.local_friend_code_seed.as_bytes());
    client.set_parameter("devname", device_name(my_data));
    client.set_parameter("servertype", "L1");
    client.set_parameter("fpdver", format!("{:04X}", context.fpd_version));
    client.set_parameter("devtime", context.device_time);
    client.set_parameter("lang", format!("{:02X}", my_data.profile.language));
    client.set_parameter("region", format!("{:02X}", my_data.profile.region));
    client.set_parameter("csnum", my_data.serial_number());
    client.set_parameter("uidhmac", account.principal_id_hmac());
    client.set_parameter("userid", account.principal_id.get().to_string());
    client.set_parameter("action", "LOGIN");
    client.set_parameter("ingamesn", "");
    client
}

/// Screen name as raw UTF-16LE bytes, without the terminator.
fn device_name(my_data: &MyData) -> Vec<u8> {
    my_data
        .screen_name
        .iter()
        .take(SCREEN_NAME_LEN - 1)
        .map(|unit| unit.get())
        .take_while(|&unit| unit != 0)
        .flat_map(u16::to_le_bytes)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use frd_nasc::{NascRequest, NascResponse, TransportError, codec::encode_value};
    use frd_savedata::raw::{friend::FriendProfile, utf16_from_str};
    use tokio::sync::Notify;

    use super::*;

    /// Answers every request with a fixed form body.
    pub(crate) struct FakeTransport {
        body: String,
        pub(crate) seen: Mutex<Vec<NascRequest>>,
    }

    impl FakeTransport {
        pub(crate) fn new(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: body.to_owned(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl NascTransport for FakeTransport {
        async fn post(&self, request: &NascRequest) -> Result<NascResponse, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(NascResponse {
                status: 200,
                content_type: Some("application/x-www-form-urlencoded".to_owned()),
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    #[derive(Default)]
    struct TestEvent {
        signals: AtomicUsize,
        notify: Notify,
    }

    impl Event for TestEvent {
        fn signal(&self) {
            self.signals.fetch_add(1, Ordering::SeqCst);
            self.notify.notify_one();
        }
    }

    pub(crate) fn success_body() -> String {
        format!(
            "returncd={}&locator={}&token=abc&datetime={}",
            encode_value("001"),
            encode_value("1.2.3.4:12345"),
            encode_value("1700000000"),
        )
        .replace('*', "%2A")
    }

    fn certificate() -> ClientCertificate {
        ClientCertificate {
            certificate: vec![1],
            private_key: vec![2],
        }
    }

    #[tokio::test]
    async fn test_successful_login_is_stored() {
        let transport = FakeTransport::new(&success_body());
        let mut bridge = AuthBridge::new(Handle::current(), transport.clone());
        let event = Arc::new(TestEvent::default());

        bridge.start(
            NascClient::new("nasc.example", certificate()),
            event.clone(),
        );
        assert!(bridge.is_pending());
        event.notify.notified().await;

        let data = *bridge.last_result();
        assert!(!bridge.is_pending());
        assert_eq!(data.result.get(), 1);
        assert_eq!(data.http_status_code.get(), 200);
        assert_eq!(data.server_address(), b"1.2.3.4");
        assert_eq!(data.server_port.get(), 12345);
        assert_eq!(data.auth_token(), b"abc");
        assert_eq!(data.server_time.get(), 1_700_000_000);
        assert_eq!(event.signals.load(Ordering::SeqCst), 1);
        assert_eq!(transport.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_code_and_status() {
        let body = format!("returncd={}", encode_value("109"));
        let transport = FakeTransport::new(&body);

        let data = authenticate(
            &NascClient::new("nasc.example", certificate()),
            transport.as_ref(),
        )
        .await;
        assert_eq!(data.result.get(), 109);
        assert_eq!(data.http_status_code.get(), 200);
        assert!(data.server_address().is_empty());
        assert!(data.auth_token().is_empty());
    }

    #[tokio::test]
    async fn test_missing_certificate_stores_zero_result() {
        let transport = FakeTransport::new(&success_body());

        let data = authenticate(
            &NascClient::new("nasc.example", ClientCertificate::default()),
            transport.as_ref(),
        )
        .await;
        assert_eq!(data, GameAuthenticationData::default());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_request_supersedes_pending() {
        let transport = FakeTransport::new(&success_body());
        let mut bridge = AuthBridge::new(Handle::current(), transport.clone());
        let first = Arc::new(TestEvent::default());
        let second = Arc::new(TestEvent::default());

        bridge.start(NascClient::new("first.example", certificate()), first.clone());
        bridge.start(NascClient::new("second.example", certificate()), second.clone());

        first.notify.notified().await;
        second.notify.notified().await;

        assert_eq!(bridge.last_result().result.get(), 1);
        assert!(!bridge.poll());
        assert_eq!(first.signals.load(Ordering::SeqCst), 1);
        assert_eq!(second.signals.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_login_parameters() {
        let mut my_data = MyData::default();
        my_data.profile = FriendProfile {
            region: 2,
            language: 1,
            platform: 2,
            ..FriendProfile::default()
        };
        my_data.screen_name = utf16_from_str("Ann");
        my_data.serial_number = utf16_from_str("CW123456789");
        let mut mii = *my_data.mii.data();
        mii.mac = [0xA0, 0xB1, 0xC2, 0xD3, 0xE4, 0xF5];
        my_data.mii.set_data(mii);

        let mut account = Account::default();
        account.principal_id = zerocopy::little_endian::U32::new(1234);
        account.principal_id_hmac = utf16_from_str("0123abcd");

        let title = TitleInfo {
            program_id: 0x0004_0000_0005_5D00,
            product_code: "CTR-P-ECLA".to_owned(),
            remaster_version: 0x12,
            maker_code: u16::from_le_bytes(*b"01"),
        };
        let seed = LocalFriendCodeSeedB::default();
        let context = LoginContext {
            game_id: 0x0005_5D00,
            sdk_major: 0x7,
            sdk_minor: 0x1003,
            title: &title,
            my_data: &my_data,
            account: &account,
            local_friend_code_seed: &seed,
            fpd_version: 16,
            device_time: "240102030405",
        };

        let client = login_client("nasc.example", certificate(), &context);
        let params = client.params();
        let get = |key| params.get(key).unwrap();

        assert_eq!(get("gameid"), "00055D00");
        assert_eq!(get("sdkver"), "007003");
        assert_eq!(get("titleid"), "0004000000055D00");
        assert_eq!(get("gamecd"), "ECLA");
        assert_eq!(get("gamever"), "0012");
        assert_eq!(get("mediatype"), "1");
        assert_eq!(get("makercd"), "01");
        assert_eq!(get("unitcd"), "2");
        assert_eq!(get("macadr"), "a0b1c2d3e4f5");
        assert_eq!(get("fpdver"), "0010");
        assert_eq!(get("devtime"), "240102030405");
        assert_eq!(get("lang"), "01");
        assert_eq!(get("region"), "02");
        assert_eq!(get("csnum"), "CW123456789");
        assert_eq!(get("uidhmac"), "0123abcd");
        assert_eq!(get("userid"), "1234");
        assert_eq!(get("action"), "LOGIN");
        assert_eq!(params.get_raw("ingamesn"), Some(""));
        assert_eq!(params.len(), 23);

        let request = client.build_request();
        assert_eq!(request.header("X-GameId"), Some("00055D00"));
        assert_eq!(request.header("User-Agent"), Some("CTR FPD/000010"));
    }

    #[test]
    fn test_device_name_is_raw_utf16() {
        let mut my_data = MyData::default();
        my_data.screen_name = utf16_from_str("Bo");
        assert_eq!(device_name(&my_data), [b'B', 0, b'o', 0]);
    }
}
