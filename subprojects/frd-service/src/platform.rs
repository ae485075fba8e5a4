//! Host emulator facilities the service depends on.

use frd_nasc::ClientCertificate;
use frd_savedata::raw::auth::LocalFriendCodeSeedB;

/// A kernel event object owned by the host.
pub trait Event: Send + Sync {
    /// Wakes every thread waiting on the event.
    fn signal(&self);
}

/// Product metadata of a running title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleInfo {
    pub program_id: u64,
    /// Full product code, e.g. `CTR-P-AXXE`
    pub product_code: String,
    pub remaster_version: u16,
    /// Two ASCII characters, low byte first
    pub maker_code: u16,
}

impl TitleInfo {
    /// Product code without its `CTR-X-` prefix.
    pub fn game_code(&self) -> &str {
        self.product_code
            .get(6..)
            .unwrap_or_default()
            .trim_end_matches('\0')
    }

    /// Maker code as its two characters.
    pub fn maker_code_str(&self) -> String {
        self.maker_code
            .to_le_bytes()
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect()
    }
}

/// Everything the service queries from the rest of the emulated system.
pub trait Platform: Send + Sync {
    /// Metadata of the title running in `process_id`, if any.
    fn title_info(&self, process_id: u32) -> Option<TitleInfo>;

    /// Client certificate presented to the authentication server.
    fn client_certificate(&self) -> ClientCertificate;

    /// Signed local friend code seed from the console's credential store.
    fn local_friend_code_seed(&self) -> LocalFriendCodeSeedB;
}
