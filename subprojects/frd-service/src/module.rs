//! State shared by the `frd:u` and `frd:a` services.

use std::sync::Arc;

use frd_nasc::HttpsTransport;
use frd_savedata::{
    raw::{
        LocalAccountId,
        account::{Account, Config, MyData},
        friend::MyPresence,
    },
    read::{FixedRecord, FriendDirectory, load_record},
    write::{directory_to_bytes, record_to_bytes},
};
use tokio::runtime::Handle;
use tracing::{error, info};

use crate::{
    auth::AuthBridge,
    config::ServiceConfig,
    platform::{Event, Platform},
    proto::DEFAULT_NOTIFICATION_MASK,
    storage::{HostSaveArchive, SaveArchive, StorageError},
};

/// Save-wide configuration file.
pub const CONFIG_PATH: &str = "/config";

/// Per-account file names, below `/{local_account_id}/`.
pub const MY_DATA_FILE: &str = "mydata";
pub const ACCOUNT_FILE: &str = "account";
pub const FRIEND_LIST_FILE: &str = "friendlist";

/// Archive path of a per-account file.
pub fn account_file_path(id: LocalAccountId, file: &str) -> String {
    format!("/{}/{file}", id as u8)
}

/// Friend services state: the loaded save records and runtime session state.
pub struct Module {
    pub(crate) config: ServiceConfig,
    pub(crate) platform: Arc<dyn Platform>,
    archive: Box<dyn SaveArchive>,

    pub(crate) save_config: Config,
    pub(crate) my_data: MyData,
    pub(crate) account: Account,
    pub(crate) friends: FriendDirectory,

    pub(crate) my_presence: MyPresence,
    pub(crate) logged_in: bool,
    pub(crate) notification_event: Option<Arc<dyn Event>>,
    pub(crate) notification_mask: u32,
    pub(crate) auth: AuthBridge,
}

impl Module {
    /// Loads the records of the configured account. Missing or unusable files are replaced by
    /// defaults.
    pub fn new(
        config: ServiceConfig,
        archive: Box<dyn SaveArchive>,
        platform: Arc<dyn Platform>,
        auth: AuthBridge,
    ) -> Self {
        let save_config = load_or_default::<Config>(archive.as_ref(), CONFIG_PATH);
        let friends = FriendDirectory::empty(config.friend_list_revision());

        let mut module = Self {
            config,
            platform,
            archive,
            save_config,
            my_data: MyData::default(),
            account: Account::default(),
            friends,
            my_presence: MyPresence::default(),
            logged_in: false,
            notification_event: None,
            notification_mask: DEFAULT_NOTIFICATION_MASK,
            auth,
        };
        module.load_account_records();
        module
    }

    /// Opens the save area below the configured NAND directory and authenticates over HTTPS
    /// on `runtime`.
    pub fn open(
        config: ServiceConfig,
        platform: Arc<dyn Platform>,
        runtime: Handle,
    ) -> Result<Self, StorageError> {
        let archive = HostSaveArchive::open(&config.nand_dir)?;
        info!(root = %archive.root().display(), "friend save area opened");

        let transport = HttpsTransport::new(config.https_timeout());
        let auth = AuthBridge::new(runtime, Arc::new(transport));
        Ok(Self::new(config, Box::new(archive), platform, auth))
    }

    /// Switches to another local account: the config is written and the account's records
    /// reloaded.
    pub fn set_local_account_id(&mut self, id: LocalAccountId) {
        self.my_data = MyData::default();
        self.account = Account::default();
        self.friends = FriendDirectory::empty(self.config.friend_list_revision());

        self.save_config.set_local_account_id(id);
        info!(local_account_id = id as u8, "local account changed");
        if let Err(error) = self
            .archive
            .write(CONFIG_PATH, &record_to_bytes(&self.save_config))
        {
            error!(%error, "failed to write config");
        }

        self.load_account_records();
    }

    /// Writes every persisted record back to the archive.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        let id = self.local_account_id();
        self.archive
            .write(CONFIG_PATH, &record_to_bytes(&self.save_config))?;
        self.archive.write(
            &account_file_path(id, MY_DATA_FILE),
            &record_to_bytes(&self.my_data),
        )?;
        self.archive.write(
            &account_file_path(id, ACCOUNT_FILE),
            &record_to_bytes(&self.account),
        )?;
        self.archive.write(
            &account_file_path(id, FRIEND_LIST_FILE),
            &directory_to_bytes(&self.friends),
        )?;
        Ok(())
    }

    fn load_account_records(&mut self) {
        let id = self.local_account_id();
        let archive = self.archive.as_ref();

        self.my_data = load_or_default(archive, &account_file_path(id, MY_DATA_FILE));
        self.account = load_or_default(archive, &account_file_path(id, ACCOUNT_FILE));

        let revision = self.config.friend_list_revision();
        let path = account_file_path(id, FRIEND_LIST_FILE);
        self.friends = match archive.read(&path) {
            Ok(bytes) => FriendDirectory::from_bytes(revision, &bytes).unwrap_or_else(|error| {
                info!(path = %path, %error, "unusable friend list file, using default");
                FriendDirectory::empty(revision)
            }),
            Err(error) => {
                info!(path = %path, %error, "no friend list file found, using default");
                FriendDirectory::empty(revision)
            }
        };
    }

    pub fn local_account_id(&self) -> LocalAccountId {
        self.save_config.local_account_id()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn my_data(&self) -> &MyData {
        &self.my_data
    }

    pub fn my_data_mut(&mut self) -> &mut MyData {
        &mut self.my_data
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_mut(&mut self) -> &mut Account {
        &mut self.account
    }

    pub fn friends(&self) -> &FriendDirectory {
        &self.friends
    }

    /// Replaces the friend list. It is persisted on the next [`Module::flush`].
    pub fn set_friends(&mut self, friends: FriendDirectory) {
        self.friends = friends;
    }

    pub fn my_presence(&self) -> &MyPresence {
        &self.my_presence
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn notification_mask(&self) -> u32 {
        self.notification_mask
    }

    pub fn has_notification_event(&self) -> bool {
        self.notification_event.is_some()
    }

    pub fn auth_mut(&mut self) -> &mut AuthBridge {
        &mut self.auth
    }
}

fn load_or_default<T: FixedRecord>(archive: &dyn SaveArchive, path: &str) -> T {
    match archive.read(path) {
        Ok(bytes) => load_record(&bytes).unwrap_or_else(|error| {
            info!(path, %error, "unusable save file, using default");
            T::default_record()
        }),
        Err(error) => {
            info!(path, %error, "no save file found, using default");
            T::default_record()
        }
    }
}
