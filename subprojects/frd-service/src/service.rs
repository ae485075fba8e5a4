//! `frd:u` / `frd:a` command dispatch.

use tracing::{debug, error};

use crate::{
    handlers::{self, Handler},
    ipc::{Header, Request, RequestParser, Response},
    module::Module,
    proto::*,
    result::ResultCode,
};

/// Which of the two friend service ports a session is connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    User,
    Admin,
}

impl ServiceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::User => SERVICE_NAME_USER,
            Self::Admin => SERVICE_NAME_ADMIN,
        }
    }
}

struct Command {
    id: u16,
    name: &'static str,
    normal_words: u8,
    translate_words: u8,
    handler: Handler,
}

macro_rules! command {
    ($id:expr, $name:literal, $normal:literal, $translate:literal, $handler:path) => {
        Command {
            id: $id,
            name: $name,
            normal_words: $normal,
            translate_words: $translate,
            handler: $handler,
        }
    };
}

/// Commands shared by both services, with their request shapes.
const COMMANDS: &[Command] = &[
    command!(CMD_HAS_LOGGED_IN, "HasLoggedIn", 0, 0, handlers::has_logged_in),
    command!(CMD_IS_ONLINE, "IsOnline", 0, 0, handlers::is_online),
    command!(CMD_LOGIN, "Login", 0, 2, handlers::login),
    command!(CMD_LOGOUT, "Logout", 0, 0, handlers::logout),
    command!(CMD_GET_MY_FRIEND_KEY, "GetMyFriendKey", 0, 0, handlers::get_my_friend_key),
    command!(CMD_GET_MY_PREFERENCE, "GetMyPreference", 0, 0, handlers::get_my_preference),
    command!(CMD_GET_MY_PROFILE, "GetMyProfile", 0, 0, handlers::get_my_profile),
    command!(CMD_GET_MY_PRESENCE, "GetMyPresence", 0, 0, handlers::get_my_presence),
    command!(CMD_GET_MY_SCREEN_NAME, "GetMyScreenName", 0, 0, handlers::get_my_screen_name),
    command!(CMD_GET_MY_MII, "GetMyMii", 0, 0, handlers::get_my_mii),
    command!(
        CMD_GET_MY_LOCAL_ACCOUNT_ID,
        "GetMyLocalAccountId",
        0,
        0,
        handlers::get_my_local_account_id
    ),
    command!(
        CMD_GET_MY_FAVORITE_GAME,
        "GetMyFavoriteGame",
        0,
        0,
        handlers::get_my_favorite_game
    ),
    command!(
        CMD_GET_MY_NC_PRINCIPAL_ID,
        "GetMyNcPrincipalId",
        0,
        0,
        handlers::get_my_nc_principal_id
    ),
    command!(CMD_GET_MY_COMMENT, "GetMyComment", 0, 0, handlers::get_my_comment),
    command!(CMD_GET_MY_PASSWORD, "GetMyPassword", 1, 0, handlers::get_my_password),
    command!(CMD_GET_FRIEND_KEY_LIST, "GetFriendKeyList", 2, 0, handlers::get_friend_key_list),
    command!(CMD_GET_FRIEND_PRESENCE, "GetFriendPresence", 1, 2, handlers::get_friend_presence),
    command!(
        CMD_GET_FRIEND_SCREEN_NAME,
        "GetFriendScreenName",
        5,
        2,
        handlers::get_friend_screen_name
    ),
    command!(CMD_GET_FRIEND_MII, "GetFriendMii", 1, 4, handlers::get_friend_mii),
    command!(CMD_GET_FRIEND_PROFILE, "GetFriendProfile", 1, 2, handlers::get_friend_profile),
    command!(
        CMD_GET_FRIEND_RELATIONSHIP,
        "GetFriendRelationship",
        1,
        2,
        handlers::get_friend_relationship
    ),
    command!(
        CMD_GET_FRIEND_ATTRIBUTE_FLAGS,
        "GetFriendAttributeFlags",
        1,
        2,
        handlers::get_friend_attribute_flags
    ),
    command!(
        CMD_GET_FRIEND_FAVORITE_GAME,
        "GetFriendFavoriteGame",
        1,
        2,
        handlers::get_friend_favorite_game
    ),
    command!(CMD_GET_FRIEND_INFO, "GetFriendInfo", 3, 4, handlers::get_friend_info),
    command!(
        CMD_IS_INCLUDED_IN_FRIEND_LIST,
        "IsIncludedInFriendList",
        2,
        0,
        handlers::is_included_in_friend_list
    ),
    command!(
        CMD_UNSCRAMBLE_LOCAL_FRIEND_CODE,
        "UnscrambleLocalFriendCode",
        1,
        2,
        handlers::unscramble_local_friend_code_handler
    ),
    command!(
        CMD_UPDATE_GAME_MODE_DESCRIPTION,
        "UpdateGameModeDescription",
        0,
        2,
        handlers::update_game_mode_description
    ),
    command!(CMD_UPDATE_GAME_MODE, "UpdateGameMode", 11, 2, handlers::update_game_mode),
    command!(
        CMD_ATTACH_TO_EVENT_NOTIFICATION,
        "AttachToEventNotification",
        0,
        2,
        handlers::attach_to_event_notification
    ),
    command!(
        CMD_SET_NOTIFICATION_MASK,
        "SetNotificationMask",
        1,
        0,
        handlers::set_notification_mask
    ),
    command!(
        CMD_GET_LAST_RESPONSE_RESULT,
        "GetLastResponseResult",
        0,
        0,
        handlers::get_last_response_result
    ),
    command!(
        CMD_PRINCIPAL_ID_TO_FRIEND_CODE,
        "PrincipalIdToFriendCode",
        1,
        0,
        handlers::principal_id_to_friend_code_handler
    ),
    command!(
        CMD_FRIEND_CODE_TO_PRINCIPAL_ID,
        "FriendCodeToPrincipalId",
        2,
        0,
        handlers::friend_code_to_principal_id_handler
    ),
    command!(
        CMD_IS_VALID_FRIEND_CODE,
        "IsValidFriendCode",
        2,
        0,
        handlers::is_valid_friend_code_handler
    ),
    command!(
        CMD_REQUEST_GAME_AUTHENTICATION,
        "RequestGameAuthentication",
        9,
        4,
        handlers::request_game_authentication
    ),
    command!(
        CMD_GET_GAME_AUTHENTICATION_DATA,
        "GetGameAuthenticationData",
        0,
        0,
        handlers::get_game_authentication_data
    ),
    command!(CMD_GET_SERVER_TYPES, "GetServerTypes", 0, 0, handlers::get_server_types),
    command!(CMD_GET_FRIEND_COMMENT, "GetFriendComment", 1, 2, handlers::get_friend_comment),
    command!(
        CMD_SET_CLIENT_SDK_VERSION,
        "SetClientSdkVersion",
        1,
        2,
        handlers::set_client_sdk_version
    ),
];

/// Commands only `frd:a` answers.
const ADMIN_COMMANDS: &[Command] = &[command!(
    CMD_SET_LOCAL_ACCOUNT_ID,
    "SetLocalAccountId",
    1,
    0,
    handlers::set_local_account_id
)];

/// A friend service port. Both ports share one [`Module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrdService {
    kind: ServiceKind,
}

impl FrdService {
    pub const fn new(kind: ServiceKind) -> Self {
        Self { kind }
    }

    pub const fn user() -> Self {
        Self::new(ServiceKind::User)
    }

    pub const fn admin() -> Self {
        Self::new(ServiceKind::Admin)
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn max_sessions(&self) -> u32 {
        MAX_SESSIONS
    }

    /// Name of a command this service answers.
    pub fn command_name(&self, command_id: u16) -> Option<&'static str> {
        self.command(command_id).map(|command| command.name)
    }

    fn command(&self, command_id: u16) -> Option<&'static Command> {
        let admin: &'static [Command] = match self.kind {
            ServiceKind::User => &[],
            ServiceKind::Admin => ADMIN_COMMANDS,
        };
        COMMANDS
            .iter()
            .chain(admin)
            .find(|command| command.id == command_id)
    }

    /// Answers one request.
    ///
    /// # Panics
    /// If the request does not have the shape declared for its command.
    pub fn handle(&self, module: &mut Module, request: Request) -> Response {
        let command_id = request.header.command_id();
        let Some(command) = self.command(command_id) else {
            error!(
                service = self.name(),
                header = ?request.header,
                "unimplemented command"
            );
            return Response::error(command_id, ResultCode::FRIENDS_NOT_IMPLEMENTED);
        };

        assert_eq!(
            request.header,
            Header::new(command.id, command.normal_words, command.translate_words),
            "{}: malformed {} request",
            self.name(),
            command.name
        );
        debug!(service = self.name(), command = command.name, "handling request");

        let mut rp = RequestParser::new(request);
        (command.handler)(module, &mut rp)
    }
}
