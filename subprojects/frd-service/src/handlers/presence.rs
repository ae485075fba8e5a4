//! The local user's presence. Held in memory only.

use frd_savedata::raw::{
    friend::{GAME_MODE_DESCRIPTION_LEN, GameMode},
    utf16_to_string,
};
use tracing::debug;
use zerocopy::{IntoBytes, little_endian::U16};

use crate::{
    ipc::{RequestParser, Response},
    module::Module,
    result::ResultCode,
};

pub(crate) fn get_my_presence(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mut rb = rp.make_builder(1, 2);
    rb.push_result(ResultCode::SUCCESS);
    rb.push_static_buffer(module.my_presence.as_bytes().to_vec(), 0);
    rb.build()
}

pub(crate) fn update_game_mode_description(
    module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let description = rp.pop_static_buffer();
    set_description(module, &description);

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

pub(crate) fn update_game_mode(module: &mut Module, rp: &mut RequestParser) -> Response {
    let game_mode = rp.pop_raw::<GameMode>();
    let description = rp.pop_static_buffer();

    debug!(
        game_id = game_mode.game_id.get(),
        game_mode = game_mode.game_mode.get(),
        "UpdateGameMode"
    );
    module.my_presence.game_mode = game_mode;
    set_description(module, &description);

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

/// Replaces the description with UTF-16LE `bytes`, truncated to leave a terminator.
fn set_description(module: &mut Module, bytes: &[u8]) {
    let mut description = [U16::ZERO; GAME_MODE_DESCRIPTION_LEN];
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0);
    for (slot, unit) in description
        .iter_mut()
        .take(GAME_MODE_DESCRIPTION_LEN - 1)
        .zip(units)
    {
        *slot = U16::new(unit);
    }

    debug!(description = %utf16_to_string(&description), "game mode description updated");
    module.my_presence.description = description;
}

#[cfg(test)]
mod tests {
    use frd_savedata::raw::friend::MyPresence;
    use zerocopy::FromBytes;

    use super::*;
    use crate::{
        handlers::tests::call,
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

    fn utf16_buffer(text: &str) -> TranslatedItem {
        let data = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        TranslatedItem::StaticBuffer { id: 0, data }
    }

    #[test]
    fn test_presence_starts_empty() {
        let (_rt, mut module) = module();
        let response = call(&mut module, CMD_GET_MY_PRESENCE, vec![], vec![]);
        let bytes = response.static_buffer(0).unwrap();
        assert_eq!(bytes.len(), size_of::<MyPresence>());
        assert!(bytes.iter().all(|&byte| byte == 0));
    }

    #[test]
    fn test_update_game_mode() {
        let (_rt, mut module) = module();
        let game_mode = GameMode {
            game_id: 0x0012_3400.into(),
            game_mode: 3.into(),
            ..GameMode::default()
        };
        let mut words = Vec::new();
        for chunk in game_mode.as_bytes().chunks(4) {
            words.push(u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }

        let response = call(
            &mut module,
            CMD_UPDATE_GAME_MODE,
            words,
            vec![utf16_buffer("Racing")],
        );
        assert!(response.result().is_success());

        let response = call(&mut module, CMD_GET_MY_PRESENCE, vec![], vec![]);
        let presence = MyPresence::read_from_bytes(response.static_buffer(0).unwrap()).unwrap();
        assert_eq!(presence.game_mode, game_mode);
        assert_eq!(utf16_to_string(&presence.description), "Racing");
    }

    #[test]
    fn test_description_is_truncated() {
        let (_rt, mut module) = module();
        let long = "x".repeat(GAME_MODE_DESCRIPTION_LEN + 10);
        call(
            &mut module,
            CMD_UPDATE_GAME_MODE_DESCRIPTION,
            vec![],
            vec![utf16_buffer(&long)],
        );

        let description = &module.my_presence().description;
        assert_eq!(description[GAME_MODE_DESCRIPTION_LEN - 1].get(), 0);
        assert_eq!(
            utf16_to_string(description).len(),
            GAME_MODE_DESCRIPTION_LEN - 1
        );
    }
}
