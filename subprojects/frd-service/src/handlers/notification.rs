use tracing::debug;

use crate::{
    ipc::{RequestParser, Response},
    module::Module,
    result::ResultCode,
};

/// Registers the event signalled on friend notifications. Replaces any earlier one.
pub(crate) fn attach_to_event_notification(
    module: &mut Module,
    rp: &mut RequestParser,
) -> Response {
    let event = rp.pop_event();
    module.notification_event = Some(event);

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}

pub(crate) fn set_notification_mask(module: &mut Module, rp: &mut RequestParser) -> Response {
    let mask = rp.pop_u32();
    debug!(mask = format_args!("{mask:#x}"), "notification mask set");
    module.notification_mask = mask;

    let mut rb = rp.make_builder(1, 0);
    rb.push_result(ResultCode::SUCCESS);
    rb.build()
}
