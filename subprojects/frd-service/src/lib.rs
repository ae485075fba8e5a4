//! # frd-service
//! Friend services (`frd:u` / `frd:a`) high-level emulation.
//!
//! The host decodes each IPC message into a [`Request`] and passes it, together with the
//! shared [`Module`], to the [`FrdService`] port the session is connected to. The response is
//! encoded back by the host.
//!
//! Modules:
//! - `module`: loaded save records and session state
//! - `service`: command table and dispatch
//! - `auth`: game server authentication on a spawned task
//! - `storage`: access to the system save data archive
//! - `ipc`: request and response model
//! - `result`: 3DS result codes
//! - `config`: TOML service configuration
//! - `platform`: facilities supplied by the host emulator
//!
//! Logging goes through `tracing`; installing a subscriber is left to the host.
//!
//! # References
//! - [3dbrew Friend Services](https://www.3dbrew.org/wiki/Friend_Services)
//! - [3dbrew NASC](https://www.3dbrew.org/wiki/NASC)

pub mod auth;
pub mod config;
mod handlers;
pub mod ipc;
pub mod module;
pub mod platform;
pub mod proto;
pub mod result;
pub mod service;
pub mod storage;

pub use self::{
    config::ServiceConfig,
    ipc::{Request, Response},
    module::Module,
    platform::{Event, Platform, TitleInfo},
    result::ResultCode,
    service::{FrdService, ServiceKind},
    storage::{HostSaveArchive, MemoryArchive, SaveArchive},
};
