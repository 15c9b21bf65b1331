//! Core record CRUD logic for mapp.
//! Owns the record schema, both backends, the REST surface and the shared
//! error taxonomy; the CLI crate only parses arguments and prints results.

pub mod backend;
pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod server;
pub mod service;

pub use backend::{AnyBackend, BackendKind, LocalBackend, ModelBackend, RemoteBackend, TableStatus};
pub use codec::CodecError;
pub use config::{AppConfig, OperationContext, StoreLocation};
pub use db::SharedStore;
pub use error::{ErrorBody, MappError, MappResult};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::single_model::{
    DateTime, DateTimeError, ListResult, ModelId, Page, SingleEnum, SingleModel,
};
pub use server::ServerState;
pub use service::CrudService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
