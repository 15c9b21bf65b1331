//! Backend contract and its two implementations.
//!
//! # Responsibility
//! - Define the CRUD operation set every backend satisfies.
//! - Provide the tagged variant resolved once from configuration.
//!
//! # Invariants
//! - Backends return typed `MappError`s and never terminate the process.
//! - The `OperationContext` is only read, never mutated.

pub mod local;
pub mod remote;

use crate::config::OperationContext;
use crate::error::{MappError, MappResult};
use crate::model::single_model::{ListResult, Page, SingleModel};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Result of the table creation action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub message: String,
    pub status: String,
}

/// CRUD operation set shared by the remote and local backends.
pub trait ModelBackend {
    /// Persists a new record and returns it with its assigned identity.
    fn create(&self, ctx: &OperationContext, model: SingleModel) -> MappResult<SingleModel>;
    fn read(&self, ctx: &OperationContext, id: &str) -> MappResult<SingleModel>;
    /// Replaces every non-identity field of record `id`.
    fn update(&self, ctx: &OperationContext, id: &str, model: SingleModel)
        -> MappResult<SingleModel>;
    fn delete(&self, ctx: &OperationContext, id: &str) -> MappResult<()>;
    fn list(&self, ctx: &OperationContext, page: Page) -> MappResult<ListResult>;

    /// Prepares storage; only meaningful for local storage.
    fn create_table(&self, _ctx: &OperationContext) -> MappResult<TableStatus> {
        Err(MappError::InvalidAction(
            "create-table is only available for the local backend".to_string(),
        ))
    }
}

/// Which backend a caller selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Remote,
    Local,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

impl FromStr for BackendKind {
    type Err = MappError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "remote" => Ok(Self::Remote),
            "local" => Ok(Self::Local),
            other => Err(MappError::UnknownCommand(other.to_string())),
        }
    }
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The configured backend, chosen once and then dispatched statically.
#[derive(Clone)]
pub enum AnyBackend {
    Remote(RemoteBackend),
    Local(LocalBackend),
}

impl AnyBackend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Remote(_) => BackendKind::Remote,
            Self::Local(_) => BackendKind::Local,
        }
    }
}

impl From<RemoteBackend> for AnyBackend {
    fn from(value: RemoteBackend) -> Self {
        Self::Remote(value)
    }
}

impl From<LocalBackend> for AnyBackend {
    fn from(value: LocalBackend) -> Self {
        Self::Local(value)
    }
}

impl ModelBackend for AnyBackend {
    fn create(&self, ctx: &OperationContext, model: SingleModel) -> MappResult<SingleModel> {
        match self {
            Self::Remote(backend) => backend.create(ctx, model),
            Self::Local(backend) => backend.create(ctx, model),
        }
    }

    fn read(&self, ctx: &OperationContext, id: &str) -> MappResult<SingleModel> {
        match self {
            Self::Remote(backend) => backend.read(ctx, id),
            Self::Local(backend) => backend.read(ctx, id),
        }
    }

    fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        model: SingleModel,
    ) -> MappResult<SingleModel> {
        match self {
            Self::Remote(backend) => backend.update(ctx, id, model),
            Self::Local(backend) => backend.update(ctx, id, model),
        }
    }

    fn delete(&self, ctx: &OperationContext, id: &str) -> MappResult<()> {
        match self {
            Self::Remote(backend) => backend.delete(ctx, id),
            Self::Local(backend) => backend.delete(ctx, id),
        }
    }

    fn list(&self, ctx: &OperationContext, page: Page) -> MappResult<ListResult> {
        match self {
            Self::Remote(backend) => backend.list(ctx, page),
            Self::Local(backend) => backend.list(ctx, page),
        }
    }

    fn create_table(&self, ctx: &OperationContext) -> MappResult<TableStatus> {
        match self {
            Self::Remote(backend) => backend.create_table(ctx),
            Self::Local(backend) => backend.create_table(ctx),
        }
    }
}
