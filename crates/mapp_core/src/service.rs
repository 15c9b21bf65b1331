//! Record use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for CLI and server callers.
//! - Decode text bodies through the codec, then delegate to the backend.
//!
//! # Invariants
//! - Service APIs never bypass backend contracts and add no semantics of
//!   their own; backend results and errors pass through unchanged.
//! - Service layer remains storage-agnostic.

use crate::backend::{
    AnyBackend, BackendKind, LocalBackend, ModelBackend, RemoteBackend, TableStatus,
};
use crate::codec;
use crate::config::OperationContext;
use crate::db::SharedStore;
use crate::error::MappResult;
use crate::model::single_model::{ListResult, Page, SingleModel};
use std::sync::Arc;

/// Use-case service wrapper for record CRUD operations.
#[derive(Clone)]
pub struct CrudService<B: ModelBackend> {
    backend: B,
}

impl CrudService<AnyBackend> {
    /// Resolves the backend once for the selected kind.
    pub fn for_kind(kind: BackendKind, store: Arc<SharedStore>) -> Self {
        let backend = match kind {
            BackendKind::Remote => AnyBackend::Remote(RemoteBackend::new()),
            BackendKind::Local => AnyBackend::Local(LocalBackend::new(store)),
        };
        Self::new(backend)
    }
}

impl<B: ModelBackend> CrudService<B> {
    /// Creates a service using the provided backend implementation.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates `body` and creates the record it describes.
    pub fn create(&self, ctx: &OperationContext, body: &str) -> MappResult<SingleModel> {
        let model = codec::decode(body)?;
        self.backend.create(ctx, model)
    }

    pub fn create_model(
        &self,
        ctx: &OperationContext,
        model: SingleModel,
    ) -> MappResult<SingleModel> {
        self.backend.create(ctx, model)
    }

    pub fn read(&self, ctx: &OperationContext, id: &str) -> MappResult<SingleModel> {
        self.backend.read(ctx, id)
    }

    /// Validates `body` and replaces record `id` with it.
    pub fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        body: &str,
    ) -> MappResult<SingleModel> {
        let model = codec::decode(body)?;
        self.backend.update(ctx, id, model)
    }

    pub fn update_model(
        &self,
        ctx: &OperationContext,
        id: &str,
        model: SingleModel,
    ) -> MappResult<SingleModel> {
        self.backend.update(ctx, id, model)
    }

    pub fn delete(&self, ctx: &OperationContext, id: &str) -> MappResult<()> {
        self.backend.delete(ctx, id)
    }

    pub fn list(&self, ctx: &OperationContext, page: Page) -> MappResult<ListResult> {
        self.backend.list(ctx, page)
    }

    pub fn create_table(&self, ctx: &OperationContext) -> MappResult<TableStatus> {
        self.backend.create_table(ctx)
    }
}
