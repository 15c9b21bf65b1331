//! REST surface over the local backend.
//!
//! # Responsibility
//! - Route collection and item requests to the CRUD service.
//! - Translate `MappError` into HTTP status codes and `{message, code}` bodies.
//! - Log every handled request.
//!
//! # Invariants
//! - Only the local backend is exposed.
//! - Storage work runs on the blocking pool; handlers share the store handle
//!   and never assume exclusive access to it.
//! - Request logging never changes or delays the response outcome.

use crate::backend::remote::MODEL_PATH;
use crate::backend::LocalBackend;
use crate::codec::{self, CodecError};
use crate::config::OperationContext;
use crate::db::SharedStore;
use crate::error::{ErrorBody, MappError, MappResult};
use crate::model::single_model::{ModelId, Page};
use crate::service::CrudService;
use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

pub const DEFAULT_LIST_OFFSET: u32 = 0;
pub const DEFAULT_LIST_LIMIT: u32 = 25;

/// Shared handler state: the caller-owned context plus the local service.
#[derive(Clone)]
pub struct ServerState {
    ctx: Arc<OperationContext>,
    service: CrudService<LocalBackend>,
}

impl ServerState {
    pub fn new(ctx: OperationContext, store: Arc<SharedStore>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            service: CrudService::new(LocalBackend::new(store)),
        }
    }

    /// Builds the state and prepares the record table before first use.
    pub fn bootstrap(ctx: OperationContext, store: Arc<SharedStore>) -> MappResult<Self> {
        let state = Self::new(ctx, store);
        state.service.create_table(&state.ctx)?;
        Ok(state)
    }

    pub fn context(&self) -> &OperationContext {
        &self.ctx
    }

    pub fn service(&self) -> &CrudService<LocalBackend> {
        &self.service
    }
}

/// Builds the route table.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            MODEL_PATH,
            post(create_model)
                .get(list_models)
                .fallback(method_not_allowed),
        )
        .route(
            &format!("{MODEL_PATH}/:id"),
            get(read_model)
                .put(update_model)
                .delete(delete_model)
                .fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Serves on an already bound listener until the process stops.
pub async fn serve_on(listener: TcpListener, state: ServerState) -> std::io::Result<()> {
    info!(
        "event=server_start module=server status=ok addr={} store={}",
        listener.local_addr()?,
        state.context().store.describe()
    );
    axum::serve(listener, router(state)).await
}

/// Binds `0.0.0.0:<port>` and serves.
pub async fn serve(state: ServerState, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await?;
    serve_on(listener, state).await
}

/// Blocking entry point for binaries without their own runtime.
pub fn run_server(state: ServerState, port: u16) -> std::io::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(state, port))
}

async fn create_model(State(state): State<ServerState>, body: Bytes) -> Response {
    let outcome = run_blocking(move || {
        let text = body_text(&body)?;
        state.service.create(&state.ctx, text)
    })
    .await;

    match outcome {
        Ok(model) => Json(codec::to_value(&model)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn list_models(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let page = Page::new(
        count_param(&params, "offset", DEFAULT_LIST_OFFSET),
        count_param(&params, "limit", DEFAULT_LIST_LIMIT),
    );
    let outcome = run_blocking(move || state.service.list(&state.ctx, page)).await;

    match outcome {
        Ok(list) => Json(codec::list_to_value(&list)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn read_model(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    let outcome = run_blocking(move || state.service.read(&state.ctx, &id)).await;

    match outcome {
        Ok(model) => Json(codec::to_value(&model)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn update_model(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let outcome = run_blocking(move || {
        let model = codec::decode(body_text(&body)?)?;
        if let ModelId::Assigned(body_id) = &model.id {
            if body_id != &id {
                return Err(MappError::IdMismatch {
                    path_id: id,
                    body_id: body_id.clone(),
                });
            }
        }
        state.service.update_model(&state.ctx, &id, model)
    })
    .await;

    match outcome {
        Ok(model) => Json(codec::to_value(&model)).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn delete_model(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    let outcome = run_blocking(move || state.service.delete(&state.ctx, &id)).await;

    match outcome {
        Ok(()) => Json(json!({ "acknowledged": true })).into_response(),
        Err(err) => error_response(&err),
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("invalid request method", "method_not_allowed")),
    )
        .into_response()
}

async fn route_not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(
            format!("no route for {}", uri.path()),
            "not_found",
        )),
    )
        .into_response()
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;

    info!(
        "event=http_request module=server method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started_at.elapsed().as_millis()
    );
    response
}

async fn run_blocking<T, F>(op: F) -> MappResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> MappResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op).await.map_err(|err| {
        error!("event=http_request module=server status=error error_code=task_failed error={err}");
        MappError::Db(format!("storage task failed: {err}"))
    })?
}

fn body_text(body: &[u8]) -> MappResult<&str> {
    std::str::from_utf8(body)
        .map_err(|err| MappError::Validation(CodecError::Parse(err.to_string())))
}

/// Reads a non-negative count, silently falling back on absent or bad input.
fn count_param(params: &HashMap<String, String>, name: &str, default: u32) -> u32 {
    params
        .get(name)
        .and_then(|value| value.parse::<u32>().ok())
        .unwrap_or(default)
}

fn status_for(err: &MappError) -> StatusCode {
    match err {
        MappError::Validation(_) | MappError::IdMismatch { .. } => StatusCode::BAD_REQUEST,
        MappError::NotFound { .. } => StatusCode::NOT_FOUND,
        MappError::Authentication => StatusCode::UNAUTHORIZED,
        MappError::Forbidden => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &MappError) -> Response {
    (status_for(err), Json(err.to_body())).into_response()
}
