//! Remote backend speaking JSON over HTTP to a CRUD service.
//!
//! Each operation issues exactly one blocking request; there is no retry,
//! backoff or built-in timeout. Callers needing a deadline configure it on
//! the agent passed to `RemoteBackend::with_agent`.

use super::ModelBackend;
use crate::codec;
use crate::config::OperationContext;
use crate::error::{MappError, MappResult};
use crate::model::single_model::{ListResult, ModelId, Page, SingleModel};
use log::debug;
use url::Url;

/// Collection path of the record resource on the remote side.
pub const MODEL_PATH: &str = "/api/template-module/single-model";

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client backend.
#[derive(Clone)]
pub struct RemoteBackend {
    agent: ureq::Agent,
}

impl Default for RemoteBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteBackend {
    pub fn new() -> Self {
        Self::with_agent(ureq::AgentBuilder::new().build())
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn collection_url(ctx: &OperationContext) -> String {
        format!("{}{MODEL_PATH}", ctx.client_host)
    }

    /// Item address with `id` percent-encoded as a single path segment.
    fn item_url(ctx: &OperationContext, id: &str) -> MappResult<Url> {
        let mut url = Url::parse(&Self::collection_url(ctx))
            .map_err(|err| MappError::Request(format!("error creating request: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                MappError::Request(format!(
                    "error creating request: `{}` cannot carry a path",
                    ctx.client_host
                ))
            })?
            .push(id);
        Ok(url)
    }
}

impl ModelBackend for RemoteBackend {
    fn create(&self, ctx: &OperationContext, model: SingleModel) -> MappResult<SingleModel> {
        codec::validate(&model)?;

        let url = Self::collection_url(ctx);
        debug!("event=remote_request module=remote method=POST url={url}");
        let outcome = self
            .agent
            .post(&url)
            .set("Content-Type", JSON_CONTENT_TYPE)
            .send_string(&codec::encode(&model));

        let body = response_body(outcome, None, "creating single model")?;
        decode_model(&body)
    }

    fn read(&self, ctx: &OperationContext, id: &str) -> MappResult<SingleModel> {
        let url = Self::item_url(ctx, id)?;
        debug!("event=remote_request module=remote method=GET url={url}");
        let outcome = self.agent.request_url("GET", &url).call();

        let body = response_body(outcome, Some(id), "reading single model")?;
        decode_model(&body)
    }

    fn update(
        &self,
        ctx: &OperationContext,
        id: &str,
        mut model: SingleModel,
    ) -> MappResult<SingleModel> {
        codec::validate(&model)?;
        if model.id.is_unassigned() {
            model.id = ModelId::assigned(id);
        }

        let url = Self::item_url(ctx, id)?;
        debug!("event=remote_request module=remote method=PUT url={url}");
        let outcome = self
            .agent
            .request_url("PUT", &url)
            .set("Content-Type", JSON_CONTENT_TYPE)
            .send_string(&codec::encode(&model));

        let body = response_body(outcome, Some(id), "updating single model")?;
        decode_model(&body)
    }

    fn delete(&self, ctx: &OperationContext, id: &str) -> MappResult<()> {
        let url = Self::item_url(ctx, id)?;
        debug!("event=remote_request module=remote method=DELETE url={url}");
        let outcome = self.agent.request_url("DELETE", &url).call();

        // 404 stays `http_404`; unknown-id semantics belong to the remote side.
        response_body(outcome, None, "deleting single model").map(|_| ())
    }

    fn list(&self, ctx: &OperationContext, page: Page) -> MappResult<ListResult> {
        let url = Self::collection_url(ctx);
        debug!(
            "event=remote_request module=remote method=GET url={url} offset={} limit={}",
            page.offset, page.limit
        );
        let outcome = self
            .agent
            .get(&url)
            .query("offset", &page.offset.to_string())
            .query("limit", &page.limit.to_string())
            .call();

        let body = response_body(outcome, None, "listing single models")?;
        codec::decode_list(&body)
            .map_err(|err| MappError::Parse(format!("error parsing response: {err}")))
    }
}

/// Reads a successful body or classifies the failure.
///
/// `not_found_id` enables the 404 -> `not_found` mapping.
fn response_body(
    outcome: Result<ureq::Response, ureq::Error>,
    not_found_id: Option<&str>,
    action: &str,
) -> MappResult<String> {
    match outcome {
        Ok(response) => response
            .into_string()
            .map_err(|err| MappError::Read(format!("error reading response: {err}"))),
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(classify_status(status, body, not_found_id))
        }
        Err(ureq::Error::Transport(transport)) => Err(classify_transport(&transport, action)),
    }
}

/// Fixed status mapping shared by every remote operation.
pub fn classify_status(status: u16, body: String, not_found_id: Option<&str>) -> MappError {
    match (status, not_found_id) {
        (401, _) => MappError::Authentication,
        (403, _) => MappError::Forbidden,
        (404, Some(id)) => MappError::not_found(id),
        _ => MappError::HttpStatus { status, body },
    }
}

fn classify_transport(transport: &ureq::Transport, action: &str) -> MappError {
    match transport.kind() {
        ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
            MappError::Request(format!("error creating request: {transport}"))
        }
        _ => MappError::Http(format!("error {action}: {transport}")),
    }
}

fn decode_model(body: &str) -> MappResult<SingleModel> {
    codec::decode(body).map_err(|err| MappError::Parse(format!("error parsing response: {err}")))
}
