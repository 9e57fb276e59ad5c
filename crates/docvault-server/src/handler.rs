use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Json, Response};
use docvault_service::{InputError, ServiceError};
use docvault_types::{DocumentId, DocumentMeta};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::auth::{Credentials, Identity};
use crate::error::{ServerError, ServerResult};
use crate::response::{DocumentView, Envelope};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub token: String,
    pub login: String,
    pub pswd: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub pswd: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub login: String,
    pub key: String,
    pub value: String,
    /// Kept raw: anything that is not an integer means no limit.
    pub limit: String,
}

impl ListParams {
    pub fn limit(&self) -> i64 {
        self.limit.trim().parse().unwrap_or(0)
    }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(v)| v)
        .map_err(|e| ServerError::BadRequest(e.body_text()))
}

/// Unparseable ids cannot name a stored document.
fn document_id(raw: &str) -> ServerResult<DocumentId> {
    raw.parse()
        .map_err(|_| ServerError::from(ServiceError::NotFound("document")))
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn register_handler(
    State(state): State<SharedState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> ServerResult<Envelope> {
    let req = json_body(body)?;
    state
        .sessions
        .register(&req.token, &req.login, &req.pswd, &state.config.admin_token)
        .await?;
    Ok(Envelope::response(json!({ "login": req.login })))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ServerResult<Envelope> {
    let req = json_body(body)?;
    let token = state
        .sessions
        .authenticate(&req.login, &req.pswd, state.config.token_ttl())
        .await?;
    Ok(Envelope::response(json!({ "token": token.as_str() })))
}

pub async fn logout_handler(
    State(state): State<SharedState>,
    headers: axum::http::HeaderMap,
) -> ServerResult<Envelope> {
    let token = Credentials::from_headers(&headers).into_token()?;
    state.sessions.logout(&token).await?;
    Ok(Envelope::acknowledged(token.into_string()))
}

pub async fn list_documents_handler(
    State(state): State<SharedState>,
    identity: Identity,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ServerResult<Envelope> {
    let Query(params) = params.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let docs = state
        .documents
        .list(
            &identity.login,
            &params.login,
            &params.key,
            &params.value,
            params.limit(),
        )
        .await?;
    let docs: Vec<DocumentView> = docs.into_iter().map(DocumentView::from).collect();
    Ok(Envelope::data(json!({ "docs": docs })))
}

/// Multipart upload: `meta` (JSON), optional `json` (JSON object), and
/// `file` when `meta.file` is set.
pub async fn create_document_handler(
    State(state): State<SharedState>,
    identity: Identity,
    mut multipart: Multipart,
) -> ServerResult<Envelope> {
    let mut meta: Option<DocumentMeta> = None;
    let mut payload: Option<Value> = None;
    let mut blob: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "meta" => {
                let raw = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                let parsed = serde_json::from_slice(&raw)
                    .map_err(|e| InputError::Malformed(format!("meta: {e}")))
                    .map_err(ServiceError::from)?;
                meta = Some(parsed);
            }
            "json" => {
                let raw = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                let value: Value = serde_json::from_slice(&raw)
                    .map_err(|e| InputError::Malformed(format!("json: {e}")))
                    .map_err(ServiceError::from)?;
                if !value.is_object() {
                    let err = InputError::Malformed("json must be an object".into());
                    return Err(ServiceError::from(err).into());
                }
                payload = Some(value);
            }
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(e.body_text()))?;
                blob = Some(bytes.to_vec());
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    let meta = meta.ok_or(ServiceError::from(InputError::MissingField("meta")))?;
    let file_name = meta.file.then(|| meta.name.clone());
    let id = if meta.file {
        let blob = blob.ok_or(ServiceError::from(InputError::MissingField("file")))?;
        state
            .documents
            .create_with_blob(&identity.login, meta, payload.clone(), &blob)
            .await?
    } else {
        state
            .documents
            .create(&identity.login, meta, payload.clone())
            .await?
    };
    Ok(Envelope::data(json!({
        "json": payload,
        "file": file_name,
        "id": id.to_string(),
    })))
}

/// Blob-backed documents are streamed from disk with their mime type;
/// everything else is returned as the JSON payload in `data`.
pub async fn get_document_handler(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
    request: Request,
) -> ServerResult<Response> {
    let id = document_id(&id)?;
    let fetched = state.documents.get(&identity.login, &id).await?;
    let Some(path) = fetched.blob_path else {
        return Ok(Envelope::data(fetched.json_payload.unwrap_or(Value::Null)).into_response());
    };
    if !tokio::fs::try_exists(&path).await? {
        tracing::warn!(%id, path = %path.display(), "blob missing for document");
        return Err(ServiceError::NotFound("document").into());
    }

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);
    if response.status().is_success() {
        let mime = HeaderValue::from_str(&fetched.mime)
            .ok()
            .filter(|_| !fetched.mime.is_empty())
            .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
        response.headers_mut().insert(CONTENT_TYPE, mime);
    }
    Ok(response)
}

pub async fn delete_document_handler(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
) -> ServerResult<Envelope> {
    let id = document_id(&id)?;
    state.documents.delete(&identity.login, &id).await?;
    Ok(Envelope::acknowledged(id.to_string()))
}
