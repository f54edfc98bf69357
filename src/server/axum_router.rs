use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use crate::dataset::Dataset;

use super::{ZarrResponse, ZarrService, ZarrServiceError};

#[derive(Clone)]
struct ZarrState {
    service: ZarrService,
    dataset: Arc<Dataset>,
}

/// Create an [`axum`] router serving `dataset` with `service`.
///
/// Routes `/.zmetadata`, `/.zgroup`, `/.zattrs`, and `/{var}/{key}` are relative to where the router is nested.
/// Requests are handled on the blocking thread pool of the [`tokio`] runtime.
/// Errors are returned as `{"detail": "..."}` with the [status code](ZarrServiceError::status_code) of the error.
pub fn router(service: ZarrService, dataset: Arc<Dataset>) -> Router {
    Router::new()
        .route("/.zmetadata", get(get_zmetadata))
        .route("/.zgroup", get(get_zgroup))
        .route("/.zattrs", get(get_zattrs))
        .route("/:var/:key", get(get_variable_chunk))
        .with_state(ZarrState { service, dataset })
}

fn detail(status: StatusCode, detail: String) -> Response {
    (status, Json(serde_json::json!({ "detail": detail }))).into_response()
}

impl IntoResponse for ZarrResponse {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, self.media_type())], self.into_body()).into_response()
    }
}

impl IntoResponse for ZarrServiceError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        detail(status, self.to_string())
    }
}

async fn respond<F>(state: ZarrState, f: F) -> Response
where
    F: FnOnce(&ZarrService, &Dataset) -> Result<ZarrResponse, ZarrServiceError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(&state.service, &state.dataset)).await {
        Ok(Ok(response)) => response.into_response(),
        Ok(Err(err)) => {
            log::debug!("{err}");
            err.into_response()
        }
        Err(err) => detail(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

async fn get_zmetadata(State(state): State<ZarrState>) -> Response {
    respond(state, |service, dataset| service.zmetadata(dataset)).await
}

async fn get_zgroup(State(state): State<ZarrState>) -> Response {
    respond(state, |service, dataset| service.zgroup(dataset)).await
}

async fn get_zattrs(State(state): State<ZarrState>) -> Response {
    respond(state, |service, dataset| service.zattrs(dataset)).await
}

async fn get_variable_chunk(
    State(state): State<ZarrState>,
    Path((var, key)): Path<(String, String)>,
) -> Response {
    respond(state, move |service, dataset| {
        service.variable_chunk(dataset, &var, &key)
    })
    .await
}
