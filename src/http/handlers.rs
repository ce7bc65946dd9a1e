//! Route handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method},
    response::{IntoResponse, Response},
    Json,
};

use crate::fetch::{self, FetchRequest, RequestError};
use crate::http::request::request_id;
use crate::http::server::AppState;

pub const LIVENESS_MESSAGE: &str = "Concurrent API Fetcher Server is up and running!";

/// Liveness text for `/` and every unmatched path, whatever the method.
pub async fn home() -> &'static str {
    LIVENESS_MESSAGE
}

/// `POST /fetch`: fetch every URL of the JSON body concurrently.
///
/// Any other method is rejected before the body is looked at.
pub async fn fetch_batch(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, RequestError> {
    let request_id = request_id(&headers);

    if method != Method::POST {
        tracing::debug!(request_id = %request_id, method = %method, "Rejected non-POST fetch");
        return Err(RequestError::MethodNotAllowed);
    }

    let request = decode_request(&body).map_err(|e| {
        tracing::debug!(request_id = %request_id, error = %e, "Rejected malformed JSON");
        e
    })?;

    let max_urls = state.limits.max_urls;
    if max_urls > 0 && request.len() > max_urls {
        return Err(RequestError::TooManyUrls {
            count: request.len(),
            max: max_urls,
        });
    }

    tracing::info!(request_id = %request_id, urls = request.len(), "Fetch batch received");

    let results = fetch::dispatch(&state.client, request, state.fetch.timeout(), &state.batches).await?;
    Ok(Json(results).into_response())
}

/// Decode the first JSON value of `body`; anything after it is ignored.
fn decode_request(body: &[u8]) -> Result<FetchRequest, RequestError> {
    match serde_json::Deserializer::from_slice(body)
        .into_iter::<FetchRequest>()
        .next()
    {
        Some(Ok(request)) => Ok(request),
        Some(Err(e)) => Err(RequestError::InvalidJson(e.to_string())),
        None => Err(RequestError::InvalidJson("EOF".to_string())),
    }
}
