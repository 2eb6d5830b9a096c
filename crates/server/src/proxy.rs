//! The authenticating request forwarder.
//!
//! Any inbound request on a `.json` path is forwarded to the remote store
//! with its query parameters passed through and the current `access_token`
//! appended. Responses are relayed verbatim — the proxy never caches.

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::AppState;
use crate::error::ApiErr;

/// Inbound body cap; store writes are far smaller.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub async fn forward(state: AppState, req: Request) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(str::to_string);

    if method == Method::DELETE && state.disable_delete {
        return ApiErr::method_not_allowed("delete is disabled on this viewer").into_response();
    }

    let body = match to_bytes(req.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return ApiErr::bad_request(format!("unreadable request body: {e}")).into_response();
        }
    };

    let token = match state.tokens.token().await {
        Ok(token) => token,
        Err(e) => {
            error!("minting a token for {method} {path} failed: {e}");
            return ApiErr::internal("failed to obtain an access token").into_response();
        }
    };

    let url = match &query {
        Some(query) => format!("{}{}?{}", state.database, path, query),
        None => format!("{}{}", state.database, path),
    };
    let mut outbound = state.client.request(method.clone(), url);
    if !token.is_empty() {
        outbound = outbound.query(&[("access_token", token.as_str())]);
    }
    // An empty (or empty-object) body is omitted rather than forwarded.
    if !body.is_empty() && &body[..] != b"{}" {
        outbound = outbound
            .header(header::CONTENT_TYPE, "application/json")
            .body(body);
    }

    let pending = state.pending.register();
    let cancel = pending.cancellation();
    let call = {
        let method = method.clone();
        let path = path.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("client disconnected, aborting forward {method} {path}");
                    None
                }
                result = outbound.send() => Some(result),
            }
        })
    };

    match call.await {
        Ok(Some(Ok(resp))) => relay(resp).await,
        Ok(Some(Err(e))) => {
            error!("forward {method} {path} failed: {e}");
            ApiErr::bad_gateway("remote store unreachable").into_response()
        }
        // Cancellation fires only when this handler itself was dropped, so
        // nobody is left to receive this arm's value.
        Ok(None) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Err(e) => {
            error!("forward {method} {path} task failed: {e}");
            ApiErr::internal("forwarding task failed").into_response()
        }
    }
}

/// Relay the remote response: status and JSON body verbatim.
async fn relay(resp: reqwest::Response) -> Response {
    let status = resp.status();
    match resp.bytes().await {
        Ok(bytes) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("reading the remote store response failed: {e}");
            ApiErr::bad_gateway("remote store response unreadable").into_response()
        }
    }
}
