//! treebase server: an authenticating proxy in front of a remote JSON
//! store, plus static hosting for the web UI.

pub mod config;
pub mod credentials;
pub mod error;
pub mod pending;
pub mod proxy;
pub mod routes;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::Args;
use crate::credentials::ServiceAccount;
use crate::pending::PendingRequests;
use crate::token::TokenCache;

/// Outbound timeout for forwarded calls and token exchanges.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Remote store base URL, trailing slash trimmed.
    pub database: String,
    pub client: reqwest::Client,
    pub tokens: Arc<TokenCache>,
    pub pending: Arc<PendingRequests>,
    pub static_files: Option<ServeDir<ServeFile>>,
    pub disable_delete: bool,
}

impl AppState {
    pub fn new(args: &Args) -> anyhow::Result<Self> {
        let account = args
            .service_account
            .as_deref()
            .map(ServiceAccount::load)
            .transpose()?;
        if account.is_none() && args.token.is_none() {
            tracing::warn!(
                "no service account or static token configured — forwarding unauthenticated"
            );
        }

        let client = reqwest::Client::builder().timeout(OUTBOUND_TIMEOUT).build()?;

        let static_files = if args.web_dir.exists() {
            tracing::info!("serving the web UI from {}", args.web_dir.display());
            let index_html = args.web_dir.join("index.html");
            Some(ServeDir::new(&args.web_dir).fallback(ServeFile::new(index_html)))
        } else {
            tracing::warn!("web UI directory {} not found", args.web_dir.display());
            None
        };

        Ok(Self {
            database: args.database.trim_end_matches('/').to_string(),
            tokens: Arc::new(TokenCache::new(
                client.clone(),
                account,
                args.token.clone(),
            )),
            client,
            pending: Arc::new(PendingRequests::default()),
            static_files,
            disable_delete: args.disable_delete,
        })
    }
}

/// Build the proxy router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/database", get(routes::database))
        .route("/token", get(routes::token))
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Everything outside the named routes: a `.json` data suffix goes to the
/// forwarder with any method; any other GET serves the web UI with an
/// `index.html` fallback.
async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    if req.uri().path().ends_with(".json") {
        return proxy::forward(state, req).await;
    }
    if req.method() == Method::GET {
        if let Some(files) = &state.static_files {
            return match files.clone().oneshot(req).await {
                Ok(resp) => resp.map(Body::new).into_response(),
                Err(infallible) => match infallible {},
            };
        }
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::METHOD_NOT_ALLOWED.into_response()
}

/// Run the server until the process is stopped.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let state = AppState::new(&args)?;
    let app = app(state);

    let listener = tokio::net::TcpListener::bind((args.bind.as_str(), args.port)).await?;
    tracing::info!(
        "listening at http://{}:{} (store: {})",
        args.bind,
        args.port,
        args.database
    );
    axum::serve(listener, app).await?;
    Ok(())
}
