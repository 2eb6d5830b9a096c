use axum::extract::State;
use tracing::error;

use crate::AppState;
use crate::error::ApiErr;

/// `GET /database` — the configured remote store base URL, as plain text.
///
/// The web UI bootstraps from this before its first data fetch.
pub async fn database(State(state): State<AppState>) -> String {
    state.database.clone()
}

/// `GET /token` — the current access token, minting one if needed.
pub async fn token(State(state): State<AppState>) -> Result<String, ApiErr> {
    state.tokens.token().await.map_err(|e| {
        error!("minting a token failed: {e}");
        ApiErr::internal("failed to obtain an access token")
    })
}
