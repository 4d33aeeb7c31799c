//! Dashboard API endpoint

use axum::{Json, extract::State};
use engine::Dashboard;

use crate::server::ServerState;

/// Every headline figure, computed from the current snapshot.
pub async fn get_dashboard(State(state): State<ServerState>) -> Json<Dashboard> {
    let ledger = state.store.snapshot().await;
    Json(Dashboard::compute(&ledger, &state.roster))
}
