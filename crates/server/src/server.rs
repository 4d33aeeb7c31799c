use std::{net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use engine::{LedgerStore, PartnerRoster};

use crate::dashboard;

pub const BANNER: &str = "Ledger bot is running.";

#[derive(Clone)]
pub struct ServerState {
    pub store: LedgerStore,
    pub roster: Arc<PartnerRoster>,
}

async fn banner() -> &'static str {
    BANNER
}

async fn health() -> &'static str {
    "OK"
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health))
        .route("/dashboard", get(dashboard::get_dashboard))
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::NaiveDate;
    use engine::MemoryStorage;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    async fn state() -> ServerState {
        let store = LedgerStore::builder()
            .storage(MemoryStorage::new())
            .build()
            .await;
        ServerState {
            store,
            roster: Arc::new(PartnerRoster::default()),
        }
    }

    async fn get_body(state: ServerState, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let (status, body) = get_body(state().await, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn root_shows_the_banner() {
        let (status, body) = get_body(state().await, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(String::from_utf8(body).unwrap(), BANNER);
    }

    #[tokio::test]
    async fn dashboard_reflects_the_store() {
        let state = state().await;
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        state
            .store
            .mutate(|ledger| ledger.set_capital(1_000_000, date))
            .await
            .unwrap();

        let (status, body) = get_body(state, "/dashboard").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["initial_capital"], 1_000_000);
        assert_eq!(json["cash_balance"], 1_000_000);
        assert_eq!(json["purchase_count"], 0);
        assert_eq!(json["partners"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        let (status, _) = get_body(state().await, "/vault").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
