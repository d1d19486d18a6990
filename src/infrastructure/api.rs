//! API Server (Cold Path)
//!
//! Read-only inspection of the trade watcher and runtime metrics.
//! State is injected at startup, nothing here is process-global.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::Level;

use crate::core::Trade;
use crate::infrastructure::metrics::{MetricsCollector, MetricsSnapshot};
use crate::market::TradeSink;
use crate::MarketError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<TradeSink>,
    pub metrics: Arc<MetricsCollector>,
}

/// Optional filters for /api/trades
#[derive(Debug, Default, Deserialize)]
pub struct TradesQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthDto {
    pub status: String,
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/trades", get(get_trades))
        .route("/api/metrics", get(get_metrics))
        .route("/health", get(get_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the API server
pub async fn start_server(state: AppState, port: u16) -> Result<(), MarketError> {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    crate::log_api!(Level::INFO, "API Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .await
        .map_err(|e| MarketError::Api(e.to_string()))?;

    Ok(())
}

/// Handler for /api/trades
/// Returns collected trades in arrival order
async fn get_trades(
    State(state): State<AppState>,
    Query(query): Query<TradesQuery>,
) -> Json<Vec<Trade>> {
    let trades = match query.symbol.as_deref() {
        Some(symbol) => state.sink.trades_for(symbol),
        None => state.sink.trades(),
    };
    Json(trades)
}

/// Handler for /api/metrics
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn get_health() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::trade;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        let sink = Arc::new(TradeSink::new());
        sink.on_trade(trade("ATT", 101.0));
        sink.on_trade(trade("SBUX", 99.0));
        sink.on_trade(trade("ATT", 102.0));
        AppState {
            sink,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> T {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_trades_in_arrival_order() {
        let trades: Vec<Trade> = get_json(router(state()), "/api/trades").await;
        assert_eq!(
            trades,
            vec![trade("ATT", 101.0), trade("SBUX", 99.0), trade("ATT", 102.0)]
        );
    }

    #[tokio::test]
    async fn test_trades_filtered_by_symbol() {
        let trades: Vec<Trade> = get_json(router(state()), "/api/trades?symbol=ATT").await;
        assert_eq!(trades, vec![trade("ATT", 101.0), trade("ATT", 102.0)]);

        let none: Vec<Trade> = get_json(router(state()), "/api/trades?symbol=ZOOM").await;
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let state = state();
        state.metrics.record_tick();
        let snapshot: serde_json::Value = get_json(router(state), "/api/metrics").await;
        assert_eq!(snapshot["ticks"], 1);
    }

    #[tokio::test]
    async fn test_health() {
        let health: HealthDto = get_json(router(state()), "/health").await;
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = router(state())
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
