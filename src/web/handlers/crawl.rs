//! Crawl API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};

use super::AppState;
use crate::catalog::{CrawlLogRepository, CrawlStats};
use crate::web::dto::{CrawlLogResponse, LogsQuery, StatsQuery, MAX_STATS_HOURS};
use crate::web::error::{ApiError, ApiResult};

/// POST /api/crawl - Run one crawl pass over all active sources.
///
/// Responds 200 with the per-source summary, or 500 with
/// `{ success: false, error }` when the run could not start.
pub async fn run_crawl(State(state): State<Arc<AppState>>) -> Response {
    let report = state.orchestrator.run().await;
    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(report)).into_response()
}

/// GET /api/crawl/logs - Recent crawl log entries with source names.
pub async fn list_crawl_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<CrawlLogResponse>>> {
    let logs = CrawlLogRepository::new(state.db.pool())
        .list_recent(query.limit())
        .await?;

    Ok(Json(logs.into_iter().map(CrawlLogResponse::from).collect()))
}

/// GET /api/crawl/stats - Aggregate crawl telemetry over the last N hours.
pub async fn crawl_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<CrawlStats>> {
    let hours = query.hours().ok_or_else(|| {
        ApiError::bad_request(format!("hours must be between 1 and {MAX_STATS_HOURS}"))
    })?;

    let since = Utc::now() - Duration::hours(hours);
    let stats = CrawlLogRepository::new(state.db.pool())
        .stats_since(since)
        .await?;

    Ok(Json(stats))
}
