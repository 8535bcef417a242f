//! Record Routes
//!
//! Endpoints for publishing and reading records.
//!
//! - POST /publish - Store a new record
//! - GET /getLast - Most recent record
//! - GET /getByTime - Records within an inclusive time window

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::api::dto::{PublishRequest, TimeRangeParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::storage::Record;

/// POST /publish
///
/// Assigns a fresh id and the current local time, then stores the record.
pub async fn publish(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PublishRequest>,
) -> ApiResult<Json<Record>> {
    let content = req
        .content
        .ok_or_else(|| ApiError::Validation("Content cannot be null".to_string()))?;

    let record = Record::generate(state.store.scorer().now(), content);
    state.store.save(record.clone())?;

    Ok(Json(record))
}

/// GET /getLast
pub async fn get_last(State(state): State<Arc<AppState>>) -> ApiResult<Json<Record>> {
    state
        .store
        .get_last()?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("no records stored".to_string()))
}

/// GET /getByTime?start=...&end=...
///
/// Both bounds are inclusive. Results are capped to the store's page size.
pub async fn get_by_time(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TimeRangeParams>,
) -> ApiResult<Json<Vec<Record>>> {
    let start = parse_date_time("start", &params.start)?;
    let end = parse_date_time("end", &params.end)?;

    let records = state.store.get_page(&start, &end)?;
    Ok(Json(records))
}

/// Parse an ISO 8601 local date-time such as `2024-01-15T12:00:00.250`
fn parse_date_time(name: &str, value: &str) -> ApiResult<NaiveDateTime> {
    value.parse::<NaiveDateTime>().map_err(|e| {
        ApiError::Validation(format!("Invalid {} date-time '{}': {}", name, value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_time() {
        let parsed = parse_date_time("start", "2024-01-15T12:00:00").unwrap();
        assert_eq!(parsed.to_string(), "2024-01-15 12:00:00");

        let with_millis = parse_date_time("start", "2024-01-15T12:00:00.250").unwrap();
        assert_eq!(with_millis.and_utc().timestamp_subsec_millis(), 250);

        assert!(matches!(
            parse_date_time("end", "yesterday"),
            Err(ApiError::Validation(_))
        ));
    }
}
