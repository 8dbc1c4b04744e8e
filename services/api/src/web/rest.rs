//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Handlers validate, delegate to the storage port, and map errors to
//! status codes: invalid input is 400 with a message and no state change,
//! an unknown update target is 404, a backend failure is 502. Nothing
//! here is fatal to the process.

use crate::config::Config;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, NaiveDate, Utc};
use night_ops_core::dashboard::build_dashboard;
use night_ops_core::domain::{
    NewNightTail, NewTempLog, NightTail, PurgeAnswer, ShiftKey, TempValue, TemperatureLog,
};
use night_ops_core::filter::FilterState;
use night_ops_core::ports::PortError;
use night_ops_core::status::{PurgeCategory, TempStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_night_tails_handler,
        create_night_tail_handler,
        mark_in_handler,
        record_purge_handler,
        update_heat_source_handler,
        clear_night_handler,
        list_temp_logs_handler,
        create_temp_log_handler,
        dashboard_handler,
    ),
    components(schemas(
        CreateNightTailRequest,
        CreateTempLogRequest,
        MarkInRequest,
        PurgeRequest,
        HeatSourceRequest,
        ClearNightResponse,
    )),
    tags(
        (name = "Night Ops API", description = "Overnight tail prep and cabin temperature tracking.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Payload Structs
//=========================================================================================

/// Shift addressing shared by every endpoint. Both parameters are
/// optional; the configured station and today's date (UTC) fill the gaps.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShiftQuery {
    pub station: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A new plan entry for tonight's aircraft list.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNightTailRequest {
    /// Tail number; `tailNumber` is accepted as an alias.
    #[serde(alias = "tailNumber")]
    pub tail: Option<String>,
    pub flight: Option<String>,
    pub gate: Option<String>,
    pub eta: Option<String>,
    pub heat_source: Option<String>,
    /// "Yes", "No" or "N/A"; defaults to "N/A".
    pub purged_drained: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkInRequest {
    /// Arrival stamp; defaults to now.
    pub marked_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeRequest {
    /// Purge stamp; defaults to now.
    pub purged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeatSourceRequest {
    /// New ground heat equipment identifier; empty clears the field.
    pub heat_source: Option<String>,
}

/// A new cabin temperature reading.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTempLogRequest {
    /// Tail number; `tailNumber` is accepted as an alias.
    #[serde(alias = "tailNumber")]
    pub tail: Option<String>,
    /// Fahrenheit reading, as a number or numeric string.
    pub temp: Option<serde_json::Value>,
    pub location: Option<String>,
    pub heat_source: Option<String>,
    pub notes: Option<String>,
    /// Display label, e.g. "21:04"; defaults to the recording time.
    pub time: Option<String>,
}

/// Filter selections for the dashboard, on top of the shift parameters.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    pub station: Option<String>,
    pub date: Option<NaiveDate>,
    /// Comma-separated temperature statuses, e.g. `Cold,Above Target`.
    pub status: Option<String>,
    /// Comma-separated purge categories, e.g. `Purged,Unknown`.
    pub purge: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NightTailsResponse {
    pub station: String,
    pub date: NaiveDate,
    pub items: Vec<NightTail>,
}

#[derive(Debug, Serialize)]
pub struct TempLogsResponse {
    pub station: String,
    pub date: NaiveDate,
    pub items: Vec<TemperatureLog>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearNightResponse {
    pub cleared: u64,
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

fn resolve_shift(station: &Option<String>, date: Option<NaiveDate>, config: &Config) -> ShiftKey {
    ShiftKey::new(
        station.clone().unwrap_or_else(|| config.station.clone()),
        date.unwrap_or_else(|| Utc::now().date_naive()),
    )
}

fn port_error(context: &str, err: PortError) -> (StatusCode, String) {
    match err {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        PortError::Unavailable(message) => {
            error!("{}: {}", context, message);
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        PortError::Backend(message) => {
            error!("{}: {}", context, message);
            (
                StatusCode::BAD_GATEWAY,
                format!("Storage backend failure: {}", message),
            )
        }
    }
}

fn required_tail(tail: &Option<String>) -> Result<&str, (StatusCode, String)> {
    match tail.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err((StatusCode::BAD_REQUEST, "tail is required.".to_string())),
    }
}

fn parse_purge_answer(
    value: Option<&str>,
) -> Result<Option<PurgeAnswer>, (StatusCode, String)> {
    match value.map(str::trim) {
        None | Some("") | Some("N/A") => Ok(Some(PurgeAnswer::NotApplicable)),
        Some("Yes") => Ok(Some(PurgeAnswer::Yes)),
        Some("No") => Ok(Some(PurgeAnswer::No)),
        Some(other) => Err((
            StatusCode::BAD_REQUEST,
            format!("purgedDrained must be Yes, No, or N/A (got '{}').", other),
        )),
    }
}

fn parse_temp(value: Option<&serde_json::Value>) -> Result<f64, (StatusCode, String)> {
    let invalid = || (StatusCode::BAD_REQUEST, "Enter a valid temperature.".to_string());
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().ok_or_else(invalid),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn parse_filters(query: &DashboardQuery) -> Result<FilterState, (StatusCode, String)> {
    let mut state = FilterState::default();
    if let Some(raw) = &query.status {
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let status = part
                .parse::<TempStatus>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            state.statuses.insert(status);
        }
    }
    if let Some(raw) = &query.purge {
        for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let category = part
                .parse::<PurgeCategory>()
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            state.purge.insert(category);
        }
    }
    Ok(state)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

//=========================================================================================
// Plan Entry Handlers
//=========================================================================================

/// List tonight's plan entries, newest first.
#[utoipa::path(
    get,
    path = "/night-tails",
    params(ShiftQuery),
    responses(
        (status = 200, description = "Tonight's plan entries, newest first"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn list_night_tails_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ShiftQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let items = app_state
        .store
        .list_night_tails(&shift)
        .await
        .map_err(|e| port_error("Failed to load night tails", e))?;
    Ok(Json(NightTailsResponse {
        station: shift.station,
        date: shift.night_date,
        items,
    }))
}

/// Add an aircraft to tonight's plan.
#[utoipa::path(
    post,
    path = "/night-tails",
    params(ShiftQuery),
    request_body = CreateNightTailRequest,
    responses(
        (status = 201, description = "Plan entry created"),
        (status = 400, description = "Missing tail number or invalid purge answer"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn create_night_tail_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ShiftQuery>,
    Json(payload): Json<CreateNightTailRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let tail = required_tail(&payload.tail)?;
    let purged_drained = parse_purge_answer(payload.purged_drained.as_deref())?;

    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let entry = NewNightTail {
        tail: tail.to_string(),
        flight: non_empty(payload.flight),
        gate: non_empty(payload.gate),
        eta: non_empty(payload.eta),
        heat_source: non_empty(payload.heat_source),
        purged_drained,
        notes: non_empty(payload.notes),
    };
    let created = app_state
        .store
        .create_night_tail(&shift, entry)
        .await
        .map_err(|e| port_error("Failed to create night tail", e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Stamp an aircraft's arrival at its overnight position.
#[utoipa::path(
    post,
    path = "/night-tails/{id}/mark-in",
    params(("id" = Uuid, Path, description = "Plan entry id"), ShiftQuery),
    request_body = MarkInRequest,
    responses(
        (status = 200, description = "Plan entry with the arrival stamp; the first stamp wins"),
        (status = 404, description = "Night tail not found"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn mark_in_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ShiftQuery>,
    payload: Option<Json<MarkInRequest>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let at = payload
        .and_then(|Json(p)| p.marked_in_at)
        .unwrap_or_else(Utc::now);
    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let updated = app_state
        .store
        .mark_in(&shift, id, at)
        .await
        .map_err(|e| port_error("Failed to mark in night tail", e))?;
    Ok(Json(updated))
}

/// Record the purge/drain action for an aircraft.
#[utoipa::path(
    post,
    path = "/night-tails/{id}/purge",
    params(("id" = Uuid, Path, description = "Plan entry id"), ShiftQuery),
    request_body = PurgeRequest,
    responses(
        (status = 200, description = "Plan entry with the purge stamp; repeated actions keep the original stamp"),
        (status = 404, description = "Night tail not found"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn record_purge_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ShiftQuery>,
    payload: Option<Json<PurgeRequest>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let at = payload
        .and_then(|Json(p)| p.purged_at)
        .unwrap_or_else(Utc::now);
    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let updated = app_state
        .store
        .record_purge(&shift, id, at)
        .await
        .map_err(|e| port_error("Failed to update purge info", e))?;
    Ok(Json(updated))
}

/// Change the ground heat equipment recorded for an aircraft.
#[utoipa::path(
    put,
    path = "/night-tails/{id}/heat-source",
    params(("id" = Uuid, Path, description = "Plan entry id"), ShiftQuery),
    request_body = HeatSourceRequest,
    responses(
        (status = 200, description = "Updated plan entry"),
        (status = 404, description = "Night tail not found"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn update_heat_source_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ShiftQuery>,
    Json(payload): Json<HeatSourceRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let updated = app_state
        .store
        .update_heat_source(&shift, id, non_empty(payload.heat_source))
        .await
        .map_err(|e| port_error("Failed to update heat source", e))?;
    Ok(Json(updated))
}

/// Shift reset: delete tonight's plan entries. Temperature logs are
/// immutable history and stay.
#[utoipa::path(
    delete,
    path = "/night-tails",
    params(ShiftQuery),
    responses(
        (status = 200, description = "How many plan entries were removed", body = ClearNightResponse),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn clear_night_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ShiftQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let cleared = app_state
        .store
        .clear_night(&shift)
        .await
        .map_err(|e| port_error("Failed to clear night tails", e))?;
    Ok(Json(ClearNightResponse { cleared }))
}

//=========================================================================================
// Temperature Log Handlers
//=========================================================================================

/// List tonight's readings, newest first.
#[utoipa::path(
    get,
    path = "/temp-logs",
    params(ShiftQuery),
    responses(
        (status = 200, description = "Tonight's readings, newest first"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn list_temp_logs_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ShiftQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let items = app_state
        .store
        .list_temp_logs(&shift)
        .await
        .map_err(|e| port_error("Failed to load temp logs", e))?;
    Ok(Json(TempLogsResponse {
        station: shift.station,
        date: shift.night_date,
        items,
    }))
}

/// Record a cabin temperature reading for one of tonight's aircraft.
///
/// The reading snapshots the plan entry's gate and heat source, and its
/// status band is classified here, exactly once.
#[utoipa::path(
    post,
    path = "/temp-logs",
    params(ShiftQuery),
    request_body = CreateTempLogRequest,
    responses(
        (status = 201, description = "Reading recorded"),
        (status = 400, description = "Missing tail, tail not in tonight's plan, or non-numeric temperature"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn create_temp_log_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ShiftQuery>,
    Json(payload): Json<CreateTempLogRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let tail = required_tail(&payload.tail)?;
    let temp = parse_temp(payload.temp.as_ref())?;

    let shift = resolve_shift(&query.station, query.date, &app_state.config);
    let tails = app_state
        .store
        .list_night_tails(&shift)
        .await
        .map_err(|e| port_error("Failed to load night tails", e))?;
    let Some(aircraft) = tails.iter().find(|t| t.matches_tail(tail)) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Select an aircraft from tonight's list.".to_string(),
        ));
    };

    let entry = NewTempLog {
        tail: aircraft.tail.clone(),
        temp: TempValue::Number(temp),
        location: non_empty(payload.location).or_else(|| aircraft.gate.clone()),
        heat_source: non_empty(payload.heat_source).or_else(|| aircraft.heat_source.clone()),
        notes: non_empty(payload.notes),
        time: non_empty(payload.time),
    };
    let created = app_state
        .store
        .create_temp_log(&shift, entry)
        .await
        .map_err(|e| port_error("Failed to create temp log", e))?;
    Ok((StatusCode::CREATED, Json(created)))
}

//=========================================================================================
// Dashboard Handler
//=========================================================================================

/// The composed dashboard view model: filtered tables and counts, the
/// recent-readings list, and the per-tail history charts (which always
/// ignore the filters).
#[utoipa::path(
    get,
    path = "/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "The dashboard view model"),
        (status = 400, description = "Unrecognized filter label"),
        (status = 502, description = "Storage backend failure")
    )
)]
pub async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let filters = parse_filters(&query)?;
    let shift = resolve_shift(&query.station, query.date, &app_state.config);

    let tails = app_state
        .store
        .list_night_tails(&shift)
        .await
        .map_err(|e| port_error("Failed to load night tails", e))?;
    let logs = app_state
        .store
        .list_temp_logs(&shift)
        .await
        .map_err(|e| port_error("Failed to load temp logs", e))?;

    Ok(Json(build_dashboard(&shift, &tails, &logs, &filters)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_answers_parse_with_a_default() {
        assert_eq!(
            parse_purge_answer(None).unwrap(),
            Some(PurgeAnswer::NotApplicable)
        );
        assert_eq!(parse_purge_answer(Some("Yes")).unwrap(), Some(PurgeAnswer::Yes));
        assert_eq!(parse_purge_answer(Some("No")).unwrap(), Some(PurgeAnswer::No));
        assert_eq!(
            parse_purge_answer(Some("N/A")).unwrap(),
            Some(PurgeAnswer::NotApplicable)
        );
        assert!(parse_purge_answer(Some("maybe")).is_err());
    }

    #[test]
    fn temps_accept_numbers_and_numeric_strings() {
        assert_eq!(parse_temp(Some(&serde_json::json!(74.5))).unwrap(), 74.5);
        assert_eq!(parse_temp(Some(&serde_json::json!("74.5"))).unwrap(), 74.5);
        assert!(parse_temp(Some(&serde_json::json!("abc"))).is_err());
        assert!(parse_temp(Some(&serde_json::json!(null))).is_err());
        assert!(parse_temp(None).is_err());
    }

    #[test]
    fn filter_labels_parse_from_comma_lists() {
        let query = DashboardQuery {
            station: None,
            date: None,
            status: Some("Cold, Above Target".to_string()),
            purge: Some("Purged".to_string()),
        };
        let state = parse_filters(&query).unwrap();
        assert!(state.statuses.contains(&TempStatus::Cold));
        assert!(state.statuses.contains(&TempStatus::AboveTarget));
        assert!(state.purge.contains(&PurgeCategory::Purged));

        let bad = DashboardQuery {
            station: None,
            date: None,
            status: Some("Tepid".to_string()),
            purge: None,
        };
        assert!(parse_filters(&bad).is_err());

        let empty = DashboardQuery {
            station: None,
            date: None,
            status: None,
            purge: None,
        };
        assert!(!parse_filters(&empty).unwrap().is_active());
    }
}
