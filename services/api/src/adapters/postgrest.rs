//! services/api/src/adapters/postgrest.rs
//!
//! The Supabase/PostgREST storage adapter. It speaks the relational REST
//! dialect (`?station=eq.OMA&night_date=eq.2026-08-06&order=created_at.desc`)
//! against the `night_tails` and `temp_logs` tables and normalizes the
//! wire rows (`tail_number`, `marked_in_at`, `temp_f`, ...) into the
//! domain entities. The rest of the service never sees those column
//! names.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use night_ops_core::domain::{
    NewNightTail, NewTempLog, NightTail, PurgeAnswer, ShiftKey, TempValue, TemperatureLog,
};
use night_ops_core::ports::{NightOpsStore, PortError, PortResult};
use night_ops_core::status::TempStatus;

/// A storage adapter backed by a PostgREST endpoint.
pub struct PostgrestStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl PostgrestStore {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            anon_key: anon_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    /// Attaches the auth headers, sends, and turns non-2xx responses into
    /// `PortError::Backend` with the endpoint's message.
    async fn send(&self, request: reqwest::RequestBuilder) -> PortResult<reqwest::Response> {
        let response = request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await
            .map_err(|e| PortError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PortError::Backend(format!(
                "PostgREST request failed with status {}: {}",
                status, message
            )));
        }
        Ok(response)
    }

    async fn fetch_night_tail(&self, shift: &ShiftKey, id: Uuid) -> PortResult<NightTail> {
        let response = self
            .send(self.client.get(self.table_url("night_tails")).query(&[
                ("select", "*".to_string()),
                ("id", format!("eq.{}", id)),
                ("station", format!("eq.{}", shift.station)),
                ("night_date", format!("eq.{}", shift.night_date)),
            ]))
            .await?;
        let rows: Vec<NightTailRow> = decode(response).await?;
        rows.into_iter()
            .next()
            .map(NightTailRow::into_domain)
            .ok_or_else(|| not_found(id))
    }

    /// PATCHes one plan entry and returns the updated representation.
    async fn patch_night_tail(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        patch: &serde_json::Value,
    ) -> PortResult<NightTail> {
        let response = self
            .send(
                self.client
                    .patch(self.table_url("night_tails"))
                    .query(&[
                        ("id", format!("eq.{}", id)),
                        ("station", format!("eq.{}", shift.station)),
                        ("night_date", format!("eq.{}", shift.night_date)),
                    ])
                    .header("Prefer", "return=representation")
                    .json(patch),
            )
            .await?;
        let rows: Vec<NightTailRow> = decode(response).await?;
        rows.into_iter()
            .next()
            .map(NightTailRow::into_domain)
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Night tail {} not found", id))
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> PortResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| PortError::Backend(format!("invalid PostgREST response: {}", e)))
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct NightTailRow {
    id: Uuid,
    tail_number: String,
    flight: Option<String>,
    gate: Option<String>,
    eta: Option<String>,
    heat_source: Option<String>,
    purged_drained: Option<PurgeAnswer>,
    purged_at: Option<DateTime<Utc>>,
    marked_in_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl NightTailRow {
    fn into_domain(self) -> NightTail {
        NightTail {
            id: self.id,
            tail: self.tail_number,
            flight: self.flight,
            gate: self.gate,
            eta: self.eta,
            heat_source: self.heat_source,
            purged_drained: self.purged_drained,
            purged_at: self.purged_at,
            in_time: self.marked_in_at,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

#[derive(Serialize)]
struct InsertNightTailRow<'a> {
    id: Uuid,
    station: &'a str,
    night_date: NaiveDate,
    tail_number: &'a str,
    flight: Option<&'a str>,
    gate: Option<&'a str>,
    eta: Option<&'a str>,
    heat_source: Option<&'a str>,
    purged_drained: Option<PurgeAnswer>,
    purged_at: Option<DateTime<Utc>>,
    marked_in_at: Option<DateTime<Utc>>,
    notes: Option<&'a str>,
    created_at: DateTime<Utc>,
}

impl<'a> InsertNightTailRow<'a> {
    fn from_domain(shift: &'a ShiftKey, tail: &'a NightTail) -> Self {
        Self {
            id: tail.id,
            station: &shift.station,
            night_date: shift.night_date,
            tail_number: &tail.tail,
            flight: tail.flight.as_deref(),
            gate: tail.gate.as_deref(),
            eta: tail.eta.as_deref(),
            heat_source: tail.heat_source.as_deref(),
            purged_drained: tail.purged_drained,
            purged_at: tail.purged_at,
            marked_in_at: tail.in_time,
            notes: tail.notes.as_deref(),
            created_at: tail.created_at,
        }
    }
}

#[derive(Deserialize)]
struct TempLogRow {
    id: Uuid,
    tail_number: String,
    temp_f: Option<f64>,
    temp_raw: Option<String>,
    status: TempStatus,
    location: Option<String>,
    heat_source: Option<String>,
    notes: Option<String>,
    time: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl TempLogRow {
    fn into_domain(self) -> TemperatureLog {
        let temp = match self.temp_f {
            Some(v) => TempValue::Number(v),
            None => TempValue::Raw(self.temp_raw.unwrap_or_default()),
        };
        TemperatureLog {
            id: self.id,
            tail: self.tail_number,
            temp,
            status: self.status,
            location: self.location,
            heat_source: self.heat_source,
            notes: self.notes,
            time: self.time,
            recorded_at: self.recorded_at,
        }
    }
}

#[derive(Serialize)]
struct InsertTempLogRow<'a> {
    id: Uuid,
    station: &'a str,
    night_date: NaiveDate,
    tail_number: &'a str,
    temp_f: Option<f64>,
    temp_raw: Option<&'a str>,
    status: TempStatus,
    location: Option<&'a str>,
    heat_source: Option<&'a str>,
    notes: Option<&'a str>,
    time: Option<&'a str>,
    recorded_at: DateTime<Utc>,
}

impl<'a> InsertTempLogRow<'a> {
    fn from_domain(shift: &'a ShiftKey, log: &'a TemperatureLog) -> Self {
        let (temp_f, temp_raw) = match &log.temp {
            TempValue::Number(v) => (Some(*v), None),
            TempValue::Raw(s) => (None, Some(s.as_str())),
        };
        Self {
            id: log.id,
            station: &shift.station,
            night_date: shift.night_date,
            tail_number: &log.tail,
            temp_f,
            temp_raw,
            status: log.status,
            location: log.location.as_deref(),
            heat_source: log.heat_source.as_deref(),
            notes: log.notes.as_deref(),
            time: log.time.as_deref(),
            recorded_at: log.recorded_at,
        }
    }
}

//=========================================================================================
// `NightOpsStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl NightOpsStore for PostgrestStore {
    async fn list_night_tails(&self, shift: &ShiftKey) -> PortResult<Vec<NightTail>> {
        let response = self
            .send(self.client.get(self.table_url("night_tails")).query(&[
                ("select", "*".to_string()),
                ("station", format!("eq.{}", shift.station)),
                ("night_date", format!("eq.{}", shift.night_date)),
                ("order", "created_at.desc".to_string()),
            ]))
            .await?;
        let rows: Vec<NightTailRow> = decode(response).await?;
        Ok(rows.into_iter().map(NightTailRow::into_domain).collect())
    }

    async fn create_night_tail(
        &self,
        shift: &ShiftKey,
        entry: NewNightTail,
    ) -> PortResult<NightTail> {
        let tail = entry.into_tail(Uuid::new_v4(), Utc::now());
        let response = self
            .send(
                self.client
                    .post(self.table_url("night_tails"))
                    .header("Prefer", "return=representation")
                    .json(&InsertNightTailRow::from_domain(shift, &tail)),
            )
            .await?;
        let rows: Vec<NightTailRow> = decode(response).await?;
        // Fall back to the locally built entity if the endpoint returns no
        // representation.
        Ok(rows
            .into_iter()
            .next()
            .map(NightTailRow::into_domain)
            .unwrap_or(tail))
    }

    async fn mark_in(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<NightTail> {
        let mut current = self.fetch_night_tail(shift, id).await?;
        if !current.mark_in(at) {
            return Ok(current);
        }
        self.patch_night_tail(shift, id, &json!({ "marked_in_at": at }))
            .await
    }

    async fn record_purge(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<NightTail> {
        let mut current = self.fetch_night_tail(shift, id).await?;
        if !current.apply_purge(at) {
            return Ok(current);
        }
        self.patch_night_tail(
            shift,
            id,
            &json!({ "purged_drained": PurgeAnswer::Yes, "purged_at": at }),
        )
        .await
    }

    async fn update_heat_source(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        heat_source: Option<String>,
    ) -> PortResult<NightTail> {
        self.patch_night_tail(shift, id, &json!({ "heat_source": heat_source }))
            .await
    }

    async fn clear_night(&self, shift: &ShiftKey) -> PortResult<u64> {
        let response = self
            .send(
                self.client
                    .delete(self.table_url("night_tails"))
                    .query(&[
                        ("station", format!("eq.{}", shift.station)),
                        ("night_date", format!("eq.{}", shift.night_date)),
                    ])
                    .header("Prefer", "return=representation"),
            )
            .await?;
        let rows: Vec<NightTailRow> = decode(response).await?;
        Ok(rows.len() as u64)
    }

    async fn list_temp_logs(&self, shift: &ShiftKey) -> PortResult<Vec<TemperatureLog>> {
        let response = self
            .send(self.client.get(self.table_url("temp_logs")).query(&[
                ("select", "*".to_string()),
                ("station", format!("eq.{}", shift.station)),
                ("night_date", format!("eq.{}", shift.night_date)),
                ("order", "recorded_at.desc".to_string()),
            ]))
            .await?;
        let rows: Vec<TempLogRow> = decode(response).await?;
        Ok(rows.into_iter().map(TempLogRow::into_domain).collect())
    }

    async fn create_temp_log(
        &self,
        shift: &ShiftKey,
        entry: NewTempLog,
    ) -> PortResult<TemperatureLog> {
        let log = entry.into_log(Uuid::new_v4(), Utc::now());
        let response = self
            .send(
                self.client
                    .post(self.table_url("temp_logs"))
                    .header("Prefer", "return=representation")
                    .json(&InsertTempLogRow::from_domain(shift, &log)),
            )
            .await?;
        let rows: Vec<TempLogRow> = decode(response).await?;
        Ok(rows
            .into_iter()
            .next()
            .map(TempLogRow::into_domain)
            .unwrap_or(log))
    }
}
