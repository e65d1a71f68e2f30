//! Backend wire models for sessions and the adapter to the display model.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::patient::Patient;
use crate::domain::session::{DATE_FORMAT, SessionDisplay, SessionInput, TIME_FORMAT};
use crate::domain::types::{PatientId, SessionId};

/// Naive layouts accepted for timestamps without an offset.
const NAIVE_LAYOUTS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Price as sent by the backend: a JSON number, a numeric string or `null`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
    Missing,
}

impl Default for Price {
    fn default() -> Self {
        Price::Number(0.0)
    }
}

impl Price {
    /// Numeric value of the price; unreadable values count as zero.
    pub fn amount(&self) -> f64 {
        let value = match self {
            Price::Number(value) => Some(*value),
            Price::Text(text) if text.trim().is_empty() => Some(0.0),
            Price::Text(text) => text.trim().parse::<f64>().ok(),
            Price::Missing => None,
        };

        match value.filter(|v| v.is_finite()) {
            Some(value) => value,
            None => {
                log::warn!("Non-numeric session price {self:?}, using 0");
                0.0
            }
        }
    }
}

/// Session as exchanged with the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub patient_id: PatientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    #[serde(rename = "fechaInicio")]
    pub starts_at: String,
    #[serde(rename = "fechaFin")]
    pub ends_at: String,
    #[serde(rename = "conceptoPrincipal", default)]
    pub primary_concept: Option<String>,
    #[serde(rename = "notasDelTerapeuta", default)]
    pub therapist_notes: Option<String>,
    #[serde(rename = "precio", default)]
    pub price: Price,
    #[serde(rename = "pagado", default)]
    pub paid: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Payload for `POST /sessions`.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub patient_id: PatientId,
    #[serde(rename = "fechaInicio")]
    pub starts_at: String,
    #[serde(rename = "fechaFin")]
    pub ends_at: String,
    #[serde(rename = "conceptoPrincipal")]
    pub primary_concept: String,
    #[serde(rename = "notasDelTerapeuta")]
    pub therapist_notes: String,
    #[serde(rename = "precio")]
    pub price: f64,
    #[serde(rename = "pagado")]
    pub paid: bool,
}

/// Partial payload for `PATCH /sessions/{id}`.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSession {
    #[serde(rename = "fechaInicio", skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(rename = "fechaFin", skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
    #[serde(rename = "conceptoPrincipal", skip_serializing_if = "Option::is_none")]
    pub primary_concept: Option<String>,
    #[serde(rename = "notasDelTerapeuta", skip_serializing_if = "Option::is_none")]
    pub therapist_notes: Option<String>,
    #[serde(rename = "precio", skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "pagado", skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
}

/// Payload for `PATCH /sessions/{id}/estado`.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct SessionStatusUpdate {
    #[serde(rename = "pagado")]
    pub paid: bool,
}

/// Splits a backend timestamp into its `YYYY-MM-DD` date and `HH:MM` time.
///
/// The wall-clock of the timestamp's own offset is used, so both parts come
/// from the same reading of the instant. Unparseable input falls back to a
/// lexical split of the ISO layout.
fn split_timestamp(raw: &str) -> (String, String) {
    let raw = raw.trim();

    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| {
            NAIVE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });

    match parsed {
        Some(dt) => (
            dt.format(DATE_FORMAT).to_string(),
            dt.format(TIME_FORMAT).to_string(),
        ),
        None => {
            log::warn!("Unparseable session timestamp {raw:?}, splitting lexically");
            let date = raw.get(..10).unwrap_or(raw).to_string();
            let time = raw.get(11..16).unwrap_or_default().to_string();
            (date, time)
        }
    }
}

impl From<Session> for SessionDisplay {
    fn from(session: Session) -> Self {
        let (date, start_time) = split_timestamp(&session.starts_at);
        let (_, end_time) = split_timestamp(&session.ends_at);
        let amount = session.price.amount();

        Self {
            id: session.id,
            patient_id: session.patient_id,
            patient: session.patient,
            date,
            start_time,
            end_time,
            session_type: session.primary_concept.unwrap_or_default(),
            notes: session.therapist_notes.unwrap_or_default(),
            amount,
            paid: session.paid,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

impl From<&SessionInput> for NewSession {
    fn from(input: &SessionInput) -> Self {
        Self {
            patient_id: input.patient_id,
            starts_at: format!("{}T{}:00", input.date, input.start_time),
            ends_at: format!("{}T{}:00", input.date, input.end_time),
            primary_concept: input.session_type.clone(),
            therapist_notes: input.notes.clone().unwrap_or_default(),
            price: input.amount,
            paid: input.paid.unwrap_or(false),
        }
    }
}

impl From<&SessionInput> for UpdateSession {
    fn from(input: &SessionInput) -> Self {
        let full = NewSession::from(input);
        Self {
            starts_at: Some(full.starts_at),
            ends_at: Some(full.ends_at),
            primary_concept: Some(full.primary_concept),
            therapist_notes: input.notes.clone(),
            price: Some(full.price),
            paid: input.paid,
        }
    }
}
