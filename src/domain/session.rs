use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::patient::Patient;
use crate::domain::types::{PatientId, SessionId, TypeConstraintError};

/// Format of the calendar date carried by [`SessionDisplay::date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format of the start and end times carried by [`SessionDisplay`].
pub const TIME_FORMAT: &str = "%H:%M";

/// Session as rendered by the calendar and the session list.
///
/// Built from the backend payload by the session adapter in
/// [`crate::models::session`]; never sent back to the backend as-is.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDisplay {
    pub id: SessionId,
    pub patient_id: PatientId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
    /// Canonical `YYYY-MM-DD` date of the session start.
    #[serde(rename = "fecha")]
    pub date: String,
    /// `HH:MM` start time.
    #[serde(rename = "horaInicio")]
    pub start_time: String,
    /// `HH:MM` end time.
    #[serde(rename = "horaFin")]
    pub end_time: String,
    #[serde(rename = "tipoSesion")]
    pub session_type: String,
    #[serde(rename = "notas")]
    pub notes: String,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "pagado")]
    pub paid: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl SessionDisplay {
    /// Parsed calendar date, `None` when the backend sent an unreadable timestamp.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    /// Minutes between start and end, clamped at zero.
    pub fn duration_minutes(&self) -> i64 {
        let start = NaiveTime::parse_from_str(&self.start_time, TIME_FORMAT);
        let end = NaiveTime::parse_from_str(&self.end_time, TIME_FORMAT);
        match (start, end) {
            (Ok(start), Ok(end)) => (end - start).num_minutes().max(0),
            _ => 0,
        }
    }

    /// Human readable duration such as `45 min`, `1 h` or `1 h 30 min`.
    pub fn duration_label(&self) -> String {
        let minutes = self.duration_minutes();
        if minutes == 0 {
            return "0 min".to_string();
        }

        let hours = minutes / 60;
        let rest = minutes % 60;
        match (hours, rest) {
            (0, m) => format!("{m} min"),
            (h, 0) => format!("{h} h"),
            (h, m) => format!("{h} h {m} min"),
        }
    }

    /// Label shown for the session type, falling back to the raw value.
    pub fn session_type_label(&self) -> &str {
        match self.session_type.as_str() {
            "individual" => "Individual",
            "grupal" => "Grupal",
            "familiar" => "Familiar",
            "evaluacion" => "Evaluación",
            "seguimiento" => "Seguimiento",
            other => other,
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        if self.paid {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Pending
        }
    }
}

/// User supplied data for a new session, expressed in display terms.
///
/// Converted into the backend payload by
/// [`crate::models::session::NewSession`].
#[derive(Clone, Debug, PartialEq)]
pub struct SessionInput {
    pub patient_id: PatientId,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub start_time: String,
    /// `HH:MM`.
    pub end_time: String,
    pub session_type: String,
    pub notes: Option<String>,
    pub amount: f64,
    pub paid: Option<bool>,
}

impl From<&SessionDisplay> for SessionInput {
    fn from(session: &SessionDisplay) -> Self {
        Self {
            patient_id: session.patient_id,
            date: session.date.clone(),
            start_time: session.start_time.clone(),
            end_time: session.end_time.clone(),
            session_type: session.session_type.clone(),
            notes: Some(session.notes.clone()).filter(|n| !n.is_empty()),
            amount: session.amount,
            paid: Some(session.paid),
        }
    }
}

/// Payment state used by the status filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "pagado")]
    Paid,
    #[serde(rename = "pendiente")]
    Pending,
}

impl PaymentStatus {
    pub fn matches(self, session: &SessionDisplay) -> bool {
        match self {
            PaymentStatus::Paid => session.paid,
            PaymentStatus::Pending => !session.paid,
        }
    }

    /// Label shown next to each session.
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Pagado",
            PaymentStatus::Pending => "Pendiente",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "pagado"),
            PaymentStatus::Pending => write!(f, "pendiente"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pagado" => Ok(PaymentStatus::Paid),
            "pendiente" => Ok(PaymentStatus::Pending),
            other => Err(TypeConstraintError::InvalidValue(other.to_string())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::display_session;
    use super::*;

    #[test]
    fn duration_labels() {
        let mut session = display_session(1, "2024-05-10", None, false);
        assert_eq!(session.duration_label(), "45 min");

        session.end_time = "10:00".to_string();
        assert_eq!(session.duration_label(), "1 h");

        session.end_time = "10:30".to_string();
        assert_eq!(session.duration_label(), "1 h 30 min");

        session.end_time = "08:00".to_string();
        assert_eq!(session.duration_label(), "0 min");
    }

    #[test]
    fn session_type_label_falls_back_to_raw_value() {
        let mut session = display_session(1, "2024-05-10", None, false);
        session.session_type = "evaluacion".to_string();
        assert_eq!(session.session_type_label(), "Evaluación");
        session.session_type = "pareja".to_string();
        assert_eq!(session.session_type_label(), "pareja");
    }

    #[test]
    fn payment_status_parses_and_matches() {
        let paid = display_session(1, "2024-05-10", None, true);
        let status: PaymentStatus = "pagado".parse().unwrap();
        assert!(status.matches(&paid));
        assert!(!PaymentStatus::Pending.matches(&paid));
        assert!("otro".parse::<PaymentStatus>().is_err());
        assert_eq!(paid.payment_status().label(), "Pagado");
    }

    #[test]
    fn display_serializes_with_frontend_names() {
        let session = display_session(4, "2024-05-10", None, true);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["fecha"], "2024-05-10");
        assert_eq!(json["horaInicio"], "09:00");
        assert_eq!(json["monto"], 10_000.0);
        assert_eq!(json["pagado"], true);
    }
}
