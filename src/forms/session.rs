use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::session::{DATE_FORMAT, SessionInput, TIME_FORMAT};
use crate::domain::types::PatientId;
use crate::forms::FormError;

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_time_order"))]
/// Form data for scheduling a new session.
pub struct NewSessionForm {
    #[validate(range(min = 1))]
    pub patient_id: i32,
    /// `YYYY-MM-DD`.
    #[validate(length(min = 1))]
    pub date: String,
    /// `HH:MM`.
    #[validate(length(min = 1))]
    pub start_time: String,
    /// `HH:MM`.
    #[validate(length(min = 1))]
    pub end_time: String,
    #[validate(length(min = 1))]
    pub session_type: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(range(min = 1.0))]
    pub amount: f64,
    #[serde(default)]
    pub paid: bool,
}

/// Start must come strictly before end; unreadable times are left to `parse_time`.
fn validate_time_order(form: &NewSessionForm) -> Result<(), ValidationError> {
    let start = NaiveTime::parse_from_str(form.start_time.trim(), TIME_FORMAT);
    let end = NaiveTime::parse_from_str(form.end_time.trim(), TIME_FORMAT);
    if let (Ok(start), Ok(end)) = (start, end)
        && start >= end
    {
        return Err(ValidationError::new("invalid_time"));
    }
    Ok(())
}

fn parse_time(value: &str) -> Result<String, FormError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map(|time| time.format(TIME_FORMAT).to_string())
        .map_err(|_| FormError::InvalidTime)
}

impl TryFrom<NewSessionForm> for SessionInput {
    type Error = FormError;

    fn try_from(form: NewSessionForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let patient_id = PatientId::new(form.patient_id).map_err(|_| FormError::InvalidPatientId)?;
        let date = NaiveDate::parse_from_str(form.date.trim(), DATE_FORMAT)
            .map_err(|_| FormError::InvalidDate)?;

        Ok(SessionInput {
            patient_id,
            date: date.format(DATE_FORMAT).to_string(),
            start_time: parse_time(&form.start_time)?,
            end_time: parse_time(&form.end_time)?,
            session_type: form.session_type.trim().to_string(),
            notes: form
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            amount: form.amount,
            paid: Some(form.paid),
        })
    }
}
