//! DTOs shaped for the month calendar and its day modal.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::session::SessionDisplay;
use crate::domain::transcription::Transcription;
use crate::domain::types::SessionId;

/// One cell of the month grid.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// Day of month, 1-based.
    pub day: u32,
    pub is_today: bool,
    pub is_current_month: bool,
    pub session_count: usize,
    /// Sessions on `date` in backend list order.
    pub sessions: Vec<SessionDisplay>,
}

/// Monday-first row of the grid.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CalendarWeek {
    pub days: [CalendarDay; 7],
}

/// Transcriptions keyed by session, `None` when the session has none.
pub type TranscriptionsBySession = HashMap<SessionId, Option<Transcription>>;

/// Content of the day modal.
#[derive(Clone, Debug, PartialEq)]
pub struct DayDetail {
    pub day: CalendarDay,
    /// `None` while the transcription batch is outstanding.
    pub transcriptions: Option<TranscriptionsBySession>,
}

impl DayDetail {
    pub fn new(day: CalendarDay) -> Self {
        Self {
            day,
            transcriptions: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.transcriptions.is_none()
    }

    /// Sessions of the day paired with their transcription, once loaded.
    pub fn sessions_with_transcriptions(&self) -> Vec<(&SessionDisplay, Option<&Transcription>)> {
        self.day
            .sessions
            .iter()
            .map(|session| {
                let transcription = self
                    .transcriptions
                    .as_ref()
                    .and_then(|loaded| loaded.get(&session.id))
                    .and_then(Option::as_ref);
                (session, transcription)
            })
            .collect()
    }
}

/// Declarative state consumed by the calendar presentation layer.
#[derive(Debug)]
pub struct CalendarViewState<'a> {
    pub month_label: String,
    pub weeks: &'a [CalendarWeek],
    pub loading: bool,
    pub error: Option<&'a str>,
    pub day: Option<&'a DayDetail>,
    /// Set while a modal is shown; replaces any page-level "modal open" toggle.
    pub modal_open: bool,
}
