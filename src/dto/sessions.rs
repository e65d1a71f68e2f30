//! DTOs shaped for the session list view and its modals.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::patient::Patient;
use crate::domain::session::{PaymentStatus, SessionDisplay};
use crate::domain::transcription::Transcription;
use crate::domain::types::SessionId;
use crate::pagination::Paginated;

/// Criteria narrowing the session list. All set criteria must hold.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// Substring of the patient's full name, case-insensitive.
    pub search: String,
    pub date: Option<NaiveDate>,
    pub status: Option<PaymentStatus>,
    /// Stored for the view; sessions are not narrowed by it.
    pub has_transcription: bool,
}

impl SessionFilter {
    pub fn matches(&self, session: &SessionDisplay) -> bool {
        let needle = self.search.trim().to_lowercase();
        if !needle.is_empty() {
            let name_matches = session
                .patient
                .as_ref()
                .is_some_and(|patient| patient.name_contains(&needle));
            if !name_matches {
                return false;
            }
        }

        if let Some(date) = self.date
            && session.calendar_date() != Some(date)
        {
            return false;
        }

        if let Some(status) = self.status
            && !status.matches(session)
        {
            return false;
        }

        true
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.date.is_none()
            && self.status.is_none()
            && !self.has_transcription
    }
}

pub const TRANSCRIPTION_NOT_FOUND: &str = "No se encontró una transcripción para esta sesión.";

/// Progress of a transcription lookup shown inside a modal.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptionLookup {
    Loading,
    Found(Transcription),
    Missing,
    Failed(String),
}

impl TranscriptionLookup {
    pub fn transcription(&self) -> Option<&Transcription> {
        match self {
            TranscriptionLookup::Found(transcription) => Some(transcription),
            _ => None,
        }
    }

    /// Message to show in place of the transcription, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            TranscriptionLookup::Missing => Some(TRANSCRIPTION_NOT_FOUND),
            TranscriptionLookup::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// The one modal (if any) the session list is showing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum UiMode {
    #[default]
    None,
    SessionActions {
        session_id: SessionId,
        transcription: TranscriptionLookup,
    },
    ViewTranscription {
        session_id: SessionId,
        transcription: TranscriptionLookup,
    },
    AddTranscription {
        session_id: SessionId,
        error: Option<String>,
    },
    ConfirmDeleteSession {
        session_id: SessionId,
    },
    ConfirmDeleteTranscription {
        session_id: SessionId,
        transcription: Transcription,
    },
    PatientDetail {
        patient: Patient,
    },
    NewSession {
        error: Option<String>,
    },
}

impl UiMode {
    pub fn is_open(&self) -> bool {
        !matches!(self, UiMode::None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown after a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notice {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Aggregates over the full session list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SessionTotals {
    pub paid_count: usize,
    pub pending_count: usize,
    /// Sum of the amounts of paid sessions.
    pub paid_total: f64,
    /// Sum of every amount, paid or not.
    pub total_revenue: f64,
}

impl SessionTotals {
    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a SessionDisplay>,
    {
        sessions
            .into_iter()
            .fold(Self::default(), |mut totals, session| {
                if session.paid {
                    totals.paid_count += 1;
                    totals.paid_total += session.amount;
                } else {
                    totals.pending_count += 1;
                }
                totals.total_revenue += session.amount;
                totals
            })
    }
}

/// Declarative state consumed by the session list presentation layer.
#[derive(Debug)]
pub struct SessionListViewState<'a> {
    /// Current page of the filtered list.
    pub page: Paginated<&'a SessionDisplay>,
    pub filter: &'a SessionFilter,
    pub max_displayed: usize,
    pub totals: SessionTotals,
    pub mode: &'a UiMode,
    pub notice: Option<&'a Notice>,
    pub loading: bool,
    pub busy: bool,
    pub error: Option<&'a str>,
    /// Set while a modal is shown; replaces any page-level "modal open" toggle.
    pub modal_open: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::fixtures::display_session;

    #[test]
    fn search_is_case_insensitive_and_trimmed() {
        let ana = display_session(1, "2024-05-10", Some("Ana María"), false);
        let bruno = display_session(2, "2024-05-10", Some("Bruno"), false);
        let filter = SessionFilter {
            search: "  ana ".to_string(),
            ..SessionFilter::default()
        };

        assert!(filter.matches(&ana));
        assert!(!filter.matches(&bruno));
    }

    #[test]
    fn sessions_without_patient_only_match_blank_search() {
        let orphan = display_session(1, "2024-05-10", None, false);
        assert!(SessionFilter::default().matches(&orphan));

        let filter = SessionFilter {
            search: "a".to_string(),
            ..SessionFilter::default()
        };
        assert!(!filter.matches(&orphan));
    }

    #[test]
    fn date_and_status_are_conjunctive() {
        let session = display_session(1, "2024-05-10", Some("Ana"), true);
        let filter = SessionFilter {
            date: NaiveDate::from_ymd_opt(2024, 5, 10),
            status: Some(PaymentStatus::Pending),
            ..SessionFilter::default()
        };
        assert!(!filter.matches(&session));

        let filter = SessionFilter {
            status: Some(PaymentStatus::Paid),
            ..filter
        };
        assert!(filter.matches(&session));
    }

    #[test]
    fn has_transcription_does_not_narrow() {
        let session = display_session(1, "2024-05-10", None, false);
        let filter = SessionFilter {
            has_transcription: true,
            ..SessionFilter::default()
        };
        assert!(filter.matches(&session));
        assert!(!filter.is_empty());
    }

    #[test]
    fn totals_fold_paid_and_pending() {
        let mut pending = display_session(2, "2024-05-10", None, false);
        pending.amount = 5_000.0;
        let sessions = vec![display_session(1, "2024-05-10", None, true), pending];

        let totals = SessionTotals::from_sessions(&sessions);

        assert_eq!(totals.paid_count, 1);
        assert_eq!(totals.pending_count, 1);
        assert_eq!(totals.paid_total, 10_000.0);
        assert_eq!(totals.total_revenue, 15_000.0);
    }
}
