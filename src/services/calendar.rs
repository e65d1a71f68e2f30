//! Month calendar controller.

use std::ops::RangeInclusive;

use chrono::{Datelike, Months, NaiveDate};

use crate::calendar::{SessionsByDate, build_month_grid, first_of_month, month_label};
use crate::domain::types::SessionId;
use crate::dto::calendar::{CalendarViewState, CalendarWeek, DayDetail, TranscriptionsBySession};
use crate::repository::{SessionReader, TranscriptionReader};
use crate::services::sessions::load_sessions_for_display;
use crate::services::transcriptions::load_for_sessions;
use crate::services::ServiceResult;

/// First year offered by the year selector.
pub const FIRST_YEAR: i32 = 2020;

pub const LOAD_ERROR: &str = "Error al cargar las sesiones";

/// Pending transcription batch for the day modal.
///
/// Results are only applied while the modal that issued the ticket is still
/// the one open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayLoadTicket {
    generation: u64,
    date: NaiveDate,
    session_ids: Vec<SessionId>,
}

impl DayLoadTicket {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn session_ids(&self) -> &[SessionId] {
        &self.session_ids
    }

    /// Fetches the transcriptions of every session in the day at once.
    pub async fn load<R>(&self, repo: &R) -> TranscriptionsBySession
    where
        R: TranscriptionReader + ?Sized,
    {
        load_for_sessions(repo, &self.session_ids).await
    }
}

#[derive(Debug)]
pub struct CalendarController {
    /// First day of the displayed month.
    month: NaiveDate,
    today: NaiveDate,
    years: RangeInclusive<i32>,
    sessions: SessionsByDate,
    weeks: Vec<CalendarWeek>,
    loading: bool,
    error: Option<String>,
    day: Option<DayDetail>,
    generation: u64,
}

impl CalendarController {
    /// Controller showing the month containing `today`.
    pub fn new(today: NaiveDate) -> Self {
        let month = today.with_day(1).unwrap_or(today);
        let mut controller = Self {
            month,
            today,
            years: FIRST_YEAR..=today.year() + 1,
            sessions: SessionsByDate::default(),
            weeks: Vec::new(),
            loading: false,
            error: None,
            day: None,
            generation: 0,
        };
        controller.rebuild();
        controller
    }

    pub fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.years.clone()
    }

    pub fn weeks(&self) -> &[CalendarWeek] {
        &self.weeks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn day(&self) -> Option<&DayDetail> {
        self.day.as_ref()
    }

    pub fn month_label(&self) -> String {
        month_label(self.month)
    }

    fn rebuild(&mut self) {
        self.weeks = build_month_grid(self.month, &self.sessions, self.today);
    }

    pub fn previous_month(&mut self) {
        if let Some(month) = self.month.checked_sub_months(Months::new(1)) {
            self.month = month;
            self.rebuild();
        }
    }

    pub fn next_month(&mut self) {
        if let Some(month) = self.month.checked_add_months(Months::new(1)) {
            self.month = month;
            self.rebuild();
        }
    }

    /// Jumps to `year`, keeping the month. Years outside the selector are ignored.
    pub fn select_year(&mut self, year: i32) -> bool {
        if !self.years.contains(&year) {
            return false;
        }
        match first_of_month(year, self.month.month()) {
            Some(month) => {
                self.month = month;
                self.rebuild();
                true
            }
            None => false,
        }
    }

    /// Jumps straight to `month` of `year`.
    pub fn go_to(&mut self, year: i32, month: u32) -> bool {
        match first_of_month(year, month) {
            Some(first) => {
                self.month = first;
                self.rebuild();
                true
            }
            None => false,
        }
    }

    /// Fetches every session and rebuilds the grid for the displayed month.
    ///
    /// On failure the previous grid stays in place and the error is shown.
    pub async fn load_month<R>(&mut self, repo: &R, today: NaiveDate) -> ServiceResult<()>
    where
        R: SessionReader + ?Sized,
    {
        self.loading = true;
        self.error = None;
        self.today = today;

        let result = load_sessions_for_display(repo).await;
        self.loading = false;

        match result {
            Ok(sessions) => {
                self.sessions = SessionsByDate::build(sessions);
                self.rebuild();
                log::debug!(
                    "Loaded {} sessions over {} days for {}",
                    self.sessions.total_sessions(),
                    self.sessions.len(),
                    self.month_label()
                );
                Ok(())
            }
            Err(err) => {
                self.error = Some(LOAD_ERROR.to_string());
                Err(err)
            }
        }
    }

    /// Opens the detail modal for `date` when it belongs to the displayed month.
    pub fn open_day(&mut self, date: NaiveDate) -> Option<DayLoadTicket> {
        let day = self
            .weeks
            .iter()
            .flat_map(|week| week.days.iter())
            .find(|day| day.date == date && day.is_current_month)?
            .clone();

        self.generation += 1;
        let ticket = DayLoadTicket {
            generation: self.generation,
            date,
            session_ids: day.sessions.iter().map(|session| session.id).collect(),
        };
        self.day = Some(DayDetail::new(day));
        Some(ticket)
    }

    /// Stores a transcription batch if its ticket still matches the open day.
    pub fn apply_day_transcriptions(
        &mut self,
        ticket: &DayLoadTicket,
        transcriptions: TranscriptionsBySession,
    ) -> bool {
        if ticket.generation != self.generation {
            log::debug!("Dropping stale transcriptions for {}", ticket.date);
            return false;
        }
        match self.day.as_mut() {
            Some(day) if day.day.date == ticket.date => {
                day.transcriptions = Some(transcriptions);
                true
            }
            _ => false,
        }
    }

    /// Opens `date`, loads its transcriptions and applies them.
    pub async fn show_day<R>(&mut self, repo: &R, date: NaiveDate) -> Option<&DayDetail>
    where
        R: TranscriptionReader + ?Sized,
    {
        let ticket = self.open_day(date)?;
        let transcriptions = ticket.load(repo).await;
        self.apply_day_transcriptions(&ticket, transcriptions);
        self.day.as_ref()
    }

    pub fn close_day(&mut self) {
        self.day = None;
        self.generation += 1;
    }

    pub fn view_state(&self) -> CalendarViewState<'_> {
        CalendarViewState {
            month_label: self.month_label(),
            weeks: &self.weeks,
            loading: self.loading,
            error: self.error.as_deref(),
            day: self.day.as_ref(),
            modal_open: self.day.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::sessions::fixtures::wire_session;
    use crate::services::transcriptions::fixtures::transcription;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn may_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_list_sessions().returning(|| {
            Ok(vec![
                wire_session(1, "2024-05-10T09:00:00", Some("Ana"), false),
                wire_session(2, "2024-05-10T10:00:00", Some("Bruno"), true),
                wire_session(3, "2024-05-15T09:00:00", None, false),
            ])
        });
        repo
    }

    #[test]
    fn starts_on_current_month_with_year_range() {
        let controller = CalendarController::new(date(2024, 5, 20));
        assert_eq!(controller.month(), date(2024, 5, 1));
        assert_eq!(controller.years(), 2020..=2025);
        assert_eq!(controller.month_label(), "mayo de 2024");
        assert!(!controller.weeks().is_empty());
    }

    #[test]
    fn navigation_wraps_years() {
        let mut controller = CalendarController::new(date(2024, 1, 5));
        controller.previous_month();
        assert_eq!(controller.month(), date(2023, 12, 1));
        controller.next_month();
        controller.next_month();
        assert_eq!(controller.month(), date(2024, 2, 1));
    }

    #[test]
    fn select_year_keeps_month_and_respects_range() {
        let mut controller = CalendarController::new(date(2024, 5, 20));
        assert!(controller.select_year(2021));
        assert_eq!(controller.month(), date(2021, 5, 1));
        assert!(!controller.select_year(2019));
        assert!(!controller.select_year(2026));
        assert_eq!(controller.month(), date(2021, 5, 1));
    }

    #[tokio::test]
    async fn load_month_buckets_sessions() {
        let repo = may_repo();
        let mut controller = CalendarController::new(date(2024, 5, 20));

        controller.load_month(&repo, date(2024, 5, 20)).await.unwrap();

        let counts: Vec<(u32, usize)> = controller
            .weeks()
            .iter()
            .flat_map(|w| w.days.iter())
            .filter(|d| d.is_current_month && d.session_count > 0)
            .map(|d| (d.day, d.session_count))
            .collect();
        assert_eq!(counts, vec![(10, 2), (15, 1)]);
        assert!(controller.view_state().error.is_none());
    }

    #[tokio::test]
    async fn load_failure_keeps_previous_grid() {
        let mut controller = CalendarController::new(date(2024, 5, 20));
        controller
            .load_month(&may_repo(), date(2024, 5, 20))
            .await
            .unwrap();
        let before = controller.weeks().to_vec();

        let mut failing = MockRepository::new();
        failing
            .expect_list_sessions()
            .returning(|| Err(RepositoryError::ConnectionError("refused".into())));
        let result = controller.load_month(&failing, date(2024, 5, 20)).await;

        assert!(result.is_err());
        assert_eq!(controller.error(), Some(LOAD_ERROR));
        assert_eq!(controller.weeks(), before.as_slice());
    }

    #[tokio::test]
    async fn day_modal_loads_transcriptions() {
        let mut repo = may_repo();
        repo.expect_get_transcription_by_session()
            .times(2)
            .returning(|id| match id.get() {
                1 => Ok(transcription(50, 1)),
                _ => Err(RepositoryError::NotFound),
            });
        let mut controller = CalendarController::new(date(2024, 5, 20));
        controller.load_month(&repo, date(2024, 5, 20)).await.unwrap();

        let detail = controller.show_day(&repo, date(2024, 5, 10)).await.unwrap();

        assert!(!detail.is_loading());
        let pairs = detail.sessions_with_transcriptions();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].1.map(|t| t.id.get()), Some(50));
        assert!(pairs[1].1.is_none());
        assert!(controller.view_state().modal_open);

        controller.close_day();
        assert!(!controller.view_state().modal_open);
    }

    #[tokio::test]
    async fn padding_days_do_not_open() {
        let repo = may_repo();
        let mut controller = CalendarController::new(date(2024, 5, 20));
        controller.load_month(&repo, date(2024, 5, 20)).await.unwrap();

        // 2024-04-29 pads the first week of May.
        assert!(controller.open_day(date(2024, 4, 29)).is_none());
        assert!(controller.day().is_none());
    }

    #[tokio::test]
    async fn stale_batches_are_dropped() {
        let repo = may_repo();
        let mut controller = CalendarController::new(date(2024, 5, 20));
        controller.load_month(&repo, date(2024, 5, 20)).await.unwrap();

        let first = controller.open_day(date(2024, 5, 10)).unwrap();
        controller.close_day();
        let second = controller.open_day(date(2024, 5, 15)).unwrap();

        assert!(!controller.apply_day_transcriptions(&first, TranscriptionsBySession::new()));
        assert!(controller.day().unwrap().is_loading());

        assert!(controller.apply_day_transcriptions(&second, TranscriptionsBySession::new()));
        assert!(!controller.day().unwrap().is_loading());
        assert_eq!(second.session_ids().len(), 1);
    }
}
