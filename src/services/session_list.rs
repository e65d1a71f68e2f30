//! Session list controller: filtering, pagination, modals and mutations.
//!
//! All state changes go through `&mut self` once a backend call has
//! returned. Modal lookups hand out tickets so that a result arriving after
//! the user moved on is discarded.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

use crate::domain::session::{PaymentStatus, SessionDisplay};
use crate::domain::transcription::Transcription;
use crate::domain::types::SessionId;
use crate::dto::sessions::{
    Notice, NoticeKind, SessionFilter, SessionListViewState, SessionTotals, TranscriptionLookup,
    UiMode,
};
use crate::forms::session::NewSessionForm;
use crate::forms::transcription::AddTranscriptionForm;
use crate::models::config::ClientConfig;
use crate::pagination::{PageState, Paginated};
use crate::repository::{SessionReader, SessionWriter, TranscriptionReader, TranscriptionWriter};
use crate::services::sessions::{
    create_session, delete_session, load_sessions_for_display, set_paid,
};
use crate::services::transcriptions::{
    create_transcription, delete_transcription, find_for_session, lookup_for_session,
};
use crate::services::{ServiceError, ServiceResult};

pub const LOAD_ERROR: &str = "Error al cargar las sesiones";

const SESSION_DELETED: &str = "Sesión eliminada correctamente";
const SESSION_DELETE_FAILED: &str = "Error al eliminar la sesión";
const TRANSCRIPTION_DELETED: &str = "Transcripción eliminada correctamente";
const TRANSCRIPTION_DELETE_FAILED: &str = "Error al eliminar la transcripción";
const TRANSCRIPTION_SAVED: &str = "Transcripción guardada correctamente";
const SESSION_CREATED: &str = "Sesión creada correctamente";
const MARKED_PAID: &str = "Sesión marcada como pagada";
const MARKED_PENDING: &str = "Sesión marcada como pendiente";
const STATUS_UPDATE_FAILED: &str = "Error al actualizar el estado de la sesión";

/// Outstanding transcription lookup started by a modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    session_id: SessionId,
}

impl LookupTicket {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

#[derive(Debug)]
pub struct SessionListController {
    sessions: Vec<SessionDisplay>,
    /// Indices into `sessions` that pass the filter, in list order.
    filtered: Vec<usize>,
    filter: SessionFilter,
    page: PageState,
    mode: UiMode,
    /// Bumped on every mode change; tickets from older generations are stale.
    generation: u64,
    notice: Option<Notice>,
    notice_duration: TimeDelta,
    loading: bool,
    busy: bool,
    error: Option<String>,
}

impl SessionListController {
    pub fn new(per_page: usize, notice_seconds: i64) -> Self {
        Self {
            sessions: Vec::new(),
            filtered: Vec::new(),
            filter: SessionFilter::default(),
            page: PageState::new(per_page),
            mode: UiMode::None,
            generation: 0,
            notice: None,
            notice_duration: TimeDelta::try_seconds(notice_seconds).unwrap_or(TimeDelta::zero()),
            loading: false,
            busy: false,
            error: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.items_per_page, config.notice_seconds)
    }

    pub fn sessions(&self) -> &[SessionDisplay] {
        &self.sessions
    }

    pub fn filter(&self) -> &SessionFilter {
        &self.filter
    }

    pub fn mode(&self) -> &UiMode {
        &self.mode
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn find(&self, session_id: SessionId) -> Option<&SessionDisplay> {
        self.sessions.iter().find(|session| session.id == session_id)
    }

    /// Reloads the full list and reapplies the current filter.
    pub async fn load<R>(&mut self, repo: &R) -> ServiceResult<()>
    where
        R: SessionReader + ?Sized,
    {
        self.loading = true;
        self.error = None;

        let result = load_sessions_for_display(repo).await;
        self.loading = false;

        match result {
            Ok(sessions) => {
                self.sessions = sessions;
                self.apply_filters();
                Ok(())
            }
            Err(err) => {
                self.error = Some(LOAD_ERROR.to_string());
                Err(err)
            }
        }
    }

    // Filtering

    /// Recomputes the filtered list and goes back to the first page.
    pub fn apply_filters(&mut self) {
        self.filtered = self
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, session)| self.filter.matches(session))
            .map(|(index, _)| index)
            .collect();
        self.page.reset(self.filtered.len());
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.apply_filters();
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.filter.date = date;
        self.apply_filters();
    }

    pub fn set_status(&mut self, status: Option<PaymentStatus>) {
        self.filter.status = status;
        self.apply_filters();
    }

    pub fn set_has_transcription(&mut self, has_transcription: bool) {
        self.filter.has_transcription = has_transcription;
        self.apply_filters();
    }

    pub fn clear_filters(&mut self) {
        self.filter = SessionFilter::default();
        self.apply_filters();
    }

    pub fn filtered(&self) -> Vec<&SessionDisplay> {
        self.filtered
            .iter()
            .filter_map(|&index| self.sessions.get(index))
            .collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    // Pagination

    pub fn go_to_page(&mut self, page: usize) -> bool {
        self.page.go_to(page)
    }

    pub fn page_items(&self) -> Vec<&SessionDisplay> {
        self.page
            .slice(&self.filtered)
            .iter()
            .filter_map(|&index| self.sessions.get(index))
            .collect()
    }

    /// Current page of the filtered list, with its page links.
    pub fn paginated(&self) -> Paginated<&SessionDisplay> {
        Paginated::from_state(&self.filtered(), &self.page)
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        self.page.page_numbers()
    }

    pub fn max_displayed(&self) -> usize {
        self.page.max_displayed(self.filtered.len())
    }

    /// Paid/pending counts and sums over the whole list.
    pub fn totals(&self) -> SessionTotals {
        SessionTotals::from_sessions(&self.sessions)
    }

    // Modals

    fn set_mode(&mut self, mode: UiMode) {
        self.mode = mode;
        self.generation += 1;
    }

    fn ticket(&self, session_id: SessionId) -> LookupTicket {
        LookupTicket {
            generation: self.generation,
            session_id,
        }
    }

    fn is_current(&self, ticket: &LookupTicket) -> bool {
        if ticket.generation == self.generation {
            true
        } else {
            log::debug!("Dropping stale lookup for session {}", ticket.session_id);
            false
        }
    }

    pub fn close_modal(&mut self) {
        self.set_mode(UiMode::None);
    }

    /// Opens the action menu of a session and starts its transcription check.
    pub fn open_actions(&mut self, session_id: SessionId) -> Option<LookupTicket> {
        self.find(session_id)?;
        self.set_mode(UiMode::SessionActions {
            session_id,
            transcription: TranscriptionLookup::Loading,
        });
        Some(self.ticket(session_id))
    }

    /// Lenient check used by the action menu: any failure reads as "none".
    pub async fn check_transcription<R>(repo: &R, ticket: &LookupTicket) -> Option<Transcription>
    where
        R: TranscriptionReader + ?Sized,
    {
        lookup_for_session(repo, ticket.session_id).await
    }

    pub fn apply_actions_lookup(
        &mut self,
        ticket: &LookupTicket,
        transcription: Option<Transcription>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match &mut self.mode {
            UiMode::SessionActions {
                session_id,
                transcription: lookup,
            } if *session_id == ticket.session_id => {
                *lookup = match transcription {
                    Some(found) => TranscriptionLookup::Found(found),
                    None => TranscriptionLookup::Missing,
                };
                true
            }
            _ => false,
        }
    }

    /// Opens the action menu and waits for its transcription check.
    pub async fn show_actions<R>(&mut self, repo: &R, session_id: SessionId) -> bool
    where
        R: TranscriptionReader + ?Sized,
    {
        let Some(ticket) = self.open_actions(session_id) else {
            return false;
        };
        let transcription = Self::check_transcription(repo, &ticket).await;
        self.apply_actions_lookup(&ticket, transcription)
    }

    fn actions_session(&self) -> Option<SessionId> {
        match &self.mode {
            UiMode::SessionActions { session_id, .. } => Some(*session_id),
            _ => None,
        }
    }

    /// Switches from the action menu to the patient card.
    pub fn on_view_patient(&mut self) -> bool {
        let patient = self
            .actions_session()
            .and_then(|id| self.find(id))
            .and_then(|session| session.patient.clone());
        match patient {
            Some(patient) => {
                self.set_mode(UiMode::PatientDetail { patient });
                true
            }
            None => false,
        }
    }

    /// Switches from the action menu to the transcription viewer.
    pub fn on_view_transcription(&mut self) -> Option<LookupTicket> {
        let session_id = self.actions_session()?;
        self.set_mode(UiMode::ViewTranscription {
            session_id,
            transcription: TranscriptionLookup::Loading,
        });
        Some(self.ticket(session_id))
    }

    /// Strict lookup used by the viewer: failures carry a message.
    pub async fn fetch_transcription<R>(
        repo: &R,
        ticket: &LookupTicket,
    ) -> ServiceResult<Option<Transcription>>
    where
        R: TranscriptionReader + ?Sized,
    {
        find_for_session(repo, ticket.session_id).await
    }

    pub fn apply_view_lookup(
        &mut self,
        ticket: &LookupTicket,
        result: ServiceResult<Option<Transcription>>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match &mut self.mode {
            UiMode::ViewTranscription {
                session_id,
                transcription,
            } if *session_id == ticket.session_id => {
                *transcription = match result {
                    Ok(Some(found)) => TranscriptionLookup::Found(found),
                    Ok(None) => TranscriptionLookup::Missing,
                    Err(err) => TranscriptionLookup::Failed(err.user_message()),
                };
                true
            }
            _ => false,
        }
    }

    /// Opens the viewer from the action menu and waits for the lookup.
    pub async fn view_transcription<R>(&mut self, repo: &R) -> bool
    where
        R: TranscriptionReader + ?Sized,
    {
        let Some(ticket) = self.on_view_transcription() else {
            return false;
        };
        let result = Self::fetch_transcription(repo, &ticket).await;
        self.apply_view_lookup(&ticket, result)
    }

    pub fn on_add_transcription(&mut self) -> bool {
        match self.actions_session() {
            Some(session_id) => {
                self.set_mode(UiMode::AddTranscription {
                    session_id,
                    error: None,
                });
                true
            }
            None => false,
        }
    }

    pub fn on_delete_session(&mut self) -> bool {
        match self.actions_session() {
            Some(session_id) => {
                self.set_mode(UiMode::ConfirmDeleteSession { session_id });
                true
            }
            None => false,
        }
    }

    /// Asks for confirmation before deleting the transcription being viewed.
    pub fn request_delete_transcription(&mut self) -> bool {
        let target = match &self.mode {
            UiMode::ViewTranscription {
                session_id,
                transcription: TranscriptionLookup::Found(transcription),
            } => Some((*session_id, transcription.clone())),
            _ => None,
        };
        match target {
            Some((session_id, transcription)) => {
                self.set_mode(UiMode::ConfirmDeleteTranscription {
                    session_id,
                    transcription,
                });
                true
            }
            None => false,
        }
    }

    /// Backs out of the delete confirmation to the transcription it was about.
    pub fn cancel_delete_transcription(&mut self) -> bool {
        let target = match &self.mode {
            UiMode::ConfirmDeleteTranscription {
                session_id,
                transcription,
            } => Some((*session_id, transcription.clone())),
            _ => None,
        };
        match target {
            Some((session_id, transcription)) => {
                self.set_mode(UiMode::ViewTranscription {
                    session_id,
                    transcription: TranscriptionLookup::Found(transcription),
                });
                true
            }
            None => false,
        }
    }

    pub fn open_new_session(&mut self) {
        self.set_mode(UiMode::NewSession { error: None });
    }

    // Mutations

    fn notify(&mut self, kind: NoticeKind, message: &str, now: DateTime<Utc>) {
        self.notice = Some(Notice {
            kind,
            message: message.to_string(),
            expires_at: now
                .checked_add_signed(self.notice_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        });
    }

    async fn reload_after_mutation<R>(&mut self, repo: &R)
    where
        R: SessionReader + ?Sized,
    {
        if let Err(err) = self.load(repo).await {
            log::warn!("Reload after mutation failed: {err}");
        }
    }

    /// Deletes the session awaiting confirmation.
    pub async fn confirm_delete_session<R>(
        &mut self,
        repo: &R,
        now: DateTime<Utc>,
    ) -> ServiceResult<()>
    where
        R: SessionReader + SessionWriter + ?Sized,
    {
        let UiMode::ConfirmDeleteSession { session_id } = &self.mode else {
            return Err(ServiceError::InvalidState("no session awaiting deletion"));
        };
        let session_id = *session_id;

        self.busy = true;
        let result = delete_session(repo, session_id).await;
        self.busy = false;

        match result {
            Ok(()) => {
                self.close_modal();
                self.reload_after_mutation(repo).await;
                self.notify(NoticeKind::Success, SESSION_DELETED, now);
                Ok(())
            }
            Err(err) => {
                self.notify(NoticeKind::Error, SESSION_DELETE_FAILED, now);
                Err(err)
            }
        }
    }

    /// Deletes the transcription awaiting confirmation.
    pub async fn confirm_delete_transcription<R>(
        &mut self,
        repo: &R,
        now: DateTime<Utc>,
    ) -> ServiceResult<()>
    where
        R: SessionReader + TranscriptionWriter + ?Sized,
    {
        let UiMode::ConfirmDeleteTranscription { transcription, .. } = &self.mode else {
            return Err(ServiceError::InvalidState("no transcription awaiting deletion"));
        };
        let transcription_id = transcription.id;

        self.busy = true;
        let result = delete_transcription(repo, transcription_id).await;
        self.busy = false;

        match result {
            Ok(()) => {
                self.close_modal();
                self.reload_after_mutation(repo).await;
                self.notify(NoticeKind::Success, TRANSCRIPTION_DELETED, now);
                Ok(())
            }
            Err(err) => {
                self.notify(NoticeKind::Error, TRANSCRIPTION_DELETE_FAILED, now);
                Err(err)
            }
        }
    }

    /// Flips the paid flag of a session. The list is not reloaded or refiltered.
    pub async fn toggle_paid<R>(
        &mut self,
        repo: &R,
        session_id: SessionId,
        now: DateTime<Utc>,
    ) -> ServiceResult<bool>
    where
        R: SessionWriter + ?Sized,
    {
        let Some(paid) = self.find(session_id).map(|session| !session.paid) else {
            return Err(ServiceError::InvalidState("unknown session"));
        };

        self.busy = true;
        let result = set_paid(repo, session_id, paid).await;
        self.busy = false;

        match result {
            Ok(()) => {
                if let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) {
                    session.paid = paid;
                }
                let message = if paid { MARKED_PAID } else { MARKED_PENDING };
                self.notify(NoticeKind::Success, message, now);
                Ok(paid)
            }
            Err(err) => {
                self.notify(NoticeKind::Error, STATUS_UPDATE_FAILED, now);
                Err(err)
            }
        }
    }

    /// Saves the transcription typed into the add-transcription modal.
    pub async fn submit_transcription<R>(
        &mut self,
        repo: &R,
        form: AddTranscriptionForm,
        now: DateTime<Utc>,
    ) -> ServiceResult<Transcription>
    where
        R: SessionReader + TranscriptionWriter + ?Sized,
    {
        let UiMode::AddTranscription { session_id, .. } = &self.mode else {
            return Err(ServiceError::InvalidState("no transcription being added"));
        };
        let session_id = *session_id;

        self.busy = true;
        let result = create_transcription(repo, session_id, form).await;
        self.busy = false;

        match result {
            Ok(created) => {
                self.close_modal();
                self.reload_after_mutation(repo).await;
                self.notify(NoticeKind::Success, TRANSCRIPTION_SAVED, now);
                Ok(created)
            }
            Err(err) => {
                if let UiMode::AddTranscription { error, .. } = &mut self.mode {
                    *error = Some(err.user_message());
                }
                Err(err)
            }
        }
    }

    /// Schedules the session described in the new-session modal.
    pub async fn submit_new_session<R>(
        &mut self,
        repo: &R,
        form: NewSessionForm,
        now: DateTime<Utc>,
    ) -> ServiceResult<SessionDisplay>
    where
        R: SessionReader + SessionWriter + ?Sized,
    {
        if !matches!(self.mode, UiMode::NewSession { .. }) {
            return Err(ServiceError::InvalidState("new session form is not open"));
        }

        self.busy = true;
        let result = create_session(repo, form).await;
        self.busy = false;

        match result {
            Ok(created) => {
                self.close_modal();
                self.reload_after_mutation(repo).await;
                self.notify(NoticeKind::Success, SESSION_CREATED, now);
                Ok(created)
            }
            Err(err) => {
                if let UiMode::NewSession { error } = &mut self.mode {
                    *error = Some(err.user_message());
                }
                Err(err)
            }
        }
    }

    // Notices

    pub fn active_notice(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.notice.as_ref().filter(|notice| notice.is_active(now))
    }

    /// Drops the notice once its display time is over.
    pub fn clear_expired_notice(&mut self, now: DateTime<Utc>) -> bool {
        if self.notice.as_ref().is_some_and(|notice| !notice.is_active(now)) {
            self.notice = None;
            true
        } else {
            false
        }
    }

    pub fn view_state(&self, now: DateTime<Utc>) -> SessionListViewState<'_> {
        SessionListViewState {
            page: self.paginated(),
            filter: &self.filter,
            max_displayed: self.max_displayed(),
            totals: self.totals(),
            mode: &self.mode,
            notice: self.active_notice(now),
            loading: self.loading,
            busy: self.busy,
            error: self.error.as_deref(),
            modal_open: self.mode.is_open(),
        }
    }
}
