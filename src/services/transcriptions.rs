//! Transcription lookups and mutations.

use futures::future::join_all;

use crate::domain::transcription::Transcription;
use crate::domain::types::{SessionId, TranscriptionId};
use crate::dto::calendar::TranscriptionsBySession;
use crate::forms::transcription::AddTranscriptionForm;
use crate::repository::{TranscriptionReader, TranscriptionWriter};
use crate::services::ServiceResult;

/// Transcription of a single session, folding every failure into `None`.
///
/// Not-found is the normal "no transcription yet" answer and only logs at
/// debug level; any other failure is logged as an error.
pub async fn lookup_for_session<R>(repo: &R, session_id: SessionId) -> Option<Transcription>
where
    R: TranscriptionReader + ?Sized,
{
    match repo.get_transcription_by_session(session_id).await {
        Ok(transcription) => Some(transcription),
        Err(err) if err.is_not_found() => {
            log::debug!("Session {session_id} has no transcription");
            None
        }
        Err(err) => {
            log::error!("Failed to load transcription for session {session_id}: {err}");
            None
        }
    }
}

/// Transcription of a single session where only not-found counts as "none".
pub async fn find_for_session<R>(
    repo: &R,
    session_id: SessionId,
) -> ServiceResult<Option<Transcription>>
where
    R: TranscriptionReader + ?Sized,
{
    match repo.get_transcription_by_session(session_id).await {
        Ok(transcription) => Ok(Some(transcription)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => {
            log::error!("Failed to load transcription for session {session_id}: {err}");
            Err(err.into())
        }
    }
}

/// Looks up the transcriptions of `session_ids` concurrently.
///
/// Every id gets an entry once all lookups have finished. The result is only
/// available after the whole batch resolves, whatever order the individual
/// requests complete in.
pub async fn load_for_sessions<R>(repo: &R, session_ids: &[SessionId]) -> TranscriptionsBySession
where
    R: TranscriptionReader + ?Sized,
{
    let lookups = session_ids
        .iter()
        .map(|&id| async move { (id, lookup_for_session(repo, id).await) });

    let loaded: TranscriptionsBySession = join_all(lookups).await.into_iter().collect();

    log::debug!(
        "Loaded transcriptions for {} sessions ({} present)",
        loaded.len(),
        loaded.values().filter(|t| t.is_some()).count()
    );

    loaded
}

pub async fn get_transcription<R>(repo: &R, id: TranscriptionId) -> ServiceResult<Transcription>
where
    R: TranscriptionReader + ?Sized,
{
    repo.get_transcription(id).await.map_err(|err| {
        log::error!("Failed to load transcription {id}: {err}");
        err.into()
    })
}

/// Validates the form and attaches the transcription to `session_id`.
pub async fn create_transcription<R>(
    repo: &R,
    session_id: SessionId,
    form: AddTranscriptionForm,
) -> ServiceResult<Transcription>
where
    R: TranscriptionWriter + ?Sized,
{
    let payload = form.into_new_transcription(session_id).map_err(|err| {
        log::error!("Failed to validate transcription form: {err}");
        err
    })?;

    let created = repo.create_transcription(&payload).await.map_err(|err| {
        log::error!("Failed to create transcription for session {session_id}: {err}");
        err
    })?;

    log::info!("Created transcription {} for session {session_id}", created.id);
    Ok(created)
}

pub async fn update_transcription<R>(
    repo: &R,
    id: TranscriptionId,
    form: AddTranscriptionForm,
) -> ServiceResult<Transcription>
where
    R: TranscriptionWriter + ?Sized,
{
    let updates = form.into_update().map_err(|err| {
        log::error!("Failed to validate transcription form: {err}");
        err
    })?;

    repo.update_transcription(id, &updates).await.map_err(|err| {
        log::error!("Failed to update transcription {id}: {err}");
        err.into()
    })
}

pub async fn delete_transcription<R>(repo: &R, id: TranscriptionId) -> ServiceResult<()>
where
    R: TranscriptionWriter + ?Sized,
{
    repo.delete_transcription(id).await.map_err(|err| {
        log::error!("Failed to delete transcription {id}: {err}");
        err
    })?;

    log::info!("Deleted transcription {id}");
    Ok(())
}
