//! Session retrieval and mutation services.
//!
//! Every read hands back [`SessionDisplay`] values; the wire shape never
//! leaves this layer.

use crate::domain::session::{SessionDisplay, SessionInput};
use crate::domain::types::SessionId;
use crate::forms::session::NewSessionForm;
use crate::models::session::{NewSession, UpdateSession};
use crate::repository::{SessionReader, SessionWriter};
use crate::services::ServiceResult;

/// Loads every session and converts it for display, keeping backend order.
pub async fn load_sessions_for_display<R>(repo: &R) -> ServiceResult<Vec<SessionDisplay>>
where
    R: SessionReader + ?Sized,
{
    let sessions = repo.list_sessions().await.map_err(|err| {
        log::error!("Failed to load sessions: {err}");
        err
    })?;

    Ok(sessions.into_iter().map(SessionDisplay::from).collect())
}

pub async fn get_session<R>(repo: &R, id: SessionId) -> ServiceResult<SessionDisplay>
where
    R: SessionReader + ?Sized,
{
    let session = repo.get_session(id).await.map_err(|err| {
        log::error!("Failed to load session {id}: {err}");
        err
    })?;

    Ok(session.into())
}

/// Sessions the backend reports as still awaiting payment.
pub async fn list_pending_payments<R>(repo: &R) -> ServiceResult<Vec<SessionDisplay>>
where
    R: SessionReader + ?Sized,
{
    let sessions = repo.list_pending_payments().await.map_err(|err| {
        log::error!("Failed to load pending payments: {err}");
        err
    })?;

    Ok(sessions.into_iter().map(SessionDisplay::from).collect())
}

/// Validates the form and schedules the session.
pub async fn create_session<R>(repo: &R, form: NewSessionForm) -> ServiceResult<SessionDisplay>
where
    R: SessionWriter + ?Sized,
{
    let input = SessionInput::try_from(form).map_err(|err| {
        log::error!("Failed to validate session form: {err}");
        err
    })?;

    let created = repo
        .create_session(&NewSession::from(&input))
        .await
        .map_err(|err| {
            log::error!("Failed to create session: {err}");
            err
        })?;

    log::info!("Created session {} on {}", created.id, input.date);
    Ok(created.into())
}

/// Replaces the schedule and details of an existing session.
pub async fn update_session<R>(
    repo: &R,
    id: SessionId,
    form: NewSessionForm,
) -> ServiceResult<SessionDisplay>
where
    R: SessionWriter + ?Sized,
{
    let input = SessionInput::try_from(form).map_err(|err| {
        log::error!("Failed to validate session form: {err}");
        err
    })?;

    let updated = repo
        .update_session(id, &UpdateSession::from(&input))
        .await
        .map_err(|err| {
            log::error!("Failed to update session {id}: {err}");
            err
        })?;

    Ok(updated.into())
}

/// Sets the paid flag of a session.
pub async fn set_paid<R>(repo: &R, id: SessionId, paid: bool) -> ServiceResult<()>
where
    R: SessionWriter + ?Sized,
{
    repo.update_session_status(id, paid).await.map_err(|err| {
        log::error!("Failed to update payment status of session {id}: {err}");
        err
    })?;

    log::info!("Session {id} marked as paid={paid}");
    Ok(())
}

pub async fn delete_session<R>(repo: &R, id: SessionId) -> ServiceResult<()>
where
    R: SessionWriter + ?Sized,
{
    repo.delete_session(id).await.map_err(|err| {
        log::error!("Failed to delete session {id}: {err}");
        err
    })?;

    log::info!("Deleted session {id}");
    Ok(())
}
