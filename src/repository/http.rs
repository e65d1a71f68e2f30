//! `reqwest` implementation of the backend gateways.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::domain::transcription::{NewTranscription, Transcription, UpdateTranscription};
use crate::domain::types::{SessionId, TranscriptionId};
use crate::models::config::ClientConfig;
use crate::models::session::{NewSession, Session, SessionStatusUpdate, UpdateSession};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{SessionReader, SessionWriter, TranscriptionReader, TranscriptionWriter};

/// Backend gateway speaking JSON over HTTP.
#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRepository {
    pub fn new(config: &ClientConfig) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| {
                RepositoryError::ConnectionError(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        log::debug!("{method} {url}");

        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> RepositoryResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = RepositoryError::from_status(status.as_u16(), &body);
        if err.is_not_found() {
            log::debug!("Backend responded {status}");
        } else {
            log::warn!("Backend responded {status}: {body}");
        }
        Err(err)
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> RepositoryResult<T> {
        let response = Self::send(request).await?;
        response.json::<T>().await.map_err(RepositoryError::from)
    }

    async fn execute(request: RequestBuilder) -> RepositoryResult<()> {
        Self::send(request).await.map(|_| ())
    }
}

#[async_trait]
impl SessionReader for HttpRepository {
    async fn list_sessions(&self) -> RepositoryResult<Vec<Session>> {
        Self::fetch(self.request(Method::GET, "/sessions")).await
    }

    async fn get_session(&self, id: SessionId) -> RepositoryResult<Session> {
        Self::fetch(self.request(Method::GET, &format!("/sessions/{id}"))).await
    }

    async fn list_pending_payments(&self) -> RepositoryResult<Vec<Session>> {
        Self::fetch(self.request(Method::GET, "/sessions/pending-payments")).await
    }
}

#[async_trait]
impl SessionWriter for HttpRepository {
    async fn create_session(&self, new_session: &NewSession) -> RepositoryResult<Session> {
        Self::fetch(self.request(Method::POST, "/sessions").json(new_session)).await
    }

    async fn update_session(
        &self,
        id: SessionId,
        updates: &UpdateSession,
    ) -> RepositoryResult<Session> {
        Self::fetch(
            self.request(Method::PATCH, &format!("/sessions/{id}"))
                .json(updates),
        )
        .await
    }

    async fn update_session_status(&self, id: SessionId, paid: bool) -> RepositoryResult<()> {
        Self::execute(
            self.request(Method::PATCH, &format!("/sessions/{id}/estado"))
                .json(&SessionStatusUpdate { paid }),
        )
        .await
    }

    async fn delete_session(&self, id: SessionId) -> RepositoryResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/sessions/{id}"))).await
    }
}

#[async_trait]
impl TranscriptionReader for HttpRepository {
    async fn get_transcription(&self, id: TranscriptionId) -> RepositoryResult<Transcription> {
        Self::fetch(self.request(Method::GET, &format!("/transcriptions/{id}"))).await
    }

    async fn get_transcription_by_session(
        &self,
        session_id: SessionId,
    ) -> RepositoryResult<Transcription> {
        Self::fetch(self.request(
            Method::GET,
            &format!("/transcriptions/session/{session_id}"),
        ))
        .await
    }
}

#[async_trait]
impl TranscriptionWriter for HttpRepository {
    async fn create_transcription(
        &self,
        transcription: &NewTranscription,
    ) -> RepositoryResult<Transcription> {
        Self::fetch(
            self.request(Method::POST, "/transcriptions")
                .json(transcription),
        )
        .await
    }

    async fn update_transcription(
        &self,
        id: TranscriptionId,
        updates: &UpdateTranscription,
    ) -> RepositoryResult<Transcription> {
        Self::fetch(
            self.request(Method::PATCH, &format!("/transcriptions/{id}"))
                .json(updates),
        )
        .await
    }

    async fn delete_transcription(&self, id: TranscriptionId) -> RepositoryResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/transcriptions/{id}"))).await
    }
}
