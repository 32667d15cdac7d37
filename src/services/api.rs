// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Directory service client for athletes and their training sessions.
//!
//! Every request goes through [`ApiClient::authorize`], which makes sure the
//! bearer token is fresh before anything leaves the process. If the session
//! cannot be refreshed the request is dropped and `ApiError::AuthExpired` is
//! returned instead.

use crate::config::{AthleteLookup, Config};
use crate::error::{ApiError, Result};
use crate::models::{
    AthleteFields, AthleteId, AthleteRecord, FeedbackUpdate, SessionId, TrainingSession,
};
use crate::services::AuthSession;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use validator::Validate;

/// HTTP client bound to one directory service origin.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<AuthSession>,
    refresh_margin_secs: i64,
    lookup: AthleteLookup,
}

impl ApiClient {
    /// Create a client for `config.api_base_url`, authenticating through `session`.
    pub fn new(config: &Config, session: Arc<AuthSession>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ApiError::NetworkFault(format!("failed building HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            refresh_margin_secs: config.token_refresh_margin_secs,
            lookup: config.athlete_lookup,
        })
    }

    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    // ─── Athletes ────────────────────────────────────────────────────────────

    /// `GET /trainer/clients`
    pub async fn list_athletes(&self) -> Result<Vec<AthleteRecord>> {
        let request = self.request(Method::GET, "/trainer/clients");
        match self.send_json(request).await {
            Err(ApiError::ServiceFault { status, body }) => {
                tracing::warn!(status, "Athlete directory returned an error");
                Err(ApiError::DirectoryUnavailable { status, body })
            }
            other => other,
        }
    }

    /// Fetch one athlete, using the configured [`AthleteLookup`] strategy.
    pub async fn get_athlete_by_id(&self, id: &AthleteId) -> Result<AthleteRecord> {
        match self.lookup {
            AthleteLookup::Endpoint => {
                let path = format!("/trainer/clients/{}", encode(id.as_str()));
                self.send_json(self.request(Method::GET, &path)).await
            }
            AthleteLookup::ListScan => self
                .list_athletes()
                .await?
                .into_iter()
                .find(|a| &a.id == id)
                .ok_or_else(|| ApiError::ServiceFault {
                    status: StatusCode::NOT_FOUND.as_u16(),
                    body: format!("athlete {} not found", id),
                }),
        }
    }

    /// `POST /trainer/clients`. Name and goal must be non-empty.
    pub async fn create_athlete(&self, fields: &AthleteFields) -> Result<AthleteRecord> {
        fields.validate()?;
        let request = self.request(Method::POST, "/trainer/clients").json(fields);
        let created: AthleteRecord = self.send_json(request).await?;
        tracing::info!(athlete_id = %created.id, "Athlete created");
        Ok(created)
    }

    /// `PUT /trainer/clients/{id}` with the full field set.
    pub async fn update_athlete(
        &self,
        id: &AthleteId,
        fields: &AthleteFields,
    ) -> Result<AthleteRecord> {
        fields.validate()?;
        let path = format!("/trainer/clients/{}", encode(id.as_str()));
        let request = self.request(Method::PUT, &path).json(fields);
        let updated: AthleteRecord = self.send_json(request).await?;
        tracing::info!(athlete_id = %id, "Athlete updated");
        Ok(updated)
    }

    /// `DELETE /trainer/clients/{id}`. An already-missing athlete counts as deleted.
    pub async fn delete_athlete(&self, id: &AthleteId) -> Result<()> {
        let path = format!("/trainer/clients/{}", encode(id.as_str()));
        match self.send(self.request(Method::DELETE, &path)).await {
            Ok(_) => {
                tracing::info!(athlete_id = %id, "Athlete deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(athlete_id = %id, "Athlete already gone");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ─── Sessions ────────────────────────────────────────────────────────────

    /// `GET /trainer/clients/{id}/sessions`
    pub async fn list_sessions(&self, athlete_id: &AthleteId) -> Result<Vec<TrainingSession>> {
        let path = format!("/trainer/clients/{}/sessions", encode(athlete_id.as_str()));
        self.send_json(self.request(Method::GET, &path)).await
    }

    /// `PATCH /trainer/sessions/{id}/feedback`
    pub async fn update_session_feedback(
        &self,
        session_id: &SessionId,
        update: &FeedbackUpdate,
    ) -> Result<TrainingSession> {
        update.check_rating().map_err(ApiError::ValidationFault)?;
        let path = format!("/trainer/sessions/{}/feedback", encode(session_id.as_str()));
        let request = self.request(Method::PATCH, &path).json(update);
        let session: TrainingSession = self.send_json(request).await?;
        tracing::info!(session_id = %session_id, "Session feedback saved");
        Ok(session)
    }

    // ─── Plumbing ────────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    /// Pre-request hook: attach a fresh bearer token, or abort.
    ///
    /// With no session at all the request goes out without `Authorization`.
    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        match self.session.ensure_fresh_token(self.refresh_margin_secs).await {
            Ok(Some(token)) => Ok(request.bearer_auth(token)),
            Ok(None) => Ok(request),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping request, re-login required");
                Err(e.into())
            }
        }
    }

    /// Authorize, send, and reject non-2xx responses.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let request = self.authorize(request).await?;
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::NetworkFault(e.to_string()))?;
        check_response(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "Directory service error");
    Err(ApiError::ServiceFault {
        status: status.as_u16(),
        body,
    })
}

fn encode(segment: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(segment)
}
