//! Authenticated API client with single-flight session refresh
//!
//! Every call goes through [`ApiClient::request`]. A 401 on a call suspends
//! it behind the client's [`RefreshCoordinator`]: one caller refreshes the
//! session, the rest wait for that outcome, and each original call is then
//! retried exactly once.

use std::sync::Arc;
use std::time::Duration;

use gamepanel_core::{
    Generation, RefreshCoordinator, RefreshLeader, RefreshOutcome, RefreshTicket,
    SessionListener, SessionState, TeardownReason,
};
use gamepanel_domain::constants::{DEFAULT_USER_AGENT, REQUEST_ID_HEADER};
use gamepanel_domain::{AuthConfig, AuthResponse, Config};
use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::credentials::{CookieCredentialStore, CredentialStore};
use super::errors::{body_excerpt, ApiError};
use super::request::RequestOptions;
use crate::config::validate_base_url;
use crate::errors::transport_error;
use crate::http::HttpClient;

/// Where a call chain stands with respect to authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthAttempt {
    /// First send; a 401 may trigger (or join) a refresh
    Initial,
    /// Sent again after a refresh; a 401 is terminal
    Retried,
}

/// Client for the panel REST API.
///
/// Cheap to clone; clones share credentials, session state and the refresh
/// coordinator. Independent clients built separately share nothing.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: String,
    auth: AuthConfig,
    credentials: Arc<dyn CredentialStore>,
    coordinator: RefreshCoordinator,
    session: SessionState,
    listeners: Vec<Arc<dyn SessionListener>>,
}

/// Body of a fully read response
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiClient {
    /// Client with an in-memory cookie store and no listeners.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, ApiError> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> ApiClientBuilder {
        ApiClientBuilder::new(config)
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.credentials
    }

    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.inner.coordinator
    }

    pub(crate) fn auth_config(&self) -> &AuthConfig {
        &self.inner.auth
    }

    /// Perform an authenticated call and decode the JSON response.
    ///
    /// A 401 triggers (or joins) a single session refresh and the call is
    /// retried once. A second 401 on the retried call is reported as
    /// [`ApiError::SessionExpired`] without another refresh. `204 No Content`
    /// and empty bodies decode from JSON `null`, so `()` and `Option<_>`
    /// work for endpoints without a payload.
    ///
    /// # Errors
    /// See [`ApiError`] for the failure taxonomy.
    #[instrument(skip(self, options), fields(method = %options.method, endpoint = %endpoint))]
    pub async fn request<T>(&self, endpoint: &str, options: RequestOptions) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let mut attempt = AuthAttempt::Initial;

        loop {
            let generation = self.inner.coordinator.generation();
            let response = self.execute(endpoint, &options).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return self.decode(response).await;
            }

            match attempt {
                AuthAttempt::Retried => {
                    warn!("request rejected again after session refresh");
                    return Err(ApiError::SessionExpired(
                        "request rejected after session refresh".to_string(),
                    ));
                }
                AuthAttempt::Initial => {
                    let outcome = self.settle_refresh(Some(generation)).await;

                    if outcome != RefreshOutcome::Refreshed {
                        return Err(ApiError::SessionExpired(
                            "session refresh failed".to_string(),
                        ));
                    }

                    debug!("retrying request with refreshed session");
                    attempt = AuthAttempt::Retried;
                }
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::get()).await
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(endpoint, RequestOptions::post().json(body)?).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(endpoint, RequestOptions::put().json(body)?).await
    }

    pub async fn patch<B, T>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(endpoint, RequestOptions::patch().json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(endpoint, RequestOptions::delete()).await
    }

    /// Lead, join or skip a refresh until it settles.
    ///
    /// `observed` is the generation a rejected request was sent under; `None`
    /// for an explicit refresh. A leader that vanished mid-refresh sends its
    /// waiters round again, so one of them takes over.
    pub(crate) async fn settle_refresh(&self, observed: Option<Generation>) -> RefreshOutcome {
        loop {
            let ticket = match observed {
                Some(generation) => self.inner.coordinator.ticket(generation),
                None => self.inner.coordinator.begin(),
            };

            let outcome = match ticket {
                RefreshTicket::AlreadyRefreshed => RefreshOutcome::Refreshed,
                RefreshTicket::Leader(leader) => self.lead_refresh(leader).await,
                RefreshTicket::Follower(waiter) => {
                    debug!("waiting for in-flight session refresh");
                    waiter.outcome().await
                }
            };

            if outcome != RefreshOutcome::Abandoned {
                return outcome;
            }
            debug!("refresh leader went away; claiming the refresh again");
        }
    }

    /// Run the refresh call as leader and release every waiter.
    ///
    /// On failure the local session is torn down here, once, before the
    /// waiters are released. A refresh that outlives its session (logout
    /// while in flight) installs nothing and fails quietly.
    async fn lead_refresh(&self, leader: RefreshLeader<'_>) -> RefreshOutcome {
        match self.perform_refresh().await {
            Ok((auth, headers)) => {
                let installed = leader.commit(|| {
                    self.inner.credentials.on_refreshed(&headers);
                    self.inner.session.establish(auth.user, auth.expires_in)
                });

                match installed {
                    Some(session) => {
                        let released = leader.complete(RefreshOutcome::Refreshed);
                        info!(
                            user = %session.user.username,
                            expires_at = %session.expires_at,
                            released,
                            "session refreshed"
                        );
                        RefreshOutcome::Refreshed
                    }
                    None => {
                        info!("session ended during refresh; discarding refreshed credentials");
                        leader.complete(RefreshOutcome::Failed);
                        RefreshOutcome::Failed
                    }
                }
            }
            Err(err) => {
                if !leader.end_session(|| self.clear_local_session()) {
                    debug!(error = %err, "refresh failed after session already ended");
                    leader.complete(RefreshOutcome::Failed);
                    return RefreshOutcome::Failed;
                }

                warn!(error = %err, "session refresh failed; ending session");
                let released = leader.complete(RefreshOutcome::Failed);
                debug!(released, "released waiters after failed refresh");
                self.notify_session_ended(TeardownReason::Expired).await;
                RefreshOutcome::Failed
            }
        }
    }

    /// Call the refresh endpoint. Nothing is installed here; the caller
    /// commits the result only if the session is still current.
    async fn perform_refresh(&self) -> Result<(AuthResponse, HeaderMap), ApiError> {
        let options = RequestOptions::post();
        let response = self.execute(&self.inner.auth.refresh_path, &options).await?;
        let raw = self.read(response).await?;

        if !raw.status.is_success() {
            return Err(ApiError::from_response(raw.status, &raw.body));
        }

        let auth: AuthResponse = serde_json::from_slice(&raw.body).map_err(|err| {
            ApiError::Decode {
                status: raw.status.as_u16(),
                message: format!("invalid refresh response: {err}"),
            }
        })?;

        Ok((auth, raw.headers))
    }

    /// Forget credentials and session, then notify listeners.
    ///
    /// Any refresh still in flight is invalidated and will not bring the
    /// session back.
    pub(crate) async fn end_session(&self, reason: TeardownReason) {
        self.inner.coordinator.end_session(|| self.clear_local_session());
        self.notify_session_ended(reason).await;
    }

    fn clear_local_session(&self) {
        self.inner.credentials.clear();
        if let Some(previous) = self.inner.session.teardown() {
            debug!(user = %previous.user.username, "cleared local session");
        }
    }

    async fn notify_session_ended(&self, reason: TeardownReason) {
        for listener in &self.inner.listeners {
            listener.on_session_ended(reason).await;
        }
    }

    /// Send one HTTP call with credentials and a request id attached. Does
    /// not interpret the status.
    pub(crate) async fn execute(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<Response, ApiError> {
        let url = self.url(endpoint);
        let request_id = Uuid::new_v4().to_string();

        let mut builder = self
            .inner
            .http
            .request(options.method.clone(), &url)
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .headers(options.headers.clone());

        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let builder = self.inner.credentials.attach(builder);

        debug!(request_id = %request_id, url = %url, "dispatching request");
        self.inner.http.send(builder).await
    }

    /// Read status, headers and the whole body.
    pub(crate) async fn read(&self, response: Response) -> Result<RawResponse, ApiError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(err, self.inner.http.timeout()))?;

        Ok(RawResponse { status, headers, body: body.to_vec() })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, ApiError> {
        let raw = self.read(response).await?;
        decode_body(raw.status, &raw.body)
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.inner.base_url, endpoint)
        } else {
            format!("{}/{}", self.inner.base_url, endpoint)
        }
    }
}

/// Turn a fully read response into `T` or the matching error.
pub(crate) fn decode_body<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, ApiError> {
    if !status.is_success() {
        debug!(%status, body = %body_excerpt(body), "request failed");
        return Err(ApiError::from_response(status, body));
    }

    if status == StatusCode::NO_CONTENT || body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(Value::Null).map_err(|err| ApiError::Decode {
            status: status.as_u16(),
            message: format!("response had no content but a value was expected: {err}"),
        });
    }

    serde_json::from_slice(body).map_err(|err| ApiError::Decode {
        status: status.as_u16(),
        message: format!("failed to parse response: {err}"),
    })
}

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    config: Config,
    credentials: Option<Arc<dyn CredentialStore>>,
    listeners: Vec<Arc<dyn SessionListener>>,
    base_backoff: Option<Duration>,
}

impl ApiClientBuilder {
    fn new(config: Config) -> Self {
        Self { config, credentials: None, listeners: Vec::new(), base_backoff: None }
    }

    /// Use a specific credential store (defaults to [`CookieCredentialStore`])
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Register a listener invoked whenever the session ends
    pub fn listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Delay before the first transport retry of an idempotent call
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = Some(backoff);
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        self.config.validate()?;
        validate_base_url(&self.config.api.base_url)?;

        let mut http = HttpClient::builder()
            .timeout(self.config.api.timeout())
            .max_attempts(self.config.api.max_attempts)
            .user_agent(
                self.config.api.user_agent.clone().unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            );
        if let Some(backoff) = self.base_backoff {
            http = http.base_backoff(backoff);
        }

        let credentials =
            self.credentials.unwrap_or_else(|| Arc::new(CookieCredentialStore::new()));

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http: http.build()?,
                base_url: self.config.api.base_url.trim_end_matches('/').to_string(),
                auth: self.config.auth,
                credentials,
                coordinator: RefreshCoordinator::new(),
                session: SessionState::new(),
                listeners: self.listeners,
            }),
        })
    }
}
