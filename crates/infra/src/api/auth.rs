//! Session operations: login, logout, explicit refresh and keepalive

use std::time::Duration;

use gamepanel_core::{RefreshOutcome, TeardownReason};
use gamepanel_domain::{AuthResponse, AuthSession, LoginRequest, UserProfile};
use reqwest::StatusCode;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::client::{decode_body, ApiClient};
use super::errors::ApiError;
use super::request::RequestOptions;

/// Lower bound between keepalive refreshes, so a session issued with a
/// lifetime shorter than the leeway does not spin.
const MIN_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(1);

impl ApiClient {
    /// Sign in and establish a session.
    ///
    /// A 401 from the login endpoint means the credentials were rejected; no
    /// refresh is attempted because there is no session to refresh.
    ///
    /// # Errors
    /// `ApiError::InvalidCredentials` on 401, otherwise the usual taxonomy.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, ApiError> {
        let body = LoginRequest { username: username.to_string(), password: password.to_string() };
        let options = RequestOptions::post().json(&body)?;

        let response = self.execute(&self.auth_config().login_path, &options).await?;
        let raw = self.read(response).await?;

        if raw.status == StatusCode::UNAUTHORIZED {
            warn!("login rejected");
            let message = ApiError::from_response(raw.status, &raw.body).message();
            return Err(ApiError::InvalidCredentials { message });
        }

        let auth: AuthResponse = decode_body(raw.status, &raw.body)?;

        self.credentials().on_refreshed(&raw.headers);
        self.coordinator().credentials_replaced();
        let session = self.session().establish(auth.user, auth.expires_in);

        info!(expires_at = %session.expires_at, "logged in");
        Ok(session)
    }

    /// End the session on the server (best effort) and locally.
    ///
    /// Local teardown and the `LoggedOut` notification happen even when the
    /// logout call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let options = RequestOptions::post();
        match self.execute(&self.auth_config().logout_path, &options).await {
            Ok(response) if response.status().is_success() => info!("logged out"),
            Ok(response) => {
                warn!(status = %response.status(), "logout rejected by server; clearing local session")
            }
            Err(err) => warn!(error = %err, "logout request failed; clearing local session"),
        }

        self.end_session(TeardownReason::LoggedOut).await;
    }

    /// Fetch the signed-in user's profile and update the cached copy.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        let user: UserProfile = self.get(&self.auth_config().me_path).await?;
        self.session().update_user(user.clone());
        Ok(user)
    }

    /// Refresh the session now, joining a refresh already in flight.
    ///
    /// # Errors
    /// `ApiError::SessionExpired` if the refresh failed. The session has
    /// been torn down in that case.
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        match self.settle_refresh(None).await {
            RefreshOutcome::Refreshed => Ok(()),
            RefreshOutcome::Failed | RefreshOutcome::Abandoned => {
                Err(ApiError::SessionExpired("session refresh failed".to_string()))
            }
        }
    }

    /// Refresh if the session expires within `leeway`. Returns whether a
    /// refresh happened. Without a session this is a no-op.
    pub async fn ensure_fresh(&self, leeway: Duration) -> Result<bool, ApiError> {
        if !self.session().needs_refresh(leeway) {
            return Ok(false);
        }

        debug!(?leeway, "session close to expiry; refreshing");
        self.refresh_session().await.map(|()| true)
    }

    /// Keep the session alive in the background.
    ///
    /// The task sleeps until `expires_at - leeway`, refreshes, and repeats.
    /// It exits once there is no session (logout, failed refresh).
    pub fn spawn_keepalive(&self, leeway: Duration) -> JoinHandle<()> {
        let client = self.clone();

        tokio::spawn(async move {
            loop {
                let Some(wait) = client.session().time_until_refresh(leeway) else {
                    debug!("no active session; keepalive stopping");
                    break;
                };

                tokio::time::sleep(wait.max(MIN_KEEPALIVE_INTERVAL)).await;

                match client.ensure_fresh(leeway).await {
                    Ok(refreshed) => debug!(refreshed, "keepalive tick"),
                    Err(err) => {
                        warn!(error = %err, "keepalive refresh failed; stopping");
                        break;
                    }
                }
            }
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    pub fn session_user(&self) -> Option<UserProfile> {
        self.session().user()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use gamepanel_core::SessionListener;
    use gamepanel_domain::{Config, ErrorCode};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Default)]
    struct RecordingListener {
        reasons: Mutex<Vec<TeardownReason>>,
    }

    #[async_trait]
    impl SessionListener for RecordingListener {
        async fn on_session_ended(&self, reason: TeardownReason) {
            self.reasons.lock().push(reason);
        }
    }

    fn auth_body(expires_in: u64) -> Value {
        json!({
            "user": { "id": "u1", "username": "admin", "role": "owner", "permissions": [] },
            "expiresIn": expires_in
        })
    }

    fn client_with_listener(server: &MockServer) -> (ApiClient, Arc<RecordingListener>) {
        let listener = Arc::new(RecordingListener::default());
        let client = ApiClient::builder(Config::with_base_url(server.uri()))
            .listener(listener.clone())
            .build()
            .unwrap();
        (client, listener)
    }

    #[tokio::test]
    async fn login_establishes_session_and_stores_cookies() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "access_token=abc; HttpOnly")
                    .set_body_json(auth_body(900)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server);
        let before = client.coordinator().generation();
        let session = client.login("admin", "hunter2").await.unwrap();

        assert_eq!(session.user.username, "admin");
        assert!(client.is_authenticated());
        assert!(client.credentials().has_credentials());
        assert!(client.coordinator().generation() > before);
        assert_eq!(client.session_user().map(|u| u.id), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn login_rejection_is_invalid_credentials_without_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad password" })),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(900)))
            .expect(0)
            .mount(&server)
            .await;

        let (client, listener) = client_with_listener(&server);
        let err = client.login("admin", "wrong").await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidCredentials);
        assert_eq!(err.message(), "Bad password");
        assert!(!client.is_authenticated());
        assert!(listener.reasons.lock().is_empty());
    }

    #[tokio::test]
    async fn logout_tears_down_even_when_server_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "access_token=abc")
                    .set_body_json(auth_body(900)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let (client, listener) = client_with_listener(&server);
        client.login("admin", "hunter2").await.unwrap();
        client.logout().await;

        assert!(!client.is_authenticated());
        assert!(!client.credentials().has_credentials());
        assert_eq!(*listener.reasons.lock(), vec![TeardownReason::LoggedOut]);
    }

    #[tokio::test]
    async fn current_user_updates_cached_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(900)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u1", "username": "admin", "role": "admin", "permissions": ["servers.start"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server);
        client.login("admin", "hunter2").await.unwrap();
        let user = client.current_user().await.unwrap();

        assert!(user.has_permission("servers.start"));
        assert_eq!(client.session_user().map(|u| u.role), Some("admin".to_string()));
    }

    #[tokio::test]
    async fn ensure_fresh_only_refreshes_near_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(900)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(900)))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server);
        assert!(!client.ensure_fresh(Duration::from_secs(60)).await.unwrap());

        client.login("admin", "hunter2").await.unwrap();
        assert!(!client.ensure_fresh(Duration::from_secs(60)).await.unwrap());
        assert!(client.ensure_fresh(Duration::from_secs(3600)).await.unwrap());
    }

    #[tokio::test]
    async fn explicit_refresh_failure_ends_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(900)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let (client, listener) = client_with_listener(&server);
        client.login("admin", "hunter2").await.unwrap();
        let err = client.refresh_session().await.unwrap_err();

        assert!(err.is_session_expired());
        assert!(!client.is_authenticated());
        assert_eq!(*listener.reasons.lock(), vec![TeardownReason::Expired]);
    }

    #[tokio::test]
    async fn keepalive_exits_without_session() {
        let server = MockServer::start().await;
        let (client, _) = client_with_listener(&server);

        let handle = client.spawn_keepalive(Duration::from_secs(60));
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn keepalive_refreshes_then_stops_after_logout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(2)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(900)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (client, _) = client_with_listener(&server);
        client.login("admin", "hunter2").await.unwrap();

        let handle = client.spawn_keepalive(Duration::from_secs(1));
        // Lifetime 2s minus 1s leeway: refresh due after roughly one second
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let expires_at = client.session().expires_at().unwrap();
        assert!(expires_at > chrono::Utc::now() + chrono::Duration::seconds(60));

        client.logout().await;
        handle.abort();
    }
}
