#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gamepanel_core::{SessionListener, TeardownReason};
use gamepanel_domain::Config;
use gamepanel_infra::ApiClient;
use parking_lot::Mutex;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Cookie issued by the stubbed login endpoint
pub const INITIAL_COOKIE: &str = "access_token=initial";
/// Cookie issued by the stubbed refresh endpoint
pub const REFRESHED_COOKIE: &str = "access_token=refreshed";

/// Listener that records every teardown it is told about.
#[derive(Default)]
pub struct CountingListener {
    calls: AtomicUsize,
    reasons: Mutex<Vec<TeardownReason>>,
}

impl CountingListener {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reasons(&self) -> Vec<TeardownReason> {
        self.reasons.lock().clone()
    }
}

#[async_trait]
impl SessionListener for CountingListener {
    async fn on_session_ended(&self, reason: TeardownReason) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reasons.lock().push(reason);
    }
}

pub fn auth_body(expires_in: u64) -> Value {
    json!({
        "user": { "id": "u1", "username": "admin", "role": "owner", "permissions": ["servers.start"] },
        "expiresIn": expires_in
    })
}

pub fn client_with_listener(server: &MockServer) -> (ApiClient, Arc<CountingListener>) {
    let listener = Arc::new(CountingListener::default());
    let client = ApiClient::builder(Config::with_base_url(server.uri()))
        .listener(listener.clone())
        .build()
        .expect("client should build");
    (client, listener)
}

/// Stub the login endpoint and sign in
pub async fn signed_in_client(server: &MockServer) -> (ApiClient, Arc<CountingListener>) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("{INITIAL_COOKIE}; HttpOnly").as_str())
                .set_body_json(auth_body(900)),
        )
        .mount(server)
        .await;

    let (client, listener) = client_with_listener(server);
    client.login("admin", "hunter2").await.expect("login should succeed");
    (client, listener)
}

/// Refresh endpoint that succeeds after `delay`, issuing [`REFRESHED_COOKIE`]
pub async fn mount_refresh_success(server: &MockServer, delay: Duration, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("{REFRESHED_COOKIE}; HttpOnly").as_str())
                .set_body_json(auth_body(900))
                .set_delay(delay),
        )
        .expect(expected_calls)
        .named("refresh")
        .mount(server)
        .await;
}

/// Refresh endpoint that rejects after `delay`
pub async fn mount_refresh_failure(server: &MockServer, delay: Duration, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Refresh token expired" }))
                .set_delay(delay),
        )
        .expect(expected_calls)
        .named("refresh")
        .mount(server)
        .await;
}

/// `GET route` answers `body` only with the refreshed cookie and 401 otherwise.
///
/// Mount order matters: the authorised mock is mounted first so it wins
/// whenever both match.
pub async fn mount_protected(server: &MockServer, route: &str, body: Value, rejected_delay: Duration) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("cookie", REFRESHED_COOKIE))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "message": "Token expired" }))
                .set_delay(rejected_delay),
        )
        .mount(server)
        .await;
}

/// Number of requests the server received for `route`
pub async fn hits(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}
