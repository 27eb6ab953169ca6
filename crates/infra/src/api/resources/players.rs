//! Player moderation

use gamepanel_domain::{Player, PlayerAction};
use serde::de::IgnoredAny;
use tracing::instrument;
use urlencoding::encode;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;

#[derive(Clone, Copy)]
pub struct Players<'a> {
    client: &'a ApiClient,
}

impl<'a> Players<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Known players of a server, online or not
    #[instrument(skip(self, server_id), fields(server_id = %server_id))]
    pub async fn list(&self, server_id: &str) -> Result<Vec<Player>, ApiError> {
        self.client.get(&format!("/servers/{}/players", encode(server_id))).await
    }

    pub async fn kick(
        &self,
        server_id: &str,
        player: &str,
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        self.moderate(server_id, player, "kick", reason).await
    }

    pub async fn ban(
        &self,
        server_id: &str,
        player: &str,
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        self.moderate(server_id, player, "ban", reason).await
    }

    #[instrument(skip(self, server_id, player), fields(server_id = %server_id, player = %player))]
    pub async fn unban(&self, server_id: &str, player: &str) -> Result<(), ApiError> {
        let path = format!("/servers/{}/players/{}/ban", encode(server_id), encode(player));
        self.client.delete::<IgnoredAny>(&path).await?;
        Ok(())
    }

    #[instrument(skip(self, server_id, player, reason), fields(server_id = %server_id, player = %player))]
    async fn moderate(
        &self,
        server_id: &str,
        player: &str,
        action: &str,
        reason: Option<&str>,
    ) -> Result<(), ApiError> {
        let path =
            format!("/servers/{}/players/{}/{}", encode(server_id), encode(player), action);
        let body = PlayerAction { reason: reason.map(str::to_string) };
        self.client.post::<_, IgnoredAny>(&path, &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::resources::test_support::client_for;

    #[tokio::test]
    async fn ban_posts_reason_and_unban_deletes() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/servers/s1/players/Steve/ban"))
            .and(body_json(json!({ "reason": "griefing" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/servers/s1/players/Steve/ban"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock)
            .await;

        let client = client_for(&mock);
        client.players().ban("s1", "Steve", Some("griefing")).await.unwrap();
        client.players().unban("s1", "Steve").await.unwrap();
    }

    #[tokio::test]
    async fn list_decodes_last_seen() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/servers/s1/players"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "Steve", "online": true },
                { "name": "Alex", "online": false, "banned": true, "lastSeen": "2024-03-01T12:00:00Z" }
            ])))
            .mount(&mock)
            .await;

        let client = client_for(&mock);
        let players = client.players().list("s1").await.unwrap();

        assert!(players[0].online);
        assert!(players[1].banned);
        assert!(players[1].last_seen.is_some());
    }
}
