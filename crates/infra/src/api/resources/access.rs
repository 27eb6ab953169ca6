//! Users, roles and permissions

use gamepanel_domain::{NewUser, Permission, Role, RoleAssignment, User};
use serde::de::IgnoredAny;
use tracing::{info, instrument};
use urlencoding::encode;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;

/// Role-based access control
#[derive(Clone, Copy)]
pub struct Permissions<'a> {
    client: &'a ApiClient,
}

impl<'a> Permissions<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Every permission key the backend knows about
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Permission>, ApiError> {
        self.client.get("/permissions").await
    }

    #[instrument(skip(self))]
    pub async fn roles(&self) -> Result<Vec<Role>, ApiError> {
        self.client.get("/roles").await
    }

    /// Replace a user's role
    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<(), ApiError> {
        let body = RoleAssignment { role_id: role_id.to_string() };
        self.client.put::<_, IgnoredAny>(&format!("/users/{}/role", encode(user_id)), &body).await?;
        info!("role assigned");
        Ok(())
    }
}

/// Panel user accounts
#[derive(Clone, Copy)]
pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        self.client.get("/users").await
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        self.client.post("/users", user).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/users/{}", encode(id))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::resources::test_support::client_for;

    #[tokio::test]
    async fn assign_role_puts_role_id() {
        let mock = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/users/u2/role"))
            .and(body_json(json!({ "roleId": "moderator" })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock)
            .await;

        let client = client_for(&mock);
        client.permissions().assign_role("u2", "moderator").await.unwrap();
    }

    #[tokio::test]
    async fn create_user_sends_password_once() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(body_json(json!({
                "username": "mod1",
                "password": "correct horse",
                "roleId": "moderator"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "u3",
                "username": "mod1",
                "role": "moderator",
                "createdAt": "2024-03-01T12:00:00Z"
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let client = client_for(&mock);
        let user = NewUser {
            username: "mod1".to_string(),
            email: None,
            password: "correct horse".to_string(),
            role_id: "moderator".to_string(),
        };
        let created = client.users().create(&user).await.unwrap();

        assert_eq!(created.id, "u3");
        assert!(!format!("{user:?}").contains("correct horse"));
    }
}
