//! Admin endpoints: roles and permissions.

use tracing::instrument;

use crate::client::BackendClient;
use crate::error::Result;
use crate::types::{
    Listing, Permission, PermissionListResponse, Role, RoleDraft, RoleListResponse,
};

impl BackendClient {
    #[instrument(skip(self, token))]
    pub async fn list_roles(&self, token: &str) -> Result<Listing<Role>> {
        let response: RoleListResponse = self.get_json("/roles", Some(token)).await?;
        Ok(Listing::new(response.roles, response.total_roles))
    }

    #[instrument(skip(self, token, draft), fields(name = %draft.name))]
    pub async fn create_role(&self, token: &str, draft: &RoleDraft) -> Result<Role> {
        self.post_json("/roles", Some(token), draft).await
    }

    #[instrument(skip(self, token, draft))]
    pub async fn update_role(&self, token: &str, id: u64, draft: &RoleDraft) -> Result<Role> {
        self.put_json(&format!("/roles/{}", id), Some(token), draft)
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn delete_role(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/roles/{}", id), Some(token)).await
    }

    #[instrument(skip(self, token))]
    pub async fn list_permissions(&self, token: &str) -> Result<Vec<Permission>> {
        let response: PermissionListResponse = self.get_json("/permissions", Some(token)).await?;
        Ok(response.permissions)
    }
}

#[cfg(test)]
mod tests {
    use crate::client::test_support::{json_response, MockHttpClient};
    use crate::client::BackendClient;
    use crate::types::RoleDraft;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_list_roles() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/roles"));
            assert!(req.headers.contains_key("Authorization"));

            Ok(json_response(
                200,
                r#"{
                    "roles": [
                        {"id": 1, "name": "moderator", "permissions": ["catalog.edit"]}
                    ],
                    "totalRoles": 1
                }"#,
            ))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        let listing = client.list_roles("tok").await.unwrap();

        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].permissions, vec!["catalog.edit"]);
    }

    #[tokio::test]
    async fn test_create_role() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            let body = req.body.expect("body present");
            let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(value["name"], "support");

            Ok(json_response(
                200,
                r#"{"id": 2, "name": "support", "permissions": []}"#,
            ))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        let role = client
            .create_role(
                "tok",
                &RoleDraft {
                    name: "support".to_string(),
                    permissions: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(role.id, 2);
    }

    #[tokio::test]
    async fn test_list_permissions() {
        let mut mock_http = MockHttpClient::new();

        mock_http.expect_execute().times(1).returning(|req| {
            assert!(req.url.ends_with("/permissions"));
            Ok(json_response(
                200,
                r#"{"permissions": [{"id": 1, "name": "catalog.edit"}]}"#,
            ))
        });

        let client = BackendClient::new(Arc::new(mock_http), "https://api.shop.example.com");
        let permissions = client.list_permissions("tok").await.unwrap();

        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].name, "catalog.edit");
    }
}
