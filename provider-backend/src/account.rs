//! Account endpoints: login, registration, profile.

use tracing::{info, instrument};

use crate::client::BackendClient;
use crate::error::Result;
use crate::types::{AuthResponse, Credentials, ProfileUpdate, Registration, UserProfile};

impl BackendClient {
    /// Exchange credentials for a bearer token and user record.
    ///
    /// Invalid credentials come back as a 4xx with the server's message in
    /// the error envelope; the caller surfaces that message verbatim.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response: AuthResponse = self.post_json("/users/login", None, credentials).await?;
        info!(user_id = response.user.id, role = %response.user.role, "Login succeeded");
        Ok(response)
    }

    /// Create an account. On success the backend signs the user in directly,
    /// returning the same payload as `login`.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let response: AuthResponse = self
            .post_json("/users/register", None, registration)
            .await?;
        info!(user_id = response.user.id, "Registration succeeded");
        Ok(response)
    }

    #[instrument(skip(self, token))]
    pub async fn fetch_profile(&self, token: &str) -> Result<UserProfile> {
        self.get_json("/users/profile", Some(token)).await
    }

    #[instrument(skip(self, token, update))]
    pub async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> Result<UserProfile> {
        self.put_json("/users/profile", Some(token), update).await
    }
}
