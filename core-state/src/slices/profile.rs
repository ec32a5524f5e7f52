//! Profile slice.

use bytes::Bytes;
use provider_backend::types::{ProfileUpdate, UserProfile};
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::{RequestState, Ticket};

/// Request-state slice for the signed-in user's profile.
///
/// Successful reads and updates are mirrored into the session manager so
/// the persisted user record stays in step with the backend.
pub struct ProfileSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Option<UserProfile>>>,
}

impl ProfileSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    pub async fn snapshot(&self) -> RequestState<Option<UserProfile>> {
        self.state.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<()> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to load your profile.",
                )
                .await)
            }
        };

        match self.ctx.backend.fetch_profile(token.as_str()).await {
            Ok(profile) => {
                self.sync_session(&profile).await;
                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    Some(profile),
                    None,
                    None,
                )
                .await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load your profile.",
            )
            .await),
        }
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, update: ProfileUpdate) -> Result<UserProfile> {
        let ticket = self.state.write().await.begin();
        self.update_inner(ticket, update).await
    }

    /// Update the profile with a new avatar image.
    ///
    /// The image is uploaded first; the durable URL replaces `avatar_url`
    /// in the update before submission.
    #[instrument(skip(self, update, avatar), fields(bytes = avatar.len()))]
    pub async fn update_with_avatar(
        &self,
        mut update: ProfileUpdate,
        avatar: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<UserProfile> {
        let ticket = self.state.write().await.begin();

        let uploader = match self.ctx.media() {
            Ok(uploader) => uploader,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to upload the avatar image.",
                )
                .await)
            }
        };

        match uploader.upload(avatar, filename, content_type).await {
            Ok(asset) => update.avatar_url = Some(asset.url),
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e.into(),
                    "Unable to upload the avatar image.",
                )
                .await)
            }
        }

        self.update_inner(ticket, update).await
    }

    async fn update_inner(&self, ticket: Ticket, update: ProfileUpdate) -> Result<UserProfile> {
        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update your profile.",
                )
                .await)
            }
        };

        match self.ctx.backend.update_profile(token.as_str(), &update).await {
            Ok(profile) => {
                self.sync_session(&profile).await;

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    Some(profile.clone()),
                    Some(Notice::success("Profile updated")),
                    None,
                )
                .await;

                Ok(profile)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to update your profile.",
            )
            .await),
        }
    }

    /// Mirror a fresh backend record into the session.
    ///
    /// A session that vanished mid-flight (logout race) is not an error for
    /// the profile dispatch itself.
    async fn sync_session(&self, profile: &UserProfile) {
        if let Err(e) = self.ctx.session.replace_user(profile.clone()).await {
            warn!(error = %e, "Could not mirror profile into session");
        }
    }
}
