//! Notification slice.

use core_runtime::events::{CommerceEvent, CoreEvent};
use provider_backend::types::{Listing, Notification, NotificationStatus};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for the authenticated user's notifications.
pub struct NotificationsSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Listing<Notification>>>,
}

impl NotificationsSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    pub async fn snapshot(&self) -> RequestState<Listing<Notification>> {
        self.state.read().await.clone()
    }

    /// Count of unread notifications in the current payload.
    pub async fn unread_count(&self) -> usize {
        self.state
            .read()
            .await
            .data()
            .items
            .iter()
            .filter(|n| n.status == NotificationStatus::Unread)
            .count()
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
                    "Unable to load notifications.",
                )
                .await)
            }
        };

        match self.ctx.backend.fetch_notifications(token.as_str()).await {
            Ok(listing) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load notifications.",
            )
            .await),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> Result<()> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to delete the notification.",
                )
                .await)
            }
        };

        match self
            .ctx
            .backend
            .delete_notification(token.as_str(), id)
            .await
        {
            Ok(()) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.retain(|n| n.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Notification deleted")),
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
                "Unable to delete the notification.",
            )
            .await),
        }
    }

    /// Mark every unread notification read in one bulk update.
    ///
    /// With nothing unread this is a local no-op. Returns how many
    /// notifications were included in the update.
    #[instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<usize> {
        let unread_ids: Vec<u64> = self
            .state
            .read()
            .await
            .data()
            .items
            .iter()
            .filter(|n| n.status == NotificationStatus::Unread)
            .map(|n| n.id)
            .collect();

        if unread_ids.is_empty() {
            return Ok(0);
        }

        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update notifications.",
                )
                .await)
            }
        };

        match self
            .ctx
            .backend
            .mark_notifications_read(token.as_str(), &unread_ids)
            .await
        {
            Ok(listing) => {
                let count = unread_ids.len();

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    None,
                    Some(CoreEvent::Commerce(
                        CommerceEvent::NotificationsMarkedRead { count },
                    )),
                )
                .await;

                Ok(count)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to update notifications.",
            )
            .await),
        }
    }
}
