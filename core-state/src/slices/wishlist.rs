//! Wishlist slice.

use core_runtime::events::{CommerceEvent, CoreEvent};
use provider_backend::types::{WishlistAdd, WishlistPayload};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for the authenticated user's wishlist.
///
/// The wishlist and the cart are independent lists; nothing reconciles
/// them.
pub struct WishlistSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<WishlistPayload>>,
}

impl WishlistSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    pub async fn snapshot(&self) -> RequestState<WishlistPayload> {
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
                    "Unable to load your wishlist.",
                )
                .await)
            }
        };

        match self.ctx.backend.fetch_wishlist(token.as_str()).await {
            Ok(wishlist) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, wishlist, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load your wishlist.",
            )
            .await),
        }
    }

    /// Add a product to the wishlist.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: u64) -> Result<()> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to add to your wishlist.",
                )
                .await)
            }
        };

        let item = WishlistAdd { product_id };

        match self
            .ctx
            .backend
            .add_wishlist_item(token.as_str(), &item)
            .await
        {
            Ok(wishlist) => {
                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    wishlist,
                    Some(Notice::success("Added to wishlist")),
                    Some(CoreEvent::Commerce(CommerceEvent::WishlistItemAdded {
                        product_id,
                    })),
                )
                .await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to add to your wishlist.",
            )
            .await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, ScriptedHttpClient};
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_add_and_fetch() {
        let http = ScriptedHttpClient::new(vec![
            (200, r#"{"items": [{"productId": 8, "userId": 9}]}"#),
            (200, r#"{"items": [{"productId": 8, "userId": 9}]}"#),
        ]);
        let (ctx, _bus) = context(http, true).await;
        let slice = WishlistSlice::new(ctx);

        slice.add(8).await.unwrap();
        assert_eq!(slice.snapshot().await.data().items.len(), 1);

        slice.fetch().await.unwrap();
        assert_eq!(slice.snapshot().await.data().items[0].product_id, 8);
    }

    #[tokio::test]
    async fn test_add_without_token_rejects_locally() {
        let http = ScriptedHttpClient::new(vec![]);
        let (ctx, _bus) = context(http.clone(), false).await;
        let slice = WishlistSlice::new(ctx);

        let error = slice.add(8).await.unwrap_err();
        assert!(matches!(error, StoreError::NotAuthenticated));
        assert_eq!(http.call_count(), 0);
    }
}
