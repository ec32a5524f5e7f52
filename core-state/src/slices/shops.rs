//! Shop slice.

use core_runtime::events::{CatalogEvent, CoreEvent, EntityKind};
use provider_backend::types::{Listing, Shop, ShopDraft};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for the shop collection.
pub struct ShopsSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Listing<Shop>>>,
}

impl ShopsSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    pub async fn snapshot(&self) -> RequestState<Listing<Shop>> {
        self.state.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<()> {
        let ticket = self.state.write().await.begin();

        match self.ctx.backend.list_shops().await {
            Ok(listing) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load shops.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: ShopDraft) -> Result<Shop> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to create the shop.",
                )
                .await)
            }
        };

        match self.ctx.backend.create_shop(token.as_str(), &draft).await {
            Ok(shop) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.push(shop.clone());
                listing.total += 1;

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Shop created")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityCreated {
                        kind: EntityKind::Shop,
                        id: shop.id,
                    })),
                )
                .await;

                Ok(shop)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to create the shop.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: u64, draft: ShopDraft) -> Result<Shop> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update the shop.",
                )
                .await)
            }
        };

        match self.ctx.backend.update_shop(token.as_str(), id, &draft).await {
            Ok(updated) => {
                let mut listing = self.state.read().await.data().clone();
                if let Some(slot) = listing.items.iter_mut().find(|s| s.id == id) {
                    *slot = updated.clone();
                }

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Shop updated")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityUpdated {
                        kind: EntityKind::Shop,
                        id,
                    })),
                )
                .await;

                Ok(updated)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to update the shop.",
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
                    "Unable to delete the shop.",
                )
                .await)
            }
        };

        match self.ctx.backend.delete_shop(token.as_str(), id).await {
            Ok(()) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.retain(|s| s.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Shop deleted")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityDeleted {
                        kind: EntityKind::Shop,
                        id,
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
                "Unable to delete the shop.",
            )
            .await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, ScriptedHttpClient};
    use super::*;

    #[tokio::test]
    async fn test_fetch_shops() {
        let http = ScriptedHttpClient::new(vec![(
            200,
            r#"{"shops": [{"id": 1, "name": "Voss Records", "ownerId": 9}], "totalShops": 1}"#,
        )]);
        let (ctx, _bus) = context(http, false).await;
        let slice = ShopsSlice::new(ctx);

        slice.fetch().await.unwrap();

        let snapshot = slice.snapshot().await;
        assert_eq!(snapshot.data().items[0].name, "Voss Records");
        assert_eq!(snapshot.data().items[0].owner_id, 9);
    }
}
