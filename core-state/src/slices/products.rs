//! Product slice.

use core_runtime::events::{CatalogEvent, CoreEvent, EntityKind};
use provider_backend::types::{Listing, Product, ProductDraft};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for the product collection.
///
/// `fetch` optionally narrows server-side by a search term; the finer
/// filtering, sorting, and paging of dashboard tables stays in
/// [`views`](crate::views), derived from this slice's full list.
pub struct ProductsSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Listing<Product>>>,
}

impl ProductsSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    pub async fn snapshot(&self) -> RequestState<Listing<Product>> {
        self.state.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self, search: Option<&str>) -> Result<()> {
        let ticket = self.state.write().await.begin();

        match self.ctx.backend.list_products(search).await {
            Ok(listing) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load products.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to create the product.",
                )
                .await)
            }
        };

        match self.ctx.backend.create_product(token.as_str(), &draft).await {
            Ok(product) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.push(product.clone());
                listing.total += 1;

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Product created")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityCreated {
                        kind: EntityKind::Product,
                        id: product.id,
                    })),
                )
                .await;

                Ok(product)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to create the product.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: u64, draft: ProductDraft) -> Result<Product> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update the product.",
                )
                .await)
            }
        };

        match self
            .ctx
            .backend
            .update_product(token.as_str(), id, &draft)
            .await
        {
            Ok(updated) => {
                let mut listing = self.state.read().await.data().clone();
                if let Some(slot) = listing.items.iter_mut().find(|p| p.id == id) {
                    *slot = updated.clone();
                }

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Product updated")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityUpdated {
                        kind: EntityKind::Product,
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
                "Unable to update the product.",
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
                    "Unable to delete the product.",
                )
                .await)
            }
        };

        match self.ctx.backend.delete_product(token.as_str(), id).await {
            Ok(()) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.retain(|p| p.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Product deleted")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityDeleted {
                        kind: EntityKind::Product,
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
                "Unable to delete the product.",
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
    async fn test_fetch_with_search_term() {
        let http = ScriptedHttpClient::new(vec![(
            200,
            r#"{"products": [{"id": 5, "name": "Blue Vinyl", "price": 18.0}], "totalProducts": 1}"#,
        )]);
        let (ctx, _bus) = context(http.clone(), false).await;
        let slice = ProductsSlice::new(ctx);

        slice.fetch(Some("blue")).await.unwrap();

        let requests = http.requests();
        assert!(requests[0].url.ends_with("/products?search=blue"));

        let snapshot = slice.snapshot().await;
        assert_eq!(snapshot.data().items.len(), 1);
    }

    #[tokio::test]
    async fn test_consecutive_fetches_latest_wins() {
        // Two dispatches settle in order; the second one's payload is the
        // final state (stale-ticket dropping is pinned in request.rs).
        let http = ScriptedHttpClient::new(vec![
            (200, r#"{"products": [], "totalProducts": 0}"#),
            (
                200,
                r#"{"products": [{"id": 5, "name": "Blue Vinyl", "price": 18.0}], "totalProducts": 1}"#,
            ),
        ]);
        let (ctx, _bus) = context(http, false).await;
        let slice = ProductsSlice::new(ctx);

        let (first, second) = tokio::join!(slice.fetch(None), slice.fetch(Some("blue")));
        first.unwrap();
        second.unwrap();

        let snapshot = slice.snapshot().await;
        assert_eq!(snapshot.data().total, 1, "latest dispatch must win");
    }
}
