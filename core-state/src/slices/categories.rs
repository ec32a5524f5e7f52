//! Category slice.

use core_runtime::events::{CatalogEvent, CoreEvent, EntityKind};
use provider_backend::types::{Category, CategoryDraft, Listing};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for the category collection.
///
/// Reads are public; every mutation asks the session for a token first and
/// rejects locally when none is present. Mutations settle by replacing the
/// whole in-memory list, locating the affected row with a linear scan.
pub struct CategoriesSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Listing<Category>>>,
}

impl CategoriesSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    /// A point-in-time copy of the slice state for rendering.
    pub async fn snapshot(&self) -> RequestState<Listing<Category>> {
        self.state.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<()> {
        let ticket = self.state.write().await.begin();

        match self.ctx.backend.list_categories().await {
            Ok(listing) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load categories.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: CategoryDraft) -> Result<Category> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to create the category.",
                )
                .await)
            }
        };

        match self.ctx.backend.create_category(token.as_str(), &draft).await {
            Ok(category) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.push(category.clone());
                listing.total += 1;

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Category created")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityCreated {
                        kind: EntityKind::Category,
                        id: category.id,
                    })),
                )
                .await;

                Ok(category)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to create the category.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: u64, draft: CategoryDraft) -> Result<Category> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update the category.",
                )
                .await)
            }
        };

        match self
            .ctx
            .backend
            .update_category(token.as_str(), id, &draft)
            .await
        {
            Ok(updated) => {
                let mut listing = self.state.read().await.data().clone();
                if let Some(slot) = listing.items.iter_mut().find(|c| c.id == id) {
                    *slot = updated.clone();
                }

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Category updated")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityUpdated {
                        kind: EntityKind::Category,
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
                "Unable to update the category.",
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
                    "Unable to delete the category.",
                )
                .await)
            }
        };

        match self.ctx.backend.delete_category(token.as_str(), id).await {
            Ok(()) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.retain(|c| c.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Category deleted")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityDeleted {
                        kind: EntityKind::Category,
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
                "Unable to delete the category.",
            )
            .await),
        }
    }
}
