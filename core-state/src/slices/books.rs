//! Book slice.

use core_runtime::events::{CatalogEvent, CoreEvent, EntityKind};
use provider_backend::types::{Book, BookDraft, Listing};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for the book collection.
pub struct BooksSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Listing<Book>>>,
}

impl BooksSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    pub async fn snapshot(&self) -> RequestState<Listing<Book>> {
        self.state.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<()> {
        let ticket = self.state.write().await.begin();

        match self.ctx.backend.list_books().await {
            Ok(listing) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load books.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: BookDraft) -> Result<Book> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to create the book.",
                )
                .await)
            }
        };

        match self.ctx.backend.create_book(token.as_str(), &draft).await {
            Ok(book) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.push(book.clone());
                listing.total += 1;

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Book created")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityCreated {
                        kind: EntityKind::Book,
                        id: book.id,
                    })),
                )
                .await;

                Ok(book)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to create the book.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: u64, draft: BookDraft) -> Result<Book> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update the book.",
                )
                .await)
            }
        };

        match self.ctx.backend.update_book(token.as_str(), id, &draft).await {
            Ok(updated) => {
                let mut listing = self.state.read().await.data().clone();
                if let Some(slot) = listing.items.iter_mut().find(|b| b.id == id) {
                    *slot = updated.clone();
                }

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Book updated")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityUpdated {
                        kind: EntityKind::Book,
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
                "Unable to update the book.",
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
                    "Unable to delete the book.",
                )
                .await)
            }
        };

        match self.ctx.backend.delete_book(token.as_str(), id).await {
            Ok(()) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.retain(|b| b.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Book deleted")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityDeleted {
                        kind: EntityKind::Book,
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
                "Unable to delete the book.",
            )
            .await),
        }
    }
}
