//! Album slice.

use bytes::Bytes;
use core_runtime::events::{CatalogEvent, CoreEvent, EntityKind};
use provider_backend::types::{Album, AlbumDraft, Listing};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for the album collection.
///
/// Besides the plain CRUD surface, albums can be created with a cover image:
/// the image goes to the media upload endpoint first and the returned
/// durable URL is substituted into the draft before it reaches the backend.
pub struct AlbumsSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Listing<Album>>>,
}

impl AlbumsSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    /// A point-in-time copy of the slice state for rendering.
    pub async fn snapshot(&self) -> RequestState<Listing<Album>> {
        self.state.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<()> {
        let ticket = self.state.write().await.begin();

        match self.ctx.backend.list_albums().await {
            Ok(listing) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load albums.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: AlbumDraft) -> Result<Album> {
        let ticket = self.state.write().await.begin();
        self.create_inner(ticket, draft).await
    }

    /// Create an album with a cover image.
    ///
    /// The image is uploaded first; its durable URL replaces `cover_url` in
    /// the draft before submission. An upload failure rejects the dispatch
    /// without touching the backend.
    #[instrument(skip(self, draft, cover), fields(title = %draft.title, bytes = cover.len()))]
    pub async fn create_with_cover(
        &self,
        mut draft: AlbumDraft,
        cover: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<Album> {
        let ticket = self.state.write().await.begin();

        let uploader = match self.ctx.media() {
            Ok(uploader) => uploader,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to upload the cover image.",
                )
                .await)
            }
        };

        match uploader.upload(cover, filename, content_type).await {
            Ok(asset) => draft.cover_url = Some(asset.url),
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e.into(),
                    "Unable to upload the cover image.",
                )
                .await)
            }
        }

        self.create_inner(ticket, draft).await
    }

    async fn create_inner(&self, ticket: crate::request::Ticket, draft: AlbumDraft) -> Result<Album> {
        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to create the album.",
                )
                .await)
            }
        };

        match self.ctx.backend.create_album(token.as_str(), &draft).await {
            Ok(album) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.push(album.clone());
                listing.total += 1;

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Album created")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityCreated {
                        kind: EntityKind::Album,
                        id: album.id,
                    })),
                )
                .await;

                Ok(album)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to create the album.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: u64, draft: AlbumDraft) -> Result<Album> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update the album.",
                )
                .await)
            }
        };

        match self.ctx.backend.update_album(token.as_str(), id, &draft).await {
            Ok(updated) => {
                let mut listing = self.state.read().await.data().clone();
                if let Some(slot) = listing.items.iter_mut().find(|a| a.id == id) {
                    *slot = updated.clone();
                }

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Album updated")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityUpdated {
                        kind: EntityKind::Album,
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
                "Unable to update the album.",
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
                    "Unable to delete the album.",
                )
                .await)
            }
        };

        match self.ctx.backend.delete_album(token.as_str(), id).await {
            Ok(()) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.retain(|a| a.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Album deleted")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityDeleted {
                        kind: EntityKind::Album,
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
                "Unable to delete the album.",
            )
            .await),
        }
    }
}
