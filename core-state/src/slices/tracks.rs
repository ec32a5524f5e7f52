//! Track slice.

use bytes::Bytes;
use core_runtime::events::{CatalogEvent, CoreEvent, EntityKind};
use provider_backend::types::{Listing, Track, TrackDraft};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::{RequestState, Ticket};

/// Request-state slice for the track collection.
///
/// Tracks reference their audio asset by URL; `create_with_audio` uploads
/// the file to the media endpoint first and submits the returned URL.
pub struct TracksSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<Listing<Track>>>,
}

impl TracksSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
        }
    }

    pub async fn snapshot(&self) -> RequestState<Listing<Track>> {
        self.state.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<()> {
        let ticket = self.state.write().await.begin();

        match self.ctx.backend.list_tracks().await {
            Ok(listing) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load tracks.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: TrackDraft) -> Result<Track> {
        let ticket = self.state.write().await.begin();
        self.create_inner(ticket, draft).await
    }

    /// Create a track with its audio file.
    ///
    /// The audio is uploaded first; the durable URL replaces `audio_url` in
    /// the draft before submission.
    #[instrument(skip(self, draft, audio), fields(title = %draft.title, bytes = audio.len()))]
    pub async fn create_with_audio(
        &self,
        mut draft: TrackDraft,
        audio: Bytes,
        filename: &str,
        content_type: &str,
    ) -> Result<Track> {
        let ticket = self.state.write().await.begin();

        let uploader = match self.ctx.media() {
            Ok(uploader) => uploader,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to upload the audio file.",
                )
                .await)
            }
        };

        match uploader.upload(audio, filename, content_type).await {
            Ok(asset) => draft.audio_url = Some(asset.url),
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e.into(),
                    "Unable to upload the audio file.",
                )
                .await)
            }
        }

        self.create_inner(ticket, draft).await
    }

    async fn create_inner(&self, ticket: Ticket, draft: TrackDraft) -> Result<Track> {
        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to create the track.",
                )
                .await)
            }
        };

        match self.ctx.backend.create_track(token.as_str(), &draft).await {
            Ok(track) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.push(track.clone());
                listing.total += 1;

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Track created")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityCreated {
                        kind: EntityKind::Track,
                        id: track.id,
                    })),
                )
                .await;

                Ok(track)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to create the track.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft))]
    pub async fn update(&self, id: u64, draft: TrackDraft) -> Result<Track> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update the track.",
                )
                .await)
            }
        };

        match self.ctx.backend.update_track(token.as_str(), id, &draft).await {
            Ok(updated) => {
                let mut listing = self.state.read().await.data().clone();
                if let Some(slot) = listing.items.iter_mut().find(|t| t.id == id) {
                    *slot = updated.clone();
                }

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Track updated")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityUpdated {
                        kind: EntityKind::Track,
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
                "Unable to update the track.",
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
                    "Unable to delete the track.",
                )
                .await)
            }
        };

        match self.ctx.backend.delete_track(token.as_str(), id).await {
            Ok(()) => {
                let mut listing = self.state.read().await.data().clone();
                listing.items.retain(|t| t.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Track deleted")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityDeleted {
                        kind: EntityKind::Track,
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
                "Unable to delete the track.",
            )
            .await),
        }
    }
}
