//! # Application Store
//!
//! The explicit application-state object: one struct owning every slice,
//! constructed from the injected collaborators and handed to hosts. There
//! is no global store; anything that needs state receives (a reference to)
//! an `AppStore`.

use core_runtime::config::FeatureFlags;
use core_runtime::events::EventBus;
use core_session::SessionManager;
use provider_backend::BackendClient;
use provider_media::MediaUploader;
use std::sync::Arc;

use crate::effects::EffectRunner;
use crate::slices::albums::AlbumsSlice;
use crate::slices::books::BooksSlice;
use crate::slices::cart::CartSlice;
use crate::slices::categories::CategoriesSlice;
use crate::slices::notifications::NotificationsSlice;
use crate::slices::products::ProductsSlice;
use crate::slices::profile::ProfileSlice;
use crate::slices::roles::RolesSlice;
use crate::slices::shops::ShopsSlice;
use crate::slices::tracks::TracksSlice;
use crate::slices::wishlist::WishlistSlice;
use crate::slices::SliceContext;

/// Every request-state slice of the application, behind one handle.
///
/// Slices share the backend connector, the session manager (the
/// authentication gate), the optional media uploader, and the effect runner;
/// beyond that they are independent. The admin slice exists only when the
/// admin surface is enabled.
pub struct AppStore {
    pub albums: AlbumsSlice,
    pub books: BooksSlice,
    pub tracks: TracksSlice,
    pub categories: CategoriesSlice,
    pub products: ProductsSlice,
    pub shops: ShopsSlice,
    pub cart: CartSlice,
    pub wishlist: WishlistSlice,
    pub notifications: NotificationsSlice,
    pub profile: ProfileSlice,
    pub roles: Option<RolesSlice>,
}

impl AppStore {
    /// Assemble the store from its collaborators.
    pub fn new(
        backend: Arc<BackendClient>,
        session: Arc<SessionManager>,
        media: Option<Arc<MediaUploader>>,
        event_bus: EventBus,
        features: FeatureFlags,
    ) -> Self {
        let ctx = SliceContext {
            backend,
            session,
            media,
            effects: EffectRunner::new(event_bus),
        };

        Self {
            albums: AlbumsSlice::new(ctx.clone()),
            books: BooksSlice::new(ctx.clone()),
            tracks: TracksSlice::new(ctx.clone()),
            categories: CategoriesSlice::new(ctx.clone()),
            products: ProductsSlice::new(ctx.clone()),
            shops: ShopsSlice::new(ctx.clone()),
            cart: CartSlice::new(ctx.clone()),
            wishlist: WishlistSlice::new(ctx.clone()),
            notifications: NotificationsSlice::new(ctx.clone()),
            profile: ProfileSlice::new(ctx.clone()),
            roles: features.enable_admin.then(|| RolesSlice::new(ctx)),
        }
    }
}
