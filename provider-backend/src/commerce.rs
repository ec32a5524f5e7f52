//! Commerce endpoints: cart, wishlist, notifications.
//!
//! Every operation here acts on the authenticated user's own data, so all of
//! them require a bearer token. Responses replace the local payload wholesale.

use tracing::{info, instrument};

use crate::client::BackendClient;
use crate::error::Result;
use crate::types::{
    CartAdd, CartPayload, Listing, Notification, NotificationListResponse, NotificationStatus,
    NotificationStatusUpdate, WishlistAdd, WishlistPayload,
};

impl BackendClient {
    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    #[instrument(skip(self, token))]
    pub async fn fetch_cart(&self, token: &str) -> Result<CartPayload> {
        self.get_json("/cart", Some(token)).await
    }

    /// Add a product to the cart. The response is the full updated cart.
    #[instrument(skip(self, token), fields(product_id = item.product_id, quantity = item.quantity))]
    pub async fn add_cart_item(&self, token: &str, item: &CartAdd) -> Result<CartPayload> {
        let cart: CartPayload = self.post_json("/cart", Some(token), item).await?;
        info!(items = cart.items.len(), "Cart updated");
        Ok(cart)
    }

    /// Replace the quantity of one cart line. The response is the full
    /// updated cart.
    #[instrument(skip(self, token))]
    pub async fn set_cart_quantity(
        &self,
        token: &str,
        product_id: u64,
        quantity: u32,
    ) -> Result<CartPayload> {
        let body = CartAdd {
            product_id,
            quantity,
        };
        self.put_json(&format!("/cart/{}", product_id), Some(token), &body)
            .await
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    #[instrument(skip(self, token))]
    pub async fn fetch_wishlist(&self, token: &str) -> Result<WishlistPayload> {
        self.get_json("/wishlist", Some(token)).await
    }

    /// Add a product to the wishlist. The response is the full updated
    /// wishlist.
    #[instrument(skip(self, token), fields(product_id = item.product_id))]
    pub async fn add_wishlist_item(
        &self,
        token: &str,
        item: &WishlistAdd,
    ) -> Result<WishlistPayload> {
        self.post_json("/wishlist", Some(token), item).await
    }

    // -------------------------------------------------------------------------
    // Notifications
    // -------------------------------------------------------------------------

    #[instrument(skip(self, token))]
    pub async fn fetch_notifications(&self, token: &str) -> Result<Listing<Notification>> {
        let response: NotificationListResponse = self.get_json("/notifications", Some(token)).await?;
        info!(count = response.notifications.len(), "Listed notifications");
        Ok(Listing::new(
            response.notifications,
            response.total_notifications,
        ))
    }

    #[instrument(skip(self, token))]
    pub async fn delete_notification(&self, token: &str, id: u64) -> Result<()> {
        self.delete(&format!("/notifications/{}", id), Some(token))
            .await
    }

    /// Bulk status update. The response is the full refreshed notification
    /// list.
    #[instrument(skip(self, token), fields(count = ids.len()))]
    pub async fn mark_notifications_read(
        &self,
        token: &str,
        ids: &[u64],
    ) -> Result<Listing<Notification>> {
        let body = NotificationStatusUpdate {
            ids: ids.to_vec(),
            status: NotificationStatus::Read,
        };

        let response: NotificationListResponse = self
            .put_json("/notifications/status", Some(token), &body)
            .await?;
        Ok(Listing::new(
            response.notifications,
            response.total_notifications,
        ))
    }
}
