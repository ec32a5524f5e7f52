//! Cart slice.

use core_runtime::events::{CommerceEvent, CoreEvent};
use provider_backend::types::{CartAdd, CartPayload};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Delay applied to quantity edits before they are sent.
///
/// Rapid edits to the same line supersede each other during this window;
/// only the newest one dispatches.
const QUANTITY_DEBOUNCE: Duration = Duration::from_millis(400);

/// Request-state slice for the authenticated user's cart.
///
/// Every operation requires a bearer token. The backend returns the full
/// cart on every change and the local payload is replaced wholesale.
pub struct CartSlice {
    ctx: SliceContext,
    state: RwLock<RequestState<CartPayload>>,
    /// Latest quantity-edit sequence per product line
    pending_edits: StdMutex<HashMap<u64, u64>>,
    edit_seq: AtomicU64,
}

impl CartSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(RequestState::default()),
            pending_edits: StdMutex::new(HashMap::new()),
            edit_seq: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> RequestState<CartPayload> {
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
                    "Unable to load your cart.",
                )
                .await)
            }
        };

        match self.ctx.backend.fetch_cart(token.as_str()).await {
            Ok(cart) => {
                settle_ok(&self.state, &self.ctx.effects, ticket, cart, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load your cart.",
            )
            .await),
        }
    }

    /// Add a product to the cart.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: u64, quantity: u32) -> Result<()> {
        let ticket = self.state.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to add to your cart.",
                )
                .await)
            }
        };

        let item = CartAdd {
            product_id,
            quantity,
        };

        match self.ctx.backend.add_cart_item(token.as_str(), &item).await {
            Ok(cart) => {
                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    cart,
                    Some(Notice::success("Added to cart")),
                    Some(CoreEvent::Commerce(CommerceEvent::CartItemAdded {
                        product_id,
                        quantity,
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
                "Unable to add to your cart.",
            )
            .await),
        }
    }

    /// Change a line's quantity, debounced.
    ///
    /// Waits [`QUANTITY_DEBOUNCE`] before sending; if another edit for the
    /// same product arrives during the window, this one is dropped without
    /// a request. Returns `true` when the edit was actually dispatched.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, product_id: u64, quantity: u32) -> Result<bool> {
        let seq = self.edit_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending_edits
            .lock()
            .expect("pending edits lock")
            .insert(product_id, seq);

        tokio::time::sleep(QUANTITY_DEBOUNCE).await;

        let still_latest = {
            let edits = self.pending_edits.lock().expect("pending edits lock");
            edits.get(&product_id) == Some(&seq)
        };
        if !still_latest {
            debug!(product_id, "Superseded quantity edit dropped");
            return Ok(false);
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
                    "Unable to update your cart.",
                )
                .await)
            }
        };

        match self
            .ctx
            .backend
            .set_cart_quantity(token.as_str(), product_id, quantity)
            .await
        {
            Ok(cart) => {
                settle_ok(
                    &self.state,
                    &self.ctx.effects,
                    ticket,
                    cart,
                    None,
                    Some(CoreEvent::Commerce(CommerceEvent::CartQuantityChanged {
                        product_id,
                        quantity,
                    })),
                )
                .await;
                Ok(true)
            }
            Err(e) => Err(settle_err(
                &self.state,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to update your cart.",
            )
            .await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{context, drain, ScriptedHttpClient};
    use super::*;
    use crate::error::StoreError;
    use crate::request::RequestPhase;
    use core_runtime::events::NoticeEvent;

    #[tokio::test]
    async fn test_add_item_scenario() {
        let http = ScriptedHttpClient::new(vec![(
            200,
            r#"{"items": [{"productId": 5, "quantity": 2, "userId": 9}]}"#,
        )]);
        let (ctx, bus) = context(http, true).await;
        let mut events = bus.subscribe();
        let slice = CartSlice::new(ctx);

        slice.add(5, 2).await.unwrap();

        // Exactly one entry with the requested product and quantity
        let snapshot = slice.snapshot().await;
        assert_eq!(snapshot.phase(), RequestPhase::Fulfilled);
        assert_eq!(snapshot.data().items.len(), 1);
        assert_eq!(snapshot.data().items[0].product_id, 5);
        assert_eq!(snapshot.data().items[0].quantity, 2);
        assert_eq!(snapshot.data().items[0].user_id, 9);

        let emitted = drain(&mut events);
        assert!(emitted.iter().any(|e| matches!(
            e,
            CoreEvent::Notice(NoticeEvent::Success { message }) if message == "Added to cart"
        )));
        assert!(emitted.iter().any(|e| matches!(
            e,
            CoreEvent::Commerce(CommerceEvent::CartItemAdded {
                product_id: 5,
                quantity: 2,
            })
        )));
    }

    #[tokio::test]
    async fn test_add_without_token_rejects_locally() {
        let http = ScriptedHttpClient::new(vec![]);
        let (ctx, _bus) = context(http.clone(), false).await;
        let slice = CartSlice::new(ctx);

        let error = slice.add(5, 2).await.unwrap_err();
        assert!(matches!(error, StoreError::NotAuthenticated));

        // No network call, no data
        assert_eq!(http.call_count(), 0);
        assert!(slice.snapshot().await.data().items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_quantity_edit_is_dropped() {
        // Only one response: exactly one edit may reach the backend
        let http = ScriptedHttpClient::new(vec![(
            200,
            r#"{"items": [{"productId": 5, "quantity": 4, "userId": 9}]}"#,
        )]);
        let (ctx, _bus) = context(http.clone(), true).await;
        let slice = CartSlice::new(ctx);

        let (first, second) = tokio::join!(slice.set_quantity(5, 3), slice.set_quantity(5, 4));

        assert!(!first.unwrap(), "first edit must be superseded");
        assert!(second.unwrap(), "second edit must dispatch");
        assert_eq!(http.call_count(), 1);

        let snapshot = slice.snapshot().await;
        assert_eq!(snapshot.data().items[0].quantity, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_to_different_lines_both_dispatch() {
        let http = ScriptedHttpClient::new(vec![
            (200, r#"{"items": [{"productId": 5, "quantity": 3, "userId": 9}]}"#),
            (
                200,
                r#"{"items": [
                    {"productId": 5, "quantity": 3, "userId": 9},
                    {"productId": 8, "quantity": 1, "userId": 9}
                ]}"#,
            ),
        ]);
        let (ctx, _bus) = context(http.clone(), true).await;
        let slice = CartSlice::new(ctx);

        let (first, second) = tokio::join!(slice.set_quantity(5, 3), slice.set_quantity(8, 1));

        assert!(first.unwrap());
        assert!(second.unwrap());
        assert_eq!(http.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_requires_token() {
        let http = ScriptedHttpClient::new(vec![]);
        let (ctx, _bus) = context(http.clone(), false).await;
        let slice = CartSlice::new(ctx);

        let error = slice.fetch().await.unwrap_err();
        assert!(matches!(error, StoreError::NotAuthenticated));
        assert_eq!(http.call_count(), 0);
    }
}
