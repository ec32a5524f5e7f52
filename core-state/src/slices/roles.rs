//! Role and permission slice (admin dashboard).

use core_runtime::events::{CatalogEvent, CoreEvent, EntityKind};
use provider_backend::types::{Listing, Permission, Role, RoleDraft};
use tokio::sync::RwLock;
use tracing::instrument;

use super::{settle_err, settle_ok, SliceContext};
use crate::effects::Notice;
use crate::error::Result;
use crate::request::RequestState;

/// Request-state slice for roles and permissions.
///
/// Everything here is admin-only on the backend; the slice still gates on a
/// token locally like every other mutation, and the backend enforces the
/// role.
pub struct RolesSlice {
    ctx: SliceContext,
    roles: RwLock<RequestState<Listing<Role>>>,
    permissions: RwLock<RequestState<Vec<Permission>>>,
}

impl RolesSlice {
    pub(crate) fn new(ctx: SliceContext) -> Self {
        Self {
            ctx,
            roles: RwLock::new(RequestState::default()),
            permissions: RwLock::new(RequestState::default()),
        }
    }

    pub async fn roles_snapshot(&self) -> RequestState<Listing<Role>> {
        self.roles.read().await.clone()
    }

    pub async fn permissions_snapshot(&self) -> RequestState<Vec<Permission>> {
        self.permissions.read().await.clone()
    }

    #[instrument(skip(self))]
    pub async fn fetch_roles(&self) -> Result<()> {
        let ticket = self.roles.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.roles,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to load roles.",
                )
                .await)
            }
        };

        match self.ctx.backend.list_roles(token.as_str()).await {
            Ok(listing) => {
                settle_ok(&self.roles, &self.ctx.effects, ticket, listing, None, None).await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.roles,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load roles.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_role(&self, draft: RoleDraft) -> Result<Role> {
        let ticket = self.roles.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.roles,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to create the role.",
                )
                .await)
            }
        };

        match self.ctx.backend.create_role(token.as_str(), &draft).await {
            Ok(role) => {
                let mut listing = self.roles.read().await.data().clone();
                listing.items.push(role.clone());
                listing.total += 1;

                settle_ok(
                    &self.roles,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Role created")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityCreated {
                        kind: EntityKind::Role,
                        id: role.id,
                    })),
                )
                .await;

                Ok(role)
            }
            Err(e) => Err(settle_err(
                &self.roles,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to create the role.",
            )
            .await),
        }
    }

    #[instrument(skip(self, draft))]
    pub async fn update_role(&self, id: u64, draft: RoleDraft) -> Result<Role> {
        let ticket = self.roles.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.roles,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to update the role.",
                )
                .await)
            }
        };

        match self.ctx.backend.update_role(token.as_str(), id, &draft).await {
            Ok(updated) => {
                let mut listing = self.roles.read().await.data().clone();
                if let Some(slot) = listing.items.iter_mut().find(|r| r.id == id) {
                    *slot = updated.clone();
                }

                settle_ok(
                    &self.roles,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Role updated")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityUpdated {
                        kind: EntityKind::Role,
                        id,
                    })),
                )
                .await;

                Ok(updated)
            }
            Err(e) => Err(settle_err(
                &self.roles,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to update the role.",
            )
            .await),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_role(&self, id: u64) -> Result<()> {
        let ticket = self.roles.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.roles,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to delete the role.",
                )
                .await)
            }
        };

        match self.ctx.backend.delete_role(token.as_str(), id).await {
            Ok(()) => {
                let mut listing = self.roles.read().await.data().clone();
                listing.items.retain(|r| r.id != id);
                listing.total = listing.total.saturating_sub(1);

                settle_ok(
                    &self.roles,
                    &self.ctx.effects,
                    ticket,
                    listing,
                    Some(Notice::success("Role deleted")),
                    Some(CoreEvent::Catalog(CatalogEvent::EntityDeleted {
                        kind: EntityKind::Role,
                        id,
                    })),
                )
                .await;

                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.roles,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to delete the role.",
            )
            .await),
        }
    }

    #[instrument(skip(self))]
    pub async fn fetch_permissions(&self) -> Result<()> {
        let ticket = self.permissions.write().await.begin();

        let token = match self.ctx.require_token().await {
            Ok(token) => token,
            Err(e) => {
                return Err(settle_err(
                    &self.permissions,
                    &self.ctx.effects,
                    ticket,
                    e,
                    "Unable to load permissions.",
                )
                .await)
            }
        };

        match self.ctx.backend.list_permissions(token.as_str()).await {
            Ok(permissions) => {
                settle_ok(
                    &self.permissions,
                    &self.ctx.effects,
                    ticket,
                    permissions,
                    None,
                    None,
                )
                .await;
                Ok(())
            }
            Err(e) => Err(settle_err(
                &self.permissions,
                &self.ctx.effects,
                ticket,
                e.into(),
                "Unable to load permissions.",
            )
            .await),
        }
    }
}
