//! The admin back-office session.

use std::sync::Arc;

use realmgate_gateway::api::{self, TokenGrant};
use realmgate_gateway::{Gateway, GatewayError};
use realmgate_guard::{PermissionCheck, Realm};
use realmgate_protocol::Domain;
use realmgate_session::{AdminIdentity, AdminProfile, SessionCell, SessionError};
use realmgate_transport::HttpTransport;

use crate::RealmgateError;

/// Login, hydration and logout for the admin realm.
///
/// The token and identity live in the [`SessionCell`]; this type only runs
/// the operations that change them. Permission checks read the identity
/// that the last successful hydration committed.
pub struct AdminSession<T: HttpTransport> {
    cell: Arc<SessionCell<AdminIdentity>>,
    gateway: Arc<Gateway<T>>,
}

impl<T: HttpTransport> AdminSession<T> {
    /// Wraps a cell and the admin gateway that carries its token.
    pub fn new(cell: Arc<SessionCell<AdminIdentity>>, gateway: Arc<Gateway<T>>) -> Self {
        Self { cell, gateway }
    }

    /// The underlying state cell.
    pub fn cell(&self) -> &Arc<SessionCell<AdminIdentity>> {
        &self.cell
    }

    /// The admin gateway.
    pub fn gateway(&self) -> &Arc<Gateway<T>> {
        &self.gateway
    }

    /// Returns `true` if a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    /// The hydrated identity, if any.
    pub fn identity(&self) -> Option<Arc<AdminIdentity>> {
        self.cell.identity()
    }

    /// Signs in, stores the token, then hydrates.
    ///
    /// The login call is silent: a bad password rejects with the server's
    /// message and no global notice, so the form can show its own.
    ///
    /// # Errors
    /// The gateway failure, or [`SessionError::MissingToken`] if the server
    /// answered without a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), RealmgateError> {
        let grant: TokenGrant = self.gateway.call_as(api::admin::login(username, password)).await?;
        let token = grant.into_token().ok_or(SessionError::MissingToken(Domain::Admin))?;
        self.cell.set_token(&token);
        tracing::info!(username, "admin signed in");
        self.bootstrap().await?;
        Ok(())
    }

    /// Hydrates the identity from the stored token.
    ///
    /// Returns `Ok(false)` without any request when there's no token.
    /// Concurrent calls queue behind each other; one that waited while
    /// another hydration committed returns without asking again.
    /// A result for a token that was cleared or replaced meanwhile is
    /// dropped.
    ///
    /// # Errors
    /// The gateway failure of the "who am I" call.
    pub async fn bootstrap(&self) -> Result<bool, GatewayError> {
        if !self.cell.is_authenticated() {
            return Ok(false);
        }
        let seen = self.cell.commits();
        let _hydrating = self.cell.lock_hydration().await;
        if self.cell.commits() != seen && self.cell.is_hydrated() {
            return Ok(true);
        }
        let Some(ticket) = self.cell.begin_hydration() else {
            return Ok(false);
        };

        let profile: AdminProfile = self.gateway.call_as(api::admin::me()).await?;
        let identity = AdminIdentity::from(profile);
        tracing::debug!(codes = identity.permissions().len(), is_admin = identity.profile().is_admin, "admin profile fetched");

        if self.cell.commit(&ticket, identity) {
            Ok(true)
        } else {
            Ok(self.cell.is_hydrated())
        }
    }

    /// Signs out. Always ends unauthenticated.
    ///
    /// The logout call is best effort; its failure is logged and ignored.
    pub async fn logout(&self) {
        if self.cell.is_authenticated() {
            if let Err(e) = self.gateway.call(api::admin::logout()).await {
                tracing::debug!(error = %e, "admin logout call failed");
            }
        }
        self.cell.clear();
    }

    /// Evaluates `code` against the hydrated identity.
    pub fn has_permission(&self, code: &str) -> bool {
        PermissionCheck::has_permission(&*self.cell, code)
    }
}

impl<T: HttpTransport> Realm for AdminSession<T> {
    type Error = GatewayError;

    fn domain(&self) -> Domain {
        Domain::Admin
    }

    fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    fn is_hydrated(&self) -> bool {
        self.cell.is_hydrated()
    }

    async fn bootstrap(&self) -> Result<bool, GatewayError> {
        AdminSession::bootstrap(self).await
    }
}

impl<T: HttpTransport> PermissionCheck for AdminSession<T> {
    fn has_permission(&self, code: &str) -> bool {
        AdminSession::has_permission(self, code)
    }
}

impl<T: HttpTransport> std::fmt::Debug for AdminSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSession").field("cell", &self.cell).finish_non_exhaustive()
    }
}
