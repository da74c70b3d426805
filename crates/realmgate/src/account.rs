//! The community account session.

use std::sync::Arc;

use realmgate_gateway::api::{self, TokenGrant};
use realmgate_gateway::{ApiRequest, Gateway, GatewayError};
use realmgate_guard::Realm;
use realmgate_protocol::Domain;
use realmgate_session::{AccountProfile, SessionCell, SessionError};
use realmgate_transport::HttpTransport;
use serde_json::Value;

use crate::RealmgateError;

/// Login, registration, hydration, profile edits and logout for the
/// account realm.
pub struct AccountSession<T: HttpTransport> {
    cell: Arc<SessionCell<AccountProfile>>,
    gateway: Arc<Gateway<T>>,
}

impl<T: HttpTransport> AccountSession<T> {
    /// Wraps a cell and the account gateway that carries its token.
    pub fn new(cell: Arc<SessionCell<AccountProfile>>, gateway: Arc<Gateway<T>>) -> Self {
        Self { cell, gateway }
    }

    /// The underlying state cell.
    pub fn cell(&self) -> &Arc<SessionCell<AccountProfile>> {
        &self.cell
    }

    /// The account gateway.
    pub fn gateway(&self) -> &Arc<Gateway<T>> {
        &self.gateway
    }

    /// Returns `true` if a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    /// The hydrated profile, if any.
    pub fn profile(&self) -> Option<Arc<AccountProfile>> {
        self.cell.identity()
    }

    /// Signs in, stores the token, then hydrates. Silent like the admin
    /// login.
    ///
    /// # Errors
    /// The gateway failure, or [`SessionError::MissingToken`].
    pub async fn login(&self, username: &str, password: &str) -> Result<(), RealmgateError> {
        self.sign_in(api::account::login(username, password)).await
    }

    /// Creates an account and signs straight in with the returned token.
    ///
    /// # Errors
    /// As [`AccountSession::login`].
    pub async fn register(&self, username: &str, password: &str, display_name: &str) -> Result<(), RealmgateError> {
        self.sign_in(api::account::register(username, password, display_name)).await
    }

    async fn sign_in(&self, request: ApiRequest) -> Result<(), RealmgateError> {
        let grant: TokenGrant = self.gateway.call_as(request).await?;
        let token = grant.into_token().ok_or(SessionError::MissingToken(Domain::Account))?;
        self.cell.set_token(&token);
        tracing::info!("account signed in");
        self.bootstrap().await?;
        Ok(())
    }

    /// Hydrates the profile from the stored token. Same rules as the admin
    /// realm's bootstrap.
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

        let profile: AccountProfile = self.gateway.call_as(api::account::me()).await?;
        if self.cell.commit(&ticket, profile) {
            Ok(true)
        } else {
            Ok(self.cell.is_hydrated())
        }
    }

    /// Saves profile changes and replaces the cached profile with what the
    /// server returned. No local merge.
    ///
    /// # Errors
    /// [`SessionError::NotAuthenticated`] without a session, otherwise the
    /// gateway failure.
    pub async fn update_profile(&self, payload: Value) -> Result<AccountProfile, RealmgateError> {
        let ticket = self
            .cell
            .begin_hydration()
            .ok_or(SessionError::NotAuthenticated(Domain::Account))?;
        let profile: AccountProfile = self.gateway.call_as(api::account::update_me(payload)).await?;
        if !self.cell.commit(&ticket, profile.clone()) {
            tracing::debug!("session changed during profile update, not caching result");
        }
        Ok(profile)
    }

    /// Signs out. Always ends unauthenticated.
    pub async fn logout(&self) {
        if self.cell.is_authenticated() {
            if let Err(e) = self.gateway.call(api::account::logout()).await {
                tracing::debug!(error = %e, "account logout call failed");
            }
        }
        self.cell.clear();
    }
}

impl<T: HttpTransport> Realm for AccountSession<T> {
    type Error = GatewayError;

    fn domain(&self) -> Domain {
        Domain::Account
    }

    fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    fn is_hydrated(&self) -> bool {
        self.cell.is_hydrated()
    }

    async fn bootstrap(&self) -> Result<bool, GatewayError> {
        AccountSession::bootstrap(self).await
    }
}

impl<T: HttpTransport> std::fmt::Debug for AccountSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSession").field("cell", &self.cell).finish_non_exhaustive()
    }
}
