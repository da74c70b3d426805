//! The per-navigation decision function.
//!
//! [`RouteGuard::check`] runs before every navigation with the matched
//! route chain and both realms:
//!
//! 1. OR the `requiresAuth` / `requiresAccountAuth` flags over the chain.
//! 2. For each required realm: no token → login redirect carrying the
//!    target as a [`PendingRedirect`]; token without profile → hydrate once,
//!    and a failed hydration is a login redirect too.
//! 3. Resolve the innermost declared `perm`. If the admin realm is required
//!    and the code isn't granted → the forbidden route, without a pending
//!    redirect.
//! 4. Otherwise proceed.
//!
//! The guard never writes session state. Its only side effect is the
//! hydration call.

use std::fmt;

use realmgate_protocol::{Domain, Location, PendingRedirect, DEFAULT_REDIRECT_PARAM};
use realmgate_session::{has_permission, AdminIdentity, PermissionSet, SessionCell};

use crate::RouteMeta;

// ---------------------------------------------------------------------------
// Realm / PermissionCheck
// ---------------------------------------------------------------------------

/// What the guard needs from one authenticated realm.
pub trait Realm {
    /// Why a hydration failed.
    type Error: fmt::Display;

    /// The realm's domain.
    fn domain(&self) -> Domain;

    /// A token is present.
    fn is_authenticated(&self) -> bool;

    /// A profile is present.
    fn is_hydrated(&self) -> bool;

    /// Hydrates the profile from the stored token.
    ///
    /// Returns `Ok(false)` when there's no token to hydrate from.
    async fn bootstrap(&self) -> Result<bool, Self::Error>;
}

/// Answers "is this admin permission code granted right now".
pub trait PermissionCheck {
    /// Evaluates `code`. An empty code is always granted.
    fn has_permission(&self, code: &str) -> bool;
}

impl PermissionCheck for AdminIdentity {
    fn has_permission(&self, code: &str) -> bool {
        AdminIdentity::has_permission(self, code)
    }
}

impl PermissionCheck for SessionCell<AdminIdentity> {
    fn has_permission(&self, code: &str) -> bool {
        match self.identity() {
            Some(identity) => identity.has_permission(code),
            None => has_permission(&PermissionSet::new(), false, code),
        }
    }
}

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Why the guard sent the user elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// The realm has no usable session.
    LoginRequired(Domain),
    /// Signed in as admin, but the permission code isn't granted.
    Forbidden,
}

/// The outcome of one navigation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Render the target.
    Proceed,
    /// Go to `target` instead.
    Redirect {
        /// In-app location to navigate to.
        target: String,
        reason: RedirectReason,
    },
}

impl Decision {
    /// Returns `true` for [`Decision::Proceed`].
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// The redirect target, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Proceed => None,
            Self::Redirect { target, .. } => Some(target),
        }
    }
}

// ---------------------------------------------------------------------------
// RouteGuard
// ---------------------------------------------------------------------------

/// Fixed locations the guard redirects to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPaths {
    pub admin_login: String,
    pub account_login: String,
    pub forbidden: String,
    /// Query parameter carrying the pending redirect.
    pub redirect_param: String,
}

impl Default for GuardPaths {
    fn default() -> Self {
        Self {
            admin_login: "/admin/login".to_string(),
            account_login: "/account/login".to_string(),
            forbidden: "/403".to_string(),
            redirect_param: DEFAULT_REDIRECT_PARAM.to_string(),
        }
    }
}

/// Runs the navigation checks.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    paths: GuardPaths,
}

impl RouteGuard {
    /// Creates a guard redirecting to `paths`.
    pub fn new(paths: GuardPaths) -> Self {
        Self { paths }
    }

    /// The redirect locations in use.
    pub fn paths(&self) -> &GuardPaths {
        &self.paths
    }

    /// Decides whether navigation to `target` may proceed.
    ///
    /// `chain` is the matched route chain, outermost first. An empty chain
    /// is a public page.
    pub async fn check<A, B>(&self, target: &Location, chain: &[&RouteMeta], admin: &A, account: &B) -> Decision
    where
        A: Realm + PermissionCheck,
        B: Realm,
    {
        let requires_admin = chain.iter().any(|meta| meta.requires_auth);
        let requires_account = chain.iter().any(|meta| meta.requires_account_auth);

        if requires_admin {
            if let Some(decision) = self.ensure_session(target, admin, &self.paths.admin_login).await {
                return decision;
            }
        }
        if requires_account {
            if let Some(decision) = self.ensure_session(target, account, &self.paths.account_login).await {
                return decision;
            }
        }

        // Innermost declaration wins; shallower ones are overridden.
        let required = chain
            .iter()
            .rev()
            .find_map(|meta| meta.perm.as_deref().filter(|code| !code.is_empty()));

        if let (true, Some(code)) = (requires_admin, required) {
            if !admin.has_permission(code) {
                tracing::info!(path = %target.path(), perm = code, "navigation forbidden");
                return Decision::Redirect {
                    target: self.paths.forbidden.clone(),
                    reason: RedirectReason::Forbidden,
                };
            }
        }

        Decision::Proceed
    }

    async fn ensure_session<R: Realm>(&self, target: &Location, realm: &R, login_path: &str) -> Option<Decision> {
        let domain = realm.domain();
        if !realm.is_authenticated() {
            tracing::debug!(%domain, path = %target.path(), "no session, redirecting to login");
            return Some(self.login_redirect(target, domain, login_path));
        }
        if realm.is_hydrated() {
            return None;
        }

        match realm.bootstrap().await {
            Ok(true) if realm.is_authenticated() => None,
            Ok(_) => Some(self.login_redirect(target, domain, login_path)),
            Err(e) => {
                tracing::warn!(%domain, error = %e, "hydration failed during navigation");
                Some(self.login_redirect(target, domain, login_path))
            }
        }
    }

    fn login_redirect(&self, target: &Location, domain: Domain, login_path: &str) -> Decision {
        Decision::Redirect {
            target: PendingRedirect::new(target).login_url(login_path, &self.paths.redirect_param),
            reason: RedirectReason::LoginRequired(domain),
        }
    }
}
