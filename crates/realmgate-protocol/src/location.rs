//! Navigation locations and the redirect that survives a login detour.
//!
//! A [`Location`] is the browser-independent form of "where the user is":
//! path, query and fragment. A [`PendingRedirect`] is the full original
//! location, carried URL-encoded in a single query parameter of a login
//! URL so the login flow can send the user back afterwards.

use std::fmt;

use crate::ProtocolError;

/// Query parameter that carries a [`PendingRedirect`] on login URLs.
pub const DEFAULT_REDIRECT_PARAM: &str = "redirect";

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A parsed `path?query#fragment` triple.
///
/// `query` and `fragment` are stored without their leading `?` / `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: String,
    fragment: String,
}

impl Location {
    /// Parses a location string. Never fails: a missing path becomes `/`.
    ///
    /// ```rust
    /// use realmgate_protocol::Location;
    ///
    /// let loc = Location::parse("/admin/users?page=2#top");
    /// assert_eq!(loc.path(), "/admin/users");
    /// assert_eq!(loc.query(), "page=2");
    /// assert_eq!(loc.fragment(), "top");
    /// ```
    pub fn parse(raw: &str) -> Self {
        let (rest, fragment) = raw.split_once('#').unwrap_or((raw, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let path = if path.is_empty() { "/" } else { path };
        Self {
            path: path.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// The path component, always starting with `/` for parsed app paths.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The fragment without the leading `#`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Reassembles `path?query#fragment`, omitting empty parts.
    pub fn full_path(&self) -> String {
        let mut out = self.path.clone();
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            out.push('#');
            out.push_str(&self.fragment);
        }
        out
    }

    /// Returns the decoded value of the first query parameter called `name`.
    ///
    /// `+` is read as a space, matching how browsers serialize forms.
    /// Values that don't decode to UTF-8 are treated as absent.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| decode_component(key).as_deref() == Some(name))
            .and_then(|(_, value)| decode_component(value))
    }

    /// Returns `true` if the path starts with `prefix`.
    ///
    /// This is a plain prefix check on the path only; the query is ignored.
    pub fn is_under(&self, prefix: &str) -> bool {
        self.path.starts_with(prefix)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::parse("/")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}

// ---------------------------------------------------------------------------
// PendingRedirect
// ---------------------------------------------------------------------------

/// The original navigation target, preserved across a forced login.
///
/// Holds the full `path?query#fragment`. Encoded as one query parameter on
/// the login URL and decoded again by the login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRedirect(String);

impl PendingRedirect {
    /// Captures the full location the user was heading to.
    pub fn new(target: &Location) -> Self {
        Self(target.full_path())
    }

    /// The decoded target, e.g. `/admin/users?page=2#top`.
    pub fn target(&self) -> &str {
        &self.0
    }

    /// Builds `{login_path}?{param}={encoded target}`.
    ///
    /// ```rust
    /// use realmgate_protocol::{Location, PendingRedirect};
    ///
    /// let pending = PendingRedirect::new(&Location::parse("/admin/users?page=2"));
    /// assert_eq!(
    ///     pending.login_url("/admin/login", "redirect"),
    ///     "/admin/login?redirect=%2Fadmin%2Fusers%3Fpage%3D2"
    /// );
    /// ```
    pub fn login_url(&self, login_path: &str, param: &str) -> String {
        format!("{login_path}?{param}={}", urlencoding::encode(&self.0))
    }

    /// Reads a pending redirect back out of a login location.
    ///
    /// Returns `Ok(None)` when the parameter is absent or empty.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidLocation`] when the decoded target
    /// isn't an in-app path (it must start with a single `/`).
    pub fn from_location(location: &Location, param: &str) -> Result<Option<Self>, ProtocolError> {
        let Some(target) = location.query_param(param) else {
            return Ok(None);
        };
        if target.is_empty() {
            return Ok(None);
        }
        if !target.starts_with('/') || target.starts_with("//") {
            return Err(ProtocolError::InvalidLocation(target));
        }
        Ok(Some(Self(target)))
    }
}
