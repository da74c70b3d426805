//! Hydrated identity snapshots returned by the "who am I" endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{has_permission, PermissionSet};

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// The admin `me` payload.
///
/// Only the permission list and the admin flag mean anything to the
/// session core; every other field is kept verbatim in `fields` for views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    /// Granted permission codes. Older backends call this `permCodes`.
    #[serde(default, alias = "permCodes")]
    pub permission_codes: Vec<String>,

    /// Super-admin flag: bypasses every permission check.
    #[serde(default)]
    pub is_admin: bool,

    /// Everything else the server sent (id, username, nickname...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl AdminProfile {
    /// Looks up an extra field by its wire name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// An admin profile plus the permission set materialized from it.
///
/// The set is derived once here; nothing updates it piecemeal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminIdentity {
    profile: AdminProfile,
    permissions: PermissionSet,
}

impl AdminIdentity {
    /// The raw profile.
    pub fn profile(&self) -> &AdminProfile {
        &self.profile
    }

    /// The materialized permission set.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Evaluates `code` against this identity (see [`has_permission`]).
    pub fn has_permission(&self, code: &str) -> bool {
        has_permission(&self.permissions, self.profile.is_admin, code)
    }
}

impl From<AdminProfile> for AdminIdentity {
    fn from(profile: AdminProfile) -> Self {
        let permissions = profile.permission_codes.iter().map(String::as_str).collect();
        Self { profile, permissions }
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// The account `me` payload. Opaque to the session core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountProfile {
    /// The profile exactly as the server returned it.
    pub fields: Map<String, Value>,
}

impl AccountProfile {
    /// Looks up a field by its wire name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The `displayName` field, if the server sent one.
    pub fn display_name(&self) -> Option<&str> {
        self.field("displayName").and_then(Value::as_str)
    }
}
