//! Static route records and path matching.
//!
//! Routes are declared once at startup as a tree. Matching a path yields
//! the chain of records from the outermost to the innermost one, and the
//! guard reads the auth flags and permission codes off that chain.

use serde::Deserialize;

use crate::GuardError;

// ---------------------------------------------------------------------------
// RouteMeta
// ---------------------------------------------------------------------------

/// Access requirements declared on one route record.
///
/// Flags are declared, never computed. On a matched chain the auth flags
/// are OR-ed, while the innermost declared `perm` wins outright.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    /// Needs an admin-realm session.
    #[serde(default)]
    pub requires_auth: bool,
    /// Needs an account-realm session.
    #[serde(default)]
    pub requires_account_auth: bool,
    /// Admin permission code required to enter.
    #[serde(default)]
    pub perm: Option<String>,
}

// ---------------------------------------------------------------------------
// RouteRecord
// ---------------------------------------------------------------------------

/// One navigation target in the route tree.
///
/// A child path without a leading `/` is relative to its parent; an empty
/// child path matches the parent's own path (a default child).
/// Segments starting with `:` match any single segment, and a final `*`
/// matches whatever remains.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteRecord {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub meta: RouteMeta,
    #[serde(default)]
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    /// A record with no requirements and no children.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    /// Names the route.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Requires an admin session.
    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    /// Requires an account session.
    pub fn requires_account_auth(mut self) -> Self {
        self.meta.requires_account_auth = true;
        self
    }

    /// Requires an admin permission code.
    pub fn perm(mut self, code: impl Into<String>) -> Self {
        self.meta.perm = Some(code.into());
        self
    }

    /// Adds child routes.
    pub fn children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children.extend(children);
        self
    }
}

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

/// The immutable route tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl RouteTable {
    /// Builds a table from top-level records.
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        Self { routes }
    }

    /// Parses a table from a JSON array of records.
    ///
    /// # Errors
    /// Returns [`GuardError::InvalidRoutes`] if the JSON doesn't describe
    /// a route tree.
    pub fn from_json(raw: &str) -> Result<Self, GuardError> {
        serde_json::from_str(raw).map_err(|e| GuardError::InvalidRoutes(e.to_string()))
    }

    /// Matches `path` and returns the chain, outermost first.
    ///
    /// Returns an empty chain when nothing matches. Earlier declarations
    /// win over later ones.
    pub fn resolve(&self, path: &str) -> Vec<&RouteRecord> {
        let target = segments(path);
        self.routes
            .iter()
            .find_map(|record| match_record(record, &[], &target))
            .unwrap_or_default()
    }

    /// The chain's metadata, outermost first.
    pub fn resolve_meta(&self, path: &str) -> Vec<&RouteMeta> {
        self.resolve(path).into_iter().map(|record| &record.meta).collect()
    }

    /// Finds a record by name anywhere in the tree.
    pub fn find_by_name(&self, name: &str) -> Option<&RouteRecord> {
        fn walk<'a>(records: &'a [RouteRecord], name: &str) -> Option<&'a RouteRecord> {
            records.iter().find_map(|record| {
                if record.name.as_deref() == Some(name) {
                    Some(record)
                } else {
                    walk(&record.children, name)
                }
            })
        }
        walk(&self.routes, name)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_record<'a>(record: &'a RouteRecord, parent: &[&'a str], target: &[&str]) -> Option<Vec<&'a RouteRecord>> {
    let own = segments(&record.path);
    let full: Vec<&str> = if record.path.starts_with('/') {
        own
    } else {
        parent.iter().copied().chain(own).collect()
    };

    for child in &record.children {
        if let Some(mut chain) = match_record(child, &full, target) {
            chain.insert(0, record);
            return Some(chain);
        }
    }

    if pattern_matches(&full, target) {
        Some(vec![record])
    } else {
        None
    }
}

fn pattern_matches(pattern: &[&str], target: &[&str]) -> bool {
    match (pattern.split_first(), target.split_first()) {
        (None, None) => true,
        (Some((&"*", rest)), _) if rest.is_empty() => true,
        (Some((p, p_rest)), Some((t, t_rest))) => {
            (p.starts_with(':') || p == t) && pattern_matches(p_rest, t_rest)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteRecord::new("/").name("home"),
            RouteRecord::new("/ow").name("ow"),
            RouteRecord::new("/admin/login").name("admin-login"),
            RouteRecord::new("/admin").requires_auth().children(vec![
                RouteRecord::new("").name("dashboard"),
                RouteRecord::new("users").perm("user:list").children(vec![
                    RouteRecord::new("create").name("user-create").perm("user:create"),
                    RouteRecord::new(":id").name("user-detail"),
                ]),
            ]),
            RouteRecord::new("/account").requires_account_auth().children(vec![
                RouteRecord::new("me").name("account-me"),
            ]),
            RouteRecord::new("/docs/*").name("docs"),
        ])
    }

    fn names(chain: &[&RouteRecord]) -> Vec<String> {
        chain
            .iter()
            .map(|r| r.name.clone().unwrap_or_else(|| r.path.clone()))
            .collect()
    }

    #[test]
    fn test_resolve_nested_route_returns_outermost_first() {
        let table = table();
        assert_eq!(names(&table.resolve("/admin/users/create")), ["/admin", "users", "user-create"]);
    }

    #[test]
    fn test_resolve_param_segment_matches_any_value() {
        let table = table();
        assert_eq!(names(&table.resolve("/admin/users/42")), ["/admin", "users", "user-detail"]);
    }

    #[test]
    fn test_resolve_default_child_matches_parent_path() {
        let table = table();
        assert_eq!(names(&table.resolve("/admin")), ["/admin", "dashboard"]);
        assert_eq!(names(&table.resolve("/admin/")), ["/admin", "dashboard"]);
    }

    #[test]
    fn test_resolve_parent_without_default_child_matches_itself() {
        let table = table();
        assert_eq!(names(&table.resolve("/admin/users")), ["/admin", "users"]);
    }

    #[test]
    fn test_resolve_unknown_path_is_empty() {
        assert!(table().resolve("/nowhere/at/all").is_empty());
    }

    #[test]
    fn test_resolve_wildcard_matches_rest() {
        let table = table();
        assert_eq!(names(&table.resolve("/docs/guide/intro")), ["docs"]);
        assert_eq!(names(&table.resolve("/docs")), ["docs"]);
    }

    #[test]
    fn test_resolve_root_does_not_swallow_other_paths() {
        let table = table();
        assert_eq!(names(&table.resolve("/")), ["home"]);
        assert_eq!(names(&table.resolve("/ow")), ["ow"]);
    }

    #[test]
    fn test_find_by_name_walks_children() {
        let table = table();
        let record = table.find_by_name("user-create").expect("should exist");
        assert_eq!(record.meta.perm.as_deref(), Some("user:create"));
    }

    #[test]
    fn test_from_json_reads_camel_case_meta() {
        let table = RouteTable::from_json(
            r#"[
                { "path": "/admin", "meta": { "requiresAuth": true },
                  "children": [ { "path": "roles", "meta": { "perm": "role:list" } } ] },
                { "path": "/lfg", "meta": { "requiresAccountAuth": true } }
            ]"#,
        )
        .expect("should parse");

        let meta = table.resolve_meta("/admin/roles");
        assert!(meta[0].requires_auth);
        assert_eq!(meta[1].perm.as_deref(), Some("role:list"));
        assert!(table.resolve_meta("/lfg")[0].requires_account_auth);
    }

    #[test]
    fn test_from_json_rejects_malformed_input() {
        assert!(matches!(
            RouteTable::from_json(r#"{ "path": 1 }"#),
            Err(GuardError::InvalidRoutes(_))
        ));
    }
}
