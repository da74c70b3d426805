//! Admin permission codes and the evaluator.

use std::collections::HashSet;

/// The permission codes granted to the current admin profile.
///
/// Built wholesale from the profile's code list on every hydration and
/// never mutated afterwards. Lookups are hash-based because the UI gate
/// may check once per rendered control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet(HashSet<String>);

impl PermissionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership test.
    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no codes are granted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Decides whether `code` is granted.
///
/// - empty code → `true` (the target is unrestricted)
/// - `bypass` (admin flag) → `true` for any code
/// - otherwise → set membership
pub fn has_permission(set: &PermissionSet, bypass: bool, code: &str) -> bool {
    if code.is_empty() || bypass {
        return true;
    }
    set.contains(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_permission_bypass_grants_unknown_code() {
        let set: PermissionSet = ["user:list"].into_iter().collect();
        assert!(has_permission(&set, true, "anything"));
        assert!(has_permission(&PermissionSet::new(), true, "role:delete"));
    }

    #[test]
    fn test_has_permission_empty_code_is_unrestricted() {
        assert!(has_permission(&PermissionSet::new(), false, ""));
    }

    #[test]
    fn test_has_permission_missing_code_is_denied() {
        let set: PermissionSet = ["a"].into_iter().collect();
        assert!(!has_permission(&set, false, "b"));
        assert!(has_permission(&set, false, "a"));
    }

    #[test]
    fn test_permission_set_deduplicates_codes() {
        let set: PermissionSet = ["user:list", "user:list", "role:list"].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_has_permission_is_case_sensitive() {
        let set: PermissionSet = ["user:list"].into_iter().collect();
        assert!(!has_permission(&set, false, "USER:LIST"));
    }
}
