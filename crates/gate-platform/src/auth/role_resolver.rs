//! Role Resolution
//!
//! Computes a user's effective role set from the permission graph at
//! sign-in time. The result is a fresh set per call; nothing is cached on
//! the user document.
//!
//! Denials are applied as a single set subtraction after all grants are
//! unioned, so the outcome cannot depend on the order groups or
//! permissions are iterated: a permission denied anywhere is absent from
//! the result no matter how many grant paths exist.

use std::collections::BTreeSet;

use crate::group::entity::Group;
use crate::permission::entity::{Permission, ROLE_PREFIX};
use crate::user::entity::User;

/// Base role held by every user.
pub const ROLE_USER: &str = "USER";

/// Role held by administrators.
pub const ROLE_ADMIN: &str = "ADMIN";

/// Resolves effective roles for authenticated users.
pub struct RoleResolver;

impl RoleResolver {
    /// Resolve the effective role set for `user`.
    ///
    /// `groups` are the groups the user belongs to and `catalog` is the
    /// full permission catalog, both read-only snapshots for the request.
    ///
    /// Administrators receive `ADMIN` plus a role for every permission in
    /// the catalog; denials never apply to them. Everyone else gets the
    /// base `USER` role plus `ROLE_<NAME>` for each granted permission
    /// (direct or via a group), minus every denied permission (direct or
    /// via a group).
    pub fn resolve(user: &User, groups: &[Group], catalog: &[Permission]) -> BTreeSet<String> {
        let mut roles = BTreeSet::new();
        roles.insert(ROLE_USER.to_string());

        if user.is_admin {
            roles.insert(ROLE_ADMIN.to_string());
            for permission in catalog {
                roles.insert(permission.role_token());
            }
            return roles;
        }

        let granted = user
            .permissions
            .iter()
            .chain(groups.iter().flat_map(|g| g.permissions.iter()))
            .map(|name| role_token(name));
        roles.extend(granted);

        let denied: BTreeSet<String> = user
            .denied_permissions
            .iter()
            .chain(groups.iter().flat_map(|g| g.denied_permissions.iter()))
            .map(|name| role_token(name))
            .collect();

        &roles - &denied
    }
}

fn role_token(permission_name: &str) -> String {
    format!("{}{}", ROLE_PREFIX, permission_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("google", "g-1", "Alice")
    }

    fn group(name: &str) -> Group {
        Group::new(name)
    }

    fn catalog(names: &[&str]) -> Vec<Permission> {
        names.iter().map(|n| Permission::new(*n)).collect()
    }

    fn roles_of(user: &User, groups: &[Group], catalog: &[Permission]) -> BTreeSet<String> {
        RoleResolver::resolve(user, groups, catalog)
    }

    #[test]
    fn test_every_user_has_base_role() {
        let roles = roles_of(&user(), &[], &[]);
        assert!(roles.contains("USER"));
        assert_eq!(roles.len(), 1);
    }

    #[test]
    fn test_admin_gets_full_catalog() {
        let mut admin = user();
        admin.set_admin(true);
        // Denials must not touch admins
        admin.deny_permission("EDITOR");

        let roles = roles_of(&admin, &[], &catalog(&["EDITOR", "REPORTS"]));

        assert!(roles.contains("USER"));
        assert!(roles.contains("ADMIN"));
        assert!(roles.contains("ROLE_EDITOR"));
        assert!(roles.contains("ROLE_REPORTS"));
        assert_eq!(roles.len(), 4);
    }

    #[test]
    fn test_direct_grant() {
        let mut alice = user();
        alice.grant_permission("REPORTS");

        let roles = roles_of(&alice, &[], &catalog(&["REPORTS"]));
        let expected: BTreeSet<String> =
            ["USER", "ROLE_REPORTS"].iter().map(|s| s.to_string()).collect();
        assert_eq!(roles, expected);
    }

    #[test]
    fn test_group_grant() {
        let alice = user();
        let mut editors = group("editors");
        editors.grant_permission("EDITOR");

        let roles = roles_of(&alice, &[editors], &catalog(&["EDITOR"]));
        assert!(roles.contains("ROLE_EDITOR"));
    }

    #[test]
    fn test_duplicate_grant_counts_once() {
        let mut alice = user();
        alice.grant_permission("EDITOR");
        let mut editors = group("editors");
        editors.grant_permission("EDITOR");

        let roles = roles_of(&alice, &[editors], &catalog(&["EDITOR"]));
        assert_eq!(roles.len(), 2); // USER + ROLE_EDITOR
    }

    #[test]
    fn test_denial_beats_grant_across_groups() {
        let alice = user();
        let mut grants = group("grants-editor");
        grants.grant_permission("EDITOR");
        let mut denies = group("denies-editor");
        denies.deny_permission("EDITOR");

        let roles = roles_of(&alice, &[grants, denies], &catalog(&["EDITOR"]));
        let expected: BTreeSet<String> = ["USER"].iter().map(|s| s.to_string()).collect();
        assert_eq!(roles, expected);
    }

    #[test]
    fn test_group_denial_beats_direct_grant() {
        let mut alice = user();
        alice.grant_permission("EDITOR");
        let mut denies = group("denies-editor");
        denies.deny_permission("EDITOR");

        let roles = roles_of(&alice, &[denies], &catalog(&["EDITOR"]));
        assert!(!roles.contains("ROLE_EDITOR"));
    }

    #[test]
    fn test_direct_denial_beats_group_grant() {
        let mut alice = user();
        alice.deny_permission("EDITOR");
        let mut grants = group("grants-editor");
        grants.grant_permission("EDITOR");

        let roles = roles_of(&alice, &[grants], &catalog(&["EDITOR"]));
        assert!(!roles.contains("ROLE_EDITOR"));
    }

    #[test]
    fn test_order_independence() {
        let mut alice = user();
        alice.grant_permission("REPORTS");
        let mut grants = group("grants");
        grants.grant_permission("EDITOR");
        grants.grant_permission("REPORTS");
        let mut denies = group("denies");
        denies.deny_permission("EDITOR");

        let catalog = catalog(&["EDITOR", "REPORTS"]);
        let forward = roles_of(&alice, &[grants.clone(), denies.clone()], &catalog);
        let reverse = roles_of(&alice, &[denies, grants], &catalog);

        assert_eq!(forward, reverse);
        assert!(forward.contains("ROLE_REPORTS"));
        assert!(!forward.contains("ROLE_EDITOR"));
    }

    #[test]
    fn test_idempotence() {
        let mut alice = user();
        alice.grant_permission("REPORTS");
        alice.deny_permission("EDITOR");
        let mut editors = group("editors");
        editors.grant_permission("EDITOR");
        let groups = vec![editors];
        let catalog = catalog(&["EDITOR", "REPORTS"]);

        let first = roles_of(&alice, &groups, &catalog);
        let second = roles_of(&alice, &groups, &catalog);
        assert_eq!(first, second);
    }

    #[test]
    fn test_frozen_user_still_resolves() {
        let mut alice = user();
        alice.set_frozen(true);
        alice.grant_permission("REPORTS");

        let roles = roles_of(&alice, &[], &catalog(&["REPORTS"]));
        assert!(roles.contains("ROLE_REPORTS"));
    }

    #[test]
    fn test_resolution_does_not_mutate_user() {
        let mut alice = user();
        alice.grant_permission("REPORTS");
        let before = alice.clone();

        let _ = roles_of(&alice, &[], &catalog(&["REPORTS"]));

        assert_eq!(alice.permissions, before.permissions);
        assert_eq!(alice.denied_permissions, before.denied_permissions);
    }
}
