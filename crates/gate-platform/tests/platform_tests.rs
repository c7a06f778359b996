//! Platform Integration Tests
//!
//! Tests for the domain models, role resolution, and sign-in provisioning
//! rules, exercised through the crate's public API.

use std::collections::BTreeSet;

use gate_platform::auth::provider::{registration_allowed, AuthenticatedUser, OAuthUserResponse};
use gate_platform::permission::entity::is_reserved_name;
use gate_platform::{
    Group, Permission, RoleResolver, SessionConfig, SessionService, User, ROLE_ADMIN, ROLE_USER,
};

fn oauth_response(owner_id: &str, name: &str, email: &str) -> OAuthUserResponse {
    OAuthUserResponse {
        resource_owner: "google".to_string(),
        resource_owner_id: owner_id.to_string(),
        real_name: name.to_string(),
        email: Some(email.to_string()),
        profile_picture_url: None,
    }
}

mod role_resolution {
    use super::*;

    #[test]
    fn base_role_is_always_present() {
        let user = User::new("google", "g-1", "Alice");
        let roles = RoleResolver::resolve(&user, &[], &[]);
        assert!(roles.contains(ROLE_USER));
    }

    #[test]
    fn admin_holds_entire_catalog_despite_denials() {
        let mut admin = User::new("google", "g-1", "Root");
        admin.set_admin(true);
        admin.deny_permission("EDITOR");

        let mut denying_group = Group::new("deniers");
        denying_group.deny_permission("REPORTS");

        let catalog = vec![Permission::new("EDITOR"), Permission::new("REPORTS")];
        let roles = RoleResolver::resolve(&admin, &[denying_group], &catalog);

        assert!(roles.contains(ROLE_ADMIN));
        assert!(roles.contains("ROLE_EDITOR"));
        assert!(roles.contains("ROLE_REPORTS"));
    }

    #[test]
    fn editor_granted_by_one_group_denied_by_another() {
        let user = User::new("google", "g-1", "Alice");

        let mut group_a = Group::new("grants-editor");
        group_a.grant_permission("EDITOR");
        let mut group_b = Group::new("denies-editor");
        group_b.deny_permission("EDITOR");

        let catalog = vec![Permission::new("EDITOR")];
        let roles = RoleResolver::resolve(&user, &[group_a, group_b], &catalog);

        let expected: BTreeSet<String> = [ROLE_USER.to_string()].into_iter().collect();
        assert_eq!(roles, expected);
    }

    #[test]
    fn direct_reports_grant_without_denials() {
        let mut user = User::new("google", "g-1", "Alice");
        user.grant_permission("REPORTS");

        let catalog = vec![Permission::new("REPORTS")];
        let roles = RoleResolver::resolve(&user, &[], &catalog);

        let expected: BTreeSet<String> = ["USER".to_string(), "ROLE_REPORTS".to_string()]
            .into_iter()
            .collect();
        assert_eq!(roles, expected);
    }

    #[test]
    fn result_is_stable_under_group_permutation() {
        let mut user = User::new("google", "g-1", "Alice");
        user.grant_permission("REPORTS");
        user.deny_permission("ARCHIVE");

        let mut editors = Group::new("editors");
        editors.grant_permission("EDITOR");
        editors.grant_permission("ARCHIVE");
        let mut auditors = Group::new("auditors");
        auditors.deny_permission("EDITOR");
        auditors.grant_permission("REPORTS");

        let catalog = vec![
            Permission::new("EDITOR"),
            Permission::new("REPORTS"),
            Permission::new("ARCHIVE"),
        ];

        let forward = RoleResolver::resolve(&user, &[editors.clone(), auditors.clone()], &catalog);
        let reverse = RoleResolver::resolve(&user, &[auditors, editors], &catalog);

        assert_eq!(forward, reverse);
        assert!(forward.contains("ROLE_REPORTS"));
        assert!(!forward.contains("ROLE_EDITOR"));
        assert!(!forward.contains("ROLE_ARCHIVE"));
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let mut user = User::new("google", "g-1", "Alice");
        user.grant_permission("REPORTS");
        let catalog = vec![Permission::new("REPORTS")];

        let first = RoleResolver::resolve(&user, &[], &catalog);
        let second = RoleResolver::resolve(&user, &[], &catalog);
        assert_eq!(first, second);
    }
}

mod provisioning_rules {
    use super::*;
    use regex::Regex;

    #[test]
    fn corp_pattern_rejects_outside_email() {
        let pattern = Regex::new(r"^.+@corp\.com$").unwrap();
        assert!(!registration_allowed(Some(&pattern), Some("a@other.com")));
        assert!(registration_allowed(Some(&pattern), Some("a@corp.com")));
    }

    #[test]
    fn frozen_returning_user_keeps_profile() {
        let mut user = User::from_oauth_response(&oauth_response("g-1", "Alice", "alice@corp.com"));
        user.set_frozen(true);

        user.apply_signin(&oauth_response("g-1", "New Name", "new@corp.com"));

        assert_eq!(user.nickname, "Alice");
        assert_eq!(user.contact.as_deref(), Some("alice@corp.com"));
        assert_eq!(user.signin_count, 2);
    }

    #[test]
    fn first_signin_counts_once() {
        let user = User::from_oauth_response(&oauth_response("g-1", "Alice", "alice@corp.com"));
        assert_eq!(user.signin_count, 1);
        assert!(!user.is_admin);
        assert!(!user.is_frozen);
    }

    #[test]
    fn reserved_permission_names_flagged() {
        assert!(is_reserved_name("USER"));
        assert!(is_reserved_name("admin"));
        assert!(!is_reserved_name("EDITOR"));
    }
}

mod sessions {
    use super::*;

    #[test]
    fn resolved_roles_survive_token_round_trip() {
        let mut user = User::new("google", "g-1", "Alice");
        user.grant_permission("REPORTS");
        let catalog = vec![Permission::new("REPORTS")];
        let roles = RoleResolver::resolve(&user, &[], &catalog);

        let service = SessionService::new(SessionConfig {
            secret_key: "integration-test-secret".to_string(),
            ..SessionConfig::default()
        });

        let token = service
            .issue(&AuthenticatedUser { user, roles: roles.clone() })
            .unwrap();
        let claims = service.validate(&token).unwrap();

        let round_tripped: BTreeSet<String> = claims.roles.into_iter().collect();
        assert_eq!(round_tripped, roles);
    }
}
