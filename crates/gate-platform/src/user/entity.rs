//! User Entity
//!
//! Administrative account provisioned from an external OAuth identity.
//! The `(resource_owner, resource_owner_id)` pair uniquely identifies the
//! external identity; a unique index enforces it at the storage layer.
//!
//! Roles are never stored on the user. They are resolved per sign-in from
//! the membership and grant/deny sets below (see `auth::role_resolver`).

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use std::collections::HashSet;

use crate::auth::provider::OAuthUserResponse;
use crate::shared::ids::IdGenerator;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    /// External identity provider name (e.g. "google")
    pub resource_owner: String,

    /// Subject id at the identity provider
    pub resource_owner_id: String,

    /// Display name, refreshed from the provider on sign-in
    pub nickname: String,

    /// Contact email from the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    /// Profile picture URL from the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Last sign-in or profile update
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_seen: DateTime<Utc>,

    /// Number of completed sign-ins
    #[serde(default)]
    pub signin_count: i64,

    /// Administrators implicitly hold every permission
    #[serde(default)]
    pub is_admin: bool,

    /// Frozen accounts keep their stored profile across sign-ins
    #[serde(default)]
    pub is_frozen: bool,

    /// Ids of groups this user belongs to
    #[serde(default)]
    pub groups: Vec<String>,

    /// Permission names granted directly to this user
    #[serde(default)]
    pub permissions: HashSet<String>,

    /// Permission names denied directly to this user
    #[serde(default)]
    pub denied_permissions: HashSet<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user for an external identity. New accounts are
    /// neither admin nor frozen and start with a sign-in count of zero;
    /// provisioning bumps the count on the first completed sign-in.
    pub fn new(
        resource_owner: impl Into<String>,
        resource_owner_id: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IdGenerator::generate(),
            resource_owner: resource_owner.into(),
            resource_owner_id: resource_owner_id.into(),
            nickname: nickname.into(),
            contact: None,
            picture: None,
            last_seen: now,
            signin_count: 0,
            is_admin: false,
            is_frozen: false,
            groups: vec![],
            permissions: HashSet::new(),
            denied_permissions: HashSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a user from a fresh OAuth response (first registration).
    pub fn from_oauth_response(response: &OAuthUserResponse) -> Self {
        let mut user = Self::new(
            &response.resource_owner,
            &response.resource_owner_id,
            &response.real_name,
        );
        user.contact = response.email.clone();
        user.picture = response.profile_picture_url.clone();
        user.signin_count = 1;
        user
    }

    /// Apply a returning sign-in: refresh profile fields unless the
    /// account is frozen, and always count the sign-in. Freezing affects
    /// profile sync only, never authorization.
    pub fn apply_signin(&mut self, response: &OAuthUserResponse) {
        if !self.is_frozen {
            self.nickname = response.real_name.clone();
            self.contact = response.email.clone();
            self.picture = response.profile_picture_url.clone();
        }
        self.signin_count += 1;
        self.last_seen = Utc::now();
        self.updated_at = self.last_seen;
    }

    pub fn join_group(&mut self, group_id: impl Into<String>) {
        let id = group_id.into();
        if !self.groups.contains(&id) {
            self.groups.push(id);
            self.updated_at = Utc::now();
        }
    }

    pub fn leave_group(&mut self, group_id: &str) {
        self.groups.retain(|g| g != group_id);
        self.updated_at = Utc::now();
    }

    pub fn is_member_of(&self, group_id: &str) -> bool {
        self.groups.iter().any(|g| g == group_id)
    }

    pub fn grant_permission(&mut self, name: impl Into<String>) {
        self.permissions.insert(name.into());
        self.updated_at = Utc::now();
    }

    pub fn revoke_permission(&mut self, name: &str) {
        self.permissions.remove(name);
        self.updated_at = Utc::now();
    }

    pub fn deny_permission(&mut self, name: impl Into<String>) {
        self.denied_permissions.insert(name.into());
        self.updated_at = Utc::now();
    }

    pub fn undeny_permission(&mut self, name: &str) {
        self.denied_permissions.remove(name);
        self.updated_at = Utc::now();
    }

    pub fn set_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin;
        self.updated_at = Utc::now();
    }

    pub fn set_frozen(&mut self, is_frozen: bool) {
        self.is_frozen = is_frozen;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(name: &str, email: &str) -> OAuthUserResponse {
        OAuthUserResponse {
            resource_owner: "google".to_string(),
            resource_owner_id: "g-123".to_string(),
            real_name: name.to_string(),
            email: Some(email.to_string()),
            profile_picture_url: Some("https://pics.example/a.png".to_string()),
        }
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("google", "g-123", "Alice");
        assert!(!user.is_admin);
        assert!(!user.is_frozen);
        assert_eq!(user.signin_count, 0);
        assert!(user.groups.is_empty());
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn test_from_oauth_response() {
        let user = User::from_oauth_response(&response("Alice", "alice@corp.com"));
        assert_eq!(user.nickname, "Alice");
        assert_eq!(user.contact.as_deref(), Some("alice@corp.com"));
        assert_eq!(user.signin_count, 1);
    }

    #[test]
    fn test_signin_refreshes_profile() {
        let mut user = User::from_oauth_response(&response("Alice", "alice@corp.com"));
        user.apply_signin(&response("Alice Smith", "a.smith@corp.com"));

        assert_eq!(user.nickname, "Alice Smith");
        assert_eq!(user.contact.as_deref(), Some("a.smith@corp.com"));
        assert_eq!(user.signin_count, 2);
    }

    #[test]
    fn test_frozen_signin_keeps_profile_but_counts() {
        let mut user = User::from_oauth_response(&response("Alice", "alice@corp.com"));
        user.set_frozen(true);
        user.apply_signin(&response("Someone Else", "other@corp.com"));

        assert_eq!(user.nickname, "Alice");
        assert_eq!(user.contact.as_deref(), Some("alice@corp.com"));
        assert_eq!(user.signin_count, 2);
    }

    #[test]
    fn test_group_membership_is_idempotent() {
        let mut user = User::new("google", "g-123", "Alice");
        user.join_group("G1");
        user.join_group("G1");
        assert_eq!(user.groups.len(), 1);

        user.leave_group("G1");
        assert!(!user.is_member_of("G1"));
    }

    #[test]
    fn test_grant_and_deny_sets() {
        let mut user = User::new("google", "g-123", "Alice");
        user.grant_permission("REPORTS");
        user.grant_permission("REPORTS");
        user.deny_permission("EDITOR");

        assert_eq!(user.permissions.len(), 1);
        assert!(user.denied_permissions.contains("EDITOR"));

        user.revoke_permission("REPORTS");
        user.undeny_permission("EDITOR");
        assert!(user.permissions.is_empty());
        assert!(user.denied_permissions.is_empty());
    }
}
