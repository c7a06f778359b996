//! Permission Entity
//!
//! Catalog entry plus a queryable index of its grants. The user and group
//! documents hold permission names; each permission holds the reverse id
//! sets so "who has this?" is a single document read. Neither side owns
//! the other.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use std::collections::HashSet;

use crate::shared::ids::IdGenerator;

/// Names that collide with the base and admin role tokens. Creating a
/// permission with one of these (any casing) is rejected.
pub const RESERVED_NAMES: &[&str] = &["USER", "ADMIN"];

/// Prefix for permission-derived role tokens.
pub const ROLE_PREFIX: &str = "ROLE_";

/// Check whether a permission name collides with a reserved role token.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name.trim()))
}

/// Permission entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(rename = "_id")]
    pub id: String,

    /// Permission name, uppercase by convention (unique)
    pub name: String,

    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Ids of users granted this permission directly
    #[serde(default)]
    pub granted_users: HashSet<String>,

    /// Ids of users denied this permission directly
    #[serde(default)]
    pub denied_users: HashSet<String>,

    /// Ids of groups granted this permission
    #[serde(default)]
    pub granted_groups: HashSet<String>,

    /// Ids of groups denied this permission
    #[serde(default)]
    pub denied_groups: HashSet<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Permission {
    /// Create a permission, normalizing the name to uppercase.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: IdGenerator::generate(),
            name: name.into().trim().to_uppercase(),
            notes: None,
            granted_users: HashSet::new(),
            denied_users: HashSet::new(),
            granted_groups: HashSet::new(),
            denied_groups: HashSet::new(),
            created_at: now,
            updated_at: now,
            created_by: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Role token this permission contributes when granted.
    pub fn role_token(&self) -> String {
        format!("{}{}", ROLE_PREFIX, self.name)
    }

    pub fn grant_to_user(&mut self, user_id: impl Into<String>) {
        self.granted_users.insert(user_id.into());
        self.updated_at = Utc::now();
    }

    pub fn revoke_from_user(&mut self, user_id: &str) {
        self.granted_users.remove(user_id);
        self.updated_at = Utc::now();
    }

    pub fn deny_to_user(&mut self, user_id: impl Into<String>) {
        self.denied_users.insert(user_id.into());
        self.updated_at = Utc::now();
    }

    pub fn undeny_for_user(&mut self, user_id: &str) {
        self.denied_users.remove(user_id);
        self.updated_at = Utc::now();
    }

    pub fn grant_to_group(&mut self, group_id: impl Into<String>) {
        self.granted_groups.insert(group_id.into());
        self.updated_at = Utc::now();
    }

    pub fn revoke_from_group(&mut self, group_id: &str) {
        self.granted_groups.remove(group_id);
        self.updated_at = Utc::now();
    }

    pub fn deny_to_group(&mut self, group_id: impl Into<String>) {
        self.denied_groups.insert(group_id.into());
        self.updated_at = Utc::now();
    }

    pub fn undeny_for_group(&mut self, group_id: &str) {
        self.denied_groups.remove(group_id);
        self.updated_at = Utc::now();
    }

    /// Drop every reference to a user id.
    pub fn remove_user_refs(&mut self, user_id: &str) {
        self.granted_users.remove(user_id);
        self.denied_users.remove(user_id);
        self.updated_at = Utc::now();
    }

    /// Drop every reference to a group id.
    pub fn remove_group_refs(&mut self, group_id: &str) {
        self.granted_groups.remove(group_id);
        self.denied_groups.remove(group_id);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_normalized() {
        let permission = Permission::new("  editor ");
        assert_eq!(permission.name, "EDITOR");
        assert_eq!(permission.role_token(), "ROLE_EDITOR");
    }

    #[test]
    fn test_reserved_names_case_insensitive() {
        assert!(is_reserved_name("USER"));
        assert!(is_reserved_name("admin"));
        assert!(is_reserved_name(" Admin "));
        assert!(!is_reserved_name("EDITOR"));
        assert!(!is_reserved_name("ADMINISTRATOR"));
    }

    #[test]
    fn test_grant_index_round_trip() {
        let mut permission = Permission::new("EDITOR");
        permission.grant_to_user("U1");
        permission.deny_to_user("U2");
        permission.grant_to_group("G1");
        permission.deny_to_group("G2");

        assert!(permission.granted_users.contains("U1"));
        assert!(permission.denied_users.contains("U2"));
        assert!(permission.granted_groups.contains("G1"));
        assert!(permission.denied_groups.contains("G2"));

        permission.remove_user_refs("U1");
        permission.remove_group_refs("G2");
        assert!(!permission.granted_users.contains("U1"));
        assert!(!permission.denied_groups.contains("G2"));
    }
}
