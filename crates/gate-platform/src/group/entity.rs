//! Group Entity
//!
//! Named collection of users carrying shared permission grants and
//! denials. Membership is stored on the user side; a group document only
//! holds its grant and deny sets.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use std::collections::HashSet;

use crate::shared::ids::IdGenerator;

/// Group entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: String,

    /// Group name (unique)
    pub name: String,

    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Permission names granted to members
    #[serde(default)]
    pub permissions: HashSet<String>,

    /// Permission names denied to members
    #[serde(default)]
    pub denied_permissions: HashSet<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: IdGenerator::generate(),
            name: name.into(),
            notes: None,
            permissions: HashSet::new(),
            denied_permissions: HashSet::new(),
            created_at: now,
            updated_at: now,
            created_by: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group() {
        let group = Group::new("editors").with_notes("newsroom staff");
        assert_eq!(group.name, "editors");
        assert_eq!(group.notes.as_deref(), Some("newsroom staff"));
        assert!(group.permissions.is_empty());
    }

    #[test]
    fn test_grant_and_deny() {
        let mut group = Group::new("editors");
        group.grant_permission("EDITOR");
        group.grant_permission("EDITOR");
        group.deny_permission("REPORTS");

        assert_eq!(group.permissions.len(), 1);
        assert!(group.denied_permissions.contains("REPORTS"));

        group.revoke_permission("EDITOR");
        group.undeny_permission("REPORTS");
        assert!(group.permissions.is_empty());
        assert!(group.denied_permissions.is_empty());
    }
}
