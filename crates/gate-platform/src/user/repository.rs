//! User Repository

use mongodb::{bson::doc, Collection, Database};
use futures::TryStreamExt;
use crate::shared::error::{is_duplicate_key, AdminError, Result};
use crate::user::entity::User;

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    /// Insert a new user. A concurrent first registration for the same
    /// identity trips the unique index and surfaces as a conflict.
    pub async fn insert(&self, user: &User) -> Result<()> {
        self.collection.insert_one(user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AdminError::duplicate(
                    "User",
                    "resourceOwner",
                    format!("{}:{}", user.resource_owner, user.resource_owner_id),
                )
            } else {
                AdminError::Database(e)
            }
        })?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Lookup by the external identity pair.
    pub async fn find_by_resource_owner(
        &self,
        resource_owner: &str,
        resource_owner_id: &str,
    ) -> Result<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! {
                "resourceOwner": resource_owner,
                "resourceOwnerId": resource_owner_id,
            })
            .await?)
    }

    /// Substring filter over nickname and contact, paged.
    pub async fn find_page(&self, filter: Option<&str>, offset: u64, limit: i64) -> Result<Vec<User>> {
        let query = Self::filter_query(filter);
        let cursor = self
            .collection
            .find(query)
            .sort(doc! { "nickname": 1 })
            .skip(offset)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self, filter: Option<&str>) -> Result<u64> {
        Ok(self.collection.count_documents(Self::filter_query(filter)).await?)
    }

    /// Members of a group, paged, with an optional nickname/contact filter.
    pub async fn find_by_group(
        &self,
        group_id: &str,
        member: bool,
        filter: Option<&str>,
        offset: u64,
        limit: i64,
    ) -> Result<Vec<User>> {
        let mut query = Self::filter_query(filter);
        if member {
            query.insert("groups", group_id);
        } else {
            query.insert("groups", doc! { "$ne": group_id });
        }
        let cursor = self
            .collection
            .find(query)
            .sort(doc! { "nickname": 1 })
            .skip(offset)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_group(&self, group_id: &str, member: bool, filter: Option<&str>) -> Result<u64> {
        let mut query = Self::filter_query(filter);
        if member {
            query.insert("groups", group_id);
        } else {
            query.insert("groups", doc! { "$ne": group_id });
        }
        Ok(self.collection.count_documents(query).await?)
    }

    pub async fn update(&self, user: &User) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &user.id }, user)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Drop a group id from every user that carries it.
    pub async fn remove_group_refs(&self, group_id: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "groups": group_id },
                doc! { "$pull": { "groups": group_id } },
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Drop a permission name from every user's grant and deny sets.
    pub async fn remove_permission_refs(&self, permission_name: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! {
                    "$or": [
                        { "permissions": permission_name },
                        { "deniedPermissions": permission_name },
                    ]
                },
                doc! {
                    "$pull": {
                        "permissions": permission_name,
                        "deniedPermissions": permission_name,
                    }
                },
            )
            .await?;
        Ok(result.modified_count)
    }

    fn filter_query(filter: Option<&str>) -> mongodb::bson::Document {
        match filter {
            Some(text) if !text.is_empty() => {
                let pattern = regex::escape(text);
                doc! {
                    "$or": [
                        { "nickname": { "$regex": &pattern, "$options": "i" } },
                        { "contact": { "$regex": &pattern, "$options": "i" } },
                    ]
                }
            }
            _ => doc! {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_escapes_regex() {
        let query = UserRepository::filter_query(Some("a.b+c"));
        let or = query.get_array("$or").unwrap();
        let nickname = or[0].as_document().unwrap().get_document("nickname").unwrap();
        assert_eq!(nickname.get_str("$regex").unwrap(), r"a\.b\+c");
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert!(UserRepository::filter_query(None).is_empty());
        assert!(UserRepository::filter_query(Some("")).is_empty());
    }
}
