//! Permission Repository

use mongodb::{bson::doc, Collection, Database};
use futures::TryStreamExt;
use crate::permission::entity::Permission;
use crate::shared::error::Result;

pub struct PermissionRepository {
    collection: Collection<Permission>,
}

impl PermissionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("permissions"),
        }
    }

    pub async fn insert(&self, permission: &Permission) -> Result<()> {
        self.collection.insert_one(permission).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Permission>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Permission>> {
        Ok(self
            .collection
            .find_one(doc! { "name": name.to_uppercase() })
            .await?)
    }

    /// Full catalog scan, used by the role resolver for admin users.
    pub async fn find_all(&self) -> Result<Vec<Permission>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Substring filter over the name, paged.
    pub async fn find_page(&self, filter: Option<&str>, offset: u64, limit: i64) -> Result<Vec<Permission>> {
        let cursor = self
            .collection
            .find(Self::filter_query(filter))
            .sort(doc! { "name": 1 })
            .skip(offset)
            .limit(limit)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self, filter: Option<&str>) -> Result<u64> {
        Ok(self.collection.count_documents(Self::filter_query(filter)).await?)
    }

    pub async fn update(&self, permission: &Permission) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &permission.id }, permission)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Drop a user id from every permission's grant and deny index.
    pub async fn remove_user_refs(&self, user_id: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! {
                    "$or": [
                        { "grantedUsers": user_id },
                        { "deniedUsers": user_id },
                    ]
                },
                doc! {
                    "$pull": {
                        "grantedUsers": user_id,
                        "deniedUsers": user_id,
                    }
                },
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Drop a group id from every permission's grant and deny index.
    pub async fn remove_group_refs(&self, group_id: &str) -> Result<u64> {
        let result = self
            .collection
            .update_many(
                doc! {
                    "$or": [
                        { "grantedGroups": group_id },
                        { "deniedGroups": group_id },
                    ]
                },
                doc! {
                    "$pull": {
                        "grantedGroups": group_id,
                        "deniedGroups": group_id,
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
                doc! { "name": { "$regex": &pattern, "$options": "i" } }
            }
            _ => doc! {},
        }
    }
}
