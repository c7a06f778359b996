//! Group Repository

use mongodb::{bson::doc, Collection, Database};
use futures::TryStreamExt;
use crate::group::entity::Group;
use crate::shared::error::Result;

pub struct GroupRepository {
    collection: Collection<Group>,
}

impl GroupRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("groups"),
        }
    }

    pub async fn insert(&self, group: &Group) -> Result<()> {
        self.collection.insert_one(group).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Group>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Group>> {
        Ok(self.collection.find_one(doc! { "name": name }).await?)
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Group>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Substring filter over name and notes, paged.
    pub async fn find_page(&self, filter: Option<&str>, offset: u64, limit: i64) -> Result<Vec<Group>> {
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

    pub async fn update(&self, group: &Group) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &group.id }, group)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Drop a permission name from every group's grant and deny sets.
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
                        { "name": { "$regex": &pattern, "$options": "i" } },
                        { "notes": { "$regex": &pattern, "$options": "i" } },
                    ]
                }
            }
            _ => doc! {},
        }
    }
}
