//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup. The unique
//! index on the users resource-owner pair is what turns a first-login
//! insert race into a conflict instead of a duplicate row.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_user_indexes(db).await?;
    create_group_indexes(db).await?;
    create_permission_indexes(db).await?;
    create_audit_log_indexes(db).await?;

    info!("MongoDB indexes initialized");
    Ok(())
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let users = db.collection::<mongodb::bson::Document>("users");

    // External identity lookup (unique pair)
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "resourceOwner": 1, "resourceOwnerId": 1 })
                .options(IndexOptions::builder().unique(true).background(true).build())
                .build(),
        )
        .await?;

    // List ordering and filter support
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "nickname": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    // Membership queries
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "groups": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on users");
    Ok(())
}

async fn create_group_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let groups = db.collection::<mongodb::bson::Document>("groups");

    groups
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().unique(true).background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on groups");
    Ok(())
}

async fn create_permission_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let permissions = db.collection::<mongodb::bson::Document>("permissions");

    permissions
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().unique(true).background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on permissions");
    Ok(())
}

async fn create_audit_log_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let audit_logs = db.collection::<mongodb::bson::Document>("audit_logs");

    audit_logs
        .create_index(
            IndexModel::builder()
                .keys(doc! { "performedAt": -1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    audit_logs
        .create_index(
            IndexModel::builder()
                .keys(doc! { "entityType": 1, "entityId": 1 })
                .options(IndexOptions::builder().background(true).build())
                .build(),
        )
        .await?;

    info!("Created indexes on audit_logs");
    Ok(())
}
