//! Development Data Seeder
//!
//! Seeds a small permission graph on startup in dev mode so the admin
//! APIs and sign-in flow have something to work against:
//!
//!   admin user:   dev/admin-1 (isAdmin)
//!   regular user: dev/user-1, member of "editors"
//!   permissions:  EDITOR (granted to "editors"), REPORTS

use mongodb::Database;
use tracing::info;

use crate::group::entity::Group;
use crate::group::repository::GroupRepository;
use crate::permission::entity::Permission;
use crate::permission::repository::PermissionRepository;
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Development data seeder
pub struct DevDataSeeder {
    db: Database,
}

impl DevDataSeeder {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Seed all development data. Skips anything that already exists.
    pub async fn seed(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Seeding development data...");

        let permission_names = self.seed_permissions().await?;
        let editors_id = self.seed_groups(&permission_names).await?;
        self.seed_users(&editors_id).await?;

        info!("Development data seeded");
        info!("  Admin:   dev/admin-1 (Site Admin)");
        info!("  Regular: dev/user-1 (Pat Writer, member of editors)");
        Ok(())
    }

    async fn seed_permissions(&self) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let repo = PermissionRepository::new(&self.db);
        let mut names = Vec::new();

        for name in ["EDITOR", "REPORTS"] {
            if repo.find_by_name(name).await?.is_none() {
                repo.insert(&Permission::new(name)).await?;
                info!(permission = name, "Seeded permission");
            }
            names.push(name.to_string());
        }

        Ok(names)
    }

    async fn seed_groups(&self, permissions: &[String]) -> Result<String, Box<dyn std::error::Error>> {
        let group_repo = GroupRepository::new(&self.db);
        let permission_repo = PermissionRepository::new(&self.db);

        if let Some(existing) = group_repo.find_by_name("editors").await? {
            return Ok(existing.id);
        }

        let mut editors = Group::new("editors").with_notes("Content editors");
        if let Some(name) = permissions.first() {
            editors.grant_permission(name);
            if let Some(mut permission) = permission_repo.find_by_name(name).await? {
                permission.grant_to_group(&editors.id);
                permission_repo.update(&permission).await?;
            }
        }

        group_repo.insert(&editors).await?;
        info!(group = %editors.name, "Seeded group");
        Ok(editors.id)
    }

    async fn seed_users(&self, editors_id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let repo = UserRepository::new(&self.db);

        if repo.find_by_resource_owner("dev", "admin-1").await?.is_none() {
            let mut admin = User::new("dev", "admin-1", "Site Admin");
            admin.contact = Some("admin@gatehouse.local".to_string());
            admin.set_admin(true);
            repo.insert(&admin).await?;
            info!("Seeded admin user");
        }

        if repo.find_by_resource_owner("dev", "user-1").await?.is_none() {
            let mut user = User::new("dev", "user-1", "Pat Writer");
            user.contact = Some("pat@gatehouse.local".to_string());
            user.join_group(editors_id);
            repo.insert(&user).await?;
            info!("Seeded regular user");
        }

        Ok(())
    }
}
