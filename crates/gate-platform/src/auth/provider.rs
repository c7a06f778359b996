//! OAuth User Provider
//!
//! Provisions users from external OAuth sign-ins and resolves their
//! effective roles. The OAuth handshake itself happens upstream; this
//! service consumes the verified response payload.

use std::collections::BTreeSet;
use std::sync::Arc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::auth::role_resolver::RoleResolver;
use crate::group::repository::GroupRepository;
use crate::permission::repository::PermissionRepository;
use crate::shared::error::{AdminError, Result};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Verified response from the external identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OAuthUserResponse {
    /// Identity provider name (e.g. "google")
    pub resource_owner: String,

    /// Subject id at the provider
    pub resource_owner_id: String,

    /// Display name reported by the provider
    pub real_name: String,

    /// Email reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Profile picture URL reported by the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
}

/// A signed-in user together with the roles resolved for this session.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub roles: BTreeSet<String>,
}

/// Check a first-registration email against the restriction pattern.
/// No pattern means registration is open.
pub fn registration_allowed(restriction: Option<&Regex>, email: Option<&str>) -> bool {
    match restriction {
        Some(pattern) => email.map(|e| pattern.is_match(e)).unwrap_or(false),
        None => true,
    }
}

/// OAuth user provider: sign-in upsert plus role resolution.
pub struct OAuthUserProvider {
    users: Arc<UserRepository>,
    groups: Arc<GroupRepository>,
    permissions: Arc<PermissionRepository>,
    registration_restriction: Option<Regex>,
}

impl OAuthUserProvider {
    pub fn new(
        users: Arc<UserRepository>,
        groups: Arc<GroupRepository>,
        permissions: Arc<PermissionRepository>,
        registration_restriction: Option<Regex>,
    ) -> Self {
        Self {
            users,
            groups,
            permissions,
            registration_restriction,
        }
    }

    /// Handle a completed external sign-in.
    ///
    /// Unknown identities are registered (subject to the restriction
    /// pattern); returning users get a profile refresh unless frozen, and
    /// their sign-in count incremented either way. The returned roles are
    /// computed fresh from the current permission graph and are not
    /// persisted.
    pub async fn authenticate(&self, response: &OAuthUserResponse) -> Result<AuthenticatedUser> {
        let existing = self
            .users
            .find_by_resource_owner(&response.resource_owner, &response.resource_owner_id)
            .await?;

        let user = match existing {
            None => {
                // Restriction applies to first registration only
                if !registration_allowed(self.registration_restriction.as_ref(), response.email.as_deref()) {
                    info!(
                        resource_owner = %response.resource_owner,
                        email = response.email.as_deref().unwrap_or("<none>"),
                        "Registration rejected by restriction pattern"
                    );
                    return Err(AdminError::RegistrationRestricted {
                        email: response.email.clone().unwrap_or_default(),
                    });
                }

                let user = User::from_oauth_response(response);
                self.users.insert(&user).await?;
                info!(
                    user_id = %user.id,
                    resource_owner = %user.resource_owner,
                    "Registered new user"
                );
                user
            }
            Some(mut user) => {
                user.apply_signin(response);
                self.users.update(&user).await?;
                debug!(
                    user_id = %user.id,
                    signin_count = user.signin_count,
                    frozen = user.is_frozen,
                    "Returning user signed in"
                );
                user
            }
        };

        self.with_roles(user).await
    }

    /// Load a user by its external identity pair, with freshly resolved
    /// roles. Used to rebuild a session without a new provider round-trip.
    pub async fn load_user(
        &self,
        resource_owner: &str,
        resource_owner_id: &str,
    ) -> Result<Option<AuthenticatedUser>> {
        match self
            .users
            .find_by_resource_owner(resource_owner, resource_owner_id)
            .await?
        {
            Some(user) => Ok(Some(self.with_roles(user).await?)),
            None => Ok(None),
        }
    }

    /// Resolve roles against a fresh snapshot of the user's groups and the
    /// permission catalog. A catalog read failure fails the whole request;
    /// a partial role set is never returned.
    async fn with_roles(&self, user: User) -> Result<AuthenticatedUser> {
        let groups = self.groups.find_by_ids(&user.groups).await?;
        let catalog = self.permissions.find_all().await?;
        let roles = RoleResolver::resolve(&user, &groups, &catalog);
        Ok(AuthenticatedUser { user, roles })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_open_without_pattern() {
        assert!(registration_allowed(None, Some("anyone@anywhere.net")));
        assert!(registration_allowed(None, None));
    }

    #[test]
    fn test_registration_pattern_filters_email() {
        let pattern = Regex::new(r"^.+@corp\.com$").unwrap();
        assert!(registration_allowed(Some(&pattern), Some("a@corp.com")));
        assert!(!registration_allowed(Some(&pattern), Some("a@other.com")));
    }

    #[test]
    fn test_registration_pattern_rejects_missing_email() {
        let pattern = Regex::new(r"^.+@corp\.com$").unwrap();
        assert!(!registration_allowed(Some(&pattern), None));
    }
}
