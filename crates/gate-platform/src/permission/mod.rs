//! Permission Aggregate
//!
//! The permission catalog and its grant index.

pub mod entity;
pub mod repository;
pub mod api;
pub mod operations;

pub use entity::{Permission, RESERVED_NAMES, ROLE_PREFIX};
pub use repository::PermissionRepository;
pub use api::{permissions_router, PermissionsState};
