//! Group Aggregate
//!
//! Groups bundle permission grants and denials for their members.

pub mod entity;
pub mod repository;
pub mod api;
pub mod operations;

pub use entity::Group;
pub use repository::GroupRepository;
pub use api::{groups_router, GroupsState};
