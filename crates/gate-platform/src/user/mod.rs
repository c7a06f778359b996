//! User Aggregate
//!
//! OAuth-provisioned accounts and their administration.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::User;
pub use repository::UserRepository;
pub use api::{users_router, UsersState};
