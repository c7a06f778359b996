//! Permission Operations
//!
//! Use cases for permission management.

pub mod events;
pub mod create;
pub mod delete;

pub use events::*;
pub use create::{CreatePermissionCommand, CreatePermissionUseCase};
pub use delete::{DeletePermissionCommand, DeletePermissionUseCase};
