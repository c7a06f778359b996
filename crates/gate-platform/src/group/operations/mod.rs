//! Group Operations
//!
//! Use cases for group management.

pub mod events;
pub mod create;
pub mod update;
pub mod delete;

pub use events::*;
pub use create::{CreateGroupCommand, CreateGroupUseCase};
pub use update::{UpdateGroupCommand, UpdateGroupUseCase};
pub use delete::{DeleteGroupCommand, DeleteGroupUseCase};
