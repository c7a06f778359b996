//! Shared infrastructure for Gatehouse services.

pub mod logging;
