//! Shared helpers.

pub mod id;
pub mod time;
