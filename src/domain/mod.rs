//! Domain layer types and invariants.

pub mod archive;
pub mod blog_config;
pub mod comments;
pub mod entities;
pub mod forms;
pub mod slug;
pub mod tags;
