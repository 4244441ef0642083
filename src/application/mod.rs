//! Application services: use cases over the repository traits.

pub mod admin;
pub mod auth;
pub mod bootstrap;
pub mod chrome;
pub mod error;
pub mod feed;
pub mod markdown;
pub mod page;
pub mod pagination;
pub mod post;
pub mod repos;
pub mod syndication;
