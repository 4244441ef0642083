pub mod admin;
pub mod views;
