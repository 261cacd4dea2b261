pub mod admin;
pub mod auth;
pub mod item;
pub mod message;
