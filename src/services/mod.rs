pub mod auth;
pub mod cache;
pub mod email;
pub mod page;
