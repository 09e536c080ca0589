pub mod cookie;
pub mod jwt;
pub mod otp;
pub mod slug;

pub use slug::{format_slug, is_reserved, normalize_slug};
