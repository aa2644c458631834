pub mod auth;
pub mod key;
