//! Gateway token authorizer: verifies an RS256 identity token against a
//! lazily fetched public key and answers with an allow/deny policy document.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
