//! HTTP server for chef marketplace authentication.
//!
//! Exposes registration, login, session checks and profile updates over a
//! JSON API, with the session token carried in an `HttpOnly` cookie.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
