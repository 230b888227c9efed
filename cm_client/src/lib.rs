//! Internal modules for the chef marketplace client.
//!
//! This library provides the session context, API client and command parsing
//! used by the cm_client binary.

pub mod api_client;
pub mod commands;
pub mod session;
