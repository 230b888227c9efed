//! Structured logging configuration.
//!
//! Console logging through `tracing-subscriber`, plus helpers for the
//! security events the auth endpoints emit.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var and default to
/// `info,sqlx=warn,hyper=warn`.
///
/// # Example
///
/// ```no_run
/// use cm_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Security event categories emitted by the auth endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityEvent {
    FailedLogin,
    DuplicateRegistration,
    RejectedSession,
    StaleSession,
}

impl SecurityEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityEvent::FailedLogin => "failed_login",
            SecurityEvent::DuplicateRegistration => "duplicate_registration",
            SecurityEvent::RejectedSession => "rejected_session",
            SecurityEvent::StaleSession => "stale_session",
        }
    }
}

/// Log security event with structured data
///
/// Emails are logged as given; passwords and tokens must never be passed in.
///
/// # Example
///
/// ```
/// use cm_server::logging::{SecurityEvent, log_security_event};
///
/// log_security_event(
///     SecurityEvent::FailedLogin,
///     Some("cook@example.com"),
///     "Invalid credentials",
/// );
/// ```
pub fn log_security_event(event: SecurityEvent, email: Option<&str>, message: &str) {
    tracing::warn!(
        event_type = event.as_str(),
        email = email,
        "SECURITY: {}",
        message
    );
}
