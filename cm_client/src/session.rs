//! Client session state.
//!
//! [`SessionState`] only changes through [`SessionContext::dispatch`], which
//! runs the pure [`reduce`] function over a closed set of [`SessionAction`]s
//! and publishes the result on a watch channel. Consumers read the state via
//! [`SessionContext::state`] or [`SessionContext::subscribe`].
//!
//! Concurrent operations are not serialized: whichever dispatch lands last
//! wins.

use chef_market::auth::{
    ChefProfilePayload, LoginPayload, ProfileUpdatePayload, PublicUser, RegisterPayload,
};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use crate::api_client::{AuthApi, ClientError};

/// Message returned when an operation needs a signed-in user
pub const SIGN_IN_MESSAGE: &str = "Please sign in";

/// Authentication state visible to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub profile: Option<PublicUser>,
    pub is_loading: bool,
}

impl Default for SessionState {
    /// Loading until the first session check resolves
    fn default() -> Self {
        Self {
            is_authenticated: false,
            profile: None,
            is_loading: true,
        }
    }
}

/// State transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    SetLoading(bool),
    /// A session was established for this user
    SetUser(PublicUser),
    /// The server returned an updated view of the signed-in user
    MergeProfile(PublicUser),
    Logout,
}

/// Pure transition function
pub fn reduce(state: &SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::SetLoading(is_loading) => SessionState {
            is_loading,
            ..state.clone()
        },
        SessionAction::SetUser(user) => SessionState {
            is_authenticated: true,
            profile: Some(user),
            is_loading: false,
        },
        // Updates for a session that has since ended are ignored
        SessionAction::MergeProfile(user) if state.is_authenticated => SessionState {
            is_authenticated: true,
            profile: Some(user),
            is_loading: false,
        },
        SessionAction::MergeProfile(_) => SessionState {
            is_loading: false,
            ..state.clone()
        },
        SessionAction::Logout => SessionState {
            is_authenticated: false,
            profile: None,
            is_loading: false,
        },
    }
}

/// Outcome of a session operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpResult {
    pub result: bool,
    /// Error messages, empty on success
    pub message: Vec<String>,
}

impl OpResult {
    pub fn ok() -> Self {
        Self {
            result: true,
            message: Vec::new(),
        }
    }

    pub fn failed(message: Vec<String>) -> Self {
        Self {
            result: false,
            message,
        }
    }
}

impl From<&ClientError> for OpResult {
    fn from(err: &ClientError) -> Self {
        OpResult::failed(err.messages())
    }
}

/// Session operations over an [`AuthApi`] transport.
///
/// No operation returns an error: failures are reported through [`OpResult`].
pub struct SessionContext<A: AuthApi> {
    api: A,
    state: watch::Sender<SessionState>,
    mounted: AtomicBool,
}

impl<A: AuthApi> SessionContext<A> {
    /// Create a mounted context in the initial loading state
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            state,
            mounted: AtomicBool::new(true),
        }
    }

    /// Underlying transport
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Tear the context down. Later dispatches are dropped.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Apply an action. Returns false if the context is no longer mounted.
    pub fn dispatch(&self, action: SessionAction) -> bool {
        if !self.is_mounted() {
            log::debug!("Dropping {:?} after unmount", action);
            return false;
        }

        self.state.send_modify(|state| {
            let next = reduce(state, action);
            *state = next;
        });
        true
    }

    /// Create an account and sign in
    pub async fn register(&self, payload: RegisterPayload) -> OpResult {
        self.dispatch(SessionAction::SetLoading(true));

        match self.api.register(&payload).await {
            Ok(session) => {
                log::info!("Registered {}", session.user.email);
                self.dispatch(SessionAction::SetUser(session.user));
                OpResult::ok()
            }
            Err(err) => {
                log::debug!("Registration failed: {}", err);
                self.dispatch(SessionAction::SetLoading(false));
                OpResult::from(&err)
            }
        }
    }

    /// Sign in with email and password
    pub async fn login(&self, payload: LoginPayload) -> OpResult {
        self.dispatch(SessionAction::SetLoading(true));

        match self.api.login(&payload).await {
            Ok(session) => {
                log::info!("Signed in as {}", session.user.email);
                self.dispatch(SessionAction::SetUser(session.user));
                OpResult::ok()
            }
            Err(err) => {
                log::debug!("Login failed: {}", err);
                self.dispatch(SessionAction::SetLoading(false));
                OpResult::from(&err)
            }
        }
    }

    /// Resolve an existing session. Any failure leaves the context logged out.
    pub async fn check_session(&self) -> OpResult {
        self.dispatch(SessionAction::SetLoading(true));

        match self.api.current_session().await {
            Ok(session) => {
                self.dispatch(SessionAction::SetUser(session.user));
                OpResult::ok()
            }
            Err(err) => {
                log::debug!("No active session: {}", err);
                self.dispatch(SessionAction::Logout);
                OpResult::from(&err)
            }
        }
    }

    /// Log out locally, then ask the server to clear its cookie.
    ///
    /// Always succeeds: the server call is best-effort.
    pub async fn logout(&self) -> OpResult {
        self.dispatch(SessionAction::Logout);

        if let Err(err) = self.api.logout().await {
            log::warn!("Server logout failed: {}", err);
        }
        OpResult::ok()
    }

    /// Partial profile update for the signed-in user
    pub async fn update_profile(&self, payload: ProfileUpdatePayload) -> OpResult {
        if !self.state().is_authenticated {
            return OpResult::failed(vec![SIGN_IN_MESSAGE.to_string()]);
        }
        self.dispatch(SessionAction::SetLoading(true));

        match self.api.update_profile(&payload).await {
            Ok(user) => {
                self.dispatch(SessionAction::MergeProfile(user));
                OpResult::ok()
            }
            Err(err) => {
                self.dispatch(SessionAction::SetLoading(false));
                OpResult::from(&err)
            }
        }
    }

    /// Register the signed-in user as a chef
    pub async fn register_chef(&self, payload: ChefProfilePayload) -> OpResult {
        if !self.state().is_authenticated {
            return OpResult::failed(vec![SIGN_IN_MESSAGE.to_string()]);
        }

        match self.api.register_chef(&payload).await {
            Ok(user) => {
                self.dispatch(SessionAction::MergeProfile(user));
                OpResult::ok()
            }
            Err(err) => OpResult::from(&err),
        }
    }

    /// Replace the signed-in chef's cuisine specialty
    pub async fn update_chef_specialty(&self, cuisine_specialty: Vec<String>) -> OpResult {
        if !self.state().is_authenticated {
            return OpResult::failed(vec![SIGN_IN_MESSAGE.to_string()]);
        }

        match self.api.update_chef_specialty(&cuisine_specialty).await {
            Ok(user) => {
                self.dispatch(SessionAction::MergeProfile(user));
                OpResult::ok()
            }
            Err(err) => OpResult::from(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chef_market::auth::Profile;

    fn user(email: &str) -> PublicUser {
        PublicUser {
            id: uuid::Uuid::new_v4(),
            email: email.to_string(),
            is_chef: false,
            created_at: chrono::Utc::now(),
            profile: Profile::default(),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert!(!state.is_authenticated);
        assert!(state.profile.is_none());
        assert!(state.is_loading);
    }

    #[test]
    fn test_set_user_authenticates() {
        let state = reduce(
            &SessionState::default(),
            SessionAction::SetUser(user("a@b.com")),
        );

        assert!(state.is_authenticated);
        assert!(!state.is_loading);
        assert_eq!(state.profile.unwrap().email, "a@b.com");
    }

    #[test]
    fn test_set_loading_keeps_profile() {
        let signed_in = reduce(
            &SessionState::default(),
            SessionAction::SetUser(user("a@b.com")),
        );
        let loading = reduce(&signed_in, SessionAction::SetLoading(true));

        assert!(loading.is_loading);
        assert!(loading.is_authenticated);
        assert_eq!(loading.profile, signed_in.profile);
    }

    #[test]
    fn test_logout_clears_profile() {
        let signed_in = reduce(
            &SessionState::default(),
            SessionAction::SetUser(user("a@b.com")),
        );
        let state = reduce(&signed_in, SessionAction::Logout);

        assert_eq!(
            state,
            SessionState {
                is_authenticated: false,
                profile: None,
                is_loading: false,
            }
        );
    }

    #[test]
    fn test_merge_profile_after_logout_is_ignored() {
        let logged_out = reduce(&SessionState::default(), SessionAction::Logout);
        let state = reduce(&logged_out, SessionAction::MergeProfile(user("a@b.com")));

        assert!(!state.is_authenticated);
        assert!(state.profile.is_none());
    }

    #[test]
    fn test_merge_profile_replaces_view() {
        let signed_in = reduce(
            &SessionState::default(),
            SessionAction::SetUser(user("a@b.com")),
        );
        let mut updated = signed_in.profile.clone().unwrap();
        updated.profile.first_name = Some("Ada".to_string());

        let state = reduce(&signed_in, SessionAction::MergeProfile(updated));
        assert_eq!(
            state.profile.unwrap().profile.first_name.as_deref(),
            Some("Ada")
        );
    }
}
