//! Session context behavior over a scripted transport.

use async_trait::async_trait;
use chef_market::auth::{
    ChefProfile, ChefProfilePayload, IssuedSession, LoginPayload, Profile, ProfileUpdatePayload,
    PublicUser, RegisterPayload,
};
use cm_client::api_client::{AuthApi, ClientError};
use cm_client::session::{SessionContext, SessionState};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted transport. `secret1` is the only accepted password and
/// `taken@example.com` is already registered.
#[derive(Default)]
struct FakeApi {
    session: Mutex<Option<PublicUser>>,
    logout_calls: Mutex<usize>,
    fail_logout: bool,
    /// When set, login waits for a permit before answering
    login_gate: Option<Arc<Notify>>,
}

fn rejected(status: u16, message: &str) -> ClientError {
    ClientError::Api {
        status,
        errors: vec![message.to_string()],
    }
}

fn user(email: &str) -> PublicUser {
    PublicUser {
        id: uuid::Uuid::new_v4(),
        email: email.to_string(),
        is_chef: false,
        created_at: chrono::Utc::now(),
        profile: Profile::default(),
    }
}

fn as_str(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

impl FakeApi {
    fn start_session(&self, email: &str) -> IssuedSession {
        let user = user(email);
        *self.session.lock().unwrap() = Some(user.clone());
        IssuedSession {
            user,
            token: "header.payload.signature".to_string(),
        }
    }

    fn signed_in(&self) -> Result<PublicUser, ClientError> {
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| rejected(401, "Please sign in"))
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn register(&self, payload: &RegisterPayload) -> Result<IssuedSession, ClientError> {
        match as_str(&payload.email) {
            None => Err(rejected(400, "Missing email")),
            Some("taken@example.com") => Err(rejected(400, "User with given email already exists")),
            Some(email) => Ok(self.start_session(email)),
        }
    }

    async fn login(&self, payload: &LoginPayload) -> Result<IssuedSession, ClientError> {
        if let Some(gate) = &self.login_gate {
            gate.notified().await;
        }
        match (as_str(&payload.email), as_str(&payload.password)) {
            (Some(email), Some("secret1")) => Ok(self.start_session(email)),
            _ => Err(rejected(400, "Email or password invalid")),
        }
    }

    async fn current_session(&self) -> Result<IssuedSession, ClientError> {
        Ok(IssuedSession {
            user: self.signed_in()?,
            token: "header.payload.signature".to_string(),
        })
    }

    async fn logout(&self) -> Result<(), ClientError> {
        *self.logout_calls.lock().unwrap() += 1;
        *self.session.lock().unwrap() = None;
        if self.fail_logout {
            return Err(rejected(500, "Unexpected error occurred"));
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        payload: &ProfileUpdatePayload,
    ) -> Result<PublicUser, ClientError> {
        let mut user = self.signed_in()?;
        if let Some(email) = &payload.email {
            match email.as_str() {
                Some(email) if email.contains('@') => user.email = email.to_string(),
                _ => return Err(rejected(400, "Invalid email")),
            }
        }
        if let Some(first_name) = &payload.first_name {
            user.profile.first_name = Some(first_name.clone());
        }
        *self.session.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn register_chef(
        &self,
        payload: &ChefProfilePayload,
    ) -> Result<PublicUser, ClientError> {
        let mut user = self.signed_in()?;
        user.is_chef = true;
        user.profile.chef_profile = Some(ChefProfile {
            cuisine_specialty: payload.cuisine_specialty.clone(),
            bio: payload.bio.clone(),
        });
        *self.session.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn update_chef_specialty(
        &self,
        cuisine_specialty: &[String],
    ) -> Result<PublicUser, ClientError> {
        let mut user = self.signed_in()?;
        let Some(chef_profile) = user.profile.chef_profile.as_mut() else {
            return Err(rejected(400, "User is not registered as a chef"));
        };
        chef_profile.cuisine_specialty = cuisine_specialty.to_vec();
        *self.session.lock().unwrap() = Some(user.clone());
        Ok(user)
    }
}

fn login_payload(email: &str, password: &str) -> LoginPayload {
    LoginPayload {
        email: Some(json!(email)),
        password: Some(json!(password)),
    }
}

fn register_payload(email: &str) -> RegisterPayload {
    RegisterPayload {
        email: Some(json!(email)),
        password: Some(json!("secret1")),
        chef: None,
    }
}

#[tokio::test]
async fn test_register_authenticates() {
    let context = SessionContext::new(FakeApi::default());

    let outcome = context.register(register_payload("a@b.com")).await;

    assert!(outcome.result);
    assert!(outcome.message.is_empty());
    let state = context.state();
    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.profile.unwrap().email, "a@b.com");
}

#[tokio::test]
async fn test_register_failure_reports_server_errors() {
    let context = SessionContext::new(FakeApi::default());

    let outcome = context.register(register_payload("taken@example.com")).await;

    assert!(!outcome.result);
    assert_eq!(
        outcome.message,
        vec!["User with given email already exists".to_string()]
    );
    let state = context.state();
    assert!(!state.is_authenticated);
    assert!(!state.is_loading);
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    let context = SessionContext::new(FakeApi::default());
    context.login(login_payload("a@b.com", "secret1")).await;

    let outcome = context.login(login_payload("a@b.com", "wrong")).await;

    assert!(!outcome.result);
    assert_eq!(outcome.message, vec!["Email or password invalid".to_string()]);
    assert!(context.state().is_authenticated);
}

#[tokio::test]
async fn test_check_session_failure_logs_out() {
    let context = SessionContext::new(FakeApi::default());
    assert!(context.state().is_loading);

    let outcome = context.check_session().await;

    assert!(!outcome.result);
    assert_eq!(
        context.state(),
        SessionState {
            is_authenticated: false,
            profile: None,
            is_loading: false,
        }
    );
}

#[tokio::test]
async fn test_check_session_restores_user() {
    let api = FakeApi::default();
    api.start_session("a@b.com");
    let context = SessionContext::new(api);

    assert!(context.check_session().await.result);
    assert_eq!(context.state().profile.unwrap().email, "a@b.com");
}

#[tokio::test]
async fn test_logout_ignores_server_failure() {
    let context = SessionContext::new(FakeApi {
        fail_logout: true,
        ..FakeApi::default()
    });
    context.login(login_payload("a@b.com", "secret1")).await;

    let outcome = context.logout().await;

    assert!(outcome.result);
    assert!(!context.state().is_authenticated);
    assert!(context.state().profile.is_none());
    assert_eq!(*context.api().logout_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_update_profile_requires_session() {
    let context = SessionContext::new(FakeApi::default());

    let outcome = context
        .update_profile(ProfileUpdatePayload {
            first_name: Some("Ada".to_string()),
            ..ProfileUpdatePayload::default()
        })
        .await;

    assert!(!outcome.result);
    assert_eq!(outcome.message, vec!["Please sign in".to_string()]);
}

#[tokio::test]
async fn test_update_profile_merges_response() {
    let context = SessionContext::new(FakeApi::default());
    context.login(login_payload("a@b.com", "secret1")).await;

    let outcome = context
        .update_profile(ProfileUpdatePayload {
            first_name: Some("Ada".to_string()),
            ..ProfileUpdatePayload::default()
        })
        .await;
    assert!(outcome.result);

    let state = context.state();
    assert!(!state.is_loading);
    assert_eq!(
        state.profile.unwrap().profile.first_name.as_deref(),
        Some("Ada")
    );
}

#[tokio::test]
async fn test_invalid_email_update_leaves_profile() {
    let context = SessionContext::new(FakeApi::default());
    context.login(login_payload("a@b.com", "secret1")).await;
    let before = context.state().profile;

    let outcome = context
        .update_profile(ProfileUpdatePayload {
            email: Some(json!("not-an-email")),
            ..ProfileUpdatePayload::default()
        })
        .await;

    assert!(!outcome.result);
    assert_eq!(outcome.message, vec!["Invalid email".to_string()]);
    assert_eq!(context.state().profile, before);
    assert!(!context.state().is_loading);
}

#[tokio::test]
async fn test_chef_registration_and_specialty() {
    let context = SessionContext::new(FakeApi::default());
    context.login(login_payload("a@b.com", "secret1")).await;

    let early = context.update_chef_specialty(vec!["Thai".to_string()]).await;
    assert!(!early.result);

    let registered = context
        .register_chef(ChefProfilePayload {
            cuisine_specialty: vec!["Thai".to_string()],
            bio: None,
        })
        .await;
    assert!(registered.result);
    assert!(context.state().profile.unwrap().is_chef);

    let updated = context
        .update_chef_specialty(vec!["Thai".to_string(), "Vegan".to_string()])
        .await;
    assert!(updated.result);
    let chef = context.state().profile.unwrap().profile.chef_profile.unwrap();
    assert_eq!(chef.cuisine_specialty.len(), 2);
}

#[tokio::test]
async fn test_subscribers_see_transitions() {
    let context = SessionContext::new(FakeApi::default());
    let mut updates = context.subscribe();

    context.login(login_payload("a@b.com", "secret1")).await;

    assert!(updates.has_changed().unwrap());
    assert!(updates.borrow_and_update().is_authenticated);
}

#[tokio::test]
async fn test_unmounted_context_drops_late_results() {
    let gate = Arc::new(Notify::new());
    let context = Arc::new(SessionContext::new(FakeApi {
        login_gate: Some(gate.clone()),
        ..FakeApi::default()
    }));

    let in_flight = {
        let context = context.clone();
        tokio::spawn(async move { context.login(login_payload("a@b.com", "secret1")).await })
    };

    context.unmount();
    gate.notify_one();
    let outcome = in_flight.await.unwrap();

    // The request itself succeeded, but its result was not applied
    assert!(outcome.result);
    assert!(!context.is_mounted());
    assert!(!context.state().is_authenticated);
    assert!(context.state().profile.is_none());
}

#[tokio::test]
async fn test_last_dispatch_wins() {
    let gate = Arc::new(Notify::new());
    let context = Arc::new(SessionContext::new(FakeApi {
        login_gate: Some(gate.clone()),
        ..FakeApi::default()
    }));

    let in_flight = {
        let context = context.clone();
        tokio::spawn(async move { context.login(login_payload("a@b.com", "secret1")).await })
    };

    context.logout().await;
    assert!(!context.state().is_authenticated);

    gate.notify_one();
    in_flight.await.unwrap();

    assert!(context.state().is_authenticated);
}
