// Session management
//
// Owns the authentication lifecycle: login, logout, profile refresh,
// registration. The session is in-memory only and resets on restart;
// the token lives in the credential store and nowhere else.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::classify::{classify, Operation};
use crate::error::RequestError;
use crate::http::ApiClient;
use crate::models::{LoginResponse, Role, Status, UserProfile};
use crate::store::CredentialStore;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Field-level validation errors, keyed by form field name.
pub type ValidationErrors = BTreeMap<&'static str, &'static str>;

/// In-memory representation of the current authenticated user and the
/// status of the most recent auth operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: Option<UserProfile>,
    pub status: Status,
    pub error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            status: Status::Idle,
            error: None,
        }
    }
}

/// Registration outcome when the request does not succeed.
#[derive(Error, Debug)]
pub enum RegisterError {
    /// Client-side validation failed; no request was sent.
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// The server rejected the registration; classified message.
    #[error("{0}")]
    Remote(String),
}

/// Registration form as entered by the user.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

pub struct SessionManager {
    client: Arc<ApiClient>,
    store: Arc<dyn CredentialStore>,
    session: RwLock<Session>,
}

impl SessionManager {
    pub fn new(client: Arc<ApiClient>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            store,
            session: RwLock::new(Session::default()),
        }
    }

    /// Snapshot of the current session for the presentation layer.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.user.is_some()
    }

    /// Drop the stored error message without other state changes.
    pub async fn clear_error(&self) {
        self.session.write().await.error = None;
    }

    /// Authenticate with the server.
    ///
    /// Validation failures are returned immediately without touching
    /// session state or the network. Once the request runs, the outcome
    /// lands in the session: `Succeeded` with the user set (and the
    /// token persisted), or `Failed` with a classified message.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<(), ValidationErrors> {
        let errors = validate_login(email, password);
        if !errors.is_empty() {
            return Err(errors);
        }

        {
            let mut session = self.session.write().await;
            session.status = Status::Loading;
            session.error = None;
        }

        let body = json!({
            "email": email.trim().to_lowercase(),
            "password": password,
            "type": role,
        });

        let outcome = match self.client.post("/auth/login", &body).await {
            Ok(value) => serde_json::from_value::<LoginResponse>(value)
                .map_err(|e| RequestError::Transport(e.to_string())),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(response) => {
                if let Some(ref token) = response.token {
                    // Storage failure is non-fatal: the session is still
                    // authenticated for this process lifetime.
                    if let Err(e) = self.store.save(token).await {
                        tracing::warn!("Failed to persist token: {}", e);
                    }
                }

                let mut session = self.session.write().await;
                session.user = Some(response.user);
                session.status = Status::Succeeded;
                session.error = None;
            }
            Err(err) => {
                let message = classify(Operation::Login, &err);
                let mut session = self.session.write().await;
                session.status = Status::Failed;
                session.error = Some(message);
            }
        }

        Ok(())
    }

    /// End the session. Token eviction is unconditional and local-first;
    /// the server-side logout call is best-effort.
    pub async fn logout(&self) {
        if let Err(err) = self.client.post("/auth/logout", &json!({})).await {
            tracing::debug!("Logout request failed (ignored): {}", err);
        }

        if let Err(e) = self.store.clear().await {
            tracing::warn!("Failed to clear stored token: {}", e);
        }

        *self.session.write().await = Session::default();
    }

    /// Refresh the user profile from the server. Non-fatal background
    /// operation: on failure the existing profile and status stay as
    /// they are.
    pub async fn fetch_profile(&self) {
        match self.client.get("/user/profile").await {
            Ok(value) => match serde_json::from_value::<UserProfile>(value) {
                Ok(user) => {
                    self.session.write().await.user = Some(user);
                }
                Err(e) => tracing::warn!("Malformed profile response: {}", e),
            },
            Err(err) => tracing::debug!("Profile refresh failed (ignored): {}", err),
        }
    }

    /// Create a new account. Does not mutate the session; the caller
    /// directs the user to login after success.
    pub async fn register(&self, form: &RegisterForm) -> Result<(), RegisterError> {
        let errors = validate_register(form);
        if !errors.is_empty() {
            return Err(RegisterError::Validation(errors));
        }

        let body = json!({
            "name": form.name.trim(),
            "email": form.email.trim().to_lowercase(),
            "password": form.password,
            "role": form.role,
        });

        self.client
            .post("/auth/register", &body)
            .await
            .map(|_| ())
            .map_err(|err| RegisterError::Remote(classify(Operation::Registration, &err)))
    }
}

fn validate_login(email: &str, password: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let email = email.trim();
    if email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !EMAIL_RE.is_match(email) {
        errors.insert("email", "Please enter a valid email address");
    }

    if password.is_empty() {
        errors.insert("password", "Password is required");
    }

    errors
}

fn validate_register(form: &RegisterForm) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let name = form.name.trim();
    if name.is_empty() {
        errors.insert("name", "Full name is required");
    } else if name.chars().count() < 2 {
        errors.insert("name", "Name must be at least 2 characters");
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !EMAIL_RE.is_match(email) {
        errors.insert("email", "Please enter a valid email address");
    }

    if form.password.is_empty() {
        errors.insert("password", "Password is required");
    } else if form.password.chars().count() < 6 {
        errors.insert("password", "Password must be at least 6 characters");
    }

    if form.password != form.confirm_password {
        errors.insert("confirm_password", "Passwords do not match");
    }

    errors
}
