//! Session collaborator: who is signed in, and how sign-in/out happen.

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::AppConfig;

/// Shared view of the current access token. The HTTP client reads it per
/// request, so sign-in and sign-out take effect without reconstruction.
pub type TokenCell = Arc<RwLock<Option<String>>>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session store error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    Input(String),
}

/// The signed-in account as the screen sees it. The email doubles as the
/// identity key for the one-fetch-per-user rule.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub email: String,
}

/// Session contract the gate depends on: readiness, identity, sign-in/out.
#[async_trait]
pub trait AuthSession: Send + Sync {
    /// False until the session store has been read once.
    fn is_ready(&self) -> bool;

    /// True while the current user is still being resolved.
    fn user_loading(&self) -> bool;

    fn is_authenticated(&self) -> bool;

    fn current_user(&self) -> Option<AuthUser>;

    /// Runs one interactive sign-in attempt.
    async fn sign_in(&mut self) -> Result<(), AuthError>;

    fn sign_out(&mut self) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    email: String,
    created_at: DateTime<Utc>,
}

/// File-backed session under the data directory. Loading is synchronous,
/// so the session is ready and the user resolved as soon as construction
/// returns.
pub struct FileAuth {
    path: PathBuf,
    base_url: String,
    session: Option<StoredSession>,
    token_cell: TokenCell,
}

impl FileAuth {
    /// Reads the stored session, if any. A missing file means signed out;
    /// an unreadable one is treated the same after a warning.
    pub fn load(config: &AppConfig) -> Result<Self, AuthError> {
        let path = config.data_dir.join("session.json");
        let session = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "ignoring corrupt session file");
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(AuthError::Io(e)),
        };

        let auth = Self {
            path,
            base_url: config.base_url.clone(),
            session,
            token_cell: Arc::new(RwLock::new(None)),
        };
        auth.publish_token();
        Ok(auth)
    }

    /// Adopts an ephemeral session, e.g. from command-line flags. Nothing
    /// is written to disk.
    pub fn use_session(&mut self, token: String, email: String) {
        self.session = Some(StoredSession {
            token,
            email,
            created_at: Utc::now(),
        });
        self.publish_token();
    }

    pub fn token_cell(&self) -> TokenCell {
        self.token_cell.clone()
    }

    fn publish_token(&self) {
        if let Ok(mut cell) = self.token_cell.write() {
            *cell = self.session.as_ref().map(|s| s.token.clone());
        }
    }

    fn save(&self, session: &StoredSession) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }
}

#[async_trait]
impl AuthSession for FileAuth {
    fn is_ready(&self) -> bool {
        true
    }

    fn user_loading(&self) -> bool {
        false
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.session.as_ref().map(|s| AuthUser {
            email: s.email.clone(),
        })
    }

    /// Opens the backend sign-in page in the system browser, then accepts
    /// the email and access token pasted back from it.
    async fn sign_in(&mut self) -> Result<(), AuthError> {
        let signin_url = format!("{}/account/signin", self.base_url);
        println!("Opening {} in your browser...", signin_url);
        if let Err(e) = webbrowser::open(&signin_url) {
            warn!(error = %e, "could not open a browser");
            println!("Could not open a browser automatically.");
            println!("Visit {} yourself, sign in, then come back here.", signin_url);
        }

        let email = prompt_line("Email: ")?;
        if email.is_empty() {
            return Err(AuthError::Input("email must not be empty".to_string()));
        }
        let token = prompt_line("Access token: ")?;
        if token.is_empty() {
            return Err(AuthError::Input("access token must not be empty".to_string()));
        }

        let session = StoredSession {
            token,
            email,
            created_at: Utc::now(),
        };
        self.save(&session)?;
        self.session = Some(session);
        self.publish_token();
        Ok(())
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(AuthError::Io(e)),
        }
        self.session = None;
        self.publish_token();
        Ok(())
    }
}

fn prompt_line(prompt: &str) -> Result<String, AuthError> {
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Scripted session for tests. `sign_in` only counts the attempt and never
/// signs the fake in, mirroring a user who abandons the browser flow.
pub struct CountingAuth {
    ready: bool,
    loading: bool,
    user: Option<AuthUser>,
    sign_in_calls: Arc<AtomicUsize>,
    sign_out_calls: Arc<AtomicUsize>,
}

impl CountingAuth {
    pub fn signed_out() -> Self {
        Self {
            ready: true,
            loading: false,
            user: None,
            sign_in_calls: Arc::new(AtomicUsize::new(0)),
            sign_out_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn signed_in(email: &str) -> Self {
        Self {
            user: Some(AuthUser {
                email: email.to_string(),
            }),
            ..Self::signed_out()
        }
    }

    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::signed_out()
        }
    }

    pub fn sign_in_counter(&self) -> Arc<AtomicUsize> {
        self.sign_in_calls.clone()
    }

    pub fn sign_out_counter(&self) -> Arc<AtomicUsize> {
        self.sign_out_calls.clone()
    }
}

#[async_trait]
impl AuthSession for CountingAuth {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn user_loading(&self) -> bool {
        self.loading
    }

    fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.user.clone()
    }

    async fn sign_in(&mut self) -> Result<(), AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.user = None;
        Ok(())
    }
}
