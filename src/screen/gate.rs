use tracing::{debug, warn};

use crate::api::{ApiError, UserProfile};

/// Which of the four gate views the session shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Loading,
    SignedOut,
    ProfileSetup,
    Ready,
}

/// Strict priority order: any loading flag wins, then authentication,
/// then profile presence.
pub fn derive_screen_state(
    is_ready: bool,
    user_loading: bool,
    profile_loading: bool,
    is_authenticated: bool,
    has_profile: bool,
) -> ScreenState {
    if !is_ready || user_loading || profile_loading {
        ScreenState::Loading
    } else if !is_authenticated {
        ScreenState::SignedOut
    } else if !has_profile {
        ScreenState::ProfileSetup
    } else {
        ScreenState::Ready
    }
}

/// Profile-fetch bookkeeping for the signed-in user.
///
/// At most one fetch runs per distinct identity, a finished identity is
/// never refetched within the session, and a completion that arrives after
/// the identity changed is dropped. Fetch failures are logged and leave
/// the profile absent, which routes the gate to the setup view.
#[derive(Debug, Default)]
pub struct SessionGate {
    profile: Option<UserProfile>,
    profile_loading: bool,
    fetched_for: Option<String>,
    in_flight_for: Option<String>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn has_profile(&self) -> bool {
        self.profile.is_some()
    }

    pub fn profile_loading(&self) -> bool {
        self.profile_loading
    }

    /// Returns true when a fetch should start for this identity now.
    pub fn begin_fetch(&mut self, identity: &str) -> bool {
        if identity.is_empty() {
            return false;
        }
        if self.fetched_for.as_deref() == Some(identity)
            || self.in_flight_for.as_deref() == Some(identity)
        {
            return false;
        }
        self.profile_loading = true;
        self.in_flight_for = Some(identity.to_string());
        true
    }

    pub fn complete_fetch(&mut self, identity: &str, result: Result<Option<UserProfile>, ApiError>) {
        if self.in_flight_for.as_deref() != Some(identity) {
            debug!(identity, "dropping profile fetch result for a replaced session");
            return;
        }
        self.in_flight_for = None;
        self.profile_loading = false;
        self.fetched_for = Some(identity.to_string());
        match result {
            Ok(profile) => self.profile = profile,
            Err(e) => {
                warn!(error = %e, "failed to fetch user profile");
                self.profile = None;
            }
        }
    }

    /// Clears all session-scoped state, e.g. after sign-out.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        serde_json::from_str(r#"{"full_name": "Ana"}"#).unwrap()
    }

    #[test]
    fn not_ready_shows_loading_regardless_of_other_flags() {
        assert_eq!(
            derive_screen_state(false, false, false, true, true),
            ScreenState::Loading
        );
        assert_eq!(
            derive_screen_state(true, true, false, true, true),
            ScreenState::Loading
        );
        assert_eq!(
            derive_screen_state(true, false, true, true, true),
            ScreenState::Loading
        );
    }

    #[test]
    fn unauthenticated_shows_sign_in_prompt() {
        assert_eq!(
            derive_screen_state(true, false, false, false, false),
            ScreenState::SignedOut
        );
    }

    #[test]
    fn authenticated_without_profile_shows_setup_prompt() {
        assert_eq!(
            derive_screen_state(true, false, false, true, false),
            ScreenState::ProfileSetup
        );
    }

    #[test]
    fn authenticated_with_profile_is_ready() {
        assert_eq!(
            derive_screen_state(true, false, false, true, true),
            ScreenState::Ready
        );
    }

    #[test]
    fn fetch_starts_once_per_identity() {
        let mut gate = SessionGate::new();
        assert!(gate.begin_fetch("ana@example.com"));
        // Same identity while in flight: suppressed.
        assert!(!gate.begin_fetch("ana@example.com"));

        gate.complete_fetch("ana@example.com", Ok(Some(profile())));
        // Same identity after completion: still suppressed.
        assert!(!gate.begin_fetch("ana@example.com"));
        assert!(gate.has_profile());
        assert!(!gate.profile_loading());
    }

    #[test]
    fn empty_identity_never_fetches() {
        let mut gate = SessionGate::new();
        assert!(!gate.begin_fetch(""));
        assert!(!gate.profile_loading());
    }

    #[test]
    fn failed_fetch_leaves_profile_absent_and_is_not_retried() {
        let mut gate = SessionGate::new();
        assert!(gate.begin_fetch("ana@example.com"));
        gate.complete_fetch("ana@example.com", Err(ApiError::Status(500)));

        assert!(!gate.has_profile());
        assert!(!gate.profile_loading());
        assert!(!gate.begin_fetch("ana@example.com"));
    }

    #[test]
    fn stale_completion_after_reset_is_dropped() {
        let mut gate = SessionGate::new();
        assert!(gate.begin_fetch("ana@example.com"));
        gate.reset();

        gate.complete_fetch("ana@example.com", Ok(Some(profile())));
        assert!(!gate.has_profile());
        // The replacement session still gets its own fetch.
        assert!(gate.begin_fetch("ana@example.com"));
    }

    #[test]
    fn completion_for_another_identity_is_dropped() {
        let mut gate = SessionGate::new();
        assert!(gate.begin_fetch("ana@example.com"));
        gate.complete_fetch("bob@example.com", Ok(Some(profile())));

        assert!(!gate.has_profile());
        assert!(gate.profile_loading());
    }
}
