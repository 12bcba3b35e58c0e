//! Admin session guard: credential check, failed-attempt counting and
//! time-boxed lockout, persisted through a [`KvStore`].

use crate::core::store::KvStore;
use crate::core::store::error::StoreError;
use crate::types::SessionConfig;
use crate::types::SessionState;
use crate::types::value::versioned_value::VersionedSessionState;
use crate::types::value::versioned_value::error::CodecError;
use credentials::CredentialVerifier;
use error::SessionError;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, instrument, warn};

pub mod credentials;

pub mod error {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum SessionError {
        #[error("Invalid credentials ({attempts_remaining} attempts remaining)")]
        InvalidCredentials { attempts_remaining: u32 },

        #[error("Locked out for another {remaining_secs}s")]
        LockedOut { remaining_secs: u64 },

        #[error("Admin session required")]
        Unauthorized,

        #[error("Lockout of {lockout_secs}s cannot be represented as a deadline")]
        LockoutOutOfRange { lockout_secs: u64 },

        #[error("Persistence error: {0}")]
        Persistence(#[from] StoreError),

        #[error("Stored session state is unreadable: {0}")]
        Codec(#[from] CodecError),
    }
}

/// Persisted key of the single session record.
pub const SESSION_STATE_KEY: &str = "session/state";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticated,
    Locked { until: SystemTime },
}

/// Delivered to subscribers whenever the admin flag is set or cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthChange {
    pub authenticated: bool,
    pub at: SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type AuthObserver = Arc<dyn Fn(&AuthChange) + Send + Sync>;

pub struct SessionGuard<S: KvStore> {
    store: Arc<S>,
    verifier: Box<dyn CredentialVerifier>,
    config: SessionConfig,
    state: SessionState,
    observers: Vec<(SubscriptionId, AuthObserver)>,
    next_subscription: u64,
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

impl<S: KvStore> SessionGuard<S> {
    /// Restores persisted state, or starts anonymous with no failed attempts.
    ///
    /// A lockout whose deadline has already passed is cleared on open.
    pub fn open(
        store: Arc<S>,
        verifier: Box<dyn CredentialVerifier>,
        config: SessionConfig,
        now: SystemTime,
    ) -> Result<Self, SessionError> {
        let state = match store.get(SESSION_STATE_KEY)? {
            Some(bytes) => VersionedSessionState::from_bytes(&bytes)?.into_latest(),
            None => SessionState::default(),
        };

        debug!(
            authenticated = state.authenticated,
            failed_attempts = state.failed_attempts,
            "session state restored"
        );

        let mut guard = Self {
            store,
            verifier,
            config,
            state,
            observers: Vec::new(),
            next_subscription: 0,
        };
        guard.expire_lockout(now)?;
        Ok(guard)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Query operations.
impl<S: KvStore> SessionGuard<S> {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.authenticated
    }

    pub fn failed_attempts(&self) -> u32 {
        self.state.failed_attempts
    }

    pub fn last_login_at(&self) -> Option<SystemTime> {
        self.state.last_login_at
    }

    /// When the current lockout ends, if one is pending. Hosts can use this to
    /// schedule a [`tick`](Self::tick).
    pub fn lockout_deadline(&self) -> Option<SystemTime> {
        self.state.lockout_until
    }

    pub fn is_locked_out(&self, now: SystemTime) -> bool {
        self.remaining_lockout(now).is_some()
    }

    /// Whole seconds left in the lockout, rounded up. `None` when not locked.
    pub fn remaining_lockout_secs(&self, now: SystemTime) -> Option<u64> {
        self.remaining_lockout(now).map(ceil_secs)
    }

    pub fn phase(&self, now: SystemTime) -> SessionPhase {
        match self.state.lockout_until {
            Some(until) if until > now => SessionPhase::Locked { until },
            _ if self.state.authenticated => SessionPhase::Authenticated,
            _ => SessionPhase::Anonymous,
        }
    }

    /// Gate for content editors before they write.
    pub fn authorize(&self) -> Result<(), SessionError> {
        if self.state.authenticated {
            Ok(())
        } else {
            Err(SessionError::Unauthorized)
        }
    }

    fn remaining_lockout(&self, now: SystemTime) -> Option<Duration> {
        self.state
            .lockout_until?
            .duration_since(now)
            .ok()
            .filter(|remaining| !remaining.is_zero())
    }
}

/// Login operations.
impl<S: KvStore> SessionGuard<S> {
    /// Boolean form of [`attempt`](Self::attempt): rejected credentials and
    /// lockout are `Ok(false)`, only persistence failures are errors.
    pub fn login(
        &mut self,
        username: &str,
        password: &SecretString,
        now: SystemTime,
    ) -> Result<bool, SessionError> {
        match self.attempt(username, password, now) {
            Ok(()) => Ok(true),
            Err(SessionError::InvalidCredentials { .. } | SessionError::LockedOut { .. }) => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Checks credentials unless locked out.
    ///
    /// While locked, returns `LockedOut` without consulting the verifier or
    /// counting the attempt. A failure that reaches the threshold starts a
    /// lockout and still reports `InvalidCredentials`.
    #[instrument(skip(self, password))]
    pub fn attempt(
        &mut self,
        username: &str,
        password: &SecretString,
        now: SystemTime,
    ) -> Result<(), SessionError> {
        self.expire_lockout(now)?;

        if let Some(remaining_secs) = self.remaining_lockout_secs(now) {
            warn!(remaining_secs, "login rejected while locked out");
            return Err(SessionError::LockedOut { remaining_secs });
        }

        if self.verifier.verify(username, password) {
            self.commit(SessionState {
                authenticated: true,
                failed_attempts: 0,
                lockout_until: None,
                last_login_at: Some(now),
            })?;

            info!("admin login succeeded");
            self.notify(AuthChange {
                authenticated: true,
                at: now,
            });
            return Ok(());
        }

        let mut next = self.state.clone();
        next.failed_attempts = next.failed_attempts.saturating_add(1);

        let threshold = self.config.max_failed_attempts;
        if next.failed_attempts >= threshold {
            let lockout = self.config.lockout_duration;
            let until = now
                .checked_add(lockout)
                .ok_or(SessionError::LockoutOutOfRange {
                    lockout_secs: lockout.as_secs(),
                })?;
            next.lockout_until = Some(until);
        }
        self.commit(next)?;

        let attempts_remaining = threshold.saturating_sub(self.state.failed_attempts);
        if attempts_remaining == 0 {
            warn!(
                lockout_secs = self.config.lockout_duration.as_secs(),
                "too many failed logins, locking out"
            );
        } else {
            warn!(attempts_remaining, "admin login failed");
        }

        Err(SessionError::InvalidCredentials { attempts_remaining })
    }

    /// Idempotent. Observers are only notified when a session was open.
    #[instrument(skip(self))]
    pub fn logout(&mut self, now: SystemTime) -> Result<(), SessionError> {
        if !self.state.authenticated {
            return Ok(());
        }

        let mut next = self.state.clone();
        next.authenticated = false;
        self.commit(next)?;

        info!("admin logged out");
        self.notify(AuthChange {
            authenticated: false,
            at: now,
        });
        Ok(())
    }
}

/// Lockout operations.
impl<S: KvStore> SessionGuard<S> {
    /// Ends an elapsed lockout. Returns `true` only on the call that performs the
    /// transition; once the deadline is cleared later ticks are no-ops.
    pub fn tick(&mut self, now: SystemTime) -> Result<bool, SessionError> {
        self.expire_lockout(now)
    }

    /// Clears the attempt counter and any lockout regardless of time left.
    /// A pending expiry is cancelled along with the deadline.
    #[instrument(skip(self))]
    pub fn reset_attempts(&mut self) -> Result<(), SessionError> {
        let mut next = self.state.clone();
        next.failed_attempts = 0;
        next.lockout_until = None;
        self.commit(next)?;

        info!("login attempts reset");
        Ok(())
    }

    fn expire_lockout(&mut self, now: SystemTime) -> Result<bool, SessionError> {
        let Some(until) = self.state.lockout_until else {
            return Ok(false);
        };
        if until > now {
            return Ok(false);
        }

        let mut next = self.state.clone();
        next.failed_attempts = 0;
        next.lockout_until = None;
        self.commit(next)?;

        info!("lockout expired");
        Ok(true)
    }
}

/// Observer operations.
impl<S: KvStore> SessionGuard<S> {
    pub fn subscribe(
        &mut self,
        observer: impl Fn(&AuthChange) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Arc::new(observer)));
        id
    }

    /// Returns `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&self, change: AuthChange) {
        for (_, observer) in &self.observers {
            observer(&change);
        }
    }
}

/// Internal helpers.
impl<S: KvStore> SessionGuard<S> {
    /// Persists `next` first; in-memory state only changes if the write succeeds.
    fn commit(&mut self, next: SessionState) -> Result<(), SessionError> {
        let bytes = VersionedSessionState::V1(next.clone()).to_bytes()?;
        self.store.put(SESSION_STATE_KEY, &bytes)?;
        self.state = next;
        Ok(())
    }
}
