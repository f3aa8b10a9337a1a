//! Authentication-failure circuit breaker.
//!
//! Repeatedly retrying bad credentials against a guarded MySQL host can get
//! the migration host blocked at the network level (e.g. `max_connect_errors`
//! or a firewall rule). The breaker counts *consecutive* authentication
//! failures and, once a configured ceiling is reached, converts the next one
//! into a fatal [`BinlogError::AuthCircuitTripped`] so the caller aborts
//! instead of reconnecting.
//!
//! # States
//!
//! - **Normal**: failures so far are below the ceiling (or no ceiling is set)
//! - **Tripped**: the ceiling was reached; the caller must abort
//!
//! # Transitions
//!
//! | Input | Effect |
//! |-------|--------|
//! | success | counter reset to 0 (logged as recovery if it was non-zero) |
//! | non-auth failure | passed through unchanged, counter untouched |
//! | auth failure | counter + 1; trips when `max_failures > 0 && count >= max_failures` |
//!
//! There is no time window and no decay: only an explicit success resets
//! the counter.
//!
//! # Classification
//!
//! [`is_authentication_error`] checks server error codes from
//! [`AUTH_ERROR_CODES`] anywhere in the error's source chain, then falls back
//! to case-insensitive text matching for errors that lost their structure on
//! the way (proxies, older servers).

use crate::client::{ClientError, ClientResult, MySqlError};
use crate::error::{BinlogError, Result};
use crate::metrics;
use std::error::Error;
use tracing::{error, info};

/// `ER_DBACCESS_DENIED_ERROR`: access denied for user to database.
pub const ER_DBACCESS_DENIED_ERROR: u16 = 1044;
/// `ER_ACCESS_DENIED_ERROR`: access denied for user (using password: YES/NO).
pub const ER_ACCESS_DENIED_ERROR: u16 = 1045;
/// `ER_HOST_NOT_PRIVILEGED`: host is not allowed to connect.
pub const ER_HOST_NOT_ALLOWED: u16 = 1130;
/// `ER_ACCESS_DENIED_NO_PASSWORD_ERROR`: access denied, no password provided.
pub const ER_ACCESS_DENIED_NO_PASSWORD: u16 = 1698;
/// `ER_ACCOUNT_HAS_BEEN_LOCKED`.
pub const ER_ACCOUNT_HAS_BEEN_LOCKED: u16 = 3118;

/// Server error codes counted as authentication failures.
pub const AUTH_ERROR_CODES: &[u16] = &[
    ER_DBACCESS_DENIED_ERROR,
    ER_ACCESS_DENIED_ERROR,
    ER_HOST_NOT_ALLOWED,
    ER_ACCESS_DENIED_NO_PASSWORD,
    ER_ACCOUNT_HAS_BEEN_LOCKED,
];

/// Lower-case fragments that mark an unstructured error as an auth failure.
const AUTH_ERROR_PHRASES: &[&str] = &["access denied", "authentication failed"];

/// Check whether a server error code denotes an authentication failure.
pub fn is_auth_error_code(code: u16) -> bool {
    AUTH_ERROR_CODES.contains(&code)
}

/// Check whether `err`, or anything in its source chain, is an authentication failure.
pub fn is_authentication_error(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if server_error_code(e).is_some_and(is_auth_error_code) {
            return true;
        }
        let text = e.to_string().to_lowercase();
        if AUTH_ERROR_PHRASES.iter().any(|p| text.contains(p)) {
            return true;
        }
        current = e.source();
    }
    false
}

fn server_error_code(e: &(dyn Error + 'static)) -> Option<u16> {
    if let Some(server) = e.downcast_ref::<MySqlError>() {
        return Some(server.code);
    }
    e.downcast_ref::<ClientError>()
        .and_then(ClientError::server_error)
        .map(|server| server.code)
}

/// Observable breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Failures are below the ceiling; errors are returned for caller retry.
    Normal,
    /// Ceiling reached; the caller must abort.
    Tripped,
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Tripped => write!(f, "tripped"),
        }
    }
}

/// Consecutive auth-failure counter with a trip ceiling.
#[derive(Debug, Clone)]
pub struct AuthCircuitBreaker {
    /// 0 means unlimited: the breaker never trips.
    max_failures: u32,
    failures: u32,
}

impl AuthCircuitBreaker {
    /// Create a breaker that trips after `max_failures` consecutive auth failures.
    pub fn new(max_failures: u32) -> Self {
        Self {
            max_failures,
            failures: 0,
        }
    }

    /// A breaker that counts but never trips.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    #[must_use]
    pub fn max_failures(&self) -> u32 {
        self.max_failures
    }

    /// Consecutive auth failures since the last success.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failures
    }

    #[must_use]
    pub fn state(&self) -> BreakerState {
        if self.max_failures > 0 && self.failures >= self.max_failures {
            BreakerState::Tripped
        } else {
            BreakerState::Normal
        }
    }

    /// Record a successful operation. Returns `true` if this ended a failure streak.
    pub fn record_success(&mut self, context: &str) -> bool {
        if self.failures == 0 {
            return false;
        }
        info!(
            context,
            previous_failures = self.failures,
            "{} successful, resetting auth failure count to 0",
            context
        );
        metrics::record_auth_recovery(context);
        self.failures = 0;
        true
    }

    /// Classify and record a failure, returning the error for the caller.
    ///
    /// Non-auth errors come back as [`BinlogError::Client`] with the counter
    /// untouched. Auth errors bump the counter and come back either as
    /// `Client` (still retryable) or [`BinlogError::AuthCircuitTripped`].
    pub fn record_failure(&mut self, err: ClientError, context: &str) -> BinlogError {
        if !is_authentication_error(&err) {
            return BinlogError::client(context, err);
        }

        self.failures = self.failures.saturating_add(1);
        metrics::record_auth_failure(context);

        if self.state() == BreakerState::Tripped {
            error!(
                context,
                failures = self.failures,
                max = self.max_failures,
                error = %err,
                "Authentication failure circuit breaker tripped, aborting"
            );
            metrics::record_auth_circuit_trip(context);
            return BinlogError::AuthCircuitTripped {
                failures: self.failures,
                max: self.max_failures,
                context: context.to_string(),
                source: err,
            };
        }

        error!(
            context,
            failures = self.failures,
            max = self.max_failures,
            error = %err,
            "Authentication failure #{} during {}",
            self.failures,
            context
        );
        BinlogError::client(context, err)
    }

    /// Feed an operation result through the breaker.
    pub fn handle<T>(&mut self, result: ClientResult<T>, context: &str) -> Result<T> {
        match result {
            Ok(value) => {
                self.record_success(context);
                Ok(value)
            }
            Err(err) => Err(self.record_failure(err, context)),
        }
    }
}

impl Default for AuthCircuitBreaker {
    fn default() -> Self {
        Self::disabled()
    }
}
