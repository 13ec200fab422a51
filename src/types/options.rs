//! Inbox client options and configuration
//!
//! This module contains the main configuration options for the inbox SDK,
//! including a builder pattern for easy configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Credentials and roles
// ============================================================================

/// Bearer credential used for both the REST API and the conversation socket
///
/// Debug output is redacted so tokens never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Create a new credential
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Credential {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Credential {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Role the local party assumes on the conversation socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    /// A human customer-service operator
    #[default]
    Operator,
    /// The automated bot
    Bot,
    /// The external contact (used by the web-chat widget)
    Contact,
}

impl std::fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Operator => "operator",
            Self::Bot => "bot",
            Self::Contact => "contact",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Reconnect policy
// ============================================================================

/// Capped exponential backoff policy for socket reconnection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Number of consecutive failed attempts after which the connectivity
    /// indicator latches Offline (retrying continues regardless)
    pub offline_after_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            offline_after_attempts: 5,
        }
    }
}

impl BackoffPolicy {
    /// Delay to apply before retry number `attempt` (1-based)
    ///
    /// Monotonically non-decreasing, doubling from `base_delay` up to
    /// `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(exponent));
        delay.min(self.max_delay)
    }
}

// ============================================================================
// Inbox Options
// ============================================================================

/// Main options for the inbox SDK
#[derive(Debug, Clone)]
pub struct InboxOptions {
    /// Base URL of the conversation REST API (e.g. `https://api.example.com`)
    pub api_base: String,
    /// Base URL of the conversation socket endpoint (e.g. `wss://api.example.com`)
    pub socket_base: String,
    /// Session-derived credential, when a session exists
    pub credential: Option<Credential>,
    /// Injected fallback credential used when no session credential exists
    pub fallback_credential: Option<Credential>,
    /// Role the local party assumes on the socket
    pub role: ParticipantRole,
    /// Reconnect backoff policy
    pub backoff: BackoffPolicy,
    /// Idle timeout after which a local typing start is followed by a stop
    pub typing_idle_timeout: Duration,
    /// Expiry for peer typing entries that are never explicitly stopped;
    /// `None` disables client-side expiry
    pub peer_typing_expiry: Option<Duration>,
    /// Timeout applied to every REST request
    pub request_timeout: Duration,
}

impl Default for InboxOptions {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            socket_base: String::new(),
            credential: None,
            fallback_credential: None,
            role: ParticipantRole::Operator,
            backoff: BackoffPolicy::default(),
            typing_idle_timeout: Duration::from_secs(2),
            peer_typing_expiry: Some(Duration::from_secs(10)),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl InboxOptions {
    /// Create a new builder for `InboxOptions`
    #[must_use]
    pub fn builder() -> InboxOptionsBuilder {
        InboxOptionsBuilder::default()
    }

    /// Resolve the effective credential: the session credential when present,
    /// otherwise the injected fallback
    ///
    /// # Errors
    /// Returns `InvalidConfig` if neither credential is configured
    pub fn effective_credential(&self) -> crate::error::Result<Credential> {
        self.credential
            .clone()
            .or_else(|| self.fallback_credential.clone())
            .ok_or_else(|| {
                crate::error::InboxError::invalid_config(
                    "no credential configured: set a session credential or a fallback",
                )
            })
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for `InboxOptions`
#[derive(Debug, Clone, Default)]
pub struct InboxOptionsBuilder {
    options: InboxOptions,
}

impl InboxOptionsBuilder {
    /// Set the REST API base URL
    #[must_use]
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.options.api_base = url.into();
        self
    }

    /// Set the socket base URL
    #[must_use]
    pub fn socket_base(mut self, url: impl Into<String>) -> Self {
        self.options.socket_base = url.into();
        self
    }

    /// Set the session credential
    #[must_use]
    pub fn credential(mut self, credential: impl Into<Credential>) -> Self {
        self.options.credential = Some(credential.into());
        self
    }

    /// Set the fallback credential used when no session credential exists
    #[must_use]
    pub fn fallback_credential(mut self, credential: impl Into<Credential>) -> Self {
        self.options.fallback_credential = Some(credential.into());
        self
    }

    /// Set the local participant role
    #[must_use]
    pub fn role(mut self, role: ParticipantRole) -> Self {
        self.options.role = role;
        self
    }

    /// Set the reconnect backoff policy
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.options.backoff = backoff;
        self
    }

    /// Set the local typing idle timeout
    #[must_use]
    pub fn typing_idle_timeout(mut self, timeout: Duration) -> Self {
        self.options.typing_idle_timeout = timeout;
        self
    }

    /// Set (or disable, with `None`) the peer typing expiry
    #[must_use]
    pub fn peer_typing_expiry(mut self, expiry: Option<Duration>) -> Self {
        self.options.peer_typing_expiry = expiry;
        self
    }

    /// Set the REST request timeout
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.options.request_timeout = timeout;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> InboxOptions {
        self.options
    }
}
