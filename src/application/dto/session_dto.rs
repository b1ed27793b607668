//! Session DTOs.

use crate::domain::entities::{SessionClaims, SessionToken};

/// Where the session token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// System keyring.
    Keyring,
    /// `--token` flag or `CARELINK_TOKEN`.
    CommandLine,
}

impl TokenSource {
    /// Returns human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Keyring => "system keyring",
            Self::CommandLine => "command line / environment",
        }
    }
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A usable session: token, origin and decoded claims.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    /// Bearer token.
    pub token: SessionToken,
    /// Source of the token.
    pub source: TokenSource,
    /// Claims decoded from the token payload.
    pub claims: SessionClaims,
}
