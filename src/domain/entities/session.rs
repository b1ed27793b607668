//! Session token value object and its client-side claims.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::errors::SessionError;

/// Bearer token issued by the backend.
///
/// Shaped like a JWT. The payload is decoded locally only to pick a role
/// and spot expired tokens; the backend remains the only verifier.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken {
    value: String,
}

impl SessionToken {
    /// Creates token if it has three non-empty dot-separated segments.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();

        let segments: Vec<&str> = value.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        Some(Self { value })
    }

    /// Creates token without validation.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns token as string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// Decodes the payload segment.
    ///
    /// # Errors
    /// Returns `SessionError::InvalidClaims` if the payload is not base64url JSON.
    pub fn claims(&self) -> Result<SessionClaims, SessionError> {
        let payload = self
            .value
            .split('.')
            .nth(1)
            .ok_or_else(|| SessionError::invalid_format("missing payload segment"))?;

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SessionError::invalid_claims(format!("payload is not base64url: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| SessionError::invalid_claims(format!("payload is not valid JSON: {e}")))
    }

    /// Returns masked token for display.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.value.chars().collect();
        if chars.len() <= 10 {
            return "*".repeat(chars.len());
        }

        let prefix: String = chars[..4].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        format!("{prefix}...{suffix}")
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// User role carried in the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Administrator.
    Admin,
    /// Doctor.
    Doctor,
    /// Patient.
    Patient,
    /// Caregiver.
    Caregiver,
    /// Role this client does not know about.
    Other(String),
}

impl Role {
    /// Parses a role claim, ignoring case and a `ROLE_` prefix.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase();
        let normalized = normalized.strip_prefix("ROLE_").unwrap_or(&normalized);

        match normalized {
            "ADMIN" => Self::Admin,
            "DOCTOR" => Self::Doctor,
            "PATIENT" => Self::Patient,
            "CAREGIVER" => Self::Caregiver,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Human readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Admin => "Admin",
            Self::Doctor => "Doctor",
            Self::Patient => "Patient",
            Self::Caregiver => "Caregiver",
            Self::Other(raw) => raw,
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Claims decoded from the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionClaims {
    /// Subject, usually the user's email.
    #[serde(default)]
    pub sub: Option<String>,
    /// Role.
    pub role: Role,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issue time, seconds since the Unix epoch.
    #[serde(default)]
    pub iat: Option<i64>,
}

impl SessionClaims {
    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Whether the token has expired at `now`. Tokens without `exp` never do.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::token_with_payload;
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(SessionToken::new("no-dots").is_none());
        assert!(SessionToken::new("a..c").is_none());
        assert!(SessionToken::new("a.b.c.d").is_none());
        assert!(SessionToken::new(" a.b.c ").is_some());
    }

    #[test]
    fn test_decodes_claims() {
        let token = token_with_payload(&json!({
            "sub": "ana@example.org",
            "role": "CAREGIVER",
            "exp": 4_102_444_800_i64,
        }));

        let claims = token.claims().unwrap();

        assert_eq!(claims.sub.as_deref(), Some("ana@example.org"));
        assert_eq!(claims.role, Role::Caregiver);
        assert!(!claims.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expired_claims() {
        let token = token_with_payload(&json!({"role": "DOCTOR", "exp": 1_000}));
        assert!(token.claims().unwrap().is_expired_at(Utc::now()));
    }

    #[test]
    fn test_garbage_payload_is_error() {
        let token = SessionToken::new_unchecked("aaa.!!!.ccc");
        assert!(matches!(
            token.claims(),
            Err(SessionError::InvalidClaims { .. })
        ));
    }

    #[test_case("DOCTOR", Role::Doctor ; "upper")]
    #[test_case("ROLE_ADMIN", Role::Admin ; "spring_prefix")]
    #[test_case("patient", Role::Patient ; "lower")]
    #[test_case("NURSE", Role::Other("NURSE".into()) ; "unknown")]
    fn test_role_parse(raw: &str, expected: Role) {
        assert_eq!(Role::parse(raw), expected);
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let token = token_with_payload(&json!({"role": "PATIENT"}));
        let debug_output = format!("{token:?}");

        assert!(!debug_output.contains(token.as_str()));
        assert_eq!(token.bearer(), format!("Bearer {}", token.as_str()));
    }

    #[test]
    fn test_masking_handles_multibyte_tokens() {
        let token = SessionToken::new_unchecked("ééééé.ñññññ.üüüüü");

        assert_eq!(token.masked(), "éééé...üüüü");
        assert_eq!(format!("{token}"), "éééé...üüüü");

        let short = SessionToken::new_unchecked("é.ñ.ü");
        assert_eq!(short.masked(), "*****");
    }
}
