use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Refresh this long before the provider's stated expiry.
const EXPIRY_BUFFER_SECS: i64 = 300;

const DEFAULT_USER: &str = "default_user";

/// Identity under which a credential is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// The single logical user all requests act as until real sessions exist.
impl Default for UserId {
    fn default() -> Self {
        Self::new(DEFAULT_USER)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Delegated-access tokens plus the provider metadata needed to renew them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Check if the access token is expired or about to expire (within 5 minutes).
    /// A credential with no known expiry is treated as valid.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry < now + Duration::seconds(EXPIRY_BUFFER_SECS),
            None => false,
        }
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::test_helpers::mock_credential;
    use super::*;

    #[test]
    fn test_expiry_buffer() {
        let now = Utc::now();

        let fresh = mock_credential("a", Some(now + Duration::hours(1)));
        assert!(!fresh.is_expired_at(now));

        let expiring = mock_credential("a", Some(now + Duration::minutes(2)));
        assert!(expiring.is_expired_at(now), "within buffer counts as expired");

        let expired = mock_credential("a", Some(now - Duration::minutes(1)));
        assert!(expired.is_expired_at(now));
    }

    #[test]
    fn test_unknown_expiry_is_not_expired() {
        assert!(!mock_credential("a", None).is_expired());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = mock_credential("super-secret-access", None);
        let output = format!("{:?}", credential);

        assert!(!output.contains("super-secret-access"));
        assert!(!output.contains("refresh-token"));
        assert!(!output.contains("client-secret"));
        assert!(output.contains("client-id"));
    }

    #[test]
    fn test_default_user() {
        assert_eq!(UserId::default().to_string(), "default_user");
        assert_eq!(UserId::default(), UserId::new("default_user"));
    }
}
