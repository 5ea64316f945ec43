//! OAuth `state` parameter: encoding, parsing and HMAC signing.
//!
//! The payload is `{provider}_{user}_{timestamp}`, optionally followed by
//! `-{nonce}`. Provider identifiers never contain `_`, so the provider is
//! everything before the first `_` and the timestamp (with its nonce) everything
//! after the last one; the user id is what remains and may itself contain `_`.
//! The nonce is lowercase hex, so two flows started in the same second still get
//! distinct state.
//!
//! Signed state is `{payload}.{hex hmac-sha256(payload)}`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use secrecy::{ExposeSecret, SecretVec};
use sha2::Sha256;

use crate::error::{state_error, Error, StateErrorKind};

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 16;

/// Context carried through the provider redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub provider: String,
    pub user_id: String,
    /// Unix seconds at which the authorize URL was generated.
    pub issued_at: i64,
    pub nonce: Option<String>,
}

impl OAuthState {
    pub fn new(provider: &str, user_id: &str) -> Self {
        Self::issued(provider, user_id, Utc::now())
    }

    pub fn issued(provider: &str, user_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            provider: provider.to_string(),
            user_id: user_id.to_string(),
            issued_at: at.timestamp(),
            nonce: Some(hex::encode(rand::thread_rng().gen::<[u8; NONCE_LEN]>())),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match DateTime::<Utc>::from_timestamp(self.issued_at, 0) {
            Some(issued) => now - issued > ttl || issued - now > Duration::minutes(1),
            None => true,
        }
    }
}

impl fmt::Display for OAuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.provider, self.user_id, self.issued_at)?;
        match &self.nonce {
            Some(nonce) => write!(f, "-{nonce}"),
            None => Ok(()),
        }
    }
}

impl FromStr for OAuthState {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || state_error(StateErrorKind::Malformed, "Invalid OAuth state");

        let (provider, rest) = value.split_once('_').ok_or_else(malformed)?;
        let (user_id, tail) = rest.rsplit_once('_').ok_or_else(malformed)?;
        if provider.is_empty() || user_id.is_empty() {
            return Err(malformed());
        }

        let (timestamp, nonce) = match tail.split_once('-') {
            Some((timestamp, nonce)) => (timestamp, Some(nonce)),
            None => (tail, None),
        };
        if let Some(nonce) = nonce {
            if nonce.is_empty() || !nonce.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
                return Err(malformed());
            }
        }
        let issued_at = timestamp.parse::<i64>().map_err(|_| malformed())?;

        Ok(Self {
            provider: provider.to_string(),
            user_id: user_id.to_string(),
            issued_at,
            nonce: nonce.map(str::to_string),
        })
    }
}

/// Signs and verifies [`OAuthState`] values.
pub struct StateSigner {
    key: SecretVec<u8>,
    ttl: Duration,
}

impl StateSigner {
    /// Create a signer with the default TTL of 10 minutes.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: SecretVec::new(secret.to_vec()),
            ttl: Duration::minutes(10),
        }
    }

    /// Create a signer with a random per-process key.
    ///
    /// State issued before a restart no longer verifies.
    pub fn ephemeral() -> Self {
        let key: [u8; 32] = rand::thread_rng().gen();
        Self::new(&key)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Produce the signed `state` value for an authorize URL.
    pub fn sign(&self, state: &OAuthState) -> Result<String, Error> {
        let payload = state.to_string();
        let signature = hex::encode(self.mac(&payload)?.finalize().into_bytes());
        Ok(format!("{payload}.{signature}"))
    }

    /// Verify a signed `state` value against the current time.
    pub fn verify(&self, signed: &str) -> Result<OAuthState, Error> {
        self.verify_at(signed, Utc::now())
    }

    pub fn verify_at(&self, signed: &str, now: DateTime<Utc>) -> Result<OAuthState, Error> {
        let (payload, signature) = signed.rsplit_once('.').ok_or_else(|| {
            state_error(StateErrorKind::MissingSignature, "OAuth state is not signed")
        })?;

        let expected = hex::decode(signature).map_err(|_| {
            state_error(StateErrorKind::InvalidSignature, "Invalid signature format")
        })?;
        self.mac(payload)?.verify_slice(&expected).map_err(|_| {
            state_error(StateErrorKind::InvalidSignature, "OAuth state signature mismatch")
        })?;

        let state: OAuthState = payload.parse()?;
        if state.is_expired(now, self.ttl) {
            return Err(state_error(StateErrorKind::Expired, "OAuth state has expired"));
        }
        Ok(state)
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, Error> {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret())
            .map_err(|_| state_error(StateErrorKind::InvalidSignature, "Invalid HMAC key"))?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn state_kind(result: Result<OAuthState, Error>) -> StateErrorKind {
        match result.unwrap_err().error_kind {
            ErrorKind::State(kind) => kind,
            other => panic!("unexpected error kind {other:?}"),
        }
    }

    #[test]
    fn parses_provider_user_and_timestamp() {
        let state: OAuthState = "slack_user123_1699999999".parse().unwrap();
        assert_eq!(state.provider, "slack");
        assert_eq!(state.user_id, "user123");
        assert_eq!(state.issued_at, 1699999999);
        assert_eq!(state.nonce, None);
        assert_eq!(state.to_string(), "slack_user123_1699999999");
    }

    #[test]
    fn parses_trailing_nonce() {
        let state: OAuthState = "slack_user123_1699999999-9f2c01".parse().unwrap();
        assert_eq!(state.user_id, "user123");
        assert_eq!(state.issued_at, 1699999999);
        assert_eq!(state.nonce.as_deref(), Some("9f2c01"));
    }

    #[test]
    fn states_issued_in_the_same_second_differ() {
        let at = Utc::now();
        let first = OAuthState::issued("google-drive", "u1", at);
        let second = OAuthState::issued("google-drive", "u1", at);

        assert_ne!(first, second);
        assert_ne!(first.to_string(), second.to_string());
        assert_eq!(first.nonce.as_ref().map(String::len), Some(NONCE_LEN * 2));
    }

    #[test]
    fn user_ids_with_underscores_survive() {
        let state = OAuthState {
            provider: "google-drive".to_string(),
            user_id: "auth0_abc_def".to_string(),
            issued_at: 1700000000,
            nonce: Some("0a1b".to_string()),
        };
        let encoded = state.to_string();
        assert_eq!(encoded, "google-drive_auth0_abc_def_1700000000-0a1b");
        assert_eq!(encoded.parse::<OAuthState>().unwrap(), state);
    }

    #[test]
    fn rejects_malformed_payloads() {
        for value in [
            "",
            "slack",
            "slack_1699999999",
            "_user_1",
            "slack__1",
            "slack_user_abc",
            "slack_user_1699999999-",
            "slack_user_1699999999-XYZ",
            "slack_user_-9f2c",
        ] {
            assert_eq!(
                state_kind(value.parse::<OAuthState>()),
                StateErrorKind::Malformed,
                "{value}"
            );
        }
    }

    #[test]
    fn signed_state_verifies() {
        let signer = StateSigner::new(b"secret");
        let state = OAuthState::new("notion", "user-1");
        let signed = signer.sign(&state).unwrap();

        assert!(signed.starts_with(&format!("{state}.")));
        assert_eq!(signer.verify(&signed).unwrap(), state);
    }

    #[test]
    fn unsigned_state_is_rejected() {
        let signer = StateSigner::new(b"secret");
        assert_eq!(
            state_kind(signer.verify("slack_user123_1699999999")),
            StateErrorKind::MissingSignature
        );
    }

    #[test]
    fn forged_state_is_rejected() {
        let signer = StateSigner::new(b"secret");
        let signed = signer.sign(&OAuthState::new("slack", "alice")).unwrap();
        let (_, signature) = signed.rsplit_once('.').unwrap();
        let forged = format!("{}.{signature}", OAuthState::new("slack", "mallory"));

        assert_eq!(
            state_kind(signer.verify(&forged)),
            StateErrorKind::InvalidSignature
        );
        assert_eq!(
            state_kind(StateSigner::new(b"other").verify(&signed)),
            StateErrorKind::InvalidSignature
        );
    }

    #[test]
    fn expired_state_is_rejected() {
        let signer = StateSigner::new(b"secret");
        let issued = Utc::now() - Duration::minutes(11);
        let signed = signer
            .sign(&OAuthState::issued("discord", "bob", issued))
            .unwrap();

        assert_eq!(state_kind(signer.verify(&signed)), StateErrorKind::Expired);
        assert!(signer
            .verify_at(&signed, issued + Duration::minutes(9))
            .is_ok());
    }

    #[test]
    fn ephemeral_signers_do_not_share_keys() {
        let signed = StateSigner::ephemeral()
            .sign(&OAuthState::new("slack", "u"))
            .unwrap();
        assert!(StateSigner::ephemeral().verify(&signed).is_err());
    }
}
