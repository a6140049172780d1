//! Authorization codes, refresh tokens and device codes.
//!
//! Expiry is carried as data. Nothing here rejects or removes an expired
//! artifact; the validating caller decides with [`is_expired`](OidcAuthorizationCode::is_expired).

use super::{parse_scopes, Base};
use crate::errors::StoreError;
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeChallengeMethod {
    S256,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcAuthorizationCode {
    #[serde(flatten)]
    pub base: Base,
    pub code: String,
    pub scope: String,
    pub nonce: String,
    pub code_challenge: Option<String>,
    pub code_challenge_method_sha256: Option<bool>,
    pub expires_at: i64,
    pub user_id: String,
    pub client_id: String,
}

impl OidcAuthorizationCode {
    pub fn scopes(&self) -> Vec<&str> {
        parse_scopes(&self.scope)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// `None` when the code was issued without PKCE.
    pub fn code_challenge_method(&self) -> Option<CodeChallengeMethod> {
        self.code_challenge.as_ref()?;
        if self.code_challenge_method_sha256.unwrap_or(false) {
            Some(CodeChallengeMethod::S256)
        } else {
            Some(CodeChallengeMethod::Plain)
        }
    }

    /// Check a PKCE verifier against the stored challenge.
    ///
    /// Codes issued without a challenge accept any verifier.
    pub fn verify_code_verifier(&self, verifier: &str) -> bool {
        let Some(challenge) = &self.code_challenge else {
            return true;
        };
        if verifier.is_empty() {
            return false;
        }
        match self.code_challenge_method() {
            Some(CodeChallengeMethod::S256) => pkce_s256(verifier) == *challenge,
            _ => verifier == challenge,
        }
    }
}

fn pkce_s256(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    Base64UrlUnpadded::encode_string(&digest)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcRefreshToken {
    #[serde(flatten)]
    pub base: Base,
    pub token: String,
    pub expires_at: i64,
    pub scope: String,
    pub user_id: String,
    pub client_id: String,
}

impl OidcRefreshToken {
    pub fn scopes(&self) -> Vec<&str> {
        parse_scopes(&self.scope)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCodeState {
    /// Waiting for a user to approve on another device.
    Pending,
    Authorized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcDeviceCode {
    #[serde(flatten)]
    pub base: Base,
    pub device_code: String,
    pub user_code: String,
    pub scope: String,
    pub nonce: String,
    pub expires_at: i64,
    pub is_authorized: bool,
    pub user_id: Option<String>,
    pub client_id: String,
}

impl OidcDeviceCode {
    pub fn scopes(&self) -> Vec<&str> {
        parse_scopes(&self.scope)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// `is_authorized` and `user_id` must agree.
    pub fn validate(&self) -> Result<(), StoreError> {
        match (self.is_authorized, &self.user_id) {
            (true, None) => Err(StoreError::InvalidState(format!(
                "device code {} is authorized without a user",
                self.base.id
            ))),
            (false, Some(_)) => Err(StoreError::InvalidState(format!(
                "device code {} has a user but is not authorized",
                self.base.id
            ))),
            _ => Ok(()),
        }
    }

    pub fn state(&self) -> Result<DeviceCodeState, StoreError> {
        self.validate()?;
        Ok(if self.is_authorized {
            DeviceCodeState::Authorized
        } else {
            DeviceCodeState::Pending
        })
    }

    /// Move from pending to authorized. A second approval is rejected.
    pub fn authorize(&mut self, user_id: &str, now: i64) -> Result<(), StoreError> {
        if self.state()? == DeviceCodeState::Authorized {
            return Err(StoreError::InvalidState(format!(
                "device code {} is already authorized",
                self.base.id
            )));
        }
        self.is_authorized = true;
        self.user_id = Some(user_id.to_string());
        self.base.touch(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_code(challenge: Option<&str>, sha256: Option<bool>) -> OidcAuthorizationCode {
        OidcAuthorizationCode {
            base: Base::new(),
            code: "code".to_string(),
            scope: "openid profile email".to_string(),
            nonce: String::new(),
            code_challenge: challenge.map(str::to_string),
            code_challenge_method_sha256: sha256,
            expires_at: 1_000,
            user_id: "user".to_string(),
            client_id: "client".to_string(),
        }
    }

    fn device_code() -> OidcDeviceCode {
        OidcDeviceCode {
            base: Base::new(),
            device_code: "device".to_string(),
            user_code: "BCDF-GHJK".to_string(),
            scope: String::new(),
            nonce: String::new(),
            expires_at: 1_000,
            is_authorized: false,
            user_id: None,
            client_id: "client".to_string(),
        }
    }

    #[test]
    fn test_scopes() {
        assert_eq!(auth_code(None, None).scopes(), vec!["openid", "profile", "email"]);
        assert!(device_code().scopes().is_empty());
    }

    #[test]
    fn test_refresh_token_empty_scope() {
        let token = OidcRefreshToken {
            base: Base::new(),
            token: "t".to_string(),
            expires_at: 0,
            scope: String::new(),
            user_id: "u".to_string(),
            client_id: "c".to_string(),
        };
        assert_eq!(token.scopes().len(), 0);
    }

    #[test]
    fn test_expiry_boundary() {
        let code = auth_code(None, None);
        assert!(!code.is_expired(999));
        assert!(code.is_expired(1_000));
        assert!(code.is_expired(1_001));
    }

    #[test]
    fn test_pkce_s256() {
        // RFC 7636 appendix B
        let code = auth_code(
            Some("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"),
            Some(true),
        );
        assert_eq!(code.code_challenge_method(), Some(CodeChallengeMethod::S256));
        assert!(code.verify_code_verifier("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"));
        assert!(!code.verify_code_verifier("wrong"));
        assert!(!code.verify_code_verifier(""));
    }

    #[test]
    fn test_pkce_plain() {
        let code = auth_code(Some("verifier"), Some(false));
        assert_eq!(code.code_challenge_method(), Some(CodeChallengeMethod::Plain));
        assert!(code.verify_code_verifier("verifier"));
        assert!(!code.verify_code_verifier("other"));
    }

    #[test]
    fn test_without_pkce() {
        let code = auth_code(None, None);
        assert_eq!(code.code_challenge_method(), None);
        assert!(code.verify_code_verifier("anything"));
    }

    #[test]
    fn test_device_code_transitions_once() {
        let mut dc = device_code();
        assert_eq!(dc.state().unwrap(), DeviceCodeState::Pending);

        dc.authorize("user-1", dc.base.created_at).unwrap();
        assert_eq!(dc.state().unwrap(), DeviceCodeState::Authorized);
        assert_eq!(dc.user_id.as_deref(), Some("user-1"));

        let err = dc.authorize("user-2", dc.base.created_at).unwrap_err();
        assert!(matches!(err, StoreError::InvalidState(_)));
        assert_eq!(dc.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_authorized_without_user_is_invalid() {
        let mut dc = device_code();
        dc.is_authorized = true;
        assert!(matches!(dc.validate(), Err(StoreError::InvalidState(_))));
        assert!(dc.state().is_err());
    }

    #[test]
    fn test_pending_with_user_is_invalid() {
        let mut dc = device_code();
        dc.user_id = Some("user".to_string());
        assert!(dc.validate().is_err());
    }
}
