use crate::codec::JsonColumn;
use serde::{Deserialize, Serialize};

/// Trust bindings to external token issuers for a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcClientCredentials {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub federated_identities: Vec<OidcClientFederatedIdentity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcClientFederatedIdentity {
    #[serde(default)]
    pub issuer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub audience: String,
    /// URL of the issuer's JWKS document.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jwks: String,
}

impl OidcClientCredentials {
    /// First binding whose issuer equals `issuer`.
    ///
    /// An empty `issuer` never matches, even against a binding whose issuer
    /// was left unset.
    pub fn federated_identity_for_issuer(
        &self,
        issuer: &str,
    ) -> Option<&OidcClientFederatedIdentity> {
        if issuer.is_empty() {
            return None;
        }
        self.federated_identities
            .iter()
            .find(|fi| fi.issuer == issuer)
    }
}

impl JsonColumn for OidcClientCredentials {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ColumnCodec;

    fn identity(issuer: &str, subject: &str) -> OidcClientFederatedIdentity {
        OidcClientFederatedIdentity {
            issuer: issuer.to_string(),
            subject: subject.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_matching_issuer_wins() {
        let creds = OidcClientCredentials {
            federated_identities: vec![identity("a", "first"), identity("b", ""), identity("a", "second")],
        };
        let found = creds.federated_identity_for_issuer("a").expect("issuer a");
        assert_eq!(found.subject, "first");
    }

    #[test]
    fn test_empty_issuer_never_matches() {
        let creds = OidcClientCredentials {
            federated_identities: vec![identity("", "unset"), identity("a", "")],
        };
        assert!(creds.federated_identity_for_issuer("").is_none());
        assert!(OidcClientCredentials::default()
            .federated_identity_for_issuer("")
            .is_none());
    }

    #[test]
    fn test_unknown_issuer_is_a_miss() {
        let creds = OidcClientCredentials {
            federated_identities: vec![identity("a", "")],
        };
        assert!(creds.federated_identity_for_issuer("https://other").is_none());
    }

    #[test]
    fn test_round_trip() {
        let creds = OidcClientCredentials {
            federated_identities: vec![
                OidcClientFederatedIdentity {
                    issuer: "https://token.actions.githubusercontent.com".to_string(),
                    subject: "repo:org/app:ref:refs/heads/main".to_string(),
                    audience: "perihelion".to_string(),
                    jwks: "https://token.actions.githubusercontent.com/.well-known/jwks".to_string(),
                },
                identity("https://kubernetes.default.svc", ""),
            ],
        };
        let encoded = creds.encode_column().unwrap();
        let decoded = OidcClientCredentials::decode_column(Some(encoded.as_str())).unwrap();
        assert_eq!(decoded, creds);
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        assert_eq!(OidcClientCredentials::default().encode_column().unwrap(), "{}");

        let creds = OidcClientCredentials {
            federated_identities: vec![identity("https://issuer", "")],
        };
        assert_eq!(
            creds.encode_column().unwrap(),
            r#"{"federatedIdentities":[{"issuer":"https://issuer"}]}"#
        );
    }

    #[test]
    fn test_decodes_empty_object() {
        let decoded = OidcClientCredentials::decode_column(Some("{}")).unwrap();
        assert!(decoded.federated_identities.is_empty());
    }
}
