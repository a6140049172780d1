//! Domain records for clients, flow artifacts and grants.

pub mod artifacts;
pub mod base;
pub mod client;
pub mod credentials;
pub mod grant;
pub mod url_list;

pub use artifacts::{
    CodeChallengeMethod, DeviceCodeState, OidcAuthorizationCode, OidcDeviceCode,
    OidcRefreshToken,
};
pub use base::Base;
pub use client::{OidcClient, OidcClientInput, Visibility};
pub use credentials::{OidcClientCredentials, OidcClientFederatedIdentity};
pub use grant::UserAuthorizedOidcClient;
pub use url_list::UrlList;

/// Split a space-delimited scope string.
///
/// Only a single ASCII space separates entries; an empty string yields no
/// entries rather than one empty entry.
pub fn parse_scopes(scope: &str) -> Vec<&str> {
    if scope.is_empty() {
        return Vec::new();
    }
    scope.split(' ').collect()
}
