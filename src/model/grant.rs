use super::parse_scopes;
use serde::{Deserialize, Serialize};

/// A user's standing consent to a client, keyed by (user_id, client_id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAuthorizedOidcClient {
    pub user_id: String,
    pub client_id: String,
    pub scope: String,
    pub last_used_at: i64,
}

impl UserAuthorizedOidcClient {
    pub fn scopes(&self) -> Vec<&str> {
        parse_scopes(&self.scope)
    }

    /// Whether every requested scope is already covered by this grant.
    pub fn covers(&self, requested: &str) -> bool {
        let granted = self.scopes();
        parse_scopes(requested)
            .iter()
            .all(|scope| granted.contains(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(scope: &str) -> UserAuthorizedOidcClient {
        UserAuthorizedOidcClient {
            user_id: "user".to_string(),
            client_id: "client".to_string(),
            scope: scope.to_string(),
            last_used_at: 0,
        }
    }

    #[test]
    fn test_scopes() {
        assert!(grant("").scopes().is_empty());
        assert_eq!(grant("openid email").scopes(), vec!["openid", "email"]);
    }

    #[test]
    fn test_covers() {
        let g = grant("openid profile email");
        assert!(g.covers("openid email"));
        assert!(g.covers(""));
        assert!(!g.covers("openid groups"));
        assert!(!grant("").covers("openid"));
    }
}
