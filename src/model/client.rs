use super::{Base, OidcClientCredentials, UrlList};
use crate::errors::UnknownVisibility;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a client is listed to end users.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Shown,
    Hidden,
    /// Listed only to users allowed to authorize it.
    #[default]
    Permission,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Shown => "shown",
            Visibility::Hidden => "hidden",
            Visibility::Permission => "permission",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = UnknownVisibility;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shown" => Ok(Visibility::Shown),
            "hidden" => Ok(Visibility::Hidden),
            "permission" => Ok(Visibility::Permission),
            other => Err(UnknownVisibility(other.to_string())),
        }
    }
}

/// A registered relying party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcClient {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    /// Argon2 PHC string; `None` until a secret has been generated.
    #[serde(skip_serializing, default)]
    pub secret: Option<String>,
    pub callback_urls: UrlList,
    pub logout_callback_urls: UrlList,
    pub image_type: Option<String>,
    pub dark_image_type: Option<String>,
    pub is_public: bool,
    pub pkce_enabled: bool,
    pub requires_reauthentication: bool,
    pub credentials: OidcClientCredentials,
    pub launch_url: Option<String>,
    pub is_group_restricted: bool,
    pub visibility: Visibility,
    pub allowed_user_group_ids: Vec<String>,
    pub created_by_id: Option<String>,
}

impl OidcClient {
    pub fn has_logo(&self) -> bool {
        self.image_type.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_dark_logo(&self) -> bool {
        self.dark_image_type.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Writable client fields; an update replaces every one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcClientInput {
    /// Caller-chosen id on creation, otherwise a UUID is generated.
    pub id: Option<String>,
    pub name: String,
    pub callback_urls: UrlList,
    pub logout_callback_urls: UrlList,
    pub is_public: bool,
    pub pkce_enabled: bool,
    pub requires_reauthentication: bool,
    pub credentials: OidcClientCredentials,
    pub launch_url: Option<String>,
    pub is_group_restricted: bool,
    pub visibility: Visibility,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OidcClient {
        OidcClient {
            base: Base::new(),
            name: "Grafana".to_string(),
            secret: None,
            callback_urls: UrlList::default(),
            logout_callback_urls: UrlList::default(),
            image_type: None,
            dark_image_type: None,
            is_public: false,
            pkce_enabled: false,
            requires_reauthentication: false,
            credentials: OidcClientCredentials::default(),
            launch_url: None,
            is_group_restricted: false,
            visibility: Visibility::default(),
            allowed_user_group_ids: Vec::new(),
            created_by_id: None,
        }
    }

    #[test]
    fn test_has_logo() {
        let mut c = client();
        assert!(!c.has_logo());
        c.image_type = Some(String::new());
        assert!(!c.has_logo());
        c.image_type = Some("png".to_string());
        assert!(c.has_logo());
        assert!(!c.has_dark_logo());
    }

    #[test]
    fn test_has_dark_logo() {
        let mut c = client();
        c.dark_image_type = Some(String::new());
        assert!(!c.has_dark_logo());
        c.dark_image_type = Some("svg".to_string());
        assert!(c.has_dark_logo());
        assert!(!c.has_logo());
    }

    #[test]
    fn test_visibility_defaults_to_permission() {
        assert_eq!(Visibility::default(), Visibility::Permission);
        assert_eq!(OidcClientInput::default().visibility, Visibility::Permission);
    }

    #[test]
    fn test_visibility_parse() {
        for v in [Visibility::Shown, Visibility::Hidden, Visibility::Permission] {
            assert_eq!(v.as_str().parse::<Visibility>().unwrap(), v);
        }
        assert!(matches!(
            "public".parse::<Visibility>(),
            Err(UnknownVisibility(v)) if v == "public"
        ));
    }

    #[test]
    fn test_secret_is_never_serialized() {
        let mut c = client();
        c.secret = Some("$argon2id$v=19$...".to_string());
        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("secret").is_none());
        assert_eq!(json["visibility"], "permission");
    }
}
