use perihelion::entities;
use perihelion::model::{
    OidcClient, OidcClientFederatedIdentity, OidcClientInput, UrlList, Visibility,
};
use perihelion::storage;
use sea_orm::DatabaseConnection;

/// Builder for creating test users
pub struct UserBuilder {
    username: String,
    email: Option<String>,
}

impl UserBuilder {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> entities::user::Model {
        storage::create_user(db, &self.username, self.email)
            .await
            .expect("Failed to create test user")
    }
}

/// Builder for creating test OIDC clients
pub struct ClientBuilder {
    input: OidcClientInput,
    created_by: Option<String>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            input: OidcClientInput {
                name: "Test Client".to_string(),
                callback_urls: UrlList::from(vec!["http://localhost:3000/callback"]),
                ..Default::default()
            },
            created_by: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.input.name = name.to_string();
        self
    }

    pub fn with_callback_urls(mut self, urls: Vec<&str>) -> Self {
        self.input.callback_urls = UrlList::from(urls);
        self
    }

    pub fn with_federated_identity(mut self, issuer: &str, subject: &str) -> Self {
        self.input
            .credentials
            .federated_identities
            .push(OidcClientFederatedIdentity {
                issuer: issuer.to_string(),
                subject: subject.to_string(),
                ..Default::default()
            });
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.input.visibility = visibility;
        self
    }

    pub fn public(mut self) -> Self {
        self.input.is_public = true;
        self.input.pkce_enabled = true;
        self
    }

    pub fn created_by(mut self, user_id: &str) -> Self {
        self.created_by = Some(user_id.to_string());
        self
    }

    pub async fn create(self, db: &DatabaseConnection) -> OidcClient {
        storage::create_client(db, self.input, self.created_by.as_deref())
            .await
            .expect("Failed to create test client")
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
