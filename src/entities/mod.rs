pub mod oidc_authorization_code;
pub mod oidc_client;
pub mod oidc_client_allowed_user_group;
pub mod oidc_device_code;
pub mod oidc_refresh_token;
pub mod user;
pub mod user_authorized_oidc_client;
pub mod user_group;

pub use oidc_authorization_code::Entity as OidcAuthorizationCode;
pub use oidc_client::Entity as OidcClient;
pub use oidc_client_allowed_user_group::Entity as OidcClientAllowedUserGroup;
pub use oidc_device_code::Entity as OidcDeviceCode;
pub use oidc_refresh_token::Entity as OidcRefreshToken;
pub use user::Entity as User;
pub use user_authorized_oidc_client::Entity as UserAuthorizedOidcClient;
pub use user_group::Entity as UserGroup;
