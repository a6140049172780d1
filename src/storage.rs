use crate::codec::ColumnCodec;
use crate::entities;
use crate::errors::StoreError;
use crate::model::{
    Base, OidcAuthorizationCode, OidcClient, OidcClientCredentials, OidcClientInput,
    OidcDeviceCode, OidcRefreshToken, UrlList, UserAuthorizedOidcClient, Visibility,
};
use crate::settings::Database as DbCfg;
use base64ct::Encoding;
use chrono::Utc;
use rand::{Rng, RngCore};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fields supplied by the authorize endpoint when it issues a code.
#[derive(Debug, Clone, Default)]
pub struct NewAuthorizationCode {
    pub user_id: String,
    pub client_id: String,
    pub scope: String,
    pub nonce: String,
    pub code_challenge: Option<String>,
    pub code_challenge_method_sha256: Option<bool>,
}

pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, StoreError> {
    let db = Database::connect(&cfg.url).await?;
    Ok(db)
}

fn now() -> i64 {
    Utc::now().timestamp()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// 192 bits from the thread-local CSPRNG, base64url encoded.
fn random_id() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64ct::Base64UrlUnpadded::encode_string(&bytes)
}

/// Generate 8-character base-20 user code in format XXXX-XXXX
/// Alphabet: BCDFGHJKLMNPQRSTVWXZ (consonants only, no ambiguous chars)
/// Entropy: 20^8 = ~43 bits
fn generate_user_code() -> String {
    const ALPHABET: &[u8] = b"BCDFGHJKLMNPQRSTVWXZ";
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(9);

    for i in 0..8 {
        if i == 4 {
            code.push('-');
        }
        let idx = rng.gen_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }

    code
}

// ============================================================================
// Users and groups
// ============================================================================

pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    email: Option<String>,
) -> Result<entities::user::Model, StoreError> {
    let now = now();
    let user = entities::user::ActiveModel {
        id: Set(new_id()),
        username: Set(username.to_string()),
        email: Set(email),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(user.insert(db).await?)
}

/// Delete a user; their codes, tokens and grants go with them.
pub async fn delete_user(db: &DatabaseConnection, user_id: &str) -> Result<(), StoreError> {
    let result = entities::User::delete_by_id(user_id.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(StoreError::NotFound(format!("user {}", user_id)));
    }
    Ok(())
}

pub async fn create_user_group(
    db: &DatabaseConnection,
    name: &str,
    friendly_name: &str,
) -> Result<entities::user_group::Model, StoreError> {
    let now = now();
    let group = entities::user_group::ActiveModel {
        id: Set(new_id()),
        name: Set(name.to_string()),
        friendly_name: Set(friendly_name.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(group.insert(db).await?)
}

// ============================================================================
// OIDC clients
// ============================================================================

fn client_from_model(
    model: entities::oidc_client::Model,
    allowed_user_group_ids: Vec<String>,
) -> Result<OidcClient, StoreError> {
    let callback_urls = UrlList::decode_column(Some(model.callback_urls.as_str()))?;
    let logout_callback_urls = UrlList::decode_column(Some(model.logout_callback_urls.as_str()))?;
    let credentials = OidcClientCredentials::decode_column(model.credentials.as_deref())?;
    let visibility = model.visibility.parse::<Visibility>()?;

    Ok(OidcClient {
        base: Base {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        },
        name: model.name,
        secret: model.secret,
        callback_urls,
        logout_callback_urls,
        image_type: model.image_type,
        dark_image_type: model.dark_image_type,
        is_public: model.is_public,
        pkce_enabled: model.pkce_enabled,
        requires_reauthentication: model.requires_reauthentication,
        credentials,
        launch_url: model.launch_url,
        is_group_restricted: model.is_group_restricted,
        visibility,
        allowed_user_group_ids,
        created_by_id: model.created_by_id,
    })
}

async fn allowed_user_group_ids<C: ConnectionTrait>(
    db: &C,
    client_id: &str,
) -> Result<Vec<String>, StoreError> {
    use entities::oidc_client_allowed_user_group::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::OidcClientId.eq(client_id))
        .order_by_asc(Column::UserGroupId)
        .all(db)
        .await?
        .into_iter()
        .map(|row| row.user_group_id)
        .collect())
}

pub async fn create_client(
    db: &DatabaseConnection,
    input: OidcClientInput,
    created_by_id: Option<&str>,
) -> Result<OidcClient, StoreError> {
    let now = now();
    let id = input.id.clone().unwrap_or_else(new_id);

    let client = entities::oidc_client::ActiveModel {
        id: Set(id.clone()),
        name: Set(input.name),
        secret: Set(None),
        callback_urls: Set(input.callback_urls.encode_column()?),
        logout_callback_urls: Set(input.logout_callback_urls.encode_column()?),
        image_type: Set(None),
        dark_image_type: Set(None),
        is_public: Set(input.is_public),
        pkce_enabled: Set(input.pkce_enabled),
        requires_reauthentication: Set(input.requires_reauthentication),
        credentials: Set(Some(input.credentials.encode_column()?)),
        launch_url: Set(input.launch_url),
        is_group_restricted: Set(input.is_group_restricted),
        visibility: Set(input.visibility.to_string()),
        created_by_id: Set(created_by_id.map(|s| s.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = client.insert(db).await?;
    info!(client_id = %id, "Created OIDC client");

    client_from_model(model, Vec::new())
}

pub async fn get_client(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Option<OidcClient>, StoreError> {
    match entities::OidcClient::find_by_id(client_id.to_string())
        .one(db)
        .await?
    {
        Some(model) => {
            let groups = allowed_user_group_ids(db, client_id).await?;
            Ok(Some(client_from_model(model, groups)?))
        }
        None => Ok(None),
    }
}

/// All clients ordered by name.
pub async fn list_clients(db: &DatabaseConnection) -> Result<Vec<OidcClient>, StoreError> {
    use entities::oidc_client::{Column, Entity};

    let models = Entity::find().order_by_asc(Column::Name).all(db).await?;

    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for row in entities::OidcClientAllowedUserGroup::find()
        .order_by_asc(entities::oidc_client_allowed_user_group::Column::UserGroupId)
        .all(db)
        .await?
    {
        groups
            .entry(row.oidc_client_id)
            .or_default()
            .push(row.user_group_id);
    }

    models
        .into_iter()
        .map(|model| {
            let ids = groups.remove(&model.id).unwrap_or_default();
            client_from_model(model, ids)
        })
        .collect()
}

/// Replace every writable field of a client. Credentials and URL lists are
/// swapped whole; there is no partial edit.
pub async fn update_client(
    db: &DatabaseConnection,
    client_id: &str,
    input: OidcClientInput,
) -> Result<OidcClient, StoreError> {
    let model = entities::OidcClient::find_by_id(client_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("client {}", client_id)))?;

    let updated_at = model.updated_at.max(now());
    let mut active: entities::oidc_client::ActiveModel = model.into();
    active.name = Set(input.name);
    active.callback_urls = Set(input.callback_urls.encode_column()?);
    active.logout_callback_urls = Set(input.logout_callback_urls.encode_column()?);
    active.is_public = Set(input.is_public);
    active.pkce_enabled = Set(input.pkce_enabled);
    active.requires_reauthentication = Set(input.requires_reauthentication);
    active.credentials = Set(Some(input.credentials.encode_column()?));
    active.launch_url = Set(input.launch_url);
    active.is_group_restricted = Set(input.is_group_restricted);
    active.visibility = Set(input.visibility.to_string());
    active.updated_at = Set(updated_at);
    let model = active.update(db).await?;

    let groups = allowed_user_group_ids(db, client_id).await?;
    client_from_model(model, groups)
}

/// Delete a client. Its codes, tokens, grants and group links cascade.
pub async fn delete_client(db: &DatabaseConnection, client_id: &str) -> Result<(), StoreError> {
    let result = entities::OidcClient::delete_by_id(client_id.to_string())
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(StoreError::NotFound(format!("client {}", client_id)));
    }
    info!(client_id = %client_id, "Deleted OIDC client");
    Ok(())
}

/// Generate a new client secret and store its Argon2id hash.
///
/// The plaintext is returned once and never persisted.
pub async fn create_client_secret(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<String, StoreError> {
    use argon2::password_hash::{rand_core::OsRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let model = entities::OidcClient::find_by_id(client_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("client {}", client_id)))?;

    let secret = random_id();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| StoreError::Other(format!("Secret hashing failed: {}", e)))?
        .to_string();

    let updated_at = model.updated_at.max(now());
    let mut active: entities::oidc_client::ActiveModel = model.into();
    active.secret = Set(Some(hash));
    active.updated_at = Set(updated_at);
    active.update(db).await?;

    info!(client_id = %client_id, "Rotated client secret");
    Ok(secret)
}

/// Check a presented secret. Clients without a secret never verify.
pub async fn verify_client_secret(
    db: &DatabaseConnection,
    client_id: &str,
    secret: &str,
) -> Result<bool, StoreError> {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Some(model) = entities::OidcClient::find_by_id(client_id.to_string())
        .one(db)
        .await?
    else {
        return Ok(false);
    };
    let Some(stored) = model.secret else {
        return Ok(false);
    };

    let parsed_hash = PasswordHash::new(&stored)
        .map_err(|e| StoreError::Decode(format!("invalid secret hash for {}: {}", client_id, e)))?;

    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Set or clear the light (`dark == false`) or dark logo image type.
pub async fn set_client_image_type(
    db: &DatabaseConnection,
    client_id: &str,
    image_type: Option<String>,
    dark: bool,
) -> Result<(), StoreError> {
    let model = entities::OidcClient::find_by_id(client_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("client {}", client_id)))?;

    let updated_at = model.updated_at.max(now());
    let mut active: entities::oidc_client::ActiveModel = model.into();
    if dark {
        active.dark_image_type = Set(image_type);
    } else {
        active.image_type = Set(image_type);
    }
    active.updated_at = Set(updated_at);
    active.update(db).await?;

    Ok(())
}

/// Replace the set of user groups allowed to use a client.
pub async fn update_client_allowed_user_groups(
    db: &DatabaseConnection,
    client_id: &str,
    group_ids: &[String],
) -> Result<OidcClient, StoreError> {
    use entities::oidc_client_allowed_user_group::{ActiveModel, Column, Entity};

    let txn = db.begin().await?;

    let model = entities::OidcClient::find_by_id(client_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("client {}", client_id)))?;

    Entity::delete_many()
        .filter(Column::OidcClientId.eq(client_id))
        .exec(&txn)
        .await?;

    let mut unique: Vec<&String> = group_ids.iter().collect();
    unique.sort();
    unique.dedup();
    if !unique.is_empty() {
        Entity::insert_many(unique.into_iter().map(|group_id| ActiveModel {
            oidc_client_id: Set(client_id.to_string()),
            user_group_id: Set(group_id.clone()),
        }))
        .exec(&txn)
        .await?;
    }

    let groups = allowed_user_group_ids(&txn, client_id).await?;
    txn.commit().await?;

    debug!(client_id = %client_id, groups = groups.len(), "Updated allowed user groups");
    client_from_model(model, groups)
}

pub async fn get_client_allowed_user_groups(
    db: &DatabaseConnection,
    client_id: &str,
) -> Result<Vec<entities::user_group::Model>, StoreError> {
    use entities::user_group::Column;

    let model = entities::OidcClient::find_by_id(client_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("client {}", client_id)))?;

    Ok(model
        .find_related(entities::UserGroup)
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

// ============================================================================
// Authorization codes
// ============================================================================

impl From<entities::oidc_authorization_code::Model> for OidcAuthorizationCode {
    fn from(model: entities::oidc_authorization_code::Model) -> Self {
        Self {
            base: Base {
                id: model.id,
                created_at: model.created_at,
                updated_at: model.updated_at,
            },
            code: model.code,
            scope: model.scope,
            nonce: model.nonce,
            code_challenge: model.code_challenge,
            code_challenge_method_sha256: model.code_challenge_method_sha256,
            expires_at: model.expires_at,
            user_id: model.user_id,
            client_id: model.client_id,
        }
    }
}

pub async fn create_authorization_code(
    db: &DatabaseConnection,
    input: NewAuthorizationCode,
    ttl_secs: i64,
) -> Result<OidcAuthorizationCode, StoreError> {
    let base = Base::new();
    // A method flag without a challenge would be meaningless
    let method = input
        .code_challenge
        .as_ref()
        .map(|_| input.code_challenge_method_sha256.unwrap_or(false));

    let code = entities::oidc_authorization_code::ActiveModel {
        id: Set(base.id.clone()),
        code: Set(random_id()),
        scope: Set(input.scope),
        nonce: Set(input.nonce),
        code_challenge: Set(input.code_challenge),
        code_challenge_method_sha256: Set(method),
        expires_at: Set(base.created_at + ttl_secs),
        user_id: Set(input.user_id),
        client_id: Set(input.client_id),
        created_at: Set(base.created_at),
        updated_at: Set(base.updated_at),
    };

    Ok(code.insert(db).await?.into())
}

/// Take an authorization code for `client_id`, deleting it in the same
/// transaction. A second call with the same code finds nothing.
///
/// Expiry is not checked here; see [`OidcAuthorizationCode::is_expired`].
pub async fn consume_authorization_code(
    db: &DatabaseConnection,
    code: &str,
    client_id: &str,
) -> Result<Option<OidcAuthorizationCode>, StoreError> {
    use entities::oidc_authorization_code::{Column, Entity};

    let txn = db.begin().await?;

    let Some(model) = Entity::find()
        .filter(Column::Code.eq(code))
        .filter(Column::ClientId.eq(client_id))
        .one(&txn)
        .await?
    else {
        return Ok(None);
    };

    let result = Entity::delete_by_id(model.id.clone()).exec(&txn).await?;
    if result.rows_affected == 0 {
        // lost a race with another consumer
        warn!(client_id = %client_id, "Authorization code consumed concurrently");
        return Ok(None);
    }
    txn.commit().await?;

    debug!(client_id = %client_id, user_id = %model.user_id, "Consumed authorization code");
    Ok(Some(model.into()))
}

// ============================================================================
// Refresh tokens
// ============================================================================

impl From<entities::oidc_refresh_token::Model> for OidcRefreshToken {
    fn from(model: entities::oidc_refresh_token::Model) -> Self {
        Self {
            base: Base {
                id: model.id,
                created_at: model.created_at,
                updated_at: model.updated_at,
            },
            token: model.token,
            expires_at: model.expires_at,
            scope: model.scope,
            user_id: model.user_id,
            client_id: model.client_id,
        }
    }
}

fn refresh_token_model(
    user_id: &str,
    client_id: &str,
    scope: &str,
    ttl_secs: i64,
) -> entities::oidc_refresh_token::ActiveModel {
    let base = Base::new();
    entities::oidc_refresh_token::ActiveModel {
        id: Set(base.id),
        token: Set(random_id()),
        expires_at: Set(base.created_at + ttl_secs),
        scope: Set(scope.to_string()),
        user_id: Set(user_id.to_string()),
        client_id: Set(client_id.to_string()),
        created_at: Set(base.created_at),
        updated_at: Set(base.updated_at),
    }
}

pub async fn create_refresh_token(
    db: &DatabaseConnection,
    user_id: &str,
    client_id: &str,
    scope: &str,
    ttl_secs: i64,
) -> Result<OidcRefreshToken, StoreError> {
    let token = refresh_token_model(user_id, client_id, scope, ttl_secs);
    Ok(token.insert(db).await?.into())
}

/// Look up a refresh token. Expired tokens are returned as stored.
pub async fn get_refresh_token(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<OidcRefreshToken>, StoreError> {
    use entities::oidc_refresh_token::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::Token.eq(token))
        .one(db)
        .await?
        .map(Into::into))
}

pub async fn delete_refresh_token(db: &DatabaseConnection, token: &str) -> Result<(), StoreError> {
    use entities::oidc_refresh_token::{Column, Entity};

    Entity::delete_many()
        .filter(Column::Token.eq(token))
        .exec(db)
        .await?;

    Ok(())
}

/// Replace a refresh token with a fresh one carrying the same user, client
/// and scope. Returns `None` if the old token is unknown.
pub async fn rotate_refresh_token(
    db: &DatabaseConnection,
    old_token: &str,
    ttl_secs: i64,
) -> Result<Option<OidcRefreshToken>, StoreError> {
    use entities::oidc_refresh_token::{Column, Entity};

    let txn = db.begin().await?;

    let Some(old) = Entity::find()
        .filter(Column::Token.eq(old_token))
        .one(&txn)
        .await?
    else {
        return Ok(None);
    };

    let result = Entity::delete_by_id(old.id.clone()).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Ok(None);
    }

    let new_token = refresh_token_model(&old.user_id, &old.client_id, &old.scope, ttl_secs)
        .insert(&txn)
        .await?;
    txn.commit().await?;

    Ok(Some(new_token.into()))
}

pub async fn delete_refresh_tokens_for(
    db: &DatabaseConnection,
    user_id: &str,
    client_id: &str,
) -> Result<u64, StoreError> {
    use entities::oidc_refresh_token::{Column, Entity};

    let result = Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::ClientId.eq(client_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

// ============================================================================
// Device Authorization Grant (RFC 8628)
// ============================================================================

fn device_code_from_model(
    model: entities::oidc_device_code::Model,
) -> Result<OidcDeviceCode, StoreError> {
    let device_code = OidcDeviceCode {
        base: Base {
            id: model.id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        },
        device_code: model.device_code,
        user_code: model.user_code,
        scope: model.scope,
        nonce: model.nonce,
        expires_at: model.expires_at,
        is_authorized: model.is_authorized,
        user_id: model.user_id,
        client_id: model.client_id,
    };
    device_code.validate()?;
    Ok(device_code)
}

/// Create a pending device code with a fresh device code and user code.
pub async fn create_device_code(
    db: &DatabaseConnection,
    client_id: &str,
    scope: &str,
    nonce: &str,
    ttl_secs: i64,
) -> Result<OidcDeviceCode, StoreError> {
    insert_device_code(db, client_id, scope, nonce, ttl_secs, generate_user_code).await
}

async fn insert_device_code(
    db: &DatabaseConnection,
    client_id: &str,
    scope: &str,
    nonce: &str,
    ttl_secs: i64,
    mut next_user_code: impl FnMut() -> String,
) -> Result<OidcDeviceCode, StoreError> {
    use entities::oidc_device_code::{Column, Entity};

    const ATTEMPTS: usize = 3;

    // user codes are short; retry the rare collision with a live code
    let mut attempt = 0;
    loop {
        attempt += 1;
        let base = Base::new();
        let user_code = next_user_code();
        let device_code = entities::oidc_device_code::ActiveModel {
            id: Set(base.id),
            device_code: Set(random_id()),
            user_code: Set(user_code.clone()),
            scope: Set(scope.to_string()),
            nonce: Set(nonce.to_string()),
            expires_at: Set(base.created_at + ttl_secs),
            is_authorized: Set(false),
            user_id: Set(None),
            client_id: Set(client_id.to_string()),
            created_at: Set(base.created_at),
            updated_at: Set(base.updated_at),
        };

        let err = match device_code.insert(db).await.map_err(StoreError::from) {
            Ok(model) => return device_code_from_model(model),
            Err(err @ StoreError::Constraint(_)) if attempt < ATTEMPTS => err,
            Err(err) => return Err(err),
        };

        // Any other constraint (unknown client, device code clash) is not retried
        let taken = Entity::find()
            .filter(Column::UserCode.eq(user_code.as_str()))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Err(err);
        }
        warn!(attempt, "User code collision, regenerating");
    }
}

pub async fn get_device_code(
    db: &DatabaseConnection,
    device_code: &str,
) -> Result<Option<OidcDeviceCode>, StoreError> {
    use entities::oidc_device_code::{Column, Entity};

    Entity::find()
        .filter(Column::DeviceCode.eq(device_code))
        .one(db)
        .await?
        .map(device_code_from_model)
        .transpose()
}

pub async fn get_device_code_by_user_code(
    db: &DatabaseConnection,
    user_code: &str,
) -> Result<Option<OidcDeviceCode>, StoreError> {
    use entities::oidc_device_code::{Column, Entity};

    Entity::find()
        .filter(Column::UserCode.eq(user_code))
        .one(db)
        .await?
        .map(device_code_from_model)
        .transpose()
}

/// Record a user's approval of the device identified by `user_code`.
///
/// Fails with [`StoreError::InvalidState`] if the code was already approved.
pub async fn authorize_device_code(
    db: &DatabaseConnection,
    user_code: &str,
    user_id: &str,
) -> Result<OidcDeviceCode, StoreError> {
    use entities::oidc_device_code::{Column, Entity};

    let txn = db.begin().await?;

    let model = Entity::find()
        .filter(Column::UserCode.eq(user_code))
        .one(&txn)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("device user code {}", user_code)))?;

    let mut device_code = device_code_from_model(model.clone())?;
    device_code.authorize(user_id, now())?;

    // Only flip a row that is still pending
    let result = Entity::update_many()
        .col_expr(Column::IsAuthorized, Expr::value(true))
        .col_expr(Column::UserId, Expr::value(Some(user_id.to_string())))
        .col_expr(Column::UpdatedAt, Expr::value(device_code.base.updated_at))
        .filter(Column::Id.eq(model.id))
        .filter(Column::IsAuthorized.eq(false))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(StoreError::InvalidState(format!(
            "device code {} is already authorized",
            device_code.base.id
        )));
    }
    txn.commit().await?;

    info!(client_id = %device_code.client_id, user_id = %user_id, "Authorized device code");
    Ok(device_code)
}

/// Take an authorized device code, deleting it in the same transaction.
///
/// Returns `None` for an unknown code and [`StoreError::InvalidState`] while
/// the code is still pending, so the caller can answer `authorization_pending`.
pub async fn consume_device_code(
    db: &DatabaseConnection,
    device_code: &str,
) -> Result<Option<OidcDeviceCode>, StoreError> {
    use entities::oidc_device_code::{Column, Entity};

    let txn = db.begin().await?;

    let Some(model) = Entity::find()
        .filter(Column::DeviceCode.eq(device_code))
        .one(&txn)
        .await?
    else {
        return Ok(None);
    };

    let dc = device_code_from_model(model)?;
    if !dc.is_authorized {
        return Err(StoreError::InvalidState(format!(
            "device code {} is pending authorization",
            dc.base.id
        )));
    }

    let result = Entity::delete_by_id(dc.base.id.clone()).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Ok(None);
    }
    txn.commit().await?;

    Ok(Some(dc))
}

// ============================================================================
// User authorized clients (consent grants)
// ============================================================================

impl From<entities::user_authorized_oidc_client::Model> for UserAuthorizedOidcClient {
    fn from(model: entities::user_authorized_oidc_client::Model) -> Self {
        Self {
            user_id: model.user_id,
            client_id: model.client_id,
            scope: model.scope,
            last_used_at: model.last_used_at,
        }
    }
}

/// Insert or update the grant for (user, client). `last_used_at` never moves
/// backwards.
pub async fn upsert_authorized_client(
    db: &DatabaseConnection,
    user_id: &str,
    client_id: &str,
    scope: &str,
) -> Result<UserAuthorizedOidcClient, StoreError> {
    use entities::user_authorized_oidc_client::{ActiveModel, Column, Entity};

    let grant = ActiveModel {
        user_id: Set(user_id.to_string()),
        client_id: Set(client_id.to_string()),
        scope: Set(scope.to_string()),
        last_used_at: Set(now()),
    };

    // last_used_at = max(stored, excluded), evaluated by the database
    let stored = Expr::col((Entity, Column::LastUsedAt));
    let incoming = Expr::cust("excluded.last_used_at");
    let newest = Expr::case(stored.clone().lt(incoming.clone()), incoming).finally(stored);

    let txn = db.begin().await?;

    Entity::insert(grant)
        .on_conflict(
            OnConflict::columns([Column::UserId, Column::ClientId])
                .update_column(Column::Scope)
                .value(Column::LastUsedAt, newest)
                .to_owned(),
        )
        .exec(&txn)
        .await?;

    let grant = Entity::find_by_id((user_id.to_string(), client_id.to_string()))
        .one(&txn)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("grant {}/{}", user_id, client_id)))?;
    txn.commit().await?;

    info!(user_id = %user_id, client_id = %client_id, scope = %scope, "Upserted client authorization");

    Ok(grant.into())
}

/// Advance `last_used_at` for an existing grant after a token was issued.
pub async fn touch_authorized_client(
    db: &DatabaseConnection,
    user_id: &str,
    client_id: &str,
) -> Result<Option<UserAuthorizedOidcClient>, StoreError> {
    use entities::user_authorized_oidc_client::{Column, Entity};

    let now = now();
    // Only ever moves forward; a concurrent newer touch wins
    Entity::update_many()
        .col_expr(Column::LastUsedAt, Expr::value(now))
        .filter(Column::UserId.eq(user_id))
        .filter(Column::ClientId.eq(client_id))
        .filter(Column::LastUsedAt.lt(now))
        .exec(db)
        .await?;

    Ok(Entity::find_by_id((user_id.to_string(), client_id.to_string()))
        .one(db)
        .await?
        .map(Into::into))
}

pub async fn get_authorized_client(
    db: &DatabaseConnection,
    user_id: &str,
    client_id: &str,
) -> Result<Option<UserAuthorizedOidcClient>, StoreError> {
    Ok(
        entities::UserAuthorizedOidcClient::find_by_id((user_id.to_string(), client_id.to_string()))
            .one(db)
            .await?
            .map(Into::into),
    )
}

/// Grants of a user, most recently used first.
pub async fn list_authorized_clients_for_user(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<UserAuthorizedOidcClient>, StoreError> {
    use entities::user_authorized_oidc_client::{Column, Entity};

    Ok(Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_desc(Column::LastUsedAt)
        .order_by_asc(Column::ClientId)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}

/// Withdraw a user's consent and drop their refresh tokens for the client.
/// Returns whether a grant existed.
pub async fn revoke_authorized_client(
    db: &DatabaseConnection,
    user_id: &str,
    client_id: &str,
) -> Result<bool, StoreError> {
    use entities::oidc_refresh_token::{Column as TokenColumn, Entity as TokenEntity};

    let txn = db.begin().await?;

    let result =
        entities::UserAuthorizedOidcClient::delete_by_id((user_id.to_string(), client_id.to_string()))
            .exec(&txn)
            .await?;

    TokenEntity::delete_many()
        .filter(TokenColumn::UserId.eq(user_id))
        .filter(TokenColumn::ClientId.eq(client_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(result.rows_affected > 0)
}
