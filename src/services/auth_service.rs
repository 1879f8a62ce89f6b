use crate::{
    config::AuthConfig,
    models::{
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User, UserProfile,
        UserSummary,
    },
    store::{StoreError, UserStore},
    utils::error::AppError,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

/// Verified against when the username is unknown so both login failures cost
/// one bcrypt verification.
const DUMMY_PASSWORD: &str = "school-service-dummy-password";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user _id (hex)
    pub username: String,
    pub iat: usize,
    pub exp: usize,
    pub jti: String,
}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::try_seconds(ttl_secs).unwrap_or(Duration::MAX),
        }
    }

    pub fn issue(&self, user_id: &ObjectId, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::internal("generate token", "token lifetime out of range"))?;
        let claims = Claims {
            sub: user_id.to_hex(),
            username: username.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: expires_at.timestamp().max(0) as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::internal("generate token", e))
    }

    /// Any failure (bad signature, malformed, expired) is `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {}", e);
                AppError::InvalidToken
            })
    }
}

/// Everything the auth handlers need besides the user store.
#[derive(Clone)]
pub struct AuthSettings {
    pub tokens: TokenIssuer,
    pub bcrypt_cost: u32,
    /// Hash of `DUMMY_PASSWORD` at `bcrypt_cost`.
    dummy_hash: String,
}

impl From<&AuthConfig> for AuthSettings {
    fn from(config: &AuthConfig) -> Self {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, config.bcrypt_cost).unwrap_or_else(|e| {
            log::error!("❌ Cannot hash with bcrypt cost {}: {}", config.bcrypt_cost, e);
            String::new()
        });

        Self {
            tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs),
            bcrypt_cost: config.bcrypt_cost,
            dummy_hash,
        }
    }
}

fn required_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), AppError> {
    match (username, password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err(AppError::validation("Username and password are required")),
    }
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::internal("hash password", e))?
        .map_err(|e| AppError::internal("hash password", e))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::internal("verify password", e))?;

    match result {
        Ok(valid) => Ok(valid),
        Err(e) => {
            log::error!("❌ Stored password hash is unusable: {}", e);
            Ok(false)
        }
    }
}

// User registration
pub async fn register(
    users: &dyn UserStore,
    settings: &AuthSettings,
    request: RegisterRequest,
) -> Result<RegisterResponse, AppError> {
    let (username, password) = required_credentials(request.username, request.password)?;

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }

    let existing = users
        .find_by_username(&username)
        .await
        .map_err(|e| AppError::internal("register user", e))?;
    if existing.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    let hashed_password = hash_password(password, settings.bcrypt_cost).await?;

    let new_user = User {
        id: None,
        username: username.clone(),
        password: hashed_password,
        created_at: BsonDateTime::now(),
    };

    // The unique index still catches a concurrent registration of the same name
    let user_id = users.insert(new_user).await.map_err(|e| match e {
        StoreError::Duplicate(_) => AppError::DuplicateUsername,
        other => AppError::internal("register user", other),
    })?;

    log::info!("✅ User registered successfully: {}", username);

    Ok(RegisterResponse {
        message: "User registered successfully".to_string(),
        user_id: user_id.to_hex(),
    })
}

// User login
pub async fn login(
    users: &dyn UserStore,
    settings: &AuthSettings,
    request: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let (username, password) = required_credentials(request.username, request.password)?;

    let user = users
        .find_by_username(&username)
        .await
        .map_err(|e| AppError::internal("log in", e))?;

    let Some(user) = user else {
        verify_password(password, settings.dummy_hash.clone()).await?;
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, user.password.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let user_id = user
        .id
        .ok_or_else(|| AppError::internal("log in", "stored user has no _id"))?;
    let token = settings.tokens.issue(&user_id, &user.username)?;

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary {
            id: user_id.to_hex(),
            username: user.username,
        },
    })
}

// Get current user
pub async fn get_current_user(
    users: &dyn UserStore,
    claims: &Claims,
) -> Result<UserProfile, AppError> {
    let user_id = ObjectId::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

    let user = users
        .find_by_id(user_id)
        .await
        .map_err(|e| AppError::internal("fetch user", e))?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(UserProfile::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;

    fn settings(ttl_secs: i64) -> AuthSettings {
        settings_with_cost(ttl_secs, 4)
    }

    fn settings_with_cost(ttl_secs: i64, bcrypt_cost: u32) -> AuthSettings {
        AuthSettings::from(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs: ttl_secs,
            bcrypt_cost,
        })
    }

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let issuer = TokenIssuer::new("test-secret", 3600);
        let id = ObjectId::new();
        let token = issuer.issue(&id, "raiden").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, id.to_hex());
        assert_eq!(claims.username, "raiden");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = TokenIssuer::new("test-secret", -10);
        let token = issuer.issue(&ObjectId::new(), "raiden").unwrap();
        assert!(matches!(issuer.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = TokenIssuer::new("secret-a", 3600)
            .issue(&ObjectId::new(), "raiden")
            .unwrap();
        let other = TokenIssuer::new("secret-b", 3600);
        assert!(matches!(other.verify(&token), Err(AppError::InvalidToken)));
        assert!(matches!(other.verify("garbage"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let users = MemoryUserStore::new();
        let settings = settings(3600);

        let err = register(&users, &settings, RegisterRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Username and password are required");

        let err = register(&users, &settings, register_request("raiden", "12345"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters long");
    }

    #[tokio::test]
    async fn test_register_hashes_and_rejects_duplicates() {
        let users = MemoryUserStore::new();
        let settings = settings(3600);

        register(&users, &settings, register_request("raiden", "hunter22"))
            .await
            .unwrap();
        let stored = users.find_by_username("raiden").await.unwrap().unwrap();
        assert_ne!(stored.password, "hunter22");
        assert!(bcrypt::verify("hunter22", &stored.password).unwrap());

        let err = register(&users, &settings, register_request("raiden", "another1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let users = MemoryUserStore::new();
        let settings = settings(3600);
        register(&users, &settings, register_request("raiden", "hunter22"))
            .await
            .unwrap();

        let wrong_password = login(&users, &settings, login_request("raiden", "wrong-pass"))
            .await
            .unwrap_err();
        let unknown_user = login(&users, &settings, login_request("nobody", "hunter22"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_token_resolves_profile() {
        let users = MemoryUserStore::new();
        let settings = settings(3600);
        let registered = register(&users, &settings, register_request("raiden", "hunter22"))
            .await
            .unwrap();

        let resp = login(&users, &settings, login_request("raiden", "hunter22"))
            .await
            .unwrap();
        assert_eq!(resp.user.id, registered.user_id);

        let claims = settings.tokens.verify(&resp.token).unwrap();
        let profile = get_current_user(&users, &claims).await.unwrap();
        assert_eq!(profile.username, "raiden");
        assert_eq!(profile.id, registered.user_id);
    }

    #[test]
    fn test_dummy_hash_uses_configured_cost() {
        let settings = settings(3600);
        assert!(settings.dummy_hash.starts_with("$2b$04$"));
        assert!(bcrypt::verify(DUMMY_PASSWORD, &settings.dummy_hash).unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user_login_still_runs_bcrypt() {
        let users = MemoryUserStore::new();
        let settings = settings_with_cost(3600, 10);

        let started = std::time::Instant::now();
        let err = login(&users, &settings, login_request("nobody", "hunter22"))
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, AppError::InvalidCredentials));
        // A cost-10 verification takes tens of milliseconds, a bare lookup microseconds
        assert!(elapsed >= std::time::Duration::from_millis(5), "took {:?}", elapsed);
    }

    #[test]
    fn test_oversized_ttl_does_not_panic() {
        let issuer = TokenIssuer::new("test-secret", i64::MAX);
        let err = issuer.issue(&ObjectId::new(), "raiden").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
