use std::sync::Arc;
use std::time::Duration;

use bcrypt::{hash, verify};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::models::user::UserInfo;
use crate::db::store::{InsertUserError, UserStore};
use crate::errors::{AuthError, AuthErrorKind};

pub const MIN_PASSWORD_LEN: usize = 6;

/// JWT Claims used for authentication.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject - user id
    pub sub: String,
    pub email: String,
    /// Expiration timestamp (UNIX TIME)
    pub exp: usize,
    /// Token id, the revocation key
    pub jti: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Session {
    pub token: String,
    pub user: UserInfo,
    pub expires_at: usize,
}

/// Session issuance, verification and sign-out.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: Arc<String>,
    token_ttl: Duration,
    bcrypt_cost: u32,
    revoked: Cache<String, ()>,
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid {
        return Err(AuthError::new(
            AuthErrorKind::InvalidInput,
            "Unable to validate email address: invalid format",
        ));
    }
    Ok(())
}

/// `now + ttl` as a JWT `exp`, or `None` when it does not fit.
fn expiry(now: i64, ttl: Duration) -> Option<usize> {
    let now = u64::try_from(now).ok()?;
    let exp = now.checked_add(ttl.as_secs())?;
    usize::try_from(exp).ok()
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_secret: String, token_ttl_secs: u64, bcrypt_cost: u32) -> Self {
        let token_ttl = Duration::from_secs(token_ttl_secs);
        Self {
            users,
            jwt_secret: Arc::new(jwt_secret),
            token_ttl,
            bcrypt_cost,
            // entries only need to outlive the tokens they revoke
            revoked: Cache::builder().time_to_live(token_ttl).build(),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::new(
                AuthErrorKind::InvalidInput,
                "Password should be at least 6 characters",
            ));
        }

        let password_hash = hash(password, self.bcrypt_cost).map_err(|e| {
            error!("Password hashing failed: {}", e);
            AuthError::internal(format!("hashing failed: {e}"))
        })?;

        let user = match self.users.insert(&email, &password_hash).await {
            Ok(user) => user,
            Err(InsertUserError::Duplicate) => {
                warn!("Sign-up for existing account: {}", email);
                return Err(AuthError::email_taken());
            }
            Err(InsertUserError::Persistence(e)) => {
                error!("Database error during sign-up: {}", e);
                return Err(AuthError::internal(e.to_string()));
            }
        };

        info!("Account created: {}", user.email);
        self.issue(UserInfo::from(&user))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(|e| {
                error!("Database error during sign-in: {}", e);
                AuthError::internal(e.to_string())
            })?;

        let Some(user) = user else {
            warn!("Sign-in attempt for unknown account: {}", email);
            return Err(AuthError::invalid_credentials());
        };

        match verify(password, &user.password_hash) {
            Ok(true) => {
                info!("Sign-in successful: {}", user.email);
                self.issue(UserInfo::from(&user))
            }
            Ok(false) => {
                warn!("Invalid password attempt: {}", user.email);
                Err(AuthError::invalid_credentials())
            }
            Err(e) => {
                error!("Password verification error: {}", e);
                Err(AuthError::internal(e.to_string()))
            }
        }
    }

    /// Revokes the token behind `claims`; later verification fails.
    pub fn sign_out(&self, claims: &Claims) {
        self.revoked.insert(claims.jti.clone(), ());
        info!("Signed out: {}", claims.email);
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("JWT decoding failed: {:?}", e);
            AuthError::unauthorized("Invalid token")
        })?;

        if self.revoked.contains_key(&data.claims.jti) {
            return Err(AuthError::unauthorized("Session has been signed out"));
        }
        Ok(data.claims)
    }

    fn issue(&self, user: UserInfo) -> Result<Session, AuthError> {
        let expires_at = expiry(chrono::Utc::now().timestamp(), self.token_ttl)
            .ok_or_else(|| AuthError::internal("Token expiry out of range"))?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp: expires_at,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::internal(format!("Token generation failed: {e}")))?;

        Ok(Session {
            token,
            user,
            expires_at,
        })
    }
}
