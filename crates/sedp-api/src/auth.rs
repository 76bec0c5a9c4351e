use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{info, warn};

use sedp_core::{Authenticator, Credentials, Error as CoreError};
use sedp_types::api::{Claims, LoginRequest, LoginResponse};

use crate::error::{ApiError, run_blocking};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Admin sessions last one working day.
const TOKEN_TTL_HOURS: i64 = 12;

/// A single admin account checked against an Argon2 hash.
pub struct PasswordAuthenticator {
    username: String,
    password_hash: String,
}

impl PasswordAuthenticator {
    /// `password_hash` must be a PHC string, e.g. from `argon2` CLI output.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> anyhow::Result<Self> {
        let password_hash = password_hash.into();
        PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid admin password hash: {}", e))?;

        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }

    /// Hash a plaintext password with Argon2id and a fresh salt.
    pub fn from_plaintext(username: impl Into<String>, password: &str) -> anyhow::Result<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?
            .to_string();

        Ok(Self {
            username: username.into(),
            password_hash,
        })
    }
}

impl Authenticator for PasswordAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> bool {
        if credentials.username != self.username {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(&self.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(credentials.password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let credentials = Credentials {
        username: req.username,
        password: req.password,
    };

    // Argon2 verification blocks for a while.
    let authenticator = state.authenticator.clone();
    let accepted = run_blocking(move || Ok(authenticator.authenticate(&credentials))).await?;

    if !accepted {
        warn!("Rejected admin login for '{}'", username);
        return Err(CoreError::Authentication.into());
    }

    let token = create_token(&state.jwt_secret, &username).map_err(|e| {
        warn!("Failed to sign token: {}", e);
        ApiError::Internal
    })?;

    info!("Admin '{}' logged in", username);
    Ok(Json(LoginResponse { username, token }))
}

fn create_token(secret: &str, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
