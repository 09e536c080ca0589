use anyhow::Result;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::jwt::JwtConfig;

static JWT_CONFIG: OnceLock<JwtConfig> = OnceLock::new();

/// Initialize JWT config. Must be called once at startup.
pub fn init_jwt_config(config: JwtConfig) -> Result<()> {
    JWT_CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("JWT config already initialized"))?;
    Ok(())
}

fn get_config() -> Result<&'static JwtConfig> {
    JWT_CONFIG
        .get()
        .ok_or_else(|| anyhow::anyhow!("JWT config not initialized"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: usize,
    pub iat: usize,
    pub kind: TokenKind,
}

impl Claims {
    pub fn user_id(&self) -> Option<i32> {
        self.sub.parse().ok()
    }
}

pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub fn encode_token(user_id: i32, kind: TokenKind) -> Result<String> {
    let config = get_config()?;
    let now = chrono::Utc::now().timestamp() as usize;
    let ttl = match kind {
        TokenKind::Access => config.access_token_expiry,
        TokenKind::Refresh => config.refresh_token_expiry,
    };
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + ttl as usize,
        iat: now,
        kind,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("Failed to encode {:?} token: {}", kind, e))
}

pub fn issue_token_pair(user_id: i32) -> Result<TokenPair> {
    Ok(TokenPair {
        access_token: encode_token(user_id, TokenKind::Access)?,
        refresh_token: encode_token(user_id, TokenKind::Refresh)?,
    })
}

/// Decode and check that the token is of the expected kind.
pub fn decode_token(token: &str, expected: TokenKind) -> Result<Claims> {
    let config = get_config()?;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| anyhow::anyhow!("Failed to decode JWT: {}", e))?;

    if claims.kind != expected {
        return Err(anyhow::anyhow!(
            "Expected {:?} token, got {:?}",
            expected,
            claims.kind
        ));
    }
    Ok(claims)
}

pub fn expiry_seconds(kind: TokenKind) -> u64 {
    match (get_config(), kind) {
        (Ok(config), TokenKind::Access) => config.access_token_expiry,
        (Ok(config), TokenKind::Refresh) => config.refresh_token_expiry,
        (Err(_), _) => 0,
    }
}
