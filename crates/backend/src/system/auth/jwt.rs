use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use crate::shared::data::db::get_connection;

const ACCESS_TOKEN_LIFETIME_HOURS: i64 = 24;
const JWT_SECRET_KEY: &str = "jwt_secret";

/// Claims for a token issued at `now`
pub fn build_claims(user_id: &str, username: &str, is_admin: bool, now: DateTime<Utc>) -> TokenClaims {
    TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        is_admin,
        exp: (now + chrono::Duration::hours(ACCESS_TOKEN_LIFETIME_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    }
}

pub fn encode_token(claims: &TokenClaims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

/// Checks signature and expiry
pub fn decode_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(token_data.claims)
}

/// Generate JWT access token with 24 hours lifetime
pub async fn generate_access_token(user_id: &str, username: &str, is_admin: bool) -> Result<String> {
    let claims = build_claims(user_id, username, is_admin, Utc::now());
    let secret = get_jwt_secret().await?;
    encode_token(&claims, &secret)
}

/// Validate JWT token and extract claims
pub async fn validate_token(token: &str) -> Result<TokenClaims> {
    let secret = get_jwt_secret().await?;
    decode_token(token, &secret)
}

/// Get or create JWT secret from database
pub async fn get_jwt_secret() -> Result<String> {
    if let Some(secret) = get_jwt_secret_from_db().await? {
        return Ok(secret);
    }
    let secret = generate_jwt_secret();
    save_jwt_secret_to_db(&secret).await?;
    tracing::info!("Generated new JWT secret");
    Ok(secret)
}

/// Random 256-bit secret, base64 encoded
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    general_purpose::STANDARD.encode(random_bytes)
}

async fn get_jwt_secret_from_db() -> Result<Option<String>> {
    let result = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [JWT_SECRET_KEY.into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(row.try_get("", "value")?)),
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(secret: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT OR REPLACE INTO sys_settings (key, value, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            [
                JWT_SECRET_KEY.into(),
                secret.to_string().into(),
                "Auto-generated JWT secret for authentication".into(),
                now.clone().into(),
                now.into(),
            ],
        ))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip() {
        let secret = generate_jwt_secret();
        let claims = build_claims("u1", "marta", true, Utc::now());

        let token = encode_token(&claims, &secret).unwrap();
        let decoded = decode_token(&token, &secret).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.exp - decoded.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let claims = build_claims("u1", "marta", false, Utc::now());
        let token = encode_token(&claims, "first-secret").unwrap();
        assert!(decode_token(&token, "second-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Utc::now() - chrono::Duration::hours(48);
        let claims = build_claims("u1", "marta", false, issued);
        let token = encode_token(&claims, "secret").unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn test_generated_secrets_differ() {
        let a = generate_jwt_secret();
        let b = generate_jwt_secret();
        assert_ne!(a, b);
        assert_eq!(a.len(), 44);
    }
}
