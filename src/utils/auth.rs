//! Authentication utilities

use anyhow::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// jwt claims: the subject is the authenticated user id
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub token_type: String,
}

/// hash a password using pbkdf2-sha256 with the server-wide salt
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut hash,
    );

    hex::encode(hash)
}

/// verify a password against a hash using constant-time comparison
pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let computed = hash_password(password, salt);
    computed.as_bytes().ct_eq(hash.as_bytes()).into()
}

/// create jwt token with token type and ttl seconds
pub fn create_jwt(user_id: &str, secret: &str, token_type: &str, expires_in: u64) -> Result<String> {
    let expiration = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() + expires_in;

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration as usize,
        token_type: token_type.to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// verify jwt token and optionally enforce token type
pub fn verify_jwt(token: &str, secret: &str, expected_type: Option<&str>) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.sub = None;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    let claims = token_data.claims;
    if let Some(t) = expected_type {
        if !claims.token_type.is_empty() && claims.token_type != t {
            return Err(anyhow::anyhow!("Invalid token type"));
        }
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("correct horse", "salt-1");

        assert!(verify_password("correct horse", "salt-1", &hash));
        assert!(!verify_password("wrong horse", "salt-1", &hash));
        assert!(!verify_password("correct horse", "salt-2", &hash));
    }

    #[test]
    fn test_jwt_roundtrip() {
        let token = create_jwt("user-abc", "secret", TOKEN_TYPE_ACCESS, 60).unwrap();

        let claims = verify_jwt(&token, "secret", Some(TOKEN_TYPE_ACCESS)).unwrap();
        assert_eq!(claims.sub, "user-abc");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn test_jwt_rejects_wrong_secret() {
        let token = create_jwt("user-abc", "secret", TOKEN_TYPE_ACCESS, 60).unwrap();
        assert!(verify_jwt(&token, "other-secret", None).is_err());
    }

    #[test]
    fn test_jwt_rejects_wrong_token_type() {
        let token = create_jwt("user-abc", "secret", TOKEN_TYPE_REFRESH, 60).unwrap();
        assert!(verify_jwt(&token, "secret", Some(TOKEN_TYPE_ACCESS)).is_err());
    }
}
