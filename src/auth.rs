use chrono::{ Duration, Utc };
use jsonwebtoken::{ decode, encode, DecodingKey, EncodingKey, Header, Validation };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::error::{ AppError, Result };

/// Issued tokens stay valid for a week.
const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys derived from the configured secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::default(),
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e|
            AppError::Internal(format!("Failed to sign token: {}", e))
        )
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_round_trip() {
        let keys = JwtKeys::new(b"test secret");
        let user_id = Uuid::new_v4();

        let token = keys.issue(user_id, "user@example.com").unwrap();
        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let keys = JwtKeys::new(b"test secret");

        assert!(keys.verify("not a token").is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let keys = JwtKeys::new(b"test secret");
        let other = JwtKeys::new(b"other secret");

        let token = keys.issue(Uuid::new_v4(), "user@example.com").unwrap();

        assert!(other.verify(&token).is_err());
    }
}
