use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access", "refresh" or "reset"
}

impl Claims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::AuthError("Invalid subject in token".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
    reset_token_expires_in: i64,
}

impl JwtService {
    pub fn new(
        secret: &str,
        access_expires_in: i64,
        refresh_expires_in: i64,
        reset_expires_in: i64,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
            reset_token_expires_in: reset_expires_in,
        }
    }

    fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
        token_type: &str,
        expires_in: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn generate_access_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        self.generate_token(user_id, email, "access", self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        self.generate_token(user_id, email, "refresh", self.refresh_token_expires_in)
    }

    pub fn generate_reset_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        self.generate_token(user_id, email, "reset", self.reset_token_expires_in)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    fn verify_typed_token(&self, token: &str, token_type: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != token_type {
            return Err(AppError::AuthError(format!(
                "Invalid {token_type} token type"
            )));
        }

        Ok(claims)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed_token(token, "access")
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed_token(token, "refresh")
    }

    pub fn verify_reset_token(&self, token: &str) -> AppResult<Claims> {
        self.verify_typed_token(token, "reset")
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }

    pub fn get_reset_token_expires_in(&self) -> i64 {
        self.reset_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 3600, 86400, 1800)
    }

    #[test]
    fn test_access_token_roundtrip() {
        let jwt = service();
        let user_id = Uuid::new_v4();
        let token = jwt.generate_access_token(user_id, "jane@example.com").unwrap();

        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_token_type_is_enforced() {
        let jwt = service();
        let user_id = Uuid::new_v4();
        let refresh = jwt.generate_refresh_token(user_id, "jane@example.com").unwrap();

        assert!(jwt.verify_access_token(&refresh).is_err());
        assert!(jwt.verify_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_reset_token_roundtrip() {
        let jwt = service();
        let user_id = Uuid::new_v4();
        let reset = jwt.generate_reset_token(user_id, "jane@example.com").unwrap();

        let claims = jwt.verify_reset_token(&reset).unwrap();
        assert_eq!(claims.token_type, "reset");
        assert!(jwt.verify_access_token(&reset).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let jwt = service();
        let other = JwtService::new("other-secret", 3600, 86400, 1800);
        let token = jwt
            .generate_access_token(Uuid::new_v4(), "jane@example.com")
            .unwrap();

        assert!(other.verify_access_token(&token).is_err());
    }
}
