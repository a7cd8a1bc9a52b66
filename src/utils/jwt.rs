use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // member_id
    pub uid: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access" or "refresh"
}

impl Claims {
    pub fn member_id(&self) -> AppResult<i64> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64, refresh_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
            refresh_token_expires_in: refresh_expires_in,
        }
    }

    fn generate_token(
        &self,
        member_id: i64,
        uid: &str,
        token_type: &str,
        expires_in: i64,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in);

        let claims = Claims {
            sub: member_id.to_string(),
            uid: uid.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn generate_access_token(&self, member_id: i64, uid: &str) -> AppResult<String> {
        self.generate_token(member_id, uid, "access", self.access_token_expires_in)
    }

    pub fn generate_refresh_token(&self, member_id: i64, uid: &str) -> AppResult<String> {
        self.generate_token(member_id, uid, "refresh", self.refresh_token_expires_in)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "access" {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }

    pub fn verify_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "refresh" {
            return Err(AppError::AuthError("Invalid refresh token type".to_string()));
        }

        Ok(claims)
    }

    /// 从 `Bearer xxx` 形式的头部值中解析会员ID。
    ///
    /// 缺失、前缀不符或校验失败都视为匿名访问，返回 `None`。
    pub fn member_id_from_bearer(&self, bearer: Option<&str>) -> Option<i64> {
        let token = bearer?.strip_prefix(BEARER_PREFIX)?;
        match self
            .verify_access_token(token)
            .and_then(|claims| claims.member_id())
        {
            Ok(member_id) => Some(member_id),
            Err(e) => {
                log::debug!("Ignoring unusable bearer token: {e}");
                None
            }
        }
    }

    pub fn get_access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 3600, 7200)
    }

    #[test]
    fn test_access_token_round_trip() {
        let jwt = service();
        let token = jwt.generate_access_token(42, "kakao-42").unwrap();
        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.member_id().unwrap(), 42);
        assert_eq!(claims.uid, "kakao-42");
        assert!(jwt.verify_refresh_token(&token).is_err());
    }

    #[test]
    fn test_member_id_from_bearer() {
        let jwt = service();
        let token = jwt.generate_access_token(7, "uid-7").unwrap();

        assert_eq!(jwt.member_id_from_bearer(Some(&format!("Bearer {token}"))), Some(7));
        assert_eq!(jwt.member_id_from_bearer(None), None);
        // 缺少前缀
        assert_eq!(jwt.member_id_from_bearer(Some(&token)), None);
        assert_eq!(jwt.member_id_from_bearer(Some("Bearer not-a-jwt")), None);

        let refresh = jwt.generate_refresh_token(7, "uid-7").unwrap();
        assert_eq!(jwt.member_id_from_bearer(Some(&format!("Bearer {refresh}"))), None);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new("other-secret", 3600, 7200);
        let token = other.generate_access_token(1, "uid-1").unwrap();
        assert!(service().verify_access_token(&token).is_err());
    }
}
