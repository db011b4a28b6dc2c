//! JWT 令牌服务
//!
//! 处理 JWT 令牌的生成、验证和解析。
//!
//! 四种用途的令牌共用同一签名密钥，通过 `token_type` claim 区分：
//! access / refresh / invitation / reset。验证时必须匹配预期用途，
//! 邀请令牌不能当访问令牌用。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Access token purpose
pub const TOKEN_TYPE_ACCESS: &str = "access";
/// Refresh token purpose
pub const TOKEN_TYPE_REFRESH: &str = "refresh";
/// Invitation token purpose
pub const TOKEN_TYPE_INVITATION: &str = "invitation";
/// Password-reset token purpose
pub const TOKEN_TYPE_RESET: &str = "reset";

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (应至少 32 字节)
    pub secret: String,
    /// Access 令牌过期时间 (分钟)
    pub access_expiration_minutes: i64,
    /// Refresh 令牌过期时间 (分钟)
    pub refresh_expiration_minutes: i64,
    /// 邀请/重置令牌过期时间 (分钟)
    pub invitation_expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: generate_secure_printable_secret(),
            access_expiration_minutes: 30,
            refresh_expiration_minutes: 1440,
            invitation_expiration_minutes: 30,
            issuer: "tally-server".to_string(),
            audience: "tally-clients".to_string(),
        }
    }
}

/// 生成可打印的安全密钥 (用于开发环境)
pub fn generate_secure_printable_secret() -> String {
    use rand::Rng;
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+";
    let mut rng = rand::thread_rng();
    (0..64)
        .map(|_| ALLOWED[rng.gen_range(0..ALLOWED.len())] as char)
        .collect()
}

/// 用户令牌的 JWT Claims (access / refresh / reset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 用户 ID (Subject)
    pub sub: String,
    /// 用户邮箱
    pub email: String,
    /// 令牌用途
    pub token_type: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// 邀请令牌的 JWT Claims — 编码 (email, store, role) 三元组
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteClaims {
    /// 受邀邮箱
    pub email: String,
    /// 目标店铺 ID
    pub store_id: i64,
    /// 入职角色名称
    pub role: String,
    /// 令牌用途 (invitation)
    pub token_type: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌用途不符: expected {expected}, got {actual}")]
    WrongPurpose { expected: String, actual: String },

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn encode_claims<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    fn user_claims(&self, user_id: i64, email: &str, token_type: &str, minutes: i64) -> Claims {
        let now = Utc::now();
        let expiration = now + Duration::minutes(minutes);
        Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_type: token_type.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        }
    }

    /// 生成 access 令牌
    pub fn generate_access_token(&self, user_id: i64, email: &str) -> Result<String, JwtError> {
        let claims = self.user_claims(
            user_id,
            email,
            TOKEN_TYPE_ACCESS,
            self.config.access_expiration_minutes,
        );
        self.encode_claims(&claims)
    }

    /// 生成 refresh 令牌
    pub fn generate_refresh_token(&self, user_id: i64, email: &str) -> Result<String, JwtError> {
        let claims = self.user_claims(
            user_id,
            email,
            TOKEN_TYPE_REFRESH,
            self.config.refresh_expiration_minutes,
        );
        self.encode_claims(&claims)
    }

    /// 生成密码重置令牌
    pub fn generate_reset_token(&self, user_id: i64, email: &str) -> Result<String, JwtError> {
        let claims = self.user_claims(
            user_id,
            email,
            TOKEN_TYPE_RESET,
            self.config.invitation_expiration_minutes,
        );
        self.encode_claims(&claims)
    }

    /// 生成邀请令牌 — 编码 (email, store, role)，固定 TTL
    pub fn generate_invitation_token(
        &self,
        email: &str,
        store_id: i64,
        role: &str,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.invitation_expiration_minutes);
        let claims = InviteClaims {
            email: email.to_string(),
            store_id,
            role: role.to_string(),
            token_type: TOKEN_TYPE_INVITATION.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        self.encode_claims(&claims)
    }

    fn decode_claims<T: DeserializeOwned>(
        &self,
        token: &str,
        required: &[&str],
    ) -> Result<T, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(required);

        let token_data = decode::<T>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 验证并解码用户令牌，检查用途
    pub fn validate_token(&self, token: &str, expected_type: &str) -> Result<Claims, JwtError> {
        let claims: Claims = self.decode_claims(token, &["sub", "exp", "iat", "iss", "aud"])?;
        if claims.token_type != expected_type {
            return Err(JwtError::WrongPurpose {
                expected: expected_type.to_string(),
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// 解码用户令牌但不校验过期时间
    ///
    /// 刷新轮换时使用：旧 access 令牌允许已过期，但签名和归属仍须有效
    pub fn decode_ignoring_expiry(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "iat", "iss", "aud"]);
        validation.validate_exp = false;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;
        Ok(token_data.claims)
    }

    /// 验证并解码邀请令牌
    pub fn validate_invitation_token(&self, token: &str) -> Result<InviteClaims, JwtError> {
        let claims: InviteClaims = self.decode_claims(token, &["exp", "iat", "iss", "aud"])?;
        if claims.token_type != TOKEN_TYPE_INVITATION {
            return Err(JwtError::WrongPurpose {
                expected: TOKEN_TYPE_INVITATION.to_string(),
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// 当前用户上下文
///
/// 由认证中间件在校验令牌并加载用户行后创建，注入到请求扩展。
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    /// 用户名
    pub username: String,
    /// 邮箱
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-key-that-is-long-enough-123456".to_string(),
            ..JwtConfig::default()
        })
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = service();
        let token = service
            .generate_access_token(42, "owner@example.com")
            .expect("Failed to generate token");

        let claims = service
            .validate_token(&token, TOKEN_TYPE_ACCESS)
            .expect("Failed to validate token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email, "owner@example.com");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = service();
        let token = service.generate_refresh_token(42, "owner@example.com").unwrap();

        let err = service.validate_token(&token, TOKEN_TYPE_ACCESS).unwrap_err();
        assert!(matches!(err, JwtError::WrongPurpose { .. }));
    }

    #[test]
    fn test_invitation_token_roundtrip() {
        let service = service();
        let token = service
            .generate_invitation_token("clerk@example.com", 7, "Sales Rep")
            .unwrap();

        let claims = service.validate_invitation_token(&token).unwrap();
        assert_eq!(claims.email, "clerk@example.com");
        assert_eq!(claims.store_id, 7);
        assert_eq!(claims.role, "Sales Rep");
    }

    #[test]
    fn test_expired_invitation_token() {
        let expired = JwtService::with_config(JwtConfig {
            secret: "test-secret-key-that-is-long-enough-123456".to_string(),
            invitation_expiration_minutes: -5,
            ..JwtConfig::default()
        });
        let token = expired
            .generate_invitation_token("clerk@example.com", 7, "Sales Rep")
            .unwrap();

        let err = expired.validate_invitation_token(&token).unwrap_err();
        assert!(matches!(err, JwtError::ExpiredToken));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = service();
        let other = JwtService::with_config(JwtConfig {
            secret: "a-completely-different-secret-key-7890123".to_string(),
            ..JwtConfig::default()
        });
        let token = other.generate_access_token(42, "owner@example.com").unwrap();

        assert!(service.validate_token(&token, TOKEN_TYPE_ACCESS).is_err());
    }
}
