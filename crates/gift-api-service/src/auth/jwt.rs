//! JWT Token 处理
//!
//! 身份协作方与本服务共享同一签名密钥，Token 在登录时签发，
//! 此处只负责生成与校验。

use chrono::{Duration, Utc};
use gift_shared::config::AuthConfig;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// 用户 ID
    pub sub: Uuid,
    /// 用户邮箱
    pub email: String,
    /// 目录管理权限（目录协作方使用，核心接口不区分）
    #[serde(default)]
    pub can_manage_catalog: bool,
    /// 签发时间
    pub iat: i64,
    /// 过期时间
    pub exp: i64,
}

/// JWT 管理器
#[derive(Clone)]
pub struct JwtManager {
    expires_in_hours: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            expires_in_hours: config.token_expiry_hours,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// 生成 JWT Token，返回 (token, 过期时间戳)
    pub fn generate_token(&self, user_id: Uuid, email: &str) -> Result<(String, i64), ApiError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expires_in_hours);

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            can_manage_catalog: false,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("JWT 生成失败: {}", e)))?;

        Ok((token, exp.timestamp()))
    }

    /// 验证并解析 JWT Token
    pub fn verify_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        ApiError::Unauthorized("Token 已过期".to_string())
                    }
                    _ => ApiError::Unauthorized("Token 无效".to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}
