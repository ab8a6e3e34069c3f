// JWT 令牌服务
// 签发和校验访问令牌、刷新令牌

use crate::config::{AuthConfig, parse_duration};
use crate::errors::InventoryError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ISSUER: &str = "inventario-microkernel";
pub const DEFAULT_AUDIENCE: &str = "inventario-api";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub refresh_secret: String,
    pub access_expires_in: Duration,
    pub refresh_expires_in: Duration,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    /// 从认证配置构建，两个密钥相同视为配置错误
    pub fn from_auth_config(config: &AuthConfig) -> Result<Self, InventoryError> {
        if config.jwt_secret.is_empty() || config.jwt_refresh_secret.is_empty() {
            return Err(InventoryError::configuration("JWT 密钥不能为空"));
        }
        if config.jwt_secret == config.jwt_refresh_secret {
            return Err(InventoryError::configuration(
                "JWT_SECRET 与 JWT_REFRESH_SECRET 不能相同",
            ));
        }

        let access_expires_in = parse_duration(&config.jwt_expires_in).ok_or_else(|| {
            InventoryError::configuration(format!(
                "无效的访问令牌有效期: {}",
                config.jwt_expires_in
            ))
        })?;
        let refresh_expires_in = parse_duration(&config.jwt_refresh_expires_in).ok_or_else(|| {
            InventoryError::configuration(format!(
                "无效的刷新令牌有效期: {}",
                config.jwt_refresh_expires_in
            ))
        })?;

        Ok(Self {
            secret: config.jwt_secret.clone(),
            refresh_secret: config.jwt_refresh_secret.clone(),
            access_expires_in,
            refresh_expires_in,
            issuer: non_empty_or(&config.issuer, DEFAULT_ISSUER),
            audience: non_empty_or(&config.audience, DEFAULT_AUDIENCE),
        })
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// 令牌声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// 管理员 ID
    pub sub: i64,
    pub usuario: String,
    /// 仅刷新令牌携带
    #[serde(rename = "tokenType", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// 一对令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// 访问令牌有效期（秒）
    pub expires_in: i64,
    pub token_type: String,
}

/// JWT 服务
pub struct JwtService {
    config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            config,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// 访问令牌有效期（秒）
    pub fn access_expires_in(&self) -> i64 {
        self.config.access_expires_in.as_secs() as i64
    }

    /// 签发访问令牌和刷新令牌
    pub fn generate_tokens(&self, user_id: i64, usuario: &str) -> Result<TokenPair, InventoryError> {
        let now = Utc::now().timestamp();

        let access = Claims {
            sub: user_id,
            usuario: usuario.to_string(),
            token_type: None,
            iat: now,
            exp: now + self.access_expires_in(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };
        let refresh = Claims {
            token_type: Some(REFRESH_TOKEN_TYPE.to_string()),
            exp: now + self.config.refresh_expires_in.as_secs() as i64,
            ..access.clone()
        };

        let header = Header::new(Algorithm::HS256);
        Ok(TokenPair {
            access_token: encode(&header, &access, &self.access_encoding)?,
            refresh_token: encode(&header, &refresh, &self.refresh_encoding)?,
            expires_in: self.access_expires_in(),
            token_type: "Bearer".to_string(),
        })
    }

    /// 校验访问令牌
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, InventoryError> {
        let claims = decode::<Claims>(token, &self.access_decoding, &self.validation())?.claims;
        if claims.token_type.as_deref() == Some(REFRESH_TOKEN_TYPE) {
            return Err(InventoryError::authentication("刷新令牌不能用于访问"));
        }
        Ok(claims)
    }

    /// 校验刷新令牌，要求 `tokenType = refresh`
    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, InventoryError> {
        let claims = decode::<Claims>(token, &self.refresh_decoding, &self.validation())
            .map_err(|_| InventoryError::authentication("刷新令牌无效"))?
            .claims;
        if claims.token_type.as_deref() != Some(REFRESH_TOKEN_TYPE) {
            return Err(InventoryError::authentication("令牌不是刷新令牌"));
        }
        Ok(claims)
    }

    /// 从 `Authorization: Bearer <token>` 中取出令牌
    pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
        let mut parts = header?.split(' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
            _ => None,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_audience(&[self.config.audience.as_str()]);
        validation
    }
}
