// 认证相关类型

use crate::errors::InventoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 认证方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Jwt,
    Local,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jwt => "jwt",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthType {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jwt" => Ok(Self::Jwt),
            "local" => Ok(Self::Local),
            other => Err(InventoryError::configuration(format!(
                "不支持的认证方式: {}",
                other
            ))),
        }
    }
}

/// 登录凭据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthCredentials {
    #[serde(default, alias = "username", skip_serializing_if = "Option::is_none")]
    pub usuario: Option<String>,
    #[serde(default, alias = "password", skip_serializing_if = "Option::is_none")]
    pub contrasena: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthCredentials {
    pub fn password(usuario: impl Into<String>, contrasena: impl Into<String>) -> Self {
        Self {
            usuario: Some(usuario.into()),
            contrasena: Some(contrasena.into()),
            token: None,
        }
    }
}

/// 已认证的管理员信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub usuario: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombreapellido: Option<String>,
}

/// 认证结果
///
/// 凭据错误属于正常结果（`success = false`），不是错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// 访问令牌有效期（秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    pub message: String,
}

impl AuthResult {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            token: None,
            refresh_token: None,
            expires_in: None,
            message: message.into(),
        }
    }

    pub fn accepted(user: AuthUser, message: impl Into<String>) -> Self {
        Self {
            success: true,
            user: Some(user),
            token: None,
            refresh_token: None,
            expires_in: None,
            message: message.into(),
        }
    }
}

/// 凭据校验结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// 通过访问令牌认证的请求主体，存放在请求扩展中
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub usuario: String,
}
