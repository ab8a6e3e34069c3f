// 凭据校验器

use crate::plugins::auth::{AuthCredentials, ValidationResult};
use once_cell::sync::Lazy;
use regex::Regex;

static USUARIO_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").ok());

/// 凭据校验接口
pub trait AuthValidator: Send + Sync {
    fn validate(&self, credentials: &AuthCredentials) -> ValidationResult;

    fn validate_token_format(&self, token: &str) -> bool;

    /// 去掉用户名和令牌两端空白，空字符串视为缺失
    fn sanitize(&self, credentials: &AuthCredentials) -> AuthCredentials {
        let trimmed = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        AuthCredentials {
            usuario: trimmed(&credentials.usuario),
            contrasena: credentials.contrasena.clone().filter(|v| !v.is_empty()),
            token: trimmed(&credentials.token),
        }
    }
}

/// 本地认证校验
pub struct LocalAuthValidator;

impl AuthValidator for LocalAuthValidator {
    fn validate(&self, credentials: &AuthCredentials) -> ValidationResult {
        let mut errors = Vec::new();

        match credentials.usuario.as_deref() {
            None => errors.push("用户名不能为空".to_string()),
            Some(usuario) => {
                let len = usuario.chars().count();
                if len < 3 {
                    errors.push("用户名至少 3 个字符".to_string());
                }
                if len > 50 {
                    errors.push("用户名不能超过 50 个字符".to_string());
                }
                if !USUARIO_PATTERN
                    .as_ref()
                    .is_some_and(|pattern| pattern.is_match(usuario))
                {
                    errors.push("用户名只能包含字母、数字和下划线".to_string());
                }
            }
        }

        match credentials.contrasena.as_deref() {
            None => errors.push("密码不能为空".to_string()),
            Some(contrasena) => {
                let len = contrasena.chars().count();
                if len < 4 {
                    errors.push("密码至少 4 个字符".to_string());
                }
                if len > 100 {
                    errors.push("密码不能超过 100 个字符".to_string());
                }
            }
        }

        ValidationResult::from_errors(errors)
    }

    fn validate_token_format(&self, _token: &str) -> bool {
        false
    }
}

/// JWT 认证校验
pub struct JwtAuthValidator;

impl AuthValidator for JwtAuthValidator {
    fn validate(&self, credentials: &AuthCredentials) -> ValidationResult {
        let mut errors = Vec::new();

        if credentials.usuario.is_none() && credentials.token.is_none() {
            errors.push("需要提供用户名密码或令牌".to_string());
        }

        if let Some(usuario) = credentials.usuario.as_deref() {
            if usuario.chars().count() < 3 {
                errors.push("用户名至少 3 个字符".to_string());
            }
            match credentials.contrasena.as_deref() {
                None => errors.push("密码不能为空".to_string()),
                Some(contrasena) if contrasena.chars().count() < 4 => {
                    errors.push("密码至少 4 个字符".to_string())
                }
                Some(_) => {}
            }
        }

        if let Some(token) = credentials.token.as_deref() {
            if !self.validate_token_format(token) {
                errors.push("令牌格式无效".to_string());
            }
        }

        ValidationResult::from_errors(errors)
    }

    /// `header.payload.signature`，三段都不能为空
    fn validate_token_format(&self, token: &str) -> bool {
        let parts: Vec<&str> = token.split('.').collect();
        parts.len() == 3 && parts.iter().all(|part| !part.is_empty())
    }
}
