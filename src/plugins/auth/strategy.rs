// 认证策略
// 本地策略只校验密码，JWT 策略在校验通过后签发令牌

use crate::db::DatabaseManager;
use crate::errors::InventoryError;
use crate::plugins::auth::{AuthCredentials, AuthResult, AuthUser, JwtService};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const FIND_ADMIN_BY_USUARIO: &str = "SELECT idadmin, nombreapellido, numero, usuario, contrasena \
     FROM admin WHERE usuario = $1";

const FIND_ADMIN_BY_ID: &str = "SELECT idadmin, nombreapellido, numero, usuario \
     FROM admin WHERE idadmin = $1";

/// 认证策略接口
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// 校验凭据，凭据错误返回 `success = false`
    async fn authenticate(&self, credentials: &AuthCredentials)
        -> Result<AuthResult, InventoryError>;

    async fn validate_token(&self, token: &str) -> bool;

    /// 没有黑名单，仅记录日志
    async fn logout(&self, token: &str);
}

/// 管理员记录
#[derive(Debug, Clone)]
pub struct AdminRecord {
    pub user: AuthUser,
    password: Option<String>,
}

impl AdminRecord {
    fn from_row(row: &JsonValue) -> Option<Self> {
        Some(Self {
            user: AuthUser {
                id: row.get("idadmin")?.as_i64()?,
                usuario: row.get("usuario")?.as_str()?.to_string(),
                nombreapellido: row
                    .get("nombreapellido")
                    .and_then(JsonValue::as_str)
                    .map(str::to_string),
            },
            password: row
                .get("contrasena")
                .and_then(JsonValue::as_str)
                .map(str::to_string),
        })
    }
}

/// 按用户名查找管理员
pub async fn find_admin(
    db: &DatabaseManager,
    usuario: &str,
) -> Result<Option<AdminRecord>, InventoryError> {
    let row = db
        .query_one(FIND_ADMIN_BY_USUARIO, vec![usuario.into()])
        .await?;
    Ok(row.as_ref().and_then(AdminRecord::from_row))
}

/// 按 ID 查找管理员
pub async fn find_admin_by_id(
    db: &DatabaseManager,
    id: i64,
) -> Result<Option<AuthUser>, InventoryError> {
    let row = db.query_one(FIND_ADMIN_BY_ID, vec![id.into()]).await?;
    Ok(row
        .as_ref()
        .and_then(AdminRecord::from_row)
        .map(|record| record.user))
}

/// 校验密码
///
/// 存储值为 bcrypt 哈希时按哈希校验，否则直接比较
pub fn verify_password(plain: &str, stored: &str) -> bool {
    let hashed = ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| stored.starts_with(prefix));

    if hashed {
        bcrypt::verify(plain, stored).unwrap_or_else(|e| {
            warn!(error = %e, "密码哈希格式无效");
            false
        })
    } else {
        plain == stored
    }
}

/// 查找管理员并校验密码，成功时返回用户信息
async fn check_credentials(
    db: &DatabaseManager,
    credentials: &AuthCredentials,
) -> Result<Option<AuthUser>, InventoryError> {
    let (Some(usuario), Some(contrasena)) = (&credentials.usuario, &credentials.contrasena) else {
        return Ok(None);
    };

    let Some(record) = find_admin(db, usuario).await? else {
        debug!(usuario = %usuario, "管理员不存在");
        return Ok(None);
    };

    let matches = record
        .password
        .as_deref()
        .is_some_and(|stored| verify_password(contrasena, stored));
    Ok(matches.then_some(record.user))
}

/// 本地认证策略
pub struct LocalAuthStrategy {
    db: Arc<DatabaseManager>,
}

impl LocalAuthStrategy {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthStrategy for LocalAuthStrategy {
    fn name(&self) -> &'static str {
        "local"
    }

    #[instrument(skip(self, credentials), fields(usuario = ?credentials.usuario))]
    async fn authenticate(
        &self,
        credentials: &AuthCredentials,
    ) -> Result<AuthResult, InventoryError> {
        match check_credentials(&self.db, credentials).await? {
            Some(user) => {
                info!(user_id = user.id, "本地认证成功");
                Ok(AuthResult::accepted(user, "本地认证成功"))
            }
            None => Ok(AuthResult::rejected("用户名或密码错误")),
        }
    }

    async fn validate_token(&self, _token: &str) -> bool {
        false
    }

    async fn logout(&self, _token: &str) {
        debug!("本地认证无会话令牌");
    }
}

/// JWT 认证策略
pub struct JwtAuthStrategy {
    db: Arc<DatabaseManager>,
    jwt: Arc<JwtService>,
}

impl JwtAuthStrategy {
    pub fn new(db: Arc<DatabaseManager>, jwt: Arc<JwtService>) -> Self {
        Self { db, jwt }
    }
}

#[async_trait]
impl AuthStrategy for JwtAuthStrategy {
    fn name(&self) -> &'static str {
        "jwt"
    }

    #[instrument(skip(self, credentials), fields(usuario = ?credentials.usuario))]
    async fn authenticate(
        &self,
        credentials: &AuthCredentials,
    ) -> Result<AuthResult, InventoryError> {
        // 只带令牌时按已有会话处理
        if let (None, Some(token)) = (&credentials.usuario, &credentials.token) {
            return Ok(match self.jwt.verify_access_token(token) {
                Ok(claims) => AuthResult {
                    token: Some(token.clone()),
                    ..AuthResult::accepted(
                        AuthUser {
                            id: claims.sub,
                            usuario: claims.usuario,
                            nombreapellido: None,
                        },
                        "令牌有效",
                    )
                },
                Err(_) => AuthResult::rejected("令牌无效或已过期"),
            });
        }

        let Some(user) = check_credentials(&self.db, credentials).await? else {
            return Ok(AuthResult::rejected("用户名或密码错误"));
        };

        let tokens = self.jwt.generate_tokens(user.id, &user.usuario)?;
        info!(user_id = user.id, "JWT 认证成功");

        Ok(AuthResult {
            token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            expires_in: Some(tokens.expires_in),
            ..AuthResult::accepted(user, "JWT 认证成功")
        })
    }

    async fn validate_token(&self, token: &str) -> bool {
        self.jwt.verify_access_token(token).is_ok()
    }

    async fn logout(&self, token: &str) {
        let prefix: String = token.chars().take(10).collect();
        info!(token_prefix = %prefix, "令牌已注销");
    }
}
