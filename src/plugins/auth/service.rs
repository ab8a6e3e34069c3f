// 认证服务
// 持有当前策略和校验器，支持运行时切换策略

use crate::db::DatabaseManager;
use crate::errors::InventoryError;
use crate::kernel::{EventBus, events};
use crate::plugins::auth::{
    AuthComponents, AuthCredentials, AuthResult, AuthType, Claims, JwtService, TokenPair,
    ValidationResult, find_admin_by_id,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// 登录结果
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// 凭据格式不合法
    Invalid(ValidationResult),
    /// 凭据错误
    Rejected(AuthResult),
    Authenticated(AuthResult),
}

/// 认证服务
///
/// 策略和校验器作为一组放在同一把锁后面，切换时整体替换
pub struct AuthService {
    components: RwLock<Arc<AuthComponents>>,
    db: Arc<DatabaseManager>,
    jwt: Arc<JwtService>,
    event_bus: Arc<EventBus>,
}

impl AuthService {
    pub fn new(
        components: AuthComponents,
        db: Arc<DatabaseManager>,
        jwt: Arc<JwtService>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            components: RwLock::new(Arc::new(components)),
            db,
            jwt,
            event_bus,
        }
    }

    /// 运行时切换策略和校验器，不重新执行插件初始化
    pub async fn set_strategy(&self, components: AuthComponents) {
        let mut current = self.components.write().await;

        info!(
            from = %current.auth_type,
            to = %components.auth_type,
            strategy = components.strategy.name(),
            "切换认证策略"
        );

        *current = Arc::new(components);
    }

    /// 当前策略和校验器的快照，一次请求内只取一次
    pub async fn components(&self) -> Arc<AuthComponents> {
        self.components.read().await.clone()
    }

    pub async fn auth_type(&self) -> AuthType {
        self.components.read().await.auth_type
    }

    /// 登录: 校验 → 认证 → 发布 `auth:login`
    #[instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &AuthCredentials) -> Result<LoginOutcome, InventoryError> {
        let components = self.components().await;
        let validator = &components.validator;
        let strategy = &components.strategy;

        let credentials = validator.sanitize(credentials);
        let validation = validator.validate(&credentials);
        if !validation.is_valid {
            return Ok(LoginOutcome::Invalid(validation));
        }

        let result = strategy.authenticate(&credentials).await?;
        if !result.success {
            warn!(usuario = ?credentials.usuario, strategy = strategy.name(), "登录失败");
            return Ok(LoginOutcome::Rejected(result));
        }

        if let Some(user) = &result.user {
            self.event_bus.emit(
                events::AUTH_LOGIN,
                &json!({
                    "id": user.id,
                    "usuario": user.usuario,
                    "strategy": strategy.name(),
                    "timestamp": Utc::now(),
                }),
            );
        }

        Ok(LoginOutcome::Authenticated(result))
    }

    /// 用刷新令牌换取新的一对令牌
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, InventoryError> {
        let claims = self.jwt.verify_refresh_token(refresh_token)?;

        let user = find_admin_by_id(&self.db, claims.sub)
            .await?
            .ok_or_else(|| InventoryError::authentication("用户不存在"))?;

        info!(user_id = user.id, "刷新令牌");
        self.jwt.generate_tokens(user.id, &user.usuario)
    }

    /// 校验访问令牌并返回声明
    pub fn verify(&self, token: &str) -> Result<Claims, InventoryError> {
        self.jwt.verify_access_token(token)
    }

    /// 注销，发布 `auth:logout`
    pub async fn logout(&self, token: &str) {
        let components = self.components().await;
        components.strategy.logout(token).await;

        self.event_bus.emit(
            events::AUTH_LOGOUT,
            &json!({
                "strategy": components.strategy.name(),
                "timestamp": Utc::now(),
            }),
        );
    }
}
