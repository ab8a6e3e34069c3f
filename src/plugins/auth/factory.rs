// 认证组件工厂
// 每种认证方式产出配套的策略和校验器

use crate::db::DatabaseManager;
use crate::plugins::auth::{
    AuthStrategy, AuthType, AuthValidator, JwtAuthStrategy, JwtAuthValidator, JwtService,
    LocalAuthStrategy, LocalAuthValidator,
};
use std::sync::Arc;

/// 配套的策略和校验器
#[derive(Clone)]
pub struct AuthComponents {
    pub strategy: Arc<dyn AuthStrategy>,
    pub validator: Arc<dyn AuthValidator>,
    pub auth_type: AuthType,
}

impl std::fmt::Debug for AuthComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthComponents")
            .field("strategy", &self.strategy.name())
            .field("auth_type", &self.auth_type)
            .finish()
    }
}

/// 认证组件工厂
pub trait AuthFactory: Send + Sync {
    fn auth_type(&self) -> AuthType;

    fn create_strategy(&self) -> Arc<dyn AuthStrategy>;

    fn create_validator(&self) -> Arc<dyn AuthValidator>;

    fn create_components(&self) -> AuthComponents {
        AuthComponents {
            strategy: self.create_strategy(),
            validator: self.create_validator(),
            auth_type: self.auth_type(),
        }
    }
}

/// 本地认证工厂
pub struct LocalAuthFactory {
    db: Arc<DatabaseManager>,
}

impl LocalAuthFactory {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }
}

impl AuthFactory for LocalAuthFactory {
    fn auth_type(&self) -> AuthType {
        AuthType::Local
    }

    fn create_strategy(&self) -> Arc<dyn AuthStrategy> {
        Arc::new(LocalAuthStrategy::new(self.db.clone()))
    }

    fn create_validator(&self) -> Arc<dyn AuthValidator> {
        Arc::new(LocalAuthValidator)
    }
}

/// JWT 认证工厂
pub struct JwtAuthFactory {
    db: Arc<DatabaseManager>,
    jwt: Arc<JwtService>,
}

impl JwtAuthFactory {
    pub fn new(db: Arc<DatabaseManager>, jwt: Arc<JwtService>) -> Self {
        Self { db, jwt }
    }
}

impl AuthFactory for JwtAuthFactory {
    fn auth_type(&self) -> AuthType {
        AuthType::Jwt
    }

    fn create_strategy(&self) -> Arc<dyn AuthStrategy> {
        Arc::new(JwtAuthStrategy::new(self.db.clone(), self.jwt.clone()))
    }

    fn create_validator(&self) -> Arc<dyn AuthValidator> {
        Arc::new(JwtAuthValidator)
    }
}

/// 按认证方式选择工厂
pub struct AuthFactoryProvider;

impl AuthFactoryProvider {
    pub fn factory(
        auth_type: AuthType,
        db: Arc<DatabaseManager>,
        jwt: Arc<JwtService>,
    ) -> Box<dyn AuthFactory> {
        match auth_type {
            AuthType::Local => Box::new(LocalAuthFactory::new(db)),
            AuthType::Jwt => Box::new(JwtAuthFactory::new(db, jwt)),
        }
    }

    pub fn create(
        auth_type: AuthType,
        db: Arc<DatabaseManager>,
        jwt: Arc<JwtService>,
    ) -> AuthComponents {
        Self::factory(auth_type, db, jwt).create_components()
    }
}
