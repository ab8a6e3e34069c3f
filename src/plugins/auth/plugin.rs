// 认证插件
// V1 只提供本地登录，V2 按配置选择认证方式并提供完整令牌接口

use crate::errors::InventoryError;
use crate::kernel::{EventBus, Plugin, RouteCapability, events, listener};
use crate::plugins::auth::{AuthFactoryProvider, AuthService, AuthType, JwtService, handlers};
use crate::plugins::database::{DATABASE_PLUGIN_NAME, DatabasePlugin};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, instrument};

pub const AUTH_PLUGIN_NAME: &str = "auth";

/// 构建认证服务并订阅登录事件
fn build_service(
    database: &DatabasePlugin,
    jwt: &Arc<JwtService>,
    auth_type: AuthType,
    event_bus: Arc<EventBus>,
) -> Result<Arc<AuthService>, InventoryError> {
    let db = database.manager()?;
    let components = AuthFactoryProvider::create(auth_type, db.clone(), jwt.clone());

    event_bus.on(
        events::AUTH_LOGIN,
        listener(|payload| {
            info!(usuario = %payload["usuario"], strategy = %payload["strategy"], "管理员登录");
            Ok(())
        }),
    );

    Ok(Arc::new(AuthService::new(
        components,
        db,
        jwt.clone(),
        event_bus,
    )))
}

fn not_initialized() -> InventoryError {
    InventoryError::service_unavailable("认证插件尚未初始化")
}

/// 认证插件 V1
pub struct AuthPluginV1 {
    database: Arc<DatabasePlugin>,
    jwt: Arc<JwtService>,
    service: OnceCell<Arc<AuthService>>,
}

impl AuthPluginV1 {
    pub const VERSION: &'static str = "1.0.0";

    pub fn new(database: Arc<DatabasePlugin>, jwt: Arc<JwtService>) -> Self {
        Self {
            database,
            jwt,
            service: OnceCell::new(),
        }
    }

    pub fn service(&self) -> Result<Arc<AuthService>, InventoryError> {
        self.service.get().cloned().ok_or_else(not_initialized)
    }
}

#[async_trait]
impl Plugin for AuthPluginV1 {
    fn name(&self) -> &str {
        AUTH_PLUGIN_NAME
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn dependencies(&self) -> Vec<String> {
        vec![DATABASE_PLUGIN_NAME.to_string()]
    }

    #[instrument(skip(self, event_bus))]
    async fn initialize(&self, event_bus: Arc<EventBus>) -> Result<(), InventoryError> {
        let service = build_service(&self.database, &self.jwt, AuthType::Local, event_bus)?;
        let _ = self.service.set(service);
        info!(auth_type = %AuthType::Local, "认证插件 V1 已初始化");
        Ok(())
    }

    fn routes(&self) -> RouteCapability {
        let Some(service) = self.service.get().cloned() else {
            return RouteCapability::NoRoutes;
        };

        RouteCapability::routes(move |cfg| {
            cfg.app_data(actix_web::web::Data::from(service.clone()))
                .route("/login", actix_web::web::post().to(handlers::login));
        })
    }
}

/// 认证插件 V2
pub struct AuthPluginV2 {
    database: Arc<DatabasePlugin>,
    jwt: Arc<JwtService>,
    auth_type: AuthType,
    service: OnceCell<Arc<AuthService>>,
}

impl AuthPluginV2 {
    pub const VERSION: &'static str = "2.0.0";

    pub fn new(database: Arc<DatabasePlugin>, jwt: Arc<JwtService>, auth_type: AuthType) -> Self {
        Self {
            database,
            jwt,
            auth_type,
            service: OnceCell::new(),
        }
    }

    pub fn service(&self) -> Result<Arc<AuthService>, InventoryError> {
        self.service.get().cloned().ok_or_else(not_initialized)
    }

    pub fn jwt(&self) -> Arc<JwtService> {
        self.jwt.clone()
    }
}

#[async_trait]
impl Plugin for AuthPluginV2 {
    fn name(&self) -> &str {
        AUTH_PLUGIN_NAME
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn dependencies(&self) -> Vec<String> {
        vec![DATABASE_PLUGIN_NAME.to_string()]
    }

    #[instrument(skip(self, event_bus), fields(auth_type = %self.auth_type))]
    async fn initialize(&self, event_bus: Arc<EventBus>) -> Result<(), InventoryError> {
        let service = build_service(&self.database, &self.jwt, self.auth_type, event_bus.clone())?;
        let _ = self.service.set(service);

        event_bus.on(
            events::AUTH_LOGOUT,
            listener(|payload| {
                info!(strategy = %payload["strategy"], "管理员注销");
                Ok(())
            }),
        );

        info!("认证插件 V2 已初始化");
        Ok(())
    }

    fn routes(&self) -> RouteCapability {
        let Some(service) = self.service.get().cloned() else {
            return RouteCapability::NoRoutes;
        };

        RouteCapability::routes(move |cfg| {
            use actix_web::web;

            cfg.app_data(web::Data::from(service.clone()))
                .route("/login", web::post().to(handlers::login))
                .route("/refresh", web::post().to(handlers::refresh))
                .route("/verify", web::post().to(handlers::verify))
                .route("/logout", web::post().to(handlers::logout));
        })
    }
}
