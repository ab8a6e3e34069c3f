// 数据库插件
// 持有进程唯一的连接池，其他插件通过它借用 DatabaseManager

use crate::config::DatabaseConfig;
use crate::db::DatabaseManager;
use crate::errors::InventoryError;
use crate::kernel::{EventBus, Plugin, ShutdownCapability, events, listener};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, instrument};

pub const DATABASE_PLUGIN_NAME: &str = "database";

/// 数据库插件
pub struct DatabasePlugin {
    version: String,
    config: DatabaseConfig,
    manager: OnceCell<Arc<DatabaseManager>>,
}

impl DatabasePlugin {
    pub fn new(version: impl Into<String>, config: DatabaseConfig) -> Self {
        Self {
            version: version.into(),
            config,
            manager: OnceCell::new(),
        }
    }

    /// 使用已建立的连接，初始化时不再重新连接
    pub fn with_manager(
        version: impl Into<String>,
        config: DatabaseConfig,
        manager: Arc<DatabaseManager>,
    ) -> Self {
        let plugin = Self::new(version, config);
        let _ = plugin.manager.set(manager);
        plugin
    }

    /// 获取连接管理器，初始化前调用返回错误
    pub fn manager(&self) -> Result<Arc<DatabaseManager>, InventoryError> {
        self.manager
            .get()
            .cloned()
            .ok_or_else(|| InventoryError::service_unavailable("数据库插件尚未初始化"))
    }

    pub fn is_connected(&self) -> bool {
        self.manager.get().is_some_and(|manager| manager.is_connected())
    }
}

#[async_trait]
impl Plugin for DatabasePlugin {
    fn name(&self) -> &str {
        DATABASE_PLUGIN_NAME
    }

    fn version(&self) -> &str {
        &self.version
    }

    #[instrument(skip(self, event_bus), fields(version = %self.version))]
    async fn initialize(&self, event_bus: Arc<EventBus>) -> Result<(), InventoryError> {
        let manager = match self.manager.get() {
            Some(manager) => manager.clone(),
            None => {
                let manager = Arc::new(DatabaseManager::connect(&self.config).await?);
                self.manager.get_or_init(|| manager).clone()
            }
        };

        if !manager.test_connection().await {
            return Err(InventoryError::plugin_initialization(
                DATABASE_PLUGIN_NAME,
                "数据库连接测试失败",
            ));
        }

        event_bus.on(
            events::SYSTEM_STOPPING,
            listener(|_| {
                info!("系统即将关闭，数据库连接将在最后释放");
                Ok(())
            }),
        );

        info!(host = %self.config.host, database = %self.config.name, "数据库插件已初始化");
        Ok(())
    }

    fn shutdown_capability(&self) -> ShutdownCapability {
        ShutdownCapability::HasShutdown
    }

    async fn shutdown(&self) -> Result<(), InventoryError> {
        match self.manager.get() {
            Some(manager) => manager.disconnect().await,
            None => Ok(()),
        }
    }
}
