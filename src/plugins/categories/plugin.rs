// 分类插件

use crate::errors::InventoryError;
use crate::kernel::{EventBus, Plugin, RouteCapability, events, listener};
use crate::plugins::categories::{CategoriesService, handlers};
use crate::plugins::database::DatabasePlugin;
use crate::plugins::routing::Edition;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const CATEGORIES_PLUGIN_NAME: &str = "categories";

/// 分类插件，V1 和 V2 只在路由和依赖上有区别
pub struct CategoriesPlugin {
    edition: Edition,
    database: Arc<DatabasePlugin>,
    service: OnceCell<Arc<CategoriesService>>,
}

impl CategoriesPlugin {
    pub fn new(edition: Edition, database: Arc<DatabasePlugin>) -> Self {
        Self {
            edition,
            database,
            service: OnceCell::new(),
        }
    }

    pub fn service(&self) -> Result<Arc<CategoriesService>, InventoryError> {
        self.service
            .get()
            .cloned()
            .ok_or_else(|| InventoryError::service_unavailable("分类插件尚未初始化"))
    }
}

#[async_trait]
impl Plugin for CategoriesPlugin {
    fn name(&self) -> &str {
        CATEGORIES_PLUGIN_NAME
    }

    fn version(&self) -> &str {
        self.edition.version()
    }

    fn dependencies(&self) -> Vec<String> {
        self.edition.dependencies()
    }

    #[instrument(skip(self, event_bus), fields(version = self.edition.version()))]
    async fn initialize(&self, event_bus: Arc<EventBus>) -> Result<(), InventoryError> {
        let db = self.database.manager()?;
        let _ = self
            .service
            .set(Arc::new(CategoriesService::new(db, event_bus.clone())));

        event_bus.on(
            events::CATEGORY_CREATED,
            listener(|payload| {
                debug!(nombre = %payload["nombre"], "收到分类创建事件");
                Ok(())
            }),
        );

        info!("分类插件已初始化");
        Ok(())
    }

    fn routes(&self) -> RouteCapability {
        match self.service.get() {
            Some(service) => self.edition.mount(
                service.clone(),
                handlers::basic_routes,
                handlers::extended_routes,
            ),
            None => RouteCapability::NoRoutes,
        }
    }
}
