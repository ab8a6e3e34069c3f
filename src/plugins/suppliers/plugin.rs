// 供应商插件

use crate::errors::InventoryError;
use crate::kernel::{EventBus, Plugin, RouteCapability, events, listener};
use crate::plugins::database::DatabasePlugin;
use crate::plugins::routing::Edition;
use crate::plugins::suppliers::{SuppliersService, handlers};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const SUPPLIERS_PLUGIN_NAME: &str = "suppliers";

pub struct SuppliersPlugin {
    edition: Edition,
    database: Arc<DatabasePlugin>,
    service: OnceCell<Arc<SuppliersService>>,
}

impl SuppliersPlugin {
    pub fn new(edition: Edition, database: Arc<DatabasePlugin>) -> Self {
        Self {
            edition,
            database,
            service: OnceCell::new(),
        }
    }

    pub fn service(&self) -> Result<Arc<SuppliersService>, InventoryError> {
        self.service
            .get()
            .cloned()
            .ok_or_else(|| InventoryError::service_unavailable("供应商插件尚未初始化"))
    }
}

#[async_trait]
impl Plugin for SuppliersPlugin {
    fn name(&self) -> &str {
        SUPPLIERS_PLUGIN_NAME
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
            .set(Arc::new(SuppliersService::new(db, event_bus.clone())));

        event_bus.on(
            events::SUPPLIER_CREATED,
            listener(|payload| {
                debug!(nombreempresa = %payload["nombreempresa"], "收到供应商创建事件");
                Ok(())
            }),
        );

        info!("供应商插件已初始化");
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
