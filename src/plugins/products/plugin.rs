// 商品插件

use crate::errors::InventoryError;
use crate::kernel::{EventBus, Plugin, RouteCapability, events, listener};
use crate::plugins::database::DatabasePlugin;
use crate::plugins::products::{ProductsService, handlers};
use crate::plugins::routing::Edition;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const PRODUCTS_PLUGIN_NAME: &str = "products";

pub struct ProductsPlugin {
    edition: Edition,
    database: Arc<DatabasePlugin>,
    service: OnceCell<Arc<ProductsService>>,
}

impl ProductsPlugin {
    pub fn new(edition: Edition, database: Arc<DatabasePlugin>) -> Self {
        Self {
            edition,
            database,
            service: OnceCell::new(),
        }
    }

    pub fn service(&self) -> Result<Arc<ProductsService>, InventoryError> {
        self.service
            .get()
            .cloned()
            .ok_or_else(|| InventoryError::service_unavailable("商品插件尚未初始化"))
    }
}

#[async_trait]
impl Plugin for ProductsPlugin {
    fn name(&self) -> &str {
        PRODUCTS_PLUGIN_NAME
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
            .set(Arc::new(ProductsService::new(db, event_bus.clone())));

        // 新商品入库即低于最低库存时提示补货
        event_bus.on(
            events::PRODUCT_CREATED,
            listener(|payload| {
                let stock = payload["stockactual"].as_i64().unwrap_or(0);
                let minimum = payload["stockminimo"].as_i64().unwrap_or(0);
                if stock <= minimum {
                    warn!(codigo = %payload["codigo"], stock, minimum, "新商品库存不足");
                }
                Ok(())
            }),
        );

        info!("商品插件已初始化");
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
