// V1 插件族: 本地认证，业务路由不做令牌校验

use crate::errors::InventoryError;
use crate::kernel::{Plugin, PluginFactory};
use crate::plugins::auth::{AuthPluginV1, JwtService};
use crate::plugins::categories::CategoriesPlugin;
use crate::plugins::database::DatabasePlugin;
use crate::plugins::factories::FactoryContext;
use crate::plugins::products::ProductsPlugin;
use crate::plugins::routing::Edition;
use crate::plugins::suppliers::SuppliersPlugin;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

pub struct PluginFactoryV1 {
    context: FactoryContext,
    jwt: Arc<JwtService>,
    database: OnceCell<Arc<DatabasePlugin>>,
}

impl PluginFactoryV1 {
    pub const VERSION: &'static str = Edition::V1_VERSION;

    pub fn new(context: FactoryContext) -> Self {
        let jwt = Arc::new(JwtService::new(context.jwt.clone()));
        Self {
            context,
            jwt,
            database: OnceCell::new(),
        }
    }

    /// 使用外部提供的数据库插件，之后创建的插件都共用它
    pub fn with_database_plugin(self, database: Arc<DatabasePlugin>) -> Self {
        let _ = self.database.set(database);
        self
    }

    /// 本工厂唯一的数据库插件
    pub fn database(&self) -> Arc<DatabasePlugin> {
        self.database
            .get_or_init(|| {
                debug!(version = Self::VERSION, "创建数据库插件");
                Arc::new(DatabasePlugin::new(
                    Self::VERSION,
                    self.context.database.clone(),
                ))
            })
            .clone()
    }
}

impl PluginFactory for PluginFactoryV1 {
    fn version(&self) -> &str {
        Self::VERSION
    }

    fn create_database_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(self.database())
    }

    fn create_auth_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(Arc::new(AuthPluginV1::new(self.database(), self.jwt.clone())))
    }

    fn create_categories_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(Arc::new(CategoriesPlugin::new(Edition::V1, self.database())))
    }

    fn create_products_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(Arc::new(ProductsPlugin::new(Edition::V1, self.database())))
    }

    fn create_suppliers_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(Arc::new(SuppliersPlugin::new(Edition::V1, self.database())))
    }
}
