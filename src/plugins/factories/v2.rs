// V2 插件族: 按配置选择认证方式，业务路由全部要求访问令牌

use crate::errors::InventoryError;
use crate::kernel::{Plugin, PluginFactory};
use crate::plugins::auth::{AuthPluginV2, AuthType, JwtService};
use crate::plugins::categories::CategoriesPlugin;
use crate::plugins::database::DatabasePlugin;
use crate::plugins::factories::FactoryContext;
use crate::plugins::products::ProductsPlugin;
use crate::plugins::routing::Edition;
use crate::plugins::suppliers::SuppliersPlugin;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::debug;

pub struct PluginFactoryV2 {
    context: FactoryContext,
    jwt: Arc<JwtService>,
    database: OnceCell<Arc<DatabasePlugin>>,
}

impl PluginFactoryV2 {
    pub const VERSION: &'static str = Edition::V2_VERSION;

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

    /// 业务插件与认证插件共用同一个令牌服务
    fn edition(&self) -> Edition {
        Edition::V2 {
            jwt: self.jwt.clone(),
        }
    }
}

impl PluginFactory for PluginFactoryV2 {
    fn version(&self) -> &str {
        Self::VERSION
    }

    fn create_database_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(self.database())
    }

    fn create_auth_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        // 本地认证不签发令牌，无法通过业务路由的 JWT 中间件
        if self.context.auth_type == AuthType::Local {
            return Err(InventoryError::configuration(format!(
                "插件族 {} 不支持本地认证",
                Self::VERSION
            )));
        }

        Ok(Arc::new(AuthPluginV2::new(
            self.database(),
            self.jwt.clone(),
            self.context.auth_type,
        )))
    }

    fn create_categories_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(Arc::new(CategoriesPlugin::new(self.edition(), self.database())))
    }

    fn create_products_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(Arc::new(ProductsPlugin::new(self.edition(), self.database())))
    }

    fn create_suppliers_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError> {
        Ok(Arc::new(SuppliersPlugin::new(self.edition(), self.database())))
    }
}
