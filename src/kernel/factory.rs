// 插件抽象工厂
// 一次性产出版本一致的整套插件

use crate::errors::InventoryError;
use crate::kernel::Plugin;
use std::sync::Arc;

/// 插件族
///
/// 由一次 `create_all_plugins` 调用原子产出，所有成员版本相同
pub struct PluginFamily {
    version: String,
    database: Arc<dyn Plugin>,
    auth: Arc<dyn Plugin>,
    domain: Vec<Arc<dyn Plugin>>,
}

impl PluginFamily {
    /// 组装插件族，任一成员版本与族版本不符即失败
    pub fn new(
        version: impl Into<String>,
        database: Arc<dyn Plugin>,
        auth: Arc<dyn Plugin>,
        domain: Vec<Arc<dyn Plugin>>,
    ) -> Result<Self, InventoryError> {
        let family = Self {
            version: version.into(),
            database,
            auth,
            domain,
        };

        if let Some(stray) = family
            .load_order()
            .into_iter()
            .find(|plugin| plugin.version() != family.version)
        {
            return Err(InventoryError::plugin(
                stray.name(),
                format!(
                    "插件版本 {} 与插件族版本 {} 不一致",
                    stray.version(),
                    family.version
                ),
            ));
        }

        Ok(family)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn database(&self) -> &Arc<dyn Plugin> {
        &self.database
    }

    pub fn auth(&self) -> &Arc<dyn Plugin> {
        &self.auth
    }

    pub fn domain(&self) -> &[Arc<dyn Plugin>] {
        &self.domain
    }

    /// 注册顺序: 数据库、认证、各业务插件
    pub fn load_order(&self) -> Vec<Arc<dyn Plugin>> {
        let mut plugins = Vec::with_capacity(self.domain.len() + 2);
        plugins.push(self.database.clone());
        plugins.push(self.auth.clone());
        plugins.extend(self.domain.iter().cloned());
        plugins
    }
}

impl std::fmt::Debug for PluginFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members: Vec<String> = self
            .load_order()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        f.debug_struct("PluginFamily")
            .field("version", &self.version)
            .field("members", &members)
            .finish()
    }
}

/// 插件抽象工厂
pub trait PluginFactory: Send + Sync {
    /// 插件族版本
    fn version(&self) -> &str;

    /// 数据库插件，同一工厂实例内只创建一次
    fn create_database_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError>;

    fn create_auth_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError>;

    fn create_categories_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError>;

    fn create_products_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError>;

    fn create_suppliers_plugin(&self) -> Result<Arc<dyn Plugin>, InventoryError>;

    /// 创建整套插件，任一创建失败则整体失败
    fn create_all_plugins(&self) -> Result<PluginFamily, InventoryError> {
        let database = self.create_database_plugin()?;
        let auth = self.create_auth_plugin()?;
        let domain = vec![
            self.create_categories_plugin()?,
            self.create_products_plugin()?,
            self.create_suppliers_plugin()?,
        ];

        PluginFamily::new(self.version(), database, auth, domain)
    }
}
