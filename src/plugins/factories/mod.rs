// 插件族工厂
// V1 本地认证的基础插件，V2 JWT 认证的扩展插件，以及按配置选择工厂的选择器

pub mod selector;
pub mod v1;
pub mod v2;


pub use selector::*;
pub use v1::*;
pub use v2::*;

use crate::config::{AppConfig, DatabaseConfig};
use crate::errors::InventoryError;
use crate::plugins::auth::{AuthType, JwtConfig};

/// 工厂构造参数
///
/// 由入口从配置中一次性构建，工厂不读取全局状态
#[derive(Debug, Clone)]
pub struct FactoryContext {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub auth_type: AuthType,
}

impl FactoryContext {
    pub fn from_app_config(config: &AppConfig) -> Result<Self, InventoryError> {
        Ok(Self {
            database: config.database.clone(),
            jwt: JwtConfig::from_auth_config(&config.auth)?,
            auth_type: config.auth.auth_type.parse()?,
        })
    }
}
