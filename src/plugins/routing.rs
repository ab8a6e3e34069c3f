// 领域插件共用的版本差异
// 版本号、依赖列表以及 V2 的 JWT 保护路由

use crate::errors::InventoryError;
use crate::kernel::RouteCapability;
use crate::plugins::auth::{AUTH_PLUGIN_NAME, JwtAuthMiddleware, JwtService};
use crate::plugins::database::DATABASE_PLUGIN_NAME;
use actix_web::web;
use inventory_common::SearchQuery;
use std::sync::Arc;

/// `estados` 表中的启用状态
pub const STATUS_ACTIVE: i32 = 1;
/// 停用状态，分类软删除后使用
pub const STATUS_INACTIVE: i32 = 2;

/// 路由配置函数
pub type Configure = fn(&mut web::ServiceConfig);

/// 领域插件所属的插件族
#[derive(Clone)]
pub enum Edition {
    /// 基础版，路由不做认证
    V1,
    /// 扩展版，全部路由要求有效的访问令牌
    V2 { jwt: Arc<JwtService> },
}

impl Edition {
    pub const V1_VERSION: &'static str = "1.0.0";
    pub const V2_VERSION: &'static str = "2.0.0";

    pub fn version(&self) -> &'static str {
        match self {
            Self::V1 => Self::V1_VERSION,
            Self::V2 { .. } => Self::V2_VERSION,
        }
    }

    pub fn dependencies(&self) -> Vec<String> {
        match self {
            Self::V1 => vec![DATABASE_PLUGIN_NAME.to_string()],
            Self::V2 { .. } => vec![
                DATABASE_PLUGIN_NAME.to_string(),
                AUTH_PLUGIN_NAME.to_string(),
            ],
        }
    }

    /// 挂载服务和路由
    ///
    /// V2 先注册 `extended` 再注册 `basic`，固定路径必须排在 `/{id}` 之前
    pub fn mount<S>(&self, service: Arc<S>, basic: Configure, extended: Configure) -> RouteCapability
    where
        S: Send + Sync + 'static,
    {
        match self {
            Self::V1 => RouteCapability::routes(move |cfg| {
                cfg.app_data(web::Data::from(service.clone()))
                    .configure(basic);
            }),
            Self::V2 { jwt } => {
                let jwt = jwt.clone();
                RouteCapability::routes(move |cfg| {
                    cfg.service(
                        web::scope("")
                            .wrap(JwtAuthMiddleware::new(jwt.clone()))
                            .app_data(web::Data::from(service.clone()))
                            .configure(extended)
                            .configure(basic),
                    );
                })
            }
        }
    }
}

/// 取出非空的必填文本字段
pub fn required_text(field: &str, value: Option<&str>) -> Result<String, InventoryError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| InventoryError::validation(field, format!("{} 为必填项", field)))
}

/// 由搜索参数构造 ILIKE 模式
pub fn search_pattern(query: &SearchQuery) -> Result<String, InventoryError> {
    let term = required_text("q", query.q.as_deref())?;
    Ok(format!("%{}%", term))
}
