// 插件接口规范
// 定义插件的能力声明和生命周期状态

use crate::errors::InventoryError;
use crate::kernel::EventBus;
use actix_web::web;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 路由表，由 HTTP 层挂载到插件的命名空间下
pub type RouteTable = Arc<dyn Fn(&mut web::ServiceConfig) + Send + Sync>;

/// 路由能力
#[derive(Clone)]
pub enum RouteCapability {
    HasRoutes(RouteTable),
    NoRoutes,
}

impl RouteCapability {
    /// 由闭包构造路由表
    pub fn routes<F>(configure: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Sync + 'static,
    {
        Self::HasRoutes(Arc::new(configure))
    }

    pub fn has_routes(&self) -> bool {
        matches!(self, Self::HasRoutes(_))
    }
}

impl std::fmt::Debug for RouteCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HasRoutes(_) => f.write_str("HasRoutes(..)"),
            Self::NoRoutes => f.write_str("NoRoutes"),
        }
    }
}

/// 关闭能力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCapability {
    HasShutdown,
    NoShutdown,
}

/// 插件状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// 已由工厂创建
    Created,
    /// 已写入注册表
    Registered,
    /// 初始化完成
    Initialized,
    /// 已关闭
    Shutdown,
}

/// 内核状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelState {
    Constructed,
    PluginsLoading,
    Started,
    Stopping,
    Stopped,
}

/// 插件接口
/// 所有插件必须实现此接口
#[async_trait]
pub trait Plugin: Send + Sync {
    /// 插件名称，同时决定路由命名空间 `/api/<name>`
    fn name(&self) -> &str;

    /// 插件版本，与所属插件族一致
    fn version(&self) -> &str;

    /// 注册前必须已存在的插件名称
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// 初始化插件，只调用一次
    async fn initialize(&self, event_bus: Arc<EventBus>) -> Result<(), InventoryError>;

    /// 路由能力
    fn routes(&self) -> RouteCapability {
        RouteCapability::NoRoutes
    }

    /// 关闭能力
    fn shutdown_capability(&self) -> ShutdownCapability {
        ShutdownCapability::NoShutdown
    }

    /// 关闭插件，仅在声明 `HasShutdown` 时调用
    async fn shutdown(&self) -> Result<(), InventoryError> {
        Ok(())
    }
}
