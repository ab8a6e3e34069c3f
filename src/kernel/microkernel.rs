// 微内核
// 持有插件注册表，校验依赖顺序，驱动生命周期并把路由交给 HTTP 层

use crate::config::AppConfig;
use crate::errors::InventoryError;
use crate::kernel::{
    EventBus, HttpLayer, KernelState, Plugin, PluginFactory, PluginState, RouteCapability,
    ShutdownCapability, events,
};
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// 内核配置
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// 监听端口
    pub port: u16,
    /// 单个插件初始化超时
    pub initialization_timeout: Duration,
    /// 单个插件关闭超时
    pub shutdown_timeout: Duration,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            initialization_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl KernelConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            port: config.server.port,
            initialization_timeout: Duration::from_secs(config.plugins.initialization_timeout),
            shutdown_timeout: Duration::from_secs(config.plugins.shutdown_timeout),
        }
    }
}

struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    state: PluginState,
}

#[derive(Default)]
struct Registry {
    entries: HashMap<String, PluginEntry>,
    /// 注册顺序，关闭时逆序遍历
    order: Vec<String>,
    /// 正在初始化的插件
    pending: Option<String>,
}

/// 微内核
pub struct Microkernel {
    config: KernelConfig,
    event_bus: Arc<EventBus>,
    http: Arc<dyn HttpLayer>,
    registry: RwLock<Registry>,
    state: RwLock<KernelState>,
    family_version: RwLock<Option<String>>,
}

impl Microkernel {
    pub fn new(config: KernelConfig, http: Arc<dyn HttpLayer>) -> Self {
        Self {
            config,
            event_bus: Arc::new(EventBus::new()),
            http,
            registry: RwLock::new(Registry::default()),
            state: RwLock::new(KernelState::Constructed),
            family_version: RwLock::new(None),
        }
    }

    /// 加载整套插件族
    ///
    /// 按数据库、认证、业务插件的固定顺序注册，任一失败立即中止
    #[instrument(skip(self, factory), fields(version = %factory.version()))]
    pub async fn load_plugin_family(
        &self,
        factory: &dyn PluginFactory,
    ) -> Result<(), InventoryError> {
        *self.state.write() = KernelState::PluginsLoading;
        info!("加载插件族");

        let family = factory.create_all_plugins()?;

        let database_dependencies = family.database().dependencies();
        if let Some(dependency) = database_dependencies.first() {
            return Err(InventoryError::dependency_not_satisfied(
                family.database().name(),
                dependency.as_str(),
            ));
        }

        for plugin in family.load_order() {
            if let Err(e) = self.register_plugin(plugin).await {
                error!(error = %e, "插件族加载中止");
                return Err(e);
            }
        }

        *self.family_version.write() = Some(family.version().to_string());
        info!(plugins = ?self.plugin_names(), "插件族加载完成");
        Ok(())
    }

    /// 注册单个插件
    ///
    /// 依赖检查、初始化、挂载路由全部成功后才写入注册表
    #[instrument(skip(self, plugin), fields(plugin = %plugin.name(), version = %plugin.version()))]
    pub async fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Result<(), InventoryError> {
        let name = plugin.name().to_string();

        self.check_dependencies(plugin.as_ref())?;
        self.registry.write().pending = Some(name.clone());

        let result = self.initialize_and_mount(&name, plugin.as_ref()).await;
        let mut registry = self.registry.write();
        registry.pending = None;
        result?;

        if registry.entries.contains_key(&name) {
            warn!(plugin = %name, "插件名称重复，新实例覆盖旧实例");
        } else {
            registry.order.push(name.clone());
        }
        registry.entries.insert(
            name.clone(),
            PluginEntry {
                plugin,
                state: PluginState::Initialized,
            },
        );

        info!(plugin = %name, "插件注册完成");
        Ok(())
    }

    fn check_dependencies(&self, plugin: &dyn Plugin) -> Result<(), InventoryError> {
        let registry = self.registry.read();
        for dependency in plugin.dependencies() {
            if !registry.entries.contains_key(&dependency) {
                error!(
                    plugin = %plugin.name(),
                    dependency = %dependency,
                    "插件依赖未满足"
                );
                return Err(InventoryError::dependency_not_satisfied(
                    plugin.name(),
                    dependency,
                ));
            }
        }
        Ok(())
    }

    async fn initialize_and_mount(
        &self,
        name: &str,
        plugin: &dyn Plugin,
    ) -> Result<(), InventoryError> {
        let initialization = tokio::time::timeout(
            self.config.initialization_timeout,
            plugin.initialize(self.event_bus.clone()),
        )
        .await;

        match initialization {
            Ok(Ok(())) => {}
            Ok(Err(e @ InventoryError::PluginInitialization { .. })) => return Err(e),
            Ok(Err(e)) => {
                error!(plugin = %name, error = %e, "插件初始化失败");
                return Err(InventoryError::plugin_initialization(name, e.to_string()));
            }
            Err(_) => {
                error!(
                    plugin = %name,
                    timeout_secs = self.config.initialization_timeout.as_secs(),
                    "插件初始化超时"
                );
                return Err(InventoryError::plugin_initialization(name, "初始化超时"));
            }
        }

        if let RouteCapability::HasRoutes(routes) = plugin.routes() {
            let base_path = format!("/api/{}", name);
            self.http.register_routes(&base_path, routes).await?;
            info!(plugin = %name, base_path = %base_path, "挂载插件路由");
        }

        Ok(())
    }

    /// 加载插件族并启动
    ///
    /// 任一步失败都会关闭已经注册的插件，释放已建立的连接
    pub async fn boot(&self, factory: &dyn PluginFactory) -> Result<(), InventoryError> {
        let result = match self.load_plugin_family(factory).await {
            Ok(()) => self.start().await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            error!(error = %e, "启动失败，关闭已注册的插件");
            self.shutdown().await;
            return Err(e);
        }
        Ok(())
    }

    /// 启动 HTTP 层
    #[instrument(skip(self), fields(port = self.config.port))]
    pub async fn start(&self) -> Result<(), InventoryError> {
        let current = self.state();
        if matches!(
            current,
            KernelState::Started | KernelState::Stopping | KernelState::Stopped
        ) {
            return Err(InventoryError::internal(format!(
                "内核当前状态 {:?} 不允许启动",
                current
            )));
        }

        let payload = json!({
            "port": self.config.port,
            "plugins": self.plugin_names(),
            "version": self.family_version(),
        });

        self.event_bus.emit(events::SYSTEM_STARTING, &payload);
        self.http.listen(self.config.port).await?;
        *self.state.write() = KernelState::Started;
        self.event_bus.emit(events::SYSTEM_STARTED, &payload);

        info!(plugins = self.plugin_names().len(), "系统已启动");
        Ok(())
    }

    /// 关闭系统
    ///
    /// 先停止 HTTP 层，再按注册逆序调用插件的关闭钩子。
    /// 单个钩子失败或超时只记录日志，重复调用不做任何事
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        {
            let mut state = self.state.write();
            if matches!(*state, KernelState::Stopping | KernelState::Stopped) {
                return;
            }
            *state = KernelState::Stopping;
        }

        info!("开始关闭系统");
        self.event_bus.emit(events::SYSTEM_STOPPING, &json!({}));

        if let Err(e) = self.http.stop().await {
            error!(error = %e, "停止 HTTP 层失败");
        }

        let plugins: Vec<Arc<dyn Plugin>> = {
            let registry = self.registry.read();
            registry
                .order
                .iter()
                .rev()
                .filter_map(|name| registry.entries.get(name))
                .map(|entry| entry.plugin.clone())
                .collect()
        };

        for plugin in plugins {
            let name = plugin.name().to_string();
            if plugin.shutdown_capability() == ShutdownCapability::HasShutdown {
                match tokio::time::timeout(self.config.shutdown_timeout, plugin.shutdown()).await {
                    Ok(Ok(())) => info!(plugin = %name, "插件已关闭"),
                    Ok(Err(e)) => error!(plugin = %name, error = %e, "插件关闭失败"),
                    Err(_) => error!(
                        plugin = %name,
                        timeout_secs = self.config.shutdown_timeout.as_secs(),
                        "插件关闭超时"
                    ),
                }
            }

            if let Some(entry) = self.registry.write().entries.get_mut(&name) {
                entry.state = PluginState::Shutdown;
            }
        }

        self.event_bus.emit(events::SYSTEM_STOPPED, &json!({}));
        *self.state.write() = KernelState::Stopped;
        info!("系统已关闭");
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.registry
            .read()
            .entries
            .get(name)
            .map(|entry| entry.plugin.clone())
    }

    /// 按注册顺序列出插件名称
    pub fn plugin_names(&self) -> Vec<String> {
        self.registry.read().order.clone()
    }

    pub fn plugin_state(&self, name: &str) -> Option<PluginState> {
        let registry = self.registry.read();
        match registry.entries.get(name) {
            Some(entry) => Some(entry.state),
            None if registry.pending.as_deref() == Some(name) => Some(PluginState::Registered),
            None => None,
        }
    }

    pub fn state(&self) -> KernelState {
        *self.state.read()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    pub fn family_version(&self) -> Option<String> {
        self.family_version.read().clone()
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }
}
