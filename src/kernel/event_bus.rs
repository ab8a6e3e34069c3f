// 事件总线
// 进程内发布/订阅，插件之间通过命名事件解耦

use crate::errors::InventoryError;
use parking_lot::RwLock;
use serde_json::Value;
use std::cell::Cell;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, error};

/// 事件监听器
///
/// 以 `Arc` 指针身份区分，调用方保留注册时的克隆用于 `off`
pub type Listener = Arc<dyn Fn(&Value) -> Result<(), InventoryError> + Send + Sync>;

/// 把闭包包装成监听器
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&Value) -> Result<(), InventoryError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 常用事件名
pub mod events {
    pub const SYSTEM_STARTING: &str = "system:starting";
    pub const SYSTEM_STARTED: &str = "system:started";
    pub const SYSTEM_STOPPING: &str = "system:stopping";
    pub const SYSTEM_STOPPED: &str = "system:stopped";
    pub const AUTH_LOGIN: &str = "auth:login";
    pub const AUTH_LOGOUT: &str = "auth:logout";
    pub const CATEGORY_CREATED: &str = "category:created";
    pub const PRODUCT_CREATED: &str = "product:created";
    pub const SUPPLIER_CREATED: &str = "supplier:created";
}

/// 同一线程上 emit 的最大嵌套深度
pub const MAX_EMIT_DEPTH: usize = 32;

thread_local! {
    static EMIT_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// 嵌套深度计数，离开作用域时恢复
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Option<Self> {
        EMIT_DEPTH.with(|depth| {
            if depth.get() >= MAX_EMIT_DEPTH {
                None
            } else {
                depth.set(depth.get() + 1);
                Some(DepthGuard)
            }
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        EMIT_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// 事件总线
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册监听器，不去重
    pub fn on(&self, event: &str, listener: Listener) {
        let mut listeners = self.listeners.write();
        listeners.entry(event.to_string()).or_default().push(listener);
        debug!(event = %event, "注册事件监听器");
    }

    /// 按注册顺序同步调用监听器
    ///
    /// 调用前先拷贝监听器列表，监听器内部可以再次 on/off/emit。
    /// 单个监听器返回错误或 panic 只记录日志，不影响其余监听器
    pub fn emit(&self, event: &str, payload: &Value) {
        let Some(_guard) = DepthGuard::enter() else {
            error!(event = %event, max_depth = MAX_EMIT_DEPTH, "事件嵌套过深，已丢弃");
            return;
        };

        let snapshot: Vec<Listener> = match self.listeners.read().get(event) {
            Some(listeners) => listeners.clone(),
            None => return,
        };

        debug!(event = %event, listeners = snapshot.len(), "派发事件");

        for (index, listener) in snapshot.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(event = %event, listener = index, error = %e, "事件监听器执行失败");
                }
                Err(_) => {
                    error!(event = %event, listener = index, "事件监听器发生 panic");
                }
            }
        }
    }

    /// 移除第一个指针相同的监听器
    pub fn off(&self, event: &str, listener: &Listener) {
        let mut listeners = self.listeners.write();
        if let Some(list) = listeners.get_mut(event) {
            if let Some(pos) = list.iter().position(|l| Arc::ptr_eq(l, listener)) {
                list.remove(pos);
            }
            if list.is_empty() {
                listeners.remove(event);
            }
        }
    }

    /// 清空指定事件的监听器，未指定时清空全部
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut listeners = self.listeners.write();
        match event {
            Some(name) => {
                listeners.remove(name);
            }
            None => listeners.clear(),
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.event_names())
            .finish()
    }
}
