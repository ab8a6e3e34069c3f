// HTTP 层
// 内核只向其提供 (基础路径, 路由表)，请求分发由 actix-web 负责

use crate::errors::{ErrorHandlerMiddleware, ErrorResponse, InventoryError};
use crate::kernel::RouteTable;
use actix_cors::Cors;
use actix_web::dev::{Server, ServerHandle};
use actix_web::error::JsonPayloadError;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use async_trait::async_trait;
use chrono::Utc;
use inventory_common::ApiResponse;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_actix_web::TracingLogger;

/// HTTP 层接口
#[async_trait]
pub trait HttpLayer: Send + Sync {
    /// 登记一个挂载点，在 `listen` 之前调用
    async fn register_routes(&self, base_path: &str, routes: RouteTable)
        -> Result<(), InventoryError>;

    /// 绑定端口并开始接受连接，绑定完成即返回
    async fn listen(&self, port: u16) -> Result<(), InventoryError>;

    /// 优雅停止
    async fn stop(&self) -> Result<(), InventoryError>;
}

/// 挂载点列表
pub type Mounts = Vec<(String, RouteTable)>;

/// 基于 actix-web 的 HTTP 层
pub struct ActixHttpLayer {
    host: String,
    workers: Option<usize>,
    shutdown_timeout: u64,
    mounts: Mutex<Mounts>,
    running: Mutex<Option<(ServerHandle, JoinHandle<std::io::Result<()>>)>>,
}

impl ActixHttpLayer {
    pub fn new(host: impl Into<String>, workers: Option<usize>, shutdown_timeout: u64) -> Self {
        Self {
            host: host.into(),
            workers,
            shutdown_timeout,
            mounts: Mutex::new(Vec::new()),
            running: Mutex::new(None),
        }
    }

    /// 已登记的挂载路径
    pub fn mounted_paths(&self) -> Vec<String> {
        self.mounts.lock().iter().map(|(base, _)| base.clone()).collect()
    }

    /// 已登记挂载点的快照
    pub fn mounts(&self) -> Mounts {
        self.mounts.lock().clone()
    }

    fn build_server(&self, port: u16) -> Result<Server, InventoryError> {
        let mounts = Arc::new(self.mounts());

        let mut server = HttpServer::new(move || {
            let mounts = mounts.clone();
            App::new()
                .app_data(json_config())
                .wrap(ErrorHandlerMiddleware)
                .wrap(TracingLogger::default())
                .wrap(Cors::permissive())
                .configure(move |cfg| mount_all(cfg, &mounts))
                .default_service(web::route().to(not_found))
        })
        .bind((self.host.as_str(), port))?
        .shutdown_timeout(self.shutdown_timeout)
        // 信号由进程入口处理，关闭顺序交给内核
        .disable_signals();

        if let Some(workers) = self.workers {
            server = server.workers(workers);
        }

        Ok(server.run())
    }
}

#[async_trait]
impl HttpLayer for ActixHttpLayer {
    async fn register_routes(
        &self,
        base_path: &str,
        routes: RouteTable,
    ) -> Result<(), InventoryError> {
        let mut mounts = self.mounts.lock();
        if mounts.iter().any(|(base, _)| base == base_path) {
            warn!(base_path = %base_path, "挂载路径重复，新路由表覆盖旧路由表");
            mounts.retain(|(base, _)| base != base_path);
        }
        mounts.push((base_path.to_string(), routes));
        info!(base_path = %base_path, "登记路由");
        Ok(())
    }

    async fn listen(&self, port: u16) -> Result<(), InventoryError> {
        if self.running.lock().is_some() {
            return Err(InventoryError::internal("HTTP 服务器已在运行"));
        }

        let server = self.build_server(port)?;
        let handle = server.handle();
        let task = tokio::spawn(server);
        *self.running.lock() = Some((handle, task));

        info!(host = %self.host, port = port, "HTTP 服务器已开始监听");
        Ok(())
    }

    async fn stop(&self) -> Result<(), InventoryError> {
        let running = self.running.lock().take();
        let Some((handle, task)) = running else {
            return Ok(());
        };

        info!("停止 HTTP 服务器");
        handle.stop(true).await;

        match tokio::time::timeout(Duration::from_secs(self.shutdown_timeout + 1), task).await {
            Ok(Ok(Ok(()))) => info!("HTTP 服务器已停止"),
            Ok(Ok(Err(e))) => error!(error = %e, "HTTP 服务器异常退出"),
            Ok(Err(e)) => error!(error = %e, "HTTP 服务器任务异常"),
            Err(_) => warn!("等待 HTTP 服务器退出超时"),
        }
        Ok(())
    }
}

/// 健康检查路由与所有挂载点
pub fn mount_all(cfg: &mut web::ServiceConfig, mounts: &[(String, RouteTable)]) {
    cfg.route("/health", web::get().to(health));
    for (base, table) in mounts {
        cfg.service(web::scope(base).configure(|scope| table(scope)));
    }
}

/// JSON 请求体解析失败时返回 400 信封
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    InventoryError::validation("body", format!("请求体格式错误: {}", err)).into()
}

/// 健康检查
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// 未匹配路由
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    ErrorResponse::route_not_found(req.path()).into_http_response()
}
