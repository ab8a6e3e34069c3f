use inventory_kernel::config::{AppConfig, ConfigLoader};
use inventory_kernel::errors::InventoryError;
use inventory_kernel::kernel::{ActixHttpLayer, KernelConfig, Microkernel};
use inventory_kernel::logging::LoggingSetup;
use inventory_kernel::plugins::{FactoryContext, FactorySelector};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> ExitCode {
    // 初始化配置
    let config = match ConfigLoader::init() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("配置加载失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 初始化结构化日志系统，guard 必须存活到进程结束
    let _log_guard = match LoggingSetup::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("日志系统初始化失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("🚀 启动库存管理微内核 v{}", config.environment.version);
    ConfigLoader::print_summary(&config);

    let kernel = match boot(&config).await {
        Ok(kernel) => kernel,
        Err(e) => {
            error!(error = %e, "启动失败");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "🌐 服务器启动地址: http://{}:{}",
        config.server.host, config.server.port
    );
    info!(
        "📋 健康检查: http://{}:{}/health",
        config.server.host, config.server.port
    );

    wait_for_signal().await;
    kernel.shutdown().await;

    info!("👋 进程退出");
    ExitCode::SUCCESS
}

/// 选择插件族、加载并开始监听
async fn boot(config: &AppConfig) -> Result<Microkernel, InventoryError> {
    let context = FactoryContext::from_app_config(config)?;
    let factory = FactorySelector::get_factory(Some(&config.plugins.version), context);

    let http = Arc::new(ActixHttpLayer::new(
        config.server.host.clone(),
        config.server.workers,
        config.server.shutdown_timeout,
    ));
    let kernel = Microkernel::new(KernelConfig::from_app_config(config), http);

    kernel.boot(factory.as_ref()).await?;
    Ok(kernel)
}

/// 等待 Ctrl+C 或 SIGTERM
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "无法监听 Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "无法监听 SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("收到 Ctrl+C，开始关闭"),
        _ = terminate => info!("收到 SIGTERM，开始关闭"),
    }
}
