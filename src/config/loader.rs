// 配置加载器
// 处理 .env 文件加载和必需环境变量检查

use crate::config::AppConfig;
use config::ConfigError;
use dotenvy::dotenv;
use inventory_common::CommonError;
use tracing::{info, warn};

/// 启动时必须提供的环境变量
pub const REQUIRED_ENV_VARS: &[&str] = &["DB_HOST", "DB_NAME", "DB_USER", "DB_PASSWORD"];

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 初始化配置
    ///
    /// 缺少必需变量或验证失败都视为致命错误
    pub fn init() -> Result<AppConfig, CommonError> {
        if let Err(e) = dotenv() {
            warn!("无法加载 .env 文件: {}", e);
        }

        Self::validate_env()?;

        let config = AppConfig::load().map_err(convert_config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证环境变量
    pub fn validate_env() -> Result<(), CommonError> {
        let missing = Self::missing_required(|var| std::env::var(var).ok());

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommonError::configuration(format!(
                "缺少必需的环境变量: {}",
                missing.join(", ")
            )))
        }
    }

    /// 列出缺失或为空的必需变量
    pub fn missing_required<F>(lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        REQUIRED_ENV_VARS
            .iter()
            .copied()
            .filter(|var| lookup(var).map(|v| v.trim().is_empty()).unwrap_or(true))
            .collect()
    }

    /// 打印配置摘要
    pub fn print_summary(config: &AppConfig) {
        info!(
            environment = %config.environment.name,
            version = %config.environment.version,
            "配置加载成功"
        );
        info!(
            host = %config.server.host,
            port = config.server.port,
            "服务器配置"
        );
        info!(
            db_host = %config.database.host,
            db_port = config.database.port,
            db_name = %config.database.name,
            pool_max = config.database.max_connections,
            pool_min = config.database.min_connections,
            "数据库配置"
        );
        info!(
            plugin_version = %config.plugins.version,
            auth_type = %config.auth.auth_type,
            "插件配置"
        );
    }
}

/// 配置错误转换辅助函数
pub fn convert_config_error(err: ConfigError) -> CommonError {
    CommonError::configuration(format!("配置错误: {}", err))
}
