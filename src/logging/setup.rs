// 日志系统设置

use crate::config::LoggingConfig;
use anyhow::{Context, Result};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

/// 日志系统初始化器
pub struct LoggingSetup;

impl LoggingSetup {
    /// 初始化日志系统
    ///
    /// 启用文件日志时返回写入线程的 guard，调用方需持有到进程结束
    pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let (writer, guard) = Self::make_writer(config)?;

        match config.format.as_str() {
            "json" => {
                let subscriber = tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(env_filter)
                    .with_writer(writer)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
            "compact" => {
                let subscriber = tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(env_filter)
                    .with_writer(writer)
                    .with_target(true)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
            _ => {
                let subscriber = tracing_subscriber::fmt()
                    .pretty()
                    .with_env_filter(env_filter)
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .finish();
                tracing::subscriber::set_global_default(subscriber)?;
            }
        }

        tracing::info!(level = %config.level, format = %config.format, "日志系统初始化完成");
        if config.file_enabled {
            tracing::info!("文件日志已启用: {:?}", config.file_path);
        }

        Ok(guard)
    }

    /// 根据配置选择标准输出或按天滚动的日志文件
    pub fn make_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, Option<WorkerGuard>)> {
        if !config.file_enabled {
            return Ok((BoxMakeWriter::new(std::io::stdout), None));
        }

        let directory = config
            .file_path
            .as_deref()
            .context("启用文件日志时必须指定日志目录")?;
        std::fs::create_dir_all(directory)
            .with_context(|| format!("无法创建日志目录: {}", directory))?;

        let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        Ok((BoxMakeWriter::new(non_blocking), Some(guard)))
    }

    /// 解析日志级别
    pub fn parse_level(level: &str) -> Level {
        match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// 创建开发环境日志配置
    pub fn development_config() -> LoggingConfig {
        LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
            file_enabled: false,
            file_path: None,
            file_prefix: "inventory.log".to_string(),
        }
    }

    /// 创建生产环境日志配置
    pub fn production_config() -> LoggingConfig {
        LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            file_enabled: true,
            file_path: Some("./logs".to_string()),
            file_prefix: "inventory.log".to_string(),
        }
    }

    /// 创建测试环境日志配置
    pub fn test_config() -> LoggingConfig {
        LoggingConfig {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file_enabled: false,
            file_path: None,
            file_prefix: "inventory.log".to_string(),
        }
    }
}
