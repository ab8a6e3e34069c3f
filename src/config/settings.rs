// 应用程序设置和配置
// 定义配置结构体和加载逻辑

use config::{Config, ConfigError, Environment, File};
use inventory_common::CommonError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 扁平环境变量到配置键的映射
///
/// 这些变量优先级最高，覆盖配置文件和带前缀的环境变量
pub const LEGACY_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("HOST", "server.host"),
    ("NODE_ENV", "environment.name"),
    ("APP_ENV", "environment.name"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_NAME", "database.name"),
    ("DB_USER", "database.user"),
    ("DB_PASSWORD", "database.password"),
    ("PLUGIN_VERSION", "plugins.version"),
    ("AUTH_TYPE", "auth.auth_type"),
    ("JWT_SECRET", "auth.jwt_secret"),
    ("JWT_REFRESH_SECRET", "auth.jwt_refresh_secret"),
    ("JWT_EXPIRES_IN", "auth.jwt_expires_in"),
    ("JWT_REFRESH_EXPIRES_IN", "auth.jwt_refresh_expires_in"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

/// 应用程序配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub plugins: PluginsConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// 优雅关闭等待时间（秒）
    pub shutdown_timeout: u64,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// 连接超时（秒）
    pub connect_timeout: u64,
    /// 空闲超时（秒）
    pub idle_timeout: u64,
    /// 连接最大存活时间（秒）
    pub max_lifetime: u64,
}

impl DatabaseConfig {
    /// 由离散参数拼出连接 URL
    pub fn url(&self) -> Result<String, CommonError> {
        let mut url = url::Url::parse("postgres://localhost")
            .map_err(|e| CommonError::internal(format!("无法构造数据库 URL: {}", e)))?;

        url.set_host(Some(&self.host))
            .map_err(|e| CommonError::configuration(format!("数据库主机无效: {}", e)))?;
        url.set_port(Some(self.port))
            .map_err(|_| CommonError::configuration("数据库端口无效"))?;
        url.set_username(&self.user)
            .map_err(|_| CommonError::configuration("数据库用户名无效"))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|_| CommonError::configuration("数据库密码无效"))?;
        }
        url.set_path(&self.name);

        Ok(url.to_string())
    }
}

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// 认证方式: jwt | local
    pub auth_type: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    /// 访问令牌有效期，如 `24h`
    pub jwt_expires_in: String,
    /// 刷新令牌有效期，如 `7d`
    pub jwt_refresh_expires_in: String,
    pub issuer: String,
    pub audience: String,
}

/// 插件系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// 插件族版本或别名
    pub version: String,
    /// 单个插件初始化超时（秒）
    pub initialization_timeout: u64,
    /// 单个插件关闭超时（秒）
    pub shutdown_timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_enabled: bool,
    /// 日志目录
    pub file_path: Option<String>,
    /// 日志文件名前缀
    pub file_prefix: String,
}

/// 环境配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub debug: bool,
    pub version: String,
}

impl AppConfig {
    /// 从环境变量和配置文件加载配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// 使用给定的变量查找函数加载配置
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder();

        // 1. 默认配置
        builder = builder.add_source(Config::try_from(&AppConfig::default())?);

        // 2. 可选配置文件
        if Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        // 3. 带前缀的环境变量，如 INVENTORY__SERVER__PORT
        builder = builder.add_source(
            Environment::with_prefix("INVENTORY")
                .prefix_separator("__")
                .separator("__"),
        );

        // 4. 扁平环境变量（优先级最高）
        for (var, key) in LEGACY_ENV_OVERRIDES {
            builder = builder.set_override_option(*key, lookup(var))?;
        }

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.environment.version = env!("CARGO_PKG_VERSION").to_string();
        app_config.environment.debug = !app_config.is_production();

        Ok(app_config)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), CommonError> {
        use crate::config::ConfigValidator;

        ConfigValidator::validate_all(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            CommonError::configuration(format!("配置验证失败: {}", error_messages.join("; ")))
        })
    }

    /// 获取环境类型
    pub fn is_development(&self) -> bool {
        self.environment.name == "development"
    }

    /// 获取环境类型
    pub fn is_production(&self) -> bool {
        self.environment.name == "production"
    }

    /// 获取环境类型
    pub fn is_test(&self) -> bool {
        self.environment.name == "test"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                workers: None,
                shutdown_timeout: 10,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                name: "inventario_microkernel".to_string(),
                user: "postgres".to_string(),
                password: String::new(),
                max_connections: 20,
                min_connections: 1,
                connect_timeout: 2,
                idle_timeout: 30,
                max_lifetime: 1800,
            },
            auth: AuthConfig {
                auth_type: "jwt".to_string(),
                jwt_secret: "change-me-access-token-secret".to_string(),
                jwt_refresh_secret: "change-me-refresh-token-secret".to_string(),
                jwt_expires_in: "24h".to_string(),
                jwt_refresh_expires_in: "7d".to_string(),
                issuer: "inventario-microkernel".to_string(),
                audience: "inventario-api".to_string(),
            },
            plugins: PluginsConfig {
                version: "2.0.0".to_string(),
                initialization_timeout: 30,
                shutdown_timeout: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                file_enabled: false,
                file_path: None,
                file_prefix: "inventory.log".to_string(),
            },
            environment: EnvironmentConfig {
                name: "development".to_string(),
                debug: true,
                version: "0.1.0".to_string(),
            },
        }
    }
}

/// 解析时长字符串
///
/// 支持 `3600`、`45s`、`30m`、`24h`、`7d`
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (digits, multiplier) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 3600),
        Some((idx, 'd')) => (&value[..idx], 86400),
        _ => (value, 1),
    };

    let amount: u64 = digits.trim().parse().ok()?;
    if amount == 0 {
        return None;
    }

    amount.checked_mul(multiplier).map(Duration::from_secs)
}
