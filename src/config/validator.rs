// 配置验证器
// 提供详细的配置验证逻辑

use crate::config::{parse_duration, AppConfig};
use crate::plugins::{Edition, FactorySelector};
use inventory_common::CommonError;

/// 允许的认证方式
pub const VALID_AUTH_TYPES: &[&str] = &["jwt", "local"];

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证完整配置，收集所有错误
    pub fn validate_all(config: &AppConfig) -> Result<(), Vec<CommonError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&config.server) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_database(&config.database) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_auth(&config.auth, config.is_production()) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_plugins(&config.plugins) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_plugin_auth(&config.plugins, &config.auth) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_logging(&config.logging) {
            errors.push(e);
        }

        if let Err(e) = Self::validate_environment(&config.environment) {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 验证服务器配置
    pub fn validate_server(config: &crate::config::ServerConfig) -> Result<(), CommonError> {
        if config.port == 0 {
            return Err(CommonError::validation("服务器端口不能为 0"));
        }

        if config.host.is_empty() {
            return Err(CommonError::validation("服务器主机地址不能为空"));
        }

        if let Some(workers) = config.workers {
            if workers == 0 {
                return Err(CommonError::validation("工作线程数不能为 0"));
            }
        }

        Ok(())
    }

    /// 验证数据库配置
    pub fn validate_database(config: &crate::config::DatabaseConfig) -> Result<(), CommonError> {
        if config.host.is_empty() {
            return Err(CommonError::validation("数据库主机不能为空"));
        }

        if config.name.is_empty() {
            return Err(CommonError::validation("数据库名称不能为空"));
        }

        if config.user.is_empty() {
            return Err(CommonError::validation("数据库用户不能为空"));
        }

        if config.port == 0 {
            return Err(CommonError::validation("数据库端口不能为 0"));
        }

        if config.max_connections == 0 {
            return Err(CommonError::validation("数据库最大连接数不能为 0"));
        }

        if config.min_connections > config.max_connections {
            return Err(CommonError::validation("数据库最小连接数不能大于最大连接数"));
        }

        if config.connect_timeout == 0 {
            return Err(CommonError::validation("数据库连接超时不能为 0"));
        }

        config.url().map(|_| ())
    }

    /// 验证认证配置
    pub fn validate_auth(
        config: &crate::config::AuthConfig,
        production: bool,
    ) -> Result<(), CommonError> {
        if !VALID_AUTH_TYPES.contains(&config.auth_type.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的认证方式: {}，有效值: {:?}",
                config.auth_type, VALID_AUTH_TYPES
            )));
        }

        if config.jwt_secret.is_empty() || config.jwt_refresh_secret.is_empty() {
            return Err(CommonError::validation("JWT 密钥不能为空"));
        }

        if config.jwt_secret == config.jwt_refresh_secret {
            return Err(CommonError::configuration(
                "JWT_SECRET 与 JWT_REFRESH_SECRET 不能相同",
            ));
        }

        if production && (config.jwt_secret.len() < 32 || config.jwt_refresh_secret.len() < 32) {
            return Err(CommonError::validation("生产环境 JWT 密钥长度不能少于 32 个字符"));
        }

        if parse_duration(&config.jwt_expires_in).is_none() {
            return Err(CommonError::validation(format!(
                "无效的访问令牌有效期: {}",
                config.jwt_expires_in
            )));
        }

        if parse_duration(&config.jwt_refresh_expires_in).is_none() {
            return Err(CommonError::validation(format!(
                "无效的刷新令牌有效期: {}",
                config.jwt_refresh_expires_in
            )));
        }

        Ok(())
    }

    /// 验证插件配置
    pub fn validate_plugins(config: &crate::config::PluginsConfig) -> Result<(), CommonError> {
        if config.initialization_timeout == 0 {
            return Err(CommonError::validation("插件初始化超时不能为 0"));
        }

        if config.shutdown_timeout == 0 {
            return Err(CommonError::validation("插件关闭超时不能为 0"));
        }

        Ok(())
    }

    /// 验证插件族与认证方式是否兼容
    ///
    /// V2 的业务路由全部要求访问令牌，本地认证不签发令牌
    pub fn validate_plugin_auth(
        plugins: &crate::config::PluginsConfig,
        auth: &crate::config::AuthConfig,
    ) -> Result<(), CommonError> {
        let version = FactorySelector::resolve_version(Some(&plugins.version));
        let local = auth.auth_type.trim().eq_ignore_ascii_case("local");

        if version == Edition::V2_VERSION && local {
            return Err(CommonError::configuration(format!(
                "插件族 {} 需要 JWT 认证，AUTH_TYPE=local 只能用于 {}",
                version,
                Edition::V1_VERSION
            )));
        }

        Ok(())
    }

    /// 验证日志配置
    pub fn validate_logging(config: &crate::config::LoggingConfig) -> Result<(), CommonError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.level.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                config.level, valid_levels
            )));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&config.format.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的日志格式: {}，有效值: {:?}",
                config.format, valid_formats
            )));
        }

        if config.file_enabled && config.file_path.is_none() {
            return Err(CommonError::validation("启用文件日志时必须指定日志目录"));
        }

        Ok(())
    }

    /// 验证环境配置
    pub fn validate_environment(
        config: &crate::config::EnvironmentConfig,
    ) -> Result<(), CommonError> {
        let valid_environments = ["development", "staging", "production", "test"];
        if !valid_environments.contains(&config.name.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的环境名称: {}，有效值: {:?}",
                config.name, valid_environments
            )));
        }

        if config.version.is_empty() {
            return Err(CommonError::validation("版本信息不能为空"));
        }

        Ok(())
    }
}
