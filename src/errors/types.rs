// 统一错误类型定义

use actix_web::{HttpResponse, ResponseError};
use inventory_common::CommonError;
use serde::{Deserialize, Serialize};

use thiserror::Error;
use tracing::error;

/// 库存微内核统一错误类型
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "error_type", content = "details")]
pub enum InventoryError {
    /// 配置错误
    #[error("配置错误: {message}")]
    Configuration { message: String },

    /// 数据库错误
    #[error("数据库错误: {message}")]
    Database { message: String, code: Option<String> },

    /// 认证错误
    #[error("认证错误: {message}")]
    Authentication { message: String },

    /// 授权错误
    #[error("授权错误: {message}")]
    Authorization { message: String },

    /// 验证错误
    #[error("验证错误: {field} - {message}")]
    Validation { field: String, message: String },

    /// 资源未找到
    #[error("资源未找到: {resource}")]
    NotFound { resource: String },

    /// 插件依赖未满足
    #[error("插件 {plugin} 依赖 {dependency}，但该插件尚未加载")]
    DependencyNotSatisfied { plugin: String, dependency: String },

    /// 插件初始化失败
    #[error("插件 {plugin} 初始化失败: {message}")]
    PluginInitialization { plugin: String, message: String },

    /// 插件运行期错误
    #[error("插件 {plugin} 错误: {message}")]
    Plugin { plugin: String, message: String },

    /// 内部服务器错误
    #[error("内部服务器错误: {message}")]
    Internal { message: String },

    /// 服务不可用
    #[error("服务暂时不可用: {message}")]
    ServiceUnavailable { message: String },

    /// 超时错误
    #[error("操作超时: {operation}")]
    Timeout { operation: String },
}

impl InventoryError {
    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DependencyNotSatisfied { .. } => "DEPENDENCY_NOT_SATISFIED",
            Self::PluginInitialization { .. } => "PLUGIN_INITIALIZATION_ERROR",
            Self::Plugin { .. } => "PLUGIN_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Self::Timeout { .. } => "TIMEOUT_ERROR",
        }
    }

    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::Authorization { .. } => 403,
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::ServiceUnavailable { .. } => 503,
            Self::Timeout { .. } => 504,
            Self::Configuration { .. }
            | Self::Database { .. }
            | Self::DependencyNotSatisfied { .. }
            | Self::PluginInitialization { .. }
            | Self::Plugin { .. }
            | Self::Internal { .. } => 500,
        }
    }

    /// 是否为客户端错误
    pub fn is_client_error(&self) -> bool {
        matches!(self.status_code(), 400..=499)
    }

    /// 是否为服务器错误
    pub fn is_server_error(&self) -> bool {
        matches!(self.status_code(), 500..=599)
    }

    /// 是否应该记录错误日志
    pub fn should_log(&self) -> bool {
        !matches!(
            self,
            Self::Validation { .. } | Self::NotFound { .. } | Self::Authentication { .. }
        )
    }

    /// 面向客户端的消息，服务器错误不暴露内部细节
    pub fn public_message(&self) -> String {
        match self {
            Self::Authentication { message } | Self::Authorization { message } => {
                message.clone()
            }
            Self::Validation { message, .. } => message.clone(),
            Self::NotFound { resource } => format!("{}未找到", resource),
            Self::ServiceUnavailable { .. } => "服务暂时不可用".to_string(),
            Self::Timeout { .. } => "请求处理超时".to_string(),
            _ => "服务器内部错误".to_string(),
        }
    }

    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 创建数据库错误
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: None,
        }
    }

    /// 创建数据库错误（带错误代码）
    pub fn database_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// 创建认证错误
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// 创建授权错误
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建资源未找到错误
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// 创建依赖未满足错误
    pub fn dependency_not_satisfied(
        plugin: impl Into<String>,
        dependency: impl Into<String>,
    ) -> Self {
        Self::DependencyNotSatisfied {
            plugin: plugin.into(),
            dependency: dependency.into(),
        }
    }

    /// 创建插件初始化错误
    pub fn plugin_initialization(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PluginInitialization {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// 创建插件错误
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 创建服务不可用错误
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// 创建超时错误
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }
}

/// 实现 ResponseError trait 以便与 Actix Web 集成
impl ResponseError for InventoryError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        if self.should_log() {
            error!(
                error_code = %self.error_code(),
                error_message = %self,
                "处理请求时发生错误"
            );
        }

        crate::errors::ErrorResponse::from_error(self).into_http_response()
    }
}

/// 从 CommonError 转换
impl From<CommonError> for InventoryError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::Configuration { message } => Self::configuration(message),
            CommonError::Validation { message } => Self::validation("general", message),
            CommonError::NotFound { resource } => Self::not_found(resource),
            CommonError::Internal { message } => Self::internal(message),
        }
    }
}

/// 从 sea_orm::DbErr 转换
impl From<sea_orm::DbErr> for InventoryError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::ConnectionAcquire(_) => Self::database("无法获取数据库连接"),
            sea_orm::DbErr::TryIntoErr { .. } => Self::database("数据类型转换错误"),
            sea_orm::DbErr::Conn(msg) => Self::database(format!("数据库连接错误: {}", msg)),
            sea_orm::DbErr::Exec(msg) => Self::database(format!("数据库执行错误: {}", msg)),
            sea_orm::DbErr::Query(msg) => Self::database(format!("数据库查询错误: {}", msg)),
            _ => Self::database(format!("数据库错误: {}", err)),
        }
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for InventoryError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(format!("配置加载错误: {}", err))
    }
}

/// 从 std::io::Error 转换
impl From<std::io::Error> for InventoryError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => Self::timeout("IO 操作"),
            std::io::ErrorKind::AddrInUse => {
                Self::service_unavailable(format!("端口已被占用: {}", err))
            }
            _ => Self::internal(format!("IO 错误: {}", err)),
        }
    }
}

/// 从 serde_json::Error 转换
impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation("json", format!("JSON 解析错误: {}", err))
    }
}

/// 从 jsonwebtoken 错误转换
impl From<jsonwebtoken::errors::Error> for InventoryError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::authentication("令牌已过期"),
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::authentication("令牌无效或已过期"),
            _ => Self::internal(format!("JWT 处理失败: {}", err)),
        }
    }
}
