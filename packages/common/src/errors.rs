// 通用错误类型定义

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 通用错误类型
///
/// 配置层和工具层使用的轻量错误，由主 crate 转换为 `InventoryError`
#[derive(Debug, Error, Serialize, Deserialize, PartialEq)]
pub enum CommonError {
    #[error("配置错误: {message}")]
    Configuration { message: String },

    #[error("验证错误: {message}")]
    Validation { message: String },

    #[error("资源未找到: {resource}")]
    NotFound { resource: String },

    #[error("内部错误: {message}")]
    Internal { message: String },
}

impl CommonError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_error_display() {
        let err = CommonError::configuration("缺少 DB_HOST");
        assert_eq!(err.to_string(), "配置错误: 缺少 DB_HOST");

        let err = CommonError::not_found("分类");
        assert_eq!(err.to_string(), "资源未找到: 分类");
    }
}
