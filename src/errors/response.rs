// 错误响应格式化

use crate::errors::InventoryError;
use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use inventory_common::ApiResponse;
use serde::{Deserialize, Serialize};

/// 错误响应结构
///
/// 与成功响应共用 `success`/`message` 字段，额外附带错误代码
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip)]
    pub status: u16,
}

impl ErrorResponse {
    /// 从 InventoryError 创建错误响应
    pub fn from_error(error: &InventoryError) -> Self {
        let field = match error {
            InventoryError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };

        Self {
            success: false,
            message: error.public_message(),
            code: error.error_code().to_string(),
            field,
            timestamp: Utc::now(),
            request_id: None,
            status: error.status_code(),
        }
    }

    /// 设置请求 ID
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// 转换为 HTTP 响应
    pub fn into_http_response(self) -> HttpResponse {
        let mut response = HttpResponse::build(
            actix_web::http::StatusCode::from_u16(self.status)
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
        );

        if let Some(ref request_id) = self.request_id {
            response.insert_header(("X-Request-ID", request_id.clone()));
        }

        response.json(self)
    }

    /// 创建未找到路由的响应
    pub fn route_not_found(path: &str) -> Self {
        Self {
            success: false,
            message: format!("路由不存在: {}", path),
            code: "NOT_FOUND".to_string(),
            field: None,
            timestamp: Utc::now(),
            request_id: None,
            status: 404,
        }
    }
}

/// 成功响应辅助函数
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(data))
}

/// 创建成功响应辅助函数
pub fn created_response<T: Serialize>(data: T, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success_with_message(data, message))
}

/// 成功响应（带消息）辅助函数
pub fn message_response(message: impl Into<String>) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::message(message))
}
