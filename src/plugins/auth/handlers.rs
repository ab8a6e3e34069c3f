// 认证 HTTP 处理函数

use crate::errors::{InventoryError, message_response};
use crate::plugins::auth::{AuthCredentials, AuthService, JwtService, LoginOutcome};
use actix_web::{HttpRequest, HttpResponse, http::header, web};
use inventory_common::ApiResponse;
use serde::Deserialize;
use serde_json::json;

/// 刷新令牌请求
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken", alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

/// 单个令牌请求
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: Option<String>,
}

/// 登录
pub async fn login(
    service: web::Data<AuthService>,
    body: web::Json<AuthCredentials>,
) -> Result<HttpResponse, InventoryError> {
    Ok(match service.login(&body).await? {
        LoginOutcome::Authenticated(result) => HttpResponse::Ok().json(result),
        LoginOutcome::Rejected(result) => HttpResponse::Unauthorized().json(result),
        LoginOutcome::Invalid(validation) => HttpResponse::BadRequest().json(
            ApiResponse::failure_with_data(validation.errors, "凭据格式不合法"),
        ),
    })
}

/// 刷新令牌
pub async fn refresh(
    service: web::Data<AuthService>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse, InventoryError> {
    let refresh_token = body
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| InventoryError::validation("refreshToken", "缺少刷新令牌"))?;

    let tokens = service.refresh(refresh_token).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        json!({ "tokens": tokens }),
        "令牌已刷新",
    )))
}

/// 校验访问令牌
pub async fn verify(
    service: web::Data<AuthService>,
    body: web::Json<TokenRequest>,
) -> Result<HttpResponse, InventoryError> {
    let token = body
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| InventoryError::validation("token", "缺少令牌"))?;

    let claims = service.verify(token)?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        json!({ "valid": true, "payload": claims }),
        "令牌有效",
    )))
}

/// 注销，令牌取自 Authorization 头或请求体
pub async fn logout(
    service: web::Data<AuthService>,
    req: HttpRequest,
    body: Option<web::Json<TokenRequest>>,
) -> Result<HttpResponse, InventoryError> {
    let from_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = JwtService::extract_token_from_header(from_header)
        .map(str::to_string)
        .or_else(|| body.and_then(|b| b.into_inner().token))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| InventoryError::validation("token", "缺少令牌"))?;

    service.logout(&token).await;
    Ok(message_response("已注销"))
}
