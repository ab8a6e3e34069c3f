// 分类 HTTP 处理函数

use crate::errors::{InventoryError, created_response, message_response, success_response};
use crate::plugins::categories::{CategoriesService, CategoryPayload};
use actix_web::{HttpResponse, web};
use inventory_common::ApiResponse;

const RESOURCE: &str = "分类";

pub async fn list(service: web::Data<CategoriesService>) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.list().await?))
}

pub async fn get(
    service: web::Data<CategoriesService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, InventoryError> {
    let category = service
        .get(id.into_inner())
        .await?
        .ok_or_else(|| InventoryError::not_found(RESOURCE))?;
    Ok(success_response(category))
}

pub async fn create(
    service: web::Data<CategoriesService>,
    body: web::Json<CategoryPayload>,
) -> Result<HttpResponse, InventoryError> {
    let category = service.create(&body).await?;
    Ok(created_response(category, "分类创建成功"))
}

pub async fn update(
    service: web::Data<CategoriesService>,
    id: web::Path<i32>,
    body: web::Json<CategoryPayload>,
) -> Result<HttpResponse, InventoryError> {
    let category = service
        .update(id.into_inner(), &body)
        .await?
        .ok_or_else(|| InventoryError::not_found(RESOURCE))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(category, "分类更新成功")))
}

pub async fn delete(
    service: web::Data<CategoriesService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, InventoryError> {
    if !service.delete(id.into_inner()).await? {
        return Err(InventoryError::not_found(RESOURCE));
    }
    Ok(message_response("分类已停用"))
}

pub async fn with_count(
    service: web::Data<CategoriesService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.with_count().await?))
}

pub async fn stats(service: web::Data<CategoriesService>) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.stats().await?))
}

pub async fn with_products(
    service: web::Data<CategoriesService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.with_products().await?))
}

pub async fn top_value(
    service: web::Data<CategoriesService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.top_value().await?))
}

/// 两个版本共有的路由
pub fn basic_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list))
        .route("", web::post().to(create))
        .route("/{id}", web::get().to(get))
        .route("/{id}", web::put().to(update))
        .route("/{id}", web::delete().to(delete));
}

/// V2 新增的路由
pub fn extended_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/with-count", web::get().to(with_count))
        .route("/dashboard/stats", web::get().to(stats))
        .route("/dashboard/with-products", web::get().to(with_products))
        .route("/dashboard/top-value", web::get().to(top_value));
}
