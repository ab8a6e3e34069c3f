// 供应商 HTTP 处理函数

use crate::errors::{InventoryError, created_response, message_response, success_response};
use crate::plugins::routing::search_pattern;
use crate::plugins::suppliers::{SupplierPayload, SuppliersService};
use actix_web::{HttpResponse, web};
use inventory_common::{ApiResponse, SearchQuery};

const RESOURCE: &str = "供应商";

pub async fn list(service: web::Data<SuppliersService>) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.list().await?))
}

pub async fn get(
    service: web::Data<SuppliersService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, InventoryError> {
    let supplier = service
        .get(id.into_inner())
        .await?
        .ok_or_else(|| InventoryError::not_found(RESOURCE))?;
    Ok(success_response(supplier))
}

pub async fn create(
    service: web::Data<SuppliersService>,
    body: web::Json<SupplierPayload>,
) -> Result<HttpResponse, InventoryError> {
    let supplier = service.create(&body).await?;
    Ok(created_response(supplier, "供应商创建成功"))
}

pub async fn update(
    service: web::Data<SuppliersService>,
    id: web::Path<i32>,
    body: web::Json<SupplierPayload>,
) -> Result<HttpResponse, InventoryError> {
    let supplier = service
        .update(id.into_inner(), &body)
        .await?
        .ok_or_else(|| InventoryError::not_found(RESOURCE))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(supplier, "供应商更新成功")))
}

pub async fn delete(
    service: web::Data<SuppliersService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, InventoryError> {
    if !service.delete(id.into_inner()).await? {
        return Err(InventoryError::not_found(RESOURCE));
    }
    Ok(message_response("供应商已删除"))
}

pub async fn search(
    service: web::Data<SuppliersService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, InventoryError> {
    let pattern = search_pattern(&query)?;
    Ok(success_response(service.search(&pattern).await?))
}

pub async fn count(service: web::Data<SuppliersService>) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.count().await?))
}

pub async fn stats(service: web::Data<SuppliersService>) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.stats().await?))
}

pub async fn most_products(
    service: web::Data<SuppliersService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.most_products().await?))
}

pub async fn top_value(
    service: web::Data<SuppliersService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.top_value().await?))
}

pub async fn products(
    service: web::Data<SuppliersService>,
    id: web::Path<i32>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.products(id.into_inner()).await?))
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
    cfg.route("/search", web::get().to(search))
        .route("/count", web::get().to(count))
        .route("/dashboard/stats", web::get().to(stats))
        .route("/dashboard/most-products", web::get().to(most_products))
        .route("/dashboard/top-value", web::get().to(top_value))
        .route("/{id}/products", web::get().to(products));
}
