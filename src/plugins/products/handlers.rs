// 商品 HTTP 处理函数

use crate::errors::{InventoryError, created_response, message_response, success_response};
use crate::plugins::products::{DEFAULT_EXPIRING_DAYS, ExpiringQuery, ProductPayload, ProductsService};
use crate::plugins::routing::search_pattern;
use actix_web::{HttpResponse, web};
use inventory_common::{ApiResponse, SearchQuery};

const RESOURCE: &str = "商品";

pub async fn list(service: web::Data<ProductsService>) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.list().await?))
}

pub async fn get(
    service: web::Data<ProductsService>,
    codigo: web::Path<i32>,
) -> Result<HttpResponse, InventoryError> {
    let product = service
        .get(codigo.into_inner())
        .await?
        .ok_or_else(|| InventoryError::not_found(RESOURCE))?;
    Ok(success_response(product))
}

pub async fn create(
    service: web::Data<ProductsService>,
    body: web::Json<ProductPayload>,
) -> Result<HttpResponse, InventoryError> {
    let product = service.create(&body).await?;
    Ok(created_response(product, "商品创建成功"))
}

pub async fn update(
    service: web::Data<ProductsService>,
    codigo: web::Path<i32>,
    body: web::Json<ProductPayload>,
) -> Result<HttpResponse, InventoryError> {
    let product = service
        .update(codigo.into_inner(), &body)
        .await?
        .ok_or_else(|| InventoryError::not_found(RESOURCE))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(product, "商品更新成功")))
}

pub async fn delete(
    service: web::Data<ProductsService>,
    codigo: web::Path<i32>,
) -> Result<HttpResponse, InventoryError> {
    if !service.delete(codigo.into_inner()).await? {
        return Err(InventoryError::not_found(RESOURCE));
    }
    Ok(message_response("商品已删除"))
}

pub async fn low_stock(
    service: web::Data<ProductsService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.low_stock().await?))
}

pub async fn search(
    service: web::Data<ProductsService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, InventoryError> {
    let pattern = search_pattern(&query)?;
    Ok(success_response(service.search(&pattern).await?))
}

pub async fn stats(service: web::Data<ProductsService>) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.stats().await?))
}

pub async fn most_moved(
    service: web::Data<ProductsService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.most_moved().await?))
}

pub async fn expiring(
    service: web::Data<ProductsService>,
    query: web::Query<ExpiringQuery>,
) -> Result<HttpResponse, InventoryError> {
    let days = query.days.unwrap_or(DEFAULT_EXPIRING_DAYS);
    Ok(success_response(service.expiring(days).await?))
}

pub async fn top_value(
    service: web::Data<ProductsService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.top_value().await?))
}

pub async fn by_category(
    service: web::Data<ProductsService>,
) -> Result<HttpResponse, InventoryError> {
    Ok(success_response(service.by_category().await?))
}

/// 两个版本共有的路由
pub fn basic_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list))
        .route("", web::post().to(create))
        .route("/low-stock", web::get().to(low_stock))
        .route("/bajo-stock", web::get().to(low_stock))
        .route("/{codigo}", web::get().to(get))
        .route("/{codigo}", web::put().to(update))
        .route("/{codigo}", web::delete().to(delete));
}

/// V2 新增的路由
pub fn extended_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/search", web::get().to(search))
        .route("/dashboard/stats", web::get().to(stats))
        .route("/dashboard/most-moved", web::get().to(most_moved))
        .route("/dashboard/expiring", web::get().to(expiring))
        .route("/dashboard/top-value", web::get().to(top_value))
        .route("/dashboard/by-category", web::get().to(by_category));
}
