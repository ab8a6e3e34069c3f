// 商品请求体和查询参数

use chrono::NaiveDate;
use sea_orm::Value;
use serde::{Deserialize, Serialize};

/// 创建或部分更新商品的请求体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    #[serde(rename = "nombre", alias = "name")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", alias = "description")]
    pub description: Option<String>,
    #[serde(rename = "idcategoria", alias = "category_id")]
    pub category_id: Option<i32>,
    #[serde(rename = "idproveedor", alias = "supplier_id")]
    pub supplier_id: Option<i32>,
    #[serde(rename = "preciocompra", alias = "purchase_price")]
    pub purchase_price: Option<f64>,
    #[serde(rename = "precioventa", alias = "sale_price")]
    pub sale_price: Option<f64>,
    #[serde(rename = "stockactual", alias = "stock")]
    pub stock: Option<i32>,
    #[serde(rename = "stockminimo", alias = "min_stock")]
    pub min_stock: Option<i32>,
    #[serde(rename = "fechavencimiento", alias = "expires_on")]
    pub expires_on: Option<NaiveDate>,
    #[serde(rename = "idestado", alias = "status_id")]
    pub status_id: Option<i32>,
}

impl ProductPayload {
    /// 请求体中出现的列及其值，按列顺序排列
    pub fn provided_columns(&self) -> Vec<(&'static str, Value)> {
        let mut columns: Vec<(&'static str, Value)> = Vec::new();

        if let Some(name) = &self.name {
            columns.push(("nombre", name.clone().into()));
        }
        if let Some(description) = &self.description {
            columns.push(("descripcion", description.clone().into()));
        }
        if let Some(category_id) = self.category_id {
            columns.push(("idcategoria", category_id.into()));
        }
        if let Some(supplier_id) = self.supplier_id {
            columns.push(("idproveedor", supplier_id.into()));
        }
        if let Some(price) = self.purchase_price {
            columns.push(("preciocompra", price.into()));
        }
        if let Some(price) = self.sale_price {
            columns.push(("precioventa", price.into()));
        }
        if let Some(stock) = self.stock {
            columns.push(("stockactual", stock.into()));
        }
        if let Some(min_stock) = self.min_stock {
            columns.push(("stockminimo", min_stock.into()));
        }
        if let Some(date) = self.expires_on {
            columns.push(("fechavencimiento", date.into()));
        }
        if let Some(status_id) = self.status_id {
            columns.push(("idestado", status_id.into()));
        }

        columns
    }
}

/// 临期商品查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpiringQuery {
    #[serde(alias = "dias")]
    pub days: Option<i32>,
}

/// 默认的临期天数
pub const DEFAULT_EXPIRING_DAYS: i32 = 30;
