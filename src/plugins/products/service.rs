// 商品服务
// 商品的增删改查、库存预警和仪表盘统计

use crate::db::DatabaseManager;
use crate::errors::InventoryError;
use crate::kernel::{EventBus, events};
use crate::plugins::products::ProductPayload;
use crate::plugins::routing::{STATUS_ACTIVE, required_text};
use sea_orm::{JsonValue, Value};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument};

const SELECT_PRODUCT: &str = "SELECT p.codigo, p.nombre, p.descripcion, p.idcategoria, \
     p.idproveedor, p.preciocompra, p.precioventa, p.stockactual, p.stockminimo, \
     p.fechavencimiento, p.idestado, \
     c.nombre AS categoria_nombre, \
     pr.nombreempresa AS proveedor_nombre, \
     e.nombre AS estado_nombre \
     FROM productos p \
     LEFT JOIN categorias c ON p.idcategoria = c.idcategoria \
     LEFT JOIN proveedores pr ON p.idproveedor = pr.idproveedor \
     LEFT JOIN estados e ON p.idestado = e.idestado";

/// 拼出部分更新语句，`codigo` 占最后一个参数位
pub fn build_update(columns: &[(&'static str, Value)]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(idx, (column, _))| format!("{} = ${}", column, idx + 1))
        .collect();

    format!(
        "UPDATE productos SET {} WHERE codigo = ${} RETURNING *",
        assignments.join(", "),
        columns.len() + 1
    )
}

pub struct ProductsService {
    db: Arc<DatabaseManager>,
    event_bus: Arc<EventBus>,
}

impl ProductsService {
    pub fn new(db: Arc<DatabaseManager>, event_bus: Arc<EventBus>) -> Self {
        Self { db, event_bus }
    }

    pub async fn list(&self) -> Result<Vec<JsonValue>, InventoryError> {
        let sql = format!("{} ORDER BY p.codigo DESC", SELECT_PRODUCT);
        self.db.query(&sql, Vec::new()).await
    }

    pub async fn get(&self, codigo: i32) -> Result<Option<JsonValue>, InventoryError> {
        let sql = format!("{} WHERE p.codigo = $1", SELECT_PRODUCT);
        self.db.query_one(&sql, vec![codigo.into()]).await
    }

    /// 创建商品并发布 `product:created`
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &ProductPayload) -> Result<JsonValue, InventoryError> {
        let name = required_text("nombre", payload.name.as_deref())?;
        let purchase_price = payload
            .purchase_price
            .ok_or_else(|| InventoryError::validation("preciocompra", "preciocompra 为必填项"))?;
        let sale_price = payload
            .sale_price
            .ok_or_else(|| InventoryError::validation("precioventa", "precioventa 为必填项"))?;

        let row = self
            .db
            .query_one(
                "INSERT INTO productos (nombre, descripcion, idcategoria, idproveedor, \
                 preciocompra, precioventa, stockactual, stockminimo, fechavencimiento, idestado) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
                vec![
                    name.into(),
                    payload.description.clone().into(),
                    payload.category_id.into(),
                    payload.supplier_id.into(),
                    purchase_price.into(),
                    sale_price.into(),
                    payload.stock.unwrap_or(0).into(),
                    payload.min_stock.unwrap_or(0).into(),
                    payload.expires_on.into(),
                    payload.status_id.unwrap_or(STATUS_ACTIVE).into(),
                ],
            )
            .await?
            .ok_or_else(|| InventoryError::database("插入商品未返回记录"))?;

        info!(codigo = %row["codigo"], "商品已创建");
        self.event_bus.emit(events::PRODUCT_CREATED, &row);
        Ok(row)
    }

    /// 只更新请求中出现的字段，没有字段时返回当前记录
    pub async fn update(
        &self,
        codigo: i32,
        payload: &ProductPayload,
    ) -> Result<Option<JsonValue>, InventoryError> {
        let columns = payload.provided_columns();
        if columns.is_empty() {
            debug!("没有可更新的字段");
            return self.get(codigo).await;
        }

        let sql = build_update(&columns);
        let mut params: Vec<Value> = columns.into_iter().map(|(_, value)| value).collect();
        params.push(codigo.into());

        self.db.query_one(&sql, params).await
    }

    /// 永久删除商品
    #[instrument(skip(self))]
    pub async fn delete(&self, codigo: i32) -> Result<bool, InventoryError> {
        let affected = self
            .db
            .execute("DELETE FROM productos WHERE codigo = $1", vec![codigo.into()])
            .await?;
        Ok(affected > 0)
    }

    /// 库存不高于最低库存的启用商品
    pub async fn low_stock(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT p.*, c.nombre AS categoria_nombre, pr.nombreempresa AS proveedor_nombre \
                 FROM productos p \
                 LEFT JOIN categorias c ON p.idcategoria = c.idcategoria \
                 LEFT JOIN proveedores pr ON p.idproveedor = pr.idproveedor \
                 WHERE p.stockactual <= p.stockminimo AND p.idestado = $1 \
                 ORDER BY p.stockactual ASC",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }

    /// 按名称模糊搜索
    pub async fn search(&self, pattern: &str) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT p.*, c.nombre AS categoria_nombre \
                 FROM productos p \
                 LEFT JOIN categorias c ON p.idcategoria = c.idcategoria \
                 WHERE p.nombre ILIKE $1 \
                 ORDER BY p.nombre ASC",
                vec![pattern.into()],
            )
            .await
    }

    pub async fn stats(&self) -> Result<JsonValue, InventoryError> {
        let row = self
            .db
            .query_one(
                "SELECT COUNT(*) AS total_productos, \
                 COUNT(CASE WHEN idestado = $1 THEN 1 END) AS activos, \
                 COUNT(CASE WHEN stockactual <= stockminimo THEN 1 END) AS bajo_stock, \
                 SUM(stockactual) AS stock_total, \
                 SUM(stockactual * precioventa) AS valor_inventario_total, \
                 SUM(stockactual * preciocompra) AS costo_inventario_total, \
                 SUM(stockactual * (precioventa - preciocompra)) AS ganancia_potencial \
                 FROM productos \
                 WHERE idestado = $1",
                vec![STATUS_ACTIVE.into()],
            )
            .await?;

        Ok(row.unwrap_or_else(|| json!({})))
    }

    /// 按库存缺口估算的高周转商品，取前十
    pub async fn most_moved(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT p.codigo, p.nombre, p.stockactual, p.stockminimo, p.precioventa, \
                 c.nombre AS categoria_nombre, \
                 (p.stockminimo - p.stockactual) AS unidades_vendidas_estimadas \
                 FROM productos p \
                 LEFT JOIN categorias c ON p.idcategoria = c.idcategoria \
                 WHERE p.idestado = $1 AND p.stockactual < p.stockminimo \
                 ORDER BY (p.stockminimo - p.stockactual) DESC \
                 LIMIT 10",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }

    /// 未来 `days` 天内到期的启用商品
    pub async fn expiring(&self, days: i32) -> Result<Vec<JsonValue>, InventoryError> {
        if days <= 0 {
            return Err(InventoryError::validation("days", "days 必须为正整数"));
        }

        self.db
            .query(
                "SELECT p.*, c.nombre AS categoria_nombre, \
                 pr.nombreempresa AS proveedor_nombre, \
                 (p.fechavencimiento - CURRENT_DATE) AS dias_para_vencer \
                 FROM productos p \
                 LEFT JOIN categorias c ON p.idcategoria = c.idcategoria \
                 LEFT JOIN proveedores pr ON p.idproveedor = pr.idproveedor \
                 WHERE p.fechavencimiento IS NOT NULL \
                 AND p.fechavencimiento BETWEEN CURRENT_DATE \
                 AND CURRENT_DATE + make_interval(days => $1) \
                 AND p.idestado = $2 \
                 ORDER BY p.fechavencimiento ASC",
                vec![days.into(), STATUS_ACTIVE.into()],
            )
            .await
    }

    /// 库存价值最高的十个商品
    pub async fn top_value(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT p.codigo, p.nombre, p.stockactual, p.precioventa, \
                 c.nombre AS categoria_nombre, \
                 (p.stockactual * p.precioventa) AS valor_stock \
                 FROM productos p \
                 LEFT JOIN categorias c ON p.idcategoria = c.idcategoria \
                 WHERE p.idestado = $1 AND p.stockactual > 0 \
                 ORDER BY valor_stock DESC \
                 LIMIT 10",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }

    /// 按分类汇总库存
    pub async fn by_category(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT c.nombre AS categoria, \
                 COUNT(p.codigo) AS total_productos, \
                 SUM(p.stockactual) AS stock_total, \
                 SUM(p.stockactual * p.precioventa) AS valor_total, \
                 AVG(p.precioventa) AS precio_promedio \
                 FROM categorias c \
                 LEFT JOIN productos p ON c.idcategoria = p.idcategoria AND p.idestado = $1 \
                 WHERE c.idestado = $1 \
                 GROUP BY c.idcategoria, c.nombre \
                 HAVING COUNT(p.codigo) > 0 \
                 ORDER BY valor_total DESC",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }
}
