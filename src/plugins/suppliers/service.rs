// 供应商服务
// 供应商的增删改查、搜索和仪表盘统计

use crate::db::DatabaseManager;
use crate::errors::InventoryError;
use crate::kernel::{EventBus, events};
use crate::plugins::routing::{STATUS_ACTIVE, STATUS_INACTIVE, required_text};
use crate::plugins::suppliers::SupplierPayload;
use inventory_common::CountResponse;
use sea_orm::JsonValue;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const SELECT_SUPPLIER: &str = "SELECT p.idproveedor, p.nombreempresa, p.nombreceo, \
     p.telefono, p.email, p.direccion, p.idestado, \
     e.nombre AS estado_nombre \
     FROM proveedores p \
     LEFT JOIN estados e ON p.idestado = e.idestado";

pub struct SuppliersService {
    db: Arc<DatabaseManager>,
    event_bus: Arc<EventBus>,
}

impl SuppliersService {
    pub fn new(db: Arc<DatabaseManager>, event_bus: Arc<EventBus>) -> Self {
        Self { db, event_bus }
    }

    pub async fn list(&self) -> Result<Vec<JsonValue>, InventoryError> {
        let sql = format!("{} ORDER BY p.idproveedor DESC", SELECT_SUPPLIER);
        self.db.query(&sql, Vec::new()).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<JsonValue>, InventoryError> {
        let sql = format!("{} WHERE p.idproveedor = $1", SELECT_SUPPLIER);
        self.db.query_one(&sql, vec![id.into()]).await
    }

    /// 创建供应商并发布 `supplier:created`
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &SupplierPayload) -> Result<JsonValue, InventoryError> {
        let company_name = required_text("nombreempresa", payload.company_name.as_deref())?;

        let row = self
            .db
            .query_one(
                "INSERT INTO proveedores (nombreempresa, nombreceo, telefono, email, direccion, idestado) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
                vec![
                    company_name.into(),
                    payload.ceo_name.clone().into(),
                    payload.phone.clone().into(),
                    payload.email.clone().into(),
                    payload.address.clone().into(),
                    payload.status_id.unwrap_or(STATUS_ACTIVE).into(),
                ],
            )
            .await?
            .ok_or_else(|| InventoryError::database("插入供应商未返回记录"))?;

        info!(idproveedor = %row["idproveedor"], "供应商已创建");
        self.event_bus.emit(events::SUPPLIER_CREATED, &row);
        Ok(row)
    }

    /// 更新供应商，未提供的字段保持原值
    pub async fn update(
        &self,
        id: i32,
        payload: &SupplierPayload,
    ) -> Result<Option<JsonValue>, InventoryError> {
        self.db
            .query_one(
                "UPDATE proveedores SET \
                 nombreempresa = COALESCE($1, nombreempresa), \
                 nombreceo = COALESCE($2, nombreceo), \
                 telefono = COALESCE($3, telefono), \
                 email = COALESCE($4, email), \
                 direccion = COALESCE($5, direccion), \
                 idestado = COALESCE($6, idestado) \
                 WHERE idproveedor = $7 RETURNING *",
                vec![
                    payload.company_name.clone().into(),
                    payload.ceo_name.clone().into(),
                    payload.phone.clone().into(),
                    payload.email.clone().into(),
                    payload.address.clone().into(),
                    payload.status_id.into(),
                    id.into(),
                ],
            )
            .await
    }

    /// 删除供应商
    ///
    /// 同一事务内先解除商品关联，再删除供应商
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, InventoryError> {
        let client = self.db.get_client().await?;

        client
            .execute(
                "UPDATE productos SET idproveedor = NULL WHERE idproveedor = $1",
                vec![id.into()],
            )
            .await?;
        let affected = client
            .execute("DELETE FROM proveedores WHERE idproveedor = $1", vec![id.into()])
            .await?;

        if affected == 0 {
            warn!("供应商不存在，回滚");
            client.rollback().await?;
            return Ok(false);
        }

        client.commit().await?;
        info!("供应商已删除");
        Ok(true)
    }

    /// 按公司名或负责人模糊搜索
    pub async fn search(&self, pattern: &str) -> Result<Vec<JsonValue>, InventoryError> {
        let sql = format!(
            "{} WHERE p.nombreempresa ILIKE $1 OR p.nombreceo ILIKE $1 ORDER BY p.nombreempresa ASC",
            SELECT_SUPPLIER
        );
        self.db.query(&sql, vec![pattern.into()]).await
    }

    pub async fn count(&self) -> Result<CountResponse, InventoryError> {
        let row = self
            .db
            .query_one("SELECT COUNT(*) AS total FROM proveedores", Vec::new())
            .await?;

        let total = row
            .as_ref()
            .and_then(|r| r["total"].as_i64())
            .unwrap_or(0);
        Ok(CountResponse { total })
    }

    pub async fn stats(&self) -> Result<JsonValue, InventoryError> {
        let row = self
            .db
            .query_one(
                "SELECT COUNT(*) AS total_proveedores, \
                 COUNT(CASE WHEN idestado = $1 THEN 1 END) AS activos, \
                 COUNT(CASE WHEN idestado = $2 THEN 1 END) AS inactivos \
                 FROM proveedores",
                vec![STATUS_ACTIVE.into(), STATUS_INACTIVE.into()],
            )
            .await?;

        Ok(row.unwrap_or_else(|| json!({})))
    }

    /// 供货商品最多的启用供应商
    pub async fn most_products(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT pr.idproveedor, pr.nombreempresa, pr.telefono, pr.email, \
                 COUNT(p.codigo) AS total_productos, \
                 SUM(p.stockactual) AS stock_total, \
                 SUM(p.stockactual * p.precioventa) AS valor_inventario \
                 FROM proveedores pr \
                 LEFT JOIN productos p ON pr.idproveedor = p.idproveedor AND p.idestado = $1 \
                 WHERE pr.idestado = $1 \
                 GROUP BY pr.idproveedor, pr.nombreempresa, pr.telefono, pr.email \
                 HAVING COUNT(p.codigo) > 0 \
                 ORDER BY total_productos DESC",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }

    /// 库存价值最高的十个供应商
    pub async fn top_value(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT pr.idproveedor, pr.nombreempresa, \
                 COUNT(p.codigo) AS total_productos, \
                 SUM(p.stockactual * p.preciocompra) AS costo_total, \
                 SUM(p.stockactual * p.precioventa) AS valor_venta_total, \
                 SUM(p.stockactual * (p.precioventa - p.preciocompra)) AS ganancia_potencial \
                 FROM proveedores pr \
                 LEFT JOIN productos p ON pr.idproveedor = p.idproveedor AND p.idestado = $1 \
                 WHERE pr.idestado = $1 \
                 GROUP BY pr.idproveedor, pr.nombreempresa \
                 HAVING SUM(p.stockactual * p.precioventa) > 0 \
                 ORDER BY valor_venta_total DESC \
                 LIMIT 10",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }

    /// 某个供应商的启用商品，按库存价值排序
    pub async fn products(&self, id: i32) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT p.codigo, p.nombre, p.stockactual, p.preciocompra, p.precioventa, \
                 c.nombre AS categoria_nombre, \
                 (p.stockactual * p.precioventa) AS valor_stock \
                 FROM productos p \
                 LEFT JOIN categorias c ON p.idcategoria = c.idcategoria \
                 WHERE p.idproveedor = $1 AND p.idestado = $2 \
                 ORDER BY valor_stock DESC",
                vec![id.into(), STATUS_ACTIVE.into()],
            )
            .await
    }
}
