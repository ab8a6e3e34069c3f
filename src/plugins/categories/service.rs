// 分类服务
// 分类的增删改查和仪表盘统计

use crate::db::DatabaseManager;
use crate::errors::InventoryError;
use crate::kernel::{EventBus, events};
use crate::plugins::categories::CategoryPayload;
use crate::plugins::routing::{STATUS_ACTIVE, STATUS_INACTIVE, required_text};
use sea_orm::JsonValue;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};

const SELECT_CATEGORY: &str = "SELECT c.idcategoria, c.nombre, c.descripcion, c.idestado, \
     e.nombre AS estado_nombre \
     FROM categorias c \
     LEFT JOIN estados e ON c.idestado = e.idestado";

pub struct CategoriesService {
    db: Arc<DatabaseManager>,
    event_bus: Arc<EventBus>,
}

impl CategoriesService {
    pub fn new(db: Arc<DatabaseManager>, event_bus: Arc<EventBus>) -> Self {
        Self { db, event_bus }
    }

    pub async fn list(&self) -> Result<Vec<JsonValue>, InventoryError> {
        let sql = format!("{} ORDER BY c.idcategoria DESC", SELECT_CATEGORY);
        self.db.query(&sql, Vec::new()).await
    }

    pub async fn get(&self, id: i32) -> Result<Option<JsonValue>, InventoryError> {
        let sql = format!("{} WHERE c.idcategoria = $1", SELECT_CATEGORY);
        self.db.query_one(&sql, vec![id.into()]).await
    }

    /// 创建分类并发布 `category:created`
    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: &CategoryPayload) -> Result<JsonValue, InventoryError> {
        let name = required_text("nombre", payload.name.as_deref())?;

        let row = self
            .db
            .query_one(
                "INSERT INTO categorias (nombre, descripcion, idestado) \
                 VALUES ($1, $2, $3) RETURNING *",
                vec![
                    name.into(),
                    payload.description.clone().into(),
                    payload.status_id.unwrap_or(STATUS_ACTIVE).into(),
                ],
            )
            .await?
            .ok_or_else(|| InventoryError::database("插入分类未返回记录"))?;

        info!(idcategoria = %row["idcategoria"], "分类已创建");
        self.event_bus.emit(events::CATEGORY_CREATED, &row);
        Ok(row)
    }

    /// 更新分类，未提供的字段保持原值
    pub async fn update(
        &self,
        id: i32,
        payload: &CategoryPayload,
    ) -> Result<Option<JsonValue>, InventoryError> {
        self.db
            .query_one(
                "UPDATE categorias SET \
                 nombre = COALESCE($1, nombre), \
                 descripcion = COALESCE($2, descripcion), \
                 idestado = COALESCE($3, idestado) \
                 WHERE idcategoria = $4 RETURNING *",
                vec![
                    payload.name.clone().into(),
                    payload.description.clone().into(),
                    payload.status_id.into(),
                    id.into(),
                ],
            )
            .await
    }

    /// 软删除分类
    ///
    /// 同一事务内先解除商品关联，再把分类标记为停用
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<bool, InventoryError> {
        let client = self.db.get_client().await?;

        client
            .execute(
                "UPDATE productos SET idcategoria = NULL WHERE idcategoria = $1",
                vec![id.into()],
            )
            .await?;
        let affected = client
            .execute(
                "UPDATE categorias SET idestado = $1 WHERE idcategoria = $2",
                vec![STATUS_INACTIVE.into(), id.into()],
            )
            .await?;

        if affected == 0 {
            warn!("分类不存在，回滚");
            client.rollback().await?;
            return Ok(false);
        }

        client.commit().await?;
        info!("分类已停用");
        Ok(true)
    }

    /// 分类及其商品数量
    pub async fn with_count(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT c.*, COUNT(p.codigo) AS total_productos \
                 FROM categorias c \
                 LEFT JOIN productos p ON c.idcategoria = p.idcategoria \
                 GROUP BY c.idcategoria \
                 ORDER BY c.idcategoria DESC",
                Vec::new(),
            )
            .await
    }

    pub async fn stats(&self) -> Result<JsonValue, InventoryError> {
        let row = self
            .db
            .query_one(
                "SELECT COUNT(*) AS total_categorias, \
                 COUNT(CASE WHEN idestado = $1 THEN 1 END) AS activas, \
                 COUNT(CASE WHEN idestado = $2 THEN 1 END) AS inactivas \
                 FROM categorias",
                vec![STATUS_ACTIVE.into(), STATUS_INACTIVE.into()],
            )
            .await?;

        Ok(row.unwrap_or_else(|| json!({})))
    }

    /// 启用分类下的商品数量和库存
    pub async fn with_products(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT c.idcategoria, c.nombre, c.descripcion, \
                 COUNT(p.codigo) AS total_productos, \
                 SUM(p.stockactual) AS stock_total, \
                 e.nombre AS estado_nombre \
                 FROM categorias c \
                 LEFT JOIN productos p ON c.idcategoria = p.idcategoria AND p.idestado = $1 \
                 LEFT JOIN estados e ON c.idestado = e.idestado \
                 WHERE c.idestado = $1 \
                 GROUP BY c.idcategoria, c.nombre, c.descripcion, e.nombre \
                 ORDER BY total_productos DESC",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }

    /// 库存价值最高的五个分类
    pub async fn top_value(&self) -> Result<Vec<JsonValue>, InventoryError> {
        self.db
            .query(
                "SELECT c.idcategoria, c.nombre, \
                 COUNT(p.codigo) AS total_productos, \
                 SUM(p.stockactual * p.precioventa) AS valor_inventario \
                 FROM categorias c \
                 LEFT JOIN productos p ON c.idcategoria = p.idcategoria AND p.idestado = $1 \
                 WHERE c.idestado = $1 \
                 GROUP BY c.idcategoria, c.nombre \
                 HAVING SUM(p.stockactual * p.precioventa) > 0 \
                 ORDER BY valor_inventario DESC \
                 LIMIT 5",
                vec![STATUS_ACTIVE.into()],
            )
            .await
    }
}
