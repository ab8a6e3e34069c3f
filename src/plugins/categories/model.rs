// 分类请求体

use serde::{Deserialize, Serialize};

/// 创建或更新分类的请求体
///
/// 字段名沿用数据库列名，同时接受英文别名
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryPayload {
    #[serde(rename = "nombre", alias = "name")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", alias = "description")]
    pub description: Option<String>,
    #[serde(rename = "idestado", alias = "status_id")]
    pub status_id: Option<i32>,
}
