// 供应商请求体

use serde::{Deserialize, Serialize};

/// 创建或更新供应商的请求体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierPayload {
    #[serde(rename = "nombreempresa", alias = "company_name")]
    pub company_name: Option<String>,
    #[serde(rename = "nombreceo", alias = "ceo_name")]
    pub ceo_name: Option<String>,
    #[serde(rename = "telefono", alias = "phone")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "direccion", alias = "address")]
    pub address: Option<String>,
    #[serde(rename = "idestado", alias = "status_id")]
    pub status_id: Option<i32>,
}
