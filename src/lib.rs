// 库存管理微内核
// 导出主要模块供二进制入口和测试使用

pub mod config;
pub mod db;
pub mod errors;
pub mod kernel;
pub mod logging;
pub mod plugins;
