// 插件模块
// 数据库、认证和各业务插件，以及产出插件族的工厂

pub mod auth;
pub mod categories;
pub mod database;
pub mod factories;
pub mod products;
pub mod routing;
pub mod suppliers;

#[cfg(test)]
mod test_support;

pub use database::*;
pub use factories::*;
pub use routing::Edition;
