// 认证插件模块
// 策略/校验器工厂、JWT 服务、认证服务、中间件和插件本身

pub mod factory;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod plugin;
pub mod service;
pub mod strategy;
pub mod types;
pub mod validator;

#[cfg(test)]
mod tests;

pub use factory::*;
pub use jwt::*;
pub use middleware::*;
pub use plugin::*;
pub use service::*;
pub use strategy::*;
pub use types::*;
pub use validator::*;
