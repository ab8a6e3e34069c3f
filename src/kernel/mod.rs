// 微内核模块
// 事件总线、插件接口、插件抽象工厂、HTTP 层和内核本身

pub mod event_bus;
pub mod factory;
pub mod http;
pub mod microkernel;
pub mod plugin;


pub use event_bus::*;
pub use factory::*;
pub use http::*;
pub use microkernel::*;
pub use plugin::*;
