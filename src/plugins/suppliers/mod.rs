// 供应商插件模块

pub mod handlers;
pub mod model;
pub mod plugin;
pub mod service;


pub use model::*;
pub use plugin::*;
pub use service::*;
