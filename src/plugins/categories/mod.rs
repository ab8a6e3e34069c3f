// 分类插件模块

pub mod handlers;
pub mod model;
pub mod plugin;
pub mod service;

#[cfg(test)]
mod tests;

pub use model::*;
pub use plugin::*;
pub use service::*;
