// 数据库模块
// 包含连接池管理、原生 SQL 查询和事务客户端

pub mod connection;


pub use connection::*;
