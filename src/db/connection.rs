// 数据库连接管理
// 处理连接池、原生 SQL 查询和事务客户端

use crate::config::DatabaseConfig;
use crate::errors::InventoryError;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    DatabaseTransaction, FromQueryResult, JsonValue, Statement, TransactionTrait, Value,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// 构造 Postgres 原生语句
fn statement(sql: &str, params: Vec<Value>) -> Statement {
    Statement::from_sql_and_values(DatabaseBackend::Postgres, sql, params)
}

/// 数据库连接管理器
///
/// 整个进程只有一个实例，由数据库插件持有，其他插件借用。
/// 断开后连接被取走，之后的查询返回 `ServiceUnavailable`
pub struct DatabaseManager {
    connection: RwLock<Option<Arc<DatabaseConnection>>>,
}

impl DatabaseManager {
    /// 按配置建立连接池
    #[instrument(skip(config), fields(host = %config.host, database = %config.name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, InventoryError> {
        let url = config.url()?;
        let mut opt = ConnectOptions::new(url.clone());

        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .sqlx_logging(false);

        info!(
            url = %Self::mask_password(&url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "连接数据库"
        );

        let connection = Database::connect(opt)
            .await
            .map_err(|e| InventoryError::database(format!("数据库连接失败: {}", e)))?;

        Ok(Self::from_connection(connection))
    }

    /// 包装已有连接
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self {
            connection: RwLock::new(Some(Arc::new(connection))),
        }
    }

    /// 当前连接，断开后返回错误
    fn connection(&self) -> Result<Arc<DatabaseConnection>, InventoryError> {
        self.connection
            .read()
            .clone()
            .ok_or_else(|| InventoryError::service_unavailable("数据库连接已关闭"))
    }

    pub fn is_connected(&self) -> bool {
        self.connection.read().is_some()
    }

    /// 执行查询并返回所有行
    pub async fn query(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Vec<JsonValue>, InventoryError> {
        debug!(sql = %sql, "执行查询");
        let connection = self.connection()?;
        Ok(JsonValue::find_by_statement(statement(sql, params))
            .all(connection.as_ref())
            .await?)
    }

    /// 执行查询并返回第一行
    pub async fn query_one(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<JsonValue>, InventoryError> {
        debug!(sql = %sql, "执行单行查询");
        let connection = self.connection()?;
        Ok(JsonValue::find_by_statement(statement(sql, params))
            .one(connection.as_ref())
            .await?)
    }

    /// 执行写语句并返回受影响行数
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, InventoryError> {
        debug!(sql = %sql, "执行语句");
        let connection = self.connection()?;
        let result = connection.execute(statement(sql, params)).await?;
        Ok(result.rows_affected())
    }

    /// 获取事务客户端，获取时即开始事务
    pub async fn get_client(&self) -> Result<DatabaseClient, InventoryError> {
        let transaction = self
            .connection()?
            .begin()
            .await
            .map_err(|e| InventoryError::database(format!("开启事务失败: {}", e)))?;

        Ok(DatabaseClient { transaction })
    }

    /// 检查连接是否可用
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> bool {
        match self.query_one("SELECT NOW() AS now", Vec::new()).await {
            Ok(Some(_)) => {
                info!("数据库连接测试通过");
                true
            }
            Ok(None) => {
                warn!("数据库连接测试未返回结果");
                false
            }
            Err(e) => {
                error!(error = %e, "数据库连接测试失败");
                false
            }
        }
    }

    /// 关闭连接池，重复调用无副作用
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> Result<(), InventoryError> {
        let Some(connection) = self.connection.write().take() else {
            debug!("数据库连接已经关闭");
            return Ok(());
        };

        info!("关闭数据库连接");
        match Arc::try_unwrap(connection) {
            Ok(connection) => connection
                .close()
                .await
                .map_err(|e| InventoryError::database(format!("关闭数据库连接失败: {}", e)))?,
            // 仍有进行中的查询持有连接，最后一个持有者释放时连接池随之关闭
            Err(_) => warn!("仍有查询在使用连接，连接池将在查询结束后释放"),
        }

        info!("数据库连接已关闭");
        Ok(())
    }

    /// 屏蔽密码信息用于日志记录
    pub fn mask_password(url: &str) -> String {
        if let Ok(mut parsed_url) = url::Url::parse(url) {
            if parsed_url.password().is_some() {
                let _ = parsed_url.set_password(Some("***"));
            }
            parsed_url.to_string()
        } else {
            "***".to_string()
        }
    }
}

/// 事务客户端
///
/// 未提交即被丢弃时事务回滚，连接归还连接池
pub struct DatabaseClient {
    transaction: DatabaseTransaction,
}

impl DatabaseClient {
    /// 在事务内查询
    pub async fn query(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Vec<JsonValue>, InventoryError> {
        Ok(JsonValue::find_by_statement(statement(sql, params))
            .all(&self.transaction)
            .await?)
    }

    /// 在事务内执行写语句
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64, InventoryError> {
        let result = self.transaction.execute(statement(sql, params)).await?;
        Ok(result.rows_affected())
    }

    /// 提交事务
    pub async fn commit(self) -> Result<(), InventoryError> {
        self.transaction
            .commit()
            .await
            .map_err(|e| InventoryError::database(format!("提交事务失败: {}", e)))
    }

    /// 回滚事务
    pub async fn rollback(self) -> Result<(), InventoryError> {
        self.transaction
            .rollback()
            .await
            .map_err(|e| InventoryError::database(format!("回滚事务失败: {}", e)))
    }
}
