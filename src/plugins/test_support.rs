// 插件测试共用的模拟数据库和令牌

use crate::config::AppConfig;
use crate::db::DatabaseManager;
use crate::kernel::{EventBus, Plugin, RouteCapability, RouteTable};
use crate::plugins::auth::{JwtConfig, JwtService};
use crate::plugins::database::DatabasePlugin;
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub type Row = BTreeMap<&'static str, Value>;

pub fn row<const N: usize>(columns: [(&'static str, Value); N]) -> Row {
    BTreeMap::from(columns)
}

pub fn now_row() -> Row {
    row([("now", Value::from("2024-01-01 00:00:00"))])
}

pub fn affected(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

pub fn mock_manager(queries: Vec<Vec<Row>>, execs: Vec<MockExecResult>) -> Arc<DatabaseManager> {
    Arc::new(DatabaseManager::from_connection(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(queries)
            .append_exec_results(execs)
            .into_connection(),
    ))
}

/// 已初始化的数据库插件，首个查询结果留给连接测试
pub async fn initialized_database(
    queries: Vec<Vec<Row>>,
    execs: Vec<MockExecResult>,
    bus: Arc<EventBus>,
) -> Arc<DatabasePlugin> {
    let mut all = vec![vec![now_row()]];
    all.extend(queries);
    let database = Arc::new(DatabasePlugin::with_manager(
        "1.0.0",
        AppConfig::default().database,
        mock_manager(all, execs),
    ));
    database.initialize(bus).await.unwrap();
    database
}

pub fn jwt() -> Arc<JwtService> {
    Arc::new(JwtService::new(
        JwtConfig::from_auth_config(&AppConfig::default().auth).unwrap(),
    ))
}

pub fn bearer(jwt: &JwtService) -> (&'static str, String) {
    let token = jwt.generate_tokens(1, "admin").unwrap().access_token;
    ("Authorization", format!("Bearer {}", token))
}

pub fn route_table(plugin: &dyn Plugin) -> RouteTable {
    match plugin.routes() {
        RouteCapability::HasRoutes(table) => table,
        RouteCapability::NoRoutes => panic!("plugin exposes no routes"),
    }
}
