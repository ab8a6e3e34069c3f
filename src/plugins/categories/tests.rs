// 分类插件测试

#[cfg(test)]
mod tests {
    use crate::errors::InventoryError;
    use crate::kernel::{EventBus, Plugin, events, json_config, listener};
    use crate::plugins::categories::*;
    use crate::plugins::routing::Edition;
    use crate::plugins::test_support::*;
    use actix_web::{App, test as actix_test, web};
    use sea_orm::{MockExecResult, Value};
    use serde_json::{Value as JsonValue, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn category_row(id: i32, nombre: &str) -> Row {
        row([
            ("idcategoria", Value::from(id)),
            ("nombre", Value::from(nombre)),
            ("descripcion", Value::from("Bebidas frías")),
            ("idestado", Value::from(1)),
        ])
    }

    async fn service_with(
        queries: Vec<Vec<Row>>,
        execs: Vec<MockExecResult>,
        bus: Arc<EventBus>,
    ) -> CategoriesService {
        CategoriesService::new(mock_manager(queries, execs), bus)
    }

    async fn initialized_plugin(
        edition: Edition,
        queries: Vec<Vec<Row>>,
        execs: Vec<MockExecResult>,
    ) -> CategoriesPlugin {
        let bus = Arc::new(EventBus::new());
        let database = initialized_database(queries, execs, bus.clone()).await;
        let plugin = CategoriesPlugin::new(edition, database);
        plugin.initialize(bus).await.unwrap();
        plugin
    }

    #[test]
    fn test_payload_accepts_both_field_names() {
        let spanish: CategoryPayload =
            serde_json::from_value(json!({"nombre": "Lácteos", "idestado": 2})).unwrap();
        let english: CategoryPayload =
            serde_json::from_value(json!({"name": "Lácteos", "status_id": 2})).unwrap();

        assert_eq!(spanish, english);
        assert_eq!(spanish.description, None);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let service = service_with(vec![], vec![], Arc::new(EventBus::new())).await;
        let payload = CategoryPayload {
            name: Some("   ".to_string()),
            ..Default::default()
        };

        let result = service.create(&payload).await;
        assert!(matches!(
            result,
            Err(InventoryError::Validation { ref field, .. }) if field == "nombre"
        ));
    }

    #[tokio::test]
    async fn test_create_emits_event() {
        let bus = Arc::new(EventBus::new());
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        bus.on(
            events::CATEGORY_CREATED,
            listener(move |payload| {
                assert_eq!(payload["nombre"], "Bebidas");
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        let service = service_with(vec![vec![category_row(7, "Bebidas")]], vec![], bus).await;
        let payload = CategoryPayload {
            name: Some("Bebidas".to_string()),
            ..Default::default()
        };

        let row = service.create(&payload).await.unwrap();
        assert_eq!(row["idcategoria"], 7);
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_category_returns_none() {
        let service = service_with(vec![vec![]], vec![], Arc::new(EventBus::new())).await;
        let updated = service.update(99, &CategoryPayload::default()).await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_delete_commits_only_when_category_exists() {
        let service = service_with(
            vec![],
            vec![affected(3), affected(1)],
            Arc::new(EventBus::new()),
        )
        .await;
        assert!(service.delete(1).await.unwrap());

        let service = service_with(
            vec![],
            vec![affected(0), affected(0)],
            Arc::new(EventBus::new()),
        )
        .await;
        assert!(!service.delete(404).await.unwrap());
    }

    #[tokio::test]
    async fn test_stats_defaults_to_empty_object() {
        let service = service_with(vec![vec![]], vec![], Arc::new(EventBus::new())).await;
        assert_eq!(service.stats().await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_editions_differ_in_version_and_dependencies() {
        let v1 = initialized_plugin(Edition::V1, vec![], vec![]).await;
        let v2 = initialized_plugin(Edition::V2 { jwt: jwt() }, vec![], vec![]).await;

        assert_eq!(v1.name(), CATEGORIES_PLUGIN_NAME);
        assert_eq!(v1.version(), "1.0.0");
        assert_eq!(v1.dependencies(), vec!["database".to_string()]);
        assert_eq!(v2.version(), "2.0.0");
        assert_eq!(
            v2.dependencies(),
            vec!["database".to_string(), "auth".to_string()]
        );
    }

    #[actix_web::test]
    async fn test_v1_crud_endpoints() {
        let plugin = initialized_plugin(
            Edition::V1,
            vec![
                vec![category_row(2, "Snacks"), category_row(1, "Bebidas")],
                vec![],
                vec![category_row(3, "Limpieza")],
            ],
            vec![affected(0), affected(1)],
        )
        .await;
        let table = route_table(&plugin);
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api/categories").configure(|cfg| table(cfg))),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/categories").to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let req = actix_test::TestRequest::get().uri("/api/categories/99").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
        let body: JsonValue = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);

        let req = actix_test::TestRequest::post()
            .uri("/api/categories")
            .set_json(json!({"descripcion": "sin nombre"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = actix_test::TestRequest::post()
            .uri("/api/categories")
            .set_json(json!({"nombre": "Limpieza"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let body: JsonValue = actix_test::read_body_json(resp).await;
        assert_eq!(body["data"]["nombre"], "Limpieza");

        let req = actix_test::TestRequest::delete().uri("/api/categories/3").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // V1 没有仪表盘路由
        let req = actix_test::TestRequest::get()
            .uri("/api/categories/dashboard/stats")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_v2_routes_require_token() {
        let jwt = jwt();
        let stats = row([
            ("total_categorias", Value::from(4i64)),
            ("activas", Value::from(3i64)),
            ("inactivas", Value::from(1i64)),
        ]);
        let plugin = initialized_plugin(
            Edition::V2 { jwt: jwt.clone() },
            vec![vec![stats]],
            vec![],
        )
        .await;
        let table = route_table(&plugin);
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api/categories").configure(|cfg| table(cfg))),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/categories/dashboard/stats")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = actix_test::TestRequest::get()
            .uri("/api/categories/dashboard/stats")
            .insert_header(bearer(&jwt))
            .to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["total_categorias"], 4);
        assert_eq!(body["data"]["activas"], 3);
    }
}
