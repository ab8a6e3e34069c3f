// 商品插件测试

#[cfg(test)]
mod tests {
    use crate::errors::InventoryError;
    use crate::kernel::{EventBus, Plugin, events, json_config, listener};
    use crate::plugins::products::*;
    use crate::plugins::routing::Edition;
    use crate::plugins::test_support::*;
    use actix_web::{App, test as actix_test, web};
    use chrono::NaiveDate;
    use sea_orm::{MockExecResult, Value};
    use serde_json::{Value as JsonValue, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn product_row(codigo: i32, nombre: &str, stock: i32, minimo: i32) -> Row {
        row([
            ("codigo", Value::from(codigo)),
            ("nombre", Value::from(nombre)),
            ("preciocompra", Value::from(1.5f64)),
            ("precioventa", Value::from(2.25f64)),
            ("stockactual", Value::from(stock)),
            ("stockminimo", Value::from(minimo)),
            ("idestado", Value::from(1)),
        ])
    }

    fn service_with(queries: Vec<Vec<Row>>, execs: Vec<MockExecResult>) -> ProductsService {
        ProductsService::new(mock_manager(queries, execs), Arc::new(EventBus::new()))
    }

    async fn app_for(
        edition: Edition,
        queries: Vec<Vec<Row>>,
        execs: Vec<MockExecResult>,
    ) -> ProductsPlugin {
        let bus = Arc::new(EventBus::new());
        let database = initialized_database(queries, execs, bus.clone()).await;
        let plugin = ProductsPlugin::new(edition, database);
        plugin.initialize(bus).await.unwrap();
        plugin
    }

    #[test]
    fn test_provided_columns_keep_declared_order() {
        let payload: ProductPayload = serde_json::from_value(json!({
            "idestado": 2,
            "nombre": "Arroz",
            "fechavencimiento": "2025-03-01",
            "precioventa": 3.5
        }))
        .unwrap();

        let columns: Vec<&str> = payload.provided_columns().iter().map(|(c, _)| *c).collect();
        assert_eq!(columns, vec!["nombre", "precioventa", "fechavencimiento", "idestado"]);
        assert_eq!(payload.expires_on, NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn test_build_update_numbers_placeholders() {
        let columns = vec![("nombre", Value::from("Arroz")), ("stockactual", Value::from(4))];
        assert_eq!(
            build_update(&columns),
            "UPDATE productos SET nombre = $1, stockactual = $2 WHERE codigo = $3 RETURNING *"
        );
    }

    #[tokio::test]
    async fn test_create_requires_name_and_prices() {
        let service = service_with(vec![], vec![]);

        let missing_price = ProductPayload {
            name: Some("Arroz".to_string()),
            purchase_price: Some(1.0),
            ..Default::default()
        };
        let result = service.create(&missing_price).await;
        assert!(matches!(
            result,
            Err(InventoryError::Validation { ref field, .. }) if field == "precioventa"
        ));

        let result = service.create(&ProductPayload::default()).await;
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
            events::PRODUCT_CREATED,
            listener(move |payload| {
                assert_eq!(payload["codigo"], 5);
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        let service = ProductsService::new(
            mock_manager(vec![vec![product_row(5, "Arroz", 10, 2)]], vec![]),
            bus,
        );

        let payload = ProductPayload {
            name: Some("Arroz".to_string()),
            purchase_price: Some(1.5),
            sale_price: Some(2.25),
            ..Default::default()
        };
        service.create(&payload).await.unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_row() {
        let service = service_with(vec![vec![product_row(5, "Arroz", 10, 2)]], vec![]);
        let current = service.update(5, &ProductPayload::default()).await.unwrap();
        assert_eq!(current.unwrap()["nombre"], "Arroz");
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let service = service_with(vec![], vec![affected(1), affected(0)]);
        assert!(service.delete(5).await.unwrap());
        assert!(!service.delete(6).await.unwrap());
    }

    #[tokio::test]
    async fn test_expiring_rejects_non_positive_days() {
        let service = service_with(vec![], vec![]);
        assert!(matches!(
            service.expiring(0).await,
            Err(InventoryError::Validation { .. })
        ));
    }

    #[actix_web::test]
    async fn test_v1_routes() {
        let plugin = app_for(
            Edition::V1,
            vec![
                vec![product_row(3, "Leche", 1, 5)],
                vec![product_row(3, "Leche", 1, 5)],
            ],
            vec![affected(0)],
        )
        .await;
        assert_eq!(plugin.dependencies(), vec!["database".to_string()]);
        let table = route_table(&plugin);
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api/products").configure(|cfg| table(cfg))),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/products/low-stock").to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"][0]["nombre"], "Leche");

        let req = actix_test::TestRequest::put()
            .uri("/api/products/3")
            .set_json(json!({"stockactual": 1}))
            .to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = actix_test::TestRequest::delete().uri("/api/products/42").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = actix_test::TestRequest::post()
            .uri("/api/products")
            .set_json(json!({"nombre": "Pan"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = actix_test::TestRequest::get().uri("/api/products/search?q=le").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn test_low_stock_served_under_both_paths() {
        let plugin = app_for(
            Edition::V1,
            vec![
                vec![product_row(3, "Leche", 1, 5)],
                vec![product_row(3, "Leche", 1, 5)],
            ],
            vec![],
        )
        .await;
        let table = route_table(&plugin);
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api/products").configure(|cfg| table(cfg))),
        )
        .await;

        for path in ["/api/products/low-stock", "/api/products/bajo-stock"] {
            let req = actix_test::TestRequest::get().uri(path).to_request();
            let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["data"][0]["codigo"], 3, "{}", path);
        }
    }

    #[actix_web::test]
    async fn test_v2_search_and_dashboard() {
        let jwt = jwt();
        let plugin = app_for(
            Edition::V2 { jwt: jwt.clone() },
            vec![vec![product_row(3, "Leche", 1, 5)], vec![]],
            vec![],
        )
        .await;
        let table = route_table(&plugin);
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api/products").configure(|cfg| table(cfg))),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/api/products/search")
            .insert_header(bearer(&jwt))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = actix_test::TestRequest::get()
            .uri("/api/products/search?q=lec")
            .insert_header(bearer(&jwt))
            .to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let req = actix_test::TestRequest::get()
            .uri("/api/products/dashboard/expiring?days=7")
            .insert_header(bearer(&jwt))
            .to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!([]));

        let req = actix_test::TestRequest::get().uri("/api/products").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
