// 错误处理系统测试

#[cfg(test)]
mod tests {
    use crate::errors::{ErrorHandlerMiddleware, ErrorResponse, InventoryError};
    use actix_web::{http::StatusCode, test as actix_test, web, App, HttpResponse, ResponseError};

    #[test]
    fn test_error_creation() {
        let error = InventoryError::validation("nombre", "名称不能为空");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.status_code(), 400);
        assert!(error.is_client_error());
        assert!(!error.is_server_error());
    }

    #[test]
    fn test_authorization_is_forbidden() {
        let error = InventoryError::authorization("没有访问权限");
        assert_eq!(error.error_code(), "AUTHORIZATION_ERROR");
        assert_eq!(error.status_code(), 403);
        assert!(error.is_client_error());
    }

    #[test]
    fn test_database_error() {
        let error = InventoryError::database_with_code("连接失败", "08006");
        assert_eq!(error.error_code(), "DATABASE_ERROR");
        assert_eq!(error.status_code(), 500);
        assert!(error.is_server_error());
    }

    #[test]
    fn test_dependency_not_satisfied_mentions_both_plugins() {
        let error = InventoryError::dependency_not_satisfied("products", "database");
        assert_eq!(error.error_code(), "DEPENDENCY_NOT_SATISFIED");
        let text = error.to_string();
        assert!(text.contains("products"));
        assert!(text.contains("database"));
    }

    #[test]
    fn test_error_logging() {
        assert!(!InventoryError::validation("field", "message").should_log());
        assert!(!InventoryError::authentication("凭证无效").should_log());
        assert!(InventoryError::internal("something went wrong").should_log());
    }

    #[test]
    fn test_server_errors_hide_details() {
        let error = InventoryError::database("relation \"productos\" does not exist");
        let response = ErrorResponse::from_error(&error);

        assert!(!response.success);
        assert_eq!(response.code, "DATABASE_ERROR");
        assert!(!response.message.contains("productos"));
        assert_eq!(response.status, 500);
    }

    #[test]
    fn test_client_errors_keep_message() {
        let error = InventoryError::validation("nombre", "名称不能为空");
        let response = ErrorResponse::from_error(&error);

        assert_eq!(response.message, "名称不能为空");
        assert_eq!(response.field.as_deref(), Some("nombre"));

        let error = InventoryError::not_found("产品");
        assert_eq!(ErrorResponse::from_error(&error).message, "产品未找到");
    }

    #[test]
    fn test_common_error_conversion() {
        let common_error = inventory_common::CommonError::validation("测试验证错误");
        let error: InventoryError = common_error.into();
        assert_eq!(error.error_code(), "VALIDATION_ERROR");

        let common_error = inventory_common::CommonError::configuration("缺少变量");
        let error: InventoryError = common_error.into();
        assert_eq!(error.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let error: InventoryError = json_error.into();
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_actix_status_code() {
        let error = InventoryError::authentication("令牌无效");
        assert_eq!(ResponseError::status_code(&error), StatusCode::UNAUTHORIZED);

        let error = InventoryError::timeout("插件关闭");
        assert_eq!(ResponseError::status_code(&error), StatusCode::GATEWAY_TIMEOUT);
    }

    #[actix_web::test]
    async fn test_error_response_body_is_envelope() {
        let app = actix_test::init_service(App::new().route(
            "/missing",
            web::get().to(|| async {
                Err::<HttpResponse, InventoryError>(InventoryError::not_found("分类"))
            }),
        ))
        .await;

        let req = actix_test::TestRequest::get().uri("/missing").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "分类未找到");
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_middleware_sets_request_id_header() {
        let app = actix_test::init_service(
            App::new()
                .wrap(ErrorHandlerMiddleware)
                .route("/ok", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = actix_test::TestRequest::get()
            .uri("/ok")
            .insert_header(("X-Request-ID", "req-123"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("req-123")
        );
    }
}
