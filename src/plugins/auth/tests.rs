// 认证模块测试

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;
    use crate::db::DatabaseManager;
    use crate::errors::InventoryError;
    use crate::kernel::{EventBus, Plugin, RouteCapability, events, json_config, listener};
    use crate::plugins::auth::*;
    use crate::plugins::database::DatabasePlugin;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use serde_json::{Value as JsonValue, json};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Row = BTreeMap<&'static str, Value>;

    fn jwt_config() -> JwtConfig {
        JwtConfig::from_auth_config(&AppConfig::default().auth).unwrap()
    }

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(jwt_config()))
    }

    fn admin_row(id: i32, usuario: &str, contrasena: &str) -> Row {
        BTreeMap::from([
            ("idadmin", Value::from(id)),
            ("nombreapellido", Value::from("Ana Pérez")),
            ("numero", Value::from("555-0101")),
            ("usuario", Value::from(usuario)),
            ("contrasena", Value::from(contrasena)),
        ])
    }

    fn now_row() -> Row {
        BTreeMap::from([("now", Value::from("2024-01-01 00:00:00"))])
    }

    fn db_with(results: Vec<Vec<Row>>) -> Arc<DatabaseManager> {
        Arc::new(DatabaseManager::from_connection(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(results)
                .into_connection(),
        ))
    }

    fn service_with(auth_type: AuthType, results: Vec<Vec<Row>>, bus: Arc<EventBus>) -> AuthService {
        let db = db_with(results);
        let jwt = jwt();
        let components = AuthFactoryProvider::create(auth_type, db.clone(), jwt.clone());
        AuthService::new(components, db, jwt, bus)
    }

    // ---------- 类型与配置 ----------

    #[test]
    fn test_auth_type_parsing() {
        assert_eq!(" JWT ".parse::<AuthType>().unwrap(), AuthType::Jwt);
        assert_eq!("local".parse::<AuthType>().unwrap(), AuthType::Local);
        assert!(matches!(
            "oauth".parse::<AuthType>(),
            Err(InventoryError::Configuration { .. })
        ));
    }

    #[test]
    fn test_credentials_accept_english_aliases() {
        let credentials: AuthCredentials =
            serde_json::from_value(json!({"username": "admin", "password": "1234"})).unwrap();
        assert_eq!(credentials, AuthCredentials::password("admin", "1234"));
    }

    #[test]
    fn test_jwt_config_rejects_shared_secret() {
        let mut auth = AppConfig::default().auth;
        auth.jwt_refresh_secret = auth.jwt_secret.clone();
        assert!(matches!(
            JwtConfig::from_auth_config(&auth),
            Err(InventoryError::Configuration { .. })
        ));
    }

    #[test]
    fn test_jwt_config_parses_expiry() {
        let config = jwt_config();
        assert_eq!(config.access_expires_in.as_secs(), 24 * 3600);
        assert_eq!(config.refresh_expires_in.as_secs(), 7 * 86400);
        assert_eq!(config.issuer, DEFAULT_ISSUER);

        let mut auth = AppConfig::default().auth;
        auth.jwt_expires_in = "soon".to_string();
        assert!(JwtConfig::from_auth_config(&auth).is_err());
    }

    // ---------- JWT ----------

    #[test]
    fn test_generate_and_verify_tokens() {
        let jwt = jwt();
        let tokens = jwt.generate_tokens(7, "admin").unwrap();

        let access = jwt.verify_access_token(&tokens.access_token).unwrap();
        assert_eq!(access.sub, 7);
        assert_eq!(access.usuario, "admin");
        assert_eq!(access.iss, DEFAULT_ISSUER);
        assert_eq!(access.aud, DEFAULT_AUDIENCE);
        assert!(access.token_type.is_none());

        let refresh = jwt.verify_refresh_token(&tokens.refresh_token).unwrap();
        assert_eq!(refresh.token_type.as_deref(), Some(REFRESH_TOKEN_TYPE));
        assert_eq!(tokens.expires_in, 86400);
        assert_eq!(tokens.token_type, "Bearer");
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let jwt = jwt();
        let tokens = jwt.generate_tokens(1, "admin").unwrap();

        assert!(jwt.verify_access_token(&tokens.refresh_token).is_err());
        assert!(jwt.verify_refresh_token(&tokens.access_token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = jwt_config();
        let jwt = JwtService::new(config.clone());
        let past = Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: 1,
            usuario: "admin".to_string(),
            token_type: None,
            iat: past - 60,
            exp: past,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            jwt.verify_access_token(&token),
            Err(InventoryError::Authentication { .. })
        ));
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(
            JwtService::extract_token_from_header(Some("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(JwtService::extract_token_from_header(Some("Basic abc")), None);
        assert_eq!(JwtService::extract_token_from_header(Some("Bearer")), None);
        assert_eq!(JwtService::extract_token_from_header(Some("Bearer a b")), None);
        assert_eq!(JwtService::extract_token_from_header(None), None);
    }

    // ---------- 密码与校验器 ----------

    #[test]
    fn test_verify_password_hashed_and_plain() {
        let hashed = bcrypt::hash("secreto", 4).unwrap();
        assert!(verify_password("secreto", &hashed));
        assert!(!verify_password("otro", &hashed));

        assert!(verify_password("1234", "1234"));
        assert!(!verify_password("1234", "12345"));
    }

    #[test]
    fn test_local_validator_rules() {
        let validator = LocalAuthValidator;

        assert!(validator.validate(&AuthCredentials::password("admin_01", "1234")).is_valid);

        let missing = validator.validate(&AuthCredentials::default());
        assert!(!missing.is_valid);
        assert_eq!(missing.errors.len(), 2);

        let short = validator.validate(&AuthCredentials::password("ab", "123"));
        assert_eq!(short.errors.len(), 2);

        let bad_chars = validator.validate(&AuthCredentials::password("ad-min", "1234"));
        assert!(!bad_chars.is_valid);

        let too_long = validator.validate(&AuthCredentials::password("a".repeat(51), "p".repeat(101)));
        assert_eq!(too_long.errors.len(), 2);

        assert!(!validator.validate_token_format("a.b.c"));
    }

    #[test]
    fn test_jwt_validator_rules() {
        let validator = JwtAuthValidator;

        assert!(validator.validate(&AuthCredentials::password("admin", "1234")).is_valid);

        let token_only = AuthCredentials {
            token: Some("aaa.bbb.ccc".to_string()),
            ..Default::default()
        };
        assert!(validator.validate(&token_only).is_valid);

        let malformed = AuthCredentials {
            token: Some("aaa..ccc".to_string()),
            ..Default::default()
        };
        assert!(!validator.validate(&malformed).is_valid);

        let no_password = AuthCredentials {
            usuario: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(!validator.validate(&no_password).is_valid);

        assert!(!validator.validate(&AuthCredentials::default()).is_valid);
    }

    #[test]
    fn test_sanitize_trims_and_drops_empty() {
        let sanitized = LocalAuthValidator.sanitize(&AuthCredentials {
            usuario: Some("  admin ".to_string()),
            contrasena: Some(String::new()),
            token: Some("   ".to_string()),
        });

        assert_eq!(sanitized.usuario.as_deref(), Some("admin"));
        assert!(sanitized.contrasena.is_none());
        assert!(sanitized.token.is_none());
    }

    // ---------- 策略与工厂 ----------

    #[tokio::test]
    async fn test_local_strategy_authenticates_without_token() {
        let db = db_with(vec![vec![admin_row(3, "admin", "1234")]]);
        let strategy = LocalAuthStrategy::new(db);

        let result = strategy
            .authenticate(&AuthCredentials::password("admin", "1234"))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.user.unwrap().id, 3);
        assert!(result.token.is_none());
        assert!(!strategy.validate_token("anything").await);
    }

    #[tokio::test]
    async fn test_local_strategy_rejects_bad_password_and_unknown_user() {
        let db = db_with(vec![vec![admin_row(3, "admin", "1234")], vec![]]);
        let strategy = LocalAuthStrategy::new(db);

        let wrong = strategy
            .authenticate(&AuthCredentials::password("admin", "0000"))
            .await
            .unwrap();
        assert!(!wrong.success);

        let unknown = strategy
            .authenticate(&AuthCredentials::password("nadie", "1234"))
            .await
            .unwrap();
        assert!(!unknown.success);
        assert!(unknown.user.is_none());
    }

    #[tokio::test]
    async fn test_jwt_strategy_issues_verifiable_tokens() {
        let jwt = jwt();
        let db = db_with(vec![vec![admin_row(9, "gerente", "clave")]]);
        let strategy = JwtAuthStrategy::new(db, jwt.clone());

        let result = strategy
            .authenticate(&AuthCredentials::password("gerente", "clave"))
            .await
            .unwrap();

        assert!(result.success);
        let token = result.token.unwrap();
        assert!(result.refresh_token.is_some());
        assert_eq!(result.expires_in, Some(86400));
        assert!(strategy.validate_token(&token).await);
        assert_eq!(jwt.verify_access_token(&token).unwrap().sub, 9);
    }

    #[tokio::test]
    async fn test_jwt_strategy_accepts_existing_token() {
        let jwt = jwt();
        let token = jwt.generate_tokens(4, "admin").unwrap().access_token;
        let strategy = JwtAuthStrategy::new(db_with(vec![]), jwt);

        let result = strategy
            .authenticate(&AuthCredentials {
                token: Some(token),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.user.unwrap().usuario, "admin");
    }

    #[test]
    fn test_factory_provider_pairs_components() {
        let local = AuthFactoryProvider::create(AuthType::Local, db_with(vec![]), jwt());
        assert_eq!(local.auth_type, AuthType::Local);
        assert_eq!(local.strategy.name(), "local");
        assert!(!local.validator.validate_token_format("a.b.c"));

        let jwt_components = AuthFactoryProvider::create(AuthType::Jwt, db_with(vec![]), jwt());
        assert_eq!(jwt_components.strategy.name(), "jwt");
        assert!(jwt_components.validator.validate_token_format("a.b.c"));
    }

    // ---------- 认证服务 ----------

    #[tokio::test]
    async fn test_login_emits_event_on_success() {
        let bus = Arc::new(EventBus::new());
        let logins = Arc::new(AtomicUsize::new(0));
        let counter = logins.clone();
        bus.on(
            events::AUTH_LOGIN,
            listener(move |payload| {
                assert_eq!(payload["usuario"], "admin");
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        let service = service_with(AuthType::Jwt, vec![vec![admin_row(1, "admin", "1234")]], bus);
        let outcome = service
            .login(&AuthCredentials::password(" admin ", "1234"))
            .await
            .unwrap();

        assert!(matches!(outcome, LoginOutcome::Authenticated(ref r) if r.token.is_some()));
        assert_eq!(logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_validation_and_rejection() {
        let bus = Arc::new(EventBus::new());
        let service = service_with(AuthType::Local, vec![vec![]], bus);

        let invalid = service
            .login(&AuthCredentials::password("a", "1"))
            .await
            .unwrap();
        assert!(matches!(invalid, LoginOutcome::Invalid(ref v) if !v.is_valid));

        let rejected = service
            .login(&AuthCredentials::password("admin", "1234"))
            .await
            .unwrap();
        assert!(matches!(rejected, LoginOutcome::Rejected(ref r) if !r.success));
    }

    #[tokio::test]
    async fn test_set_strategy_swaps_components() {
        let bus = Arc::new(EventBus::new());
        let db = db_with(vec![vec![admin_row(1, "admin", "1234")]]);
        let service = service_with(AuthType::Jwt, vec![], bus);
        assert_eq!(service.auth_type().await, AuthType::Jwt);

        service
            .set_strategy(AuthFactoryProvider::create(AuthType::Local, db, jwt()))
            .await;
        assert_eq!(service.auth_type().await, AuthType::Local);

        let outcome = service
            .login(&AuthCredentials::password("admin", "1234"))
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Authenticated(ref r) if r.token.is_none()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_components_stay_paired_during_swaps() {
        let bus = Arc::new(EventBus::new());
        let service = Arc::new(service_with(AuthType::Jwt, vec![], bus));
        let db = db_with(vec![]);

        let swapper = {
            let service = service.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    let auth_type = if i % 2 == 0 { AuthType::Local } else { AuthType::Jwt };
                    service
                        .set_strategy(AuthFactoryProvider::create(auth_type, db.clone(), jwt()))
                        .await;
                    tokio::task::yield_now().await;
                }
            })
        };

        // 只有 JWT 校验器接受单独的令牌
        let token_only = AuthCredentials {
            token: Some("header.payload.signature".to_string()),
            ..Default::default()
        };
        for _ in 0..200 {
            let components = service.components().await;
            assert_eq!(components.strategy.name(), components.auth_type.as_str());
            assert_eq!(
                components.validator.validate(&token_only).is_valid,
                components.auth_type == AuthType::Jwt
            );
            tokio::task::yield_now().await;
        }

        swapper.await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_issues_new_pair() {
        let bus = Arc::new(EventBus::new());
        let mut admin = admin_row(5, "admin", "1234");
        admin.remove("contrasena");
        let service = service_with(AuthType::Jwt, vec![vec![admin]], bus);

        let refresh_token = jwt().generate_tokens(5, "admin").unwrap().refresh_token;
        let tokens = service.refresh(&refresh_token).await.unwrap();
        assert_eq!(service.verify(&tokens.access_token).unwrap().sub, 5);

        assert!(matches!(
            service.refresh("not-a-token").await,
            Err(InventoryError::Authentication { .. })
        ));
    }

    #[tokio::test]
    async fn test_logout_emits_event() {
        let bus = Arc::new(EventBus::new());
        let logouts = Arc::new(AtomicUsize::new(0));
        let counter = logouts.clone();
        bus.on(
            events::AUTH_LOGOUT,
            listener(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );

        let service = service_with(AuthType::Jwt, vec![], bus);
        service.logout("aaa.bbb.ccc").await;
        assert_eq!(logouts.load(Ordering::SeqCst), 1);
    }

    // ---------- 插件与 HTTP ----------

    async fn initialized_v2(results: Vec<Vec<Row>>) -> AuthPluginV2 {
        let mut all = vec![vec![now_row()]];
        all.extend(results);
        let database = Arc::new(DatabasePlugin::with_manager(
            "2.0.0",
            AppConfig::default().database,
            db_with(all),
        ));
        let bus = Arc::new(EventBus::new());
        database.initialize(bus.clone()).await.unwrap();

        let plugin = AuthPluginV2::new(database, jwt(), AuthType::Jwt);
        plugin.initialize(bus).await.unwrap();
        plugin
    }

    fn route_table(plugin: &dyn Plugin) -> crate::kernel::RouteTable {
        match plugin.routes() {
            RouteCapability::HasRoutes(table) => table,
            RouteCapability::NoRoutes => panic!("plugin exposes no routes"),
        }
    }

    #[actix_web::test]
    async fn test_v2_login_endpoint_status_codes() {
        let plugin = initialized_v2(vec![vec![admin_row(1, "admin", "1234")], vec![]]).await;
        assert_eq!(plugin.dependencies(), vec!["database".to_string()]);
        let table = route_table(&plugin);
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api/auth").configure(|cfg| table(cfg))),
        )
        .await;

        let req = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"usuario": "admin", "contrasena": "1234"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: JsonValue = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert!(body["token"].is_string());
        assert!(body["refreshToken"].is_string());

        let req = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"usuario": "admin", "contrasena": "9999"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: JsonValue = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_v2_verify_and_refresh_endpoints() {
        let plugin = initialized_v2(vec![]).await;
        let table = route_table(&plugin);
        let app = actix_test::init_service(
            App::new()
                .app_data(json_config())
                .service(web::scope("/api/auth").configure(|cfg| table(cfg))),
        )
        .await;
        let tokens = plugin.jwt().generate_tokens(2, "admin").unwrap();

        let req = actix_test::TestRequest::post()
            .uri("/api/auth/verify")
            .set_json(json!({"token": tokens.access_token}))
            .to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["valid"], true);
        assert_eq!(body["data"]["payload"]["sub"], 2);

        let req = actix_test::TestRequest::post()
            .uri("/api/auth/verify")
            .set_json(json!({"token": "a.b.c"}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let req = actix_test::TestRequest::post()
            .uri("/api/auth/refresh")
            .set_json(json!({}))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = actix_test::TestRequest::post()
            .uri("/api/auth/logout")
            .insert_header(("Authorization", format!("Bearer {}", tokens.access_token)))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn test_plugin_without_database_fails_to_initialize() {
        let database = Arc::new(DatabasePlugin::new("1.0.0", AppConfig::default().database));
        assert!(!database.is_connected());
        let plugin = AuthPluginV1::new(database, jwt());

        let result = plugin.initialize(Arc::new(EventBus::new())).await;
        assert!(matches!(result, Err(InventoryError::ServiceUnavailable { .. })));
        assert!(!plugin.routes().has_routes());
    }

    // ---------- 中间件 ----------

    async fn whoami(user: AuthenticatedUser) -> HttpResponse {
        HttpResponse::Ok().json(json!({ "usuario": user.usuario, "id": user.id }))
    }

    #[actix_web::test]
    async fn test_jwt_middleware_guards_routes() {
        let jwt = jwt();
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/api/products")
                    .wrap(JwtAuthMiddleware::new(jwt.clone()))
                    .route("", web::get().to(whoami)),
            ),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/api/products").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: JsonValue = actix_test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "AUTHENTICATION_ERROR");

        let req = actix_test::TestRequest::get()
            .uri("/api/products")
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let token = jwt.generate_tokens(11, "admin").unwrap().access_token;
        let req = actix_test::TestRequest::get()
            .uri("/api/products")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: JsonValue = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["usuario"], "admin");
        assert_eq!(body["id"], 11);
    }
}
