// JWT 认证中间件
// 校验 Bearer 令牌，把认证主体放入请求扩展

use crate::errors::{ErrorResponse, InventoryError, get_request_id};
use crate::plugins::auth::{AuthenticatedUser, JwtService};
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::Header,
};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use futures::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::warn;

/// JWT 认证中间件
#[derive(Clone)]
pub struct JwtAuthMiddleware {
    jwt: Arc<JwtService>,
}

impl JwtAuthMiddleware {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            jwt: self.jwt.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    jwt: Arc<JwtService>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt = self.jwt.clone();

        Box::pin(async move {
            let verified = Authorization::<Bearer>::parse(req.request())
                .map_err(|_| InventoryError::authentication("缺少认证令牌"))
                .and_then(|auth| jwt.verify_access_token(auth.into_scheme().token()));

            match verified {
                Ok(claims) => {
                    req.extensions_mut().insert(AuthenticatedUser {
                        id: claims.sub,
                        usuario: claims.usuario,
                    });
                    let response = service.call(req).await?;
                    Ok(response.map_into_left_body())
                }
                Err(e) => {
                    warn!(path = %req.path(), error = %e, "令牌校验失败");
                    let mut body = ErrorResponse::from_error(&e);
                    if let Some(request_id) = get_request_id(req.request()) {
                        body = body.with_request_id(request_id);
                    }
                    Ok(req
                        .into_response(body.into_http_response())
                        .map_into_right_body())
                }
            }
        })
    }
}

/// 在处理函数中直接提取认证主体
impl FromRequest for AuthenticatedUser {
    type Error = InventoryError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| InventoryError::authentication("未认证")),
        )
    }
}
