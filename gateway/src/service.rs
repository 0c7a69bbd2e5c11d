use crate::errors::GatewayError;
use crate::router::{GatewayBody, Router};
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::{Request, Response};
use std::pin::Pin;

/// Hyper service for the gateway; all request logic lives in the router.
pub struct GatewayService {
    router: Router,
}

impl GatewayService {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl Service<Request<Incoming>> for GatewayService {
    type Response = Response<GatewayBody>;
    type Error = GatewayError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let router = self.router.clone();
        Box::pin(async move { Ok(router.dispatch(req).await) })
    }
}
