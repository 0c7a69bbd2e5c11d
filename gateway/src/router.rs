use crate::auth::{AuthOutcome, authenticate};
use crate::coerce::coerce_to_strings;
use crate::config::Config;
use crate::errors::GatewayError;
use crate::handler::{Context, Envelope, EventHandler};
use crate::metrics_defs;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Bytes;
use hyper::header::AUTHORIZATION;
use hyper::{Method, Request, Response, StatusCode};
use indexmap::IndexMap;
use serde_json::Value;
use shared::http::{make_error_response, make_text_response};
use shared::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;

/// Response body type produced at the route boundary
pub type GatewayBody = BoxBody<Bytes, GatewayError>;

/// What a matched route does with the request.
enum RouteAction {
    /// Liveness probe; bypasses parsing, authentication, and normalization.
    Health,
    /// Plain-text status line listing the served routes.
    Status,
    /// The authenticated parse/normalize/invoke cycle.
    Invoke(Arc<dyn EventHandler>),
}

struct Route {
    method: Method,
    path: &'static str,
    action: RouteAction,
}

struct RouterInner {
    routes: Vec<Route>,
    auth_token: Option<String>,
    max_body_bytes: usize,
}

/// Router that matches incoming requests against the gateway's route table
/// and runs the request-boundary cycle for handler routes.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    /// Builds the route table. Handlers are already resolved; the table is
    /// immutable for the life of the process.
    pub fn new(
        config: &Config,
        check: Arc<dyn EventHandler>,
        identify_duplicates: Arc<dyn EventHandler>,
    ) -> Self {
        let routes = vec![
            Route {
                method: Method::GET,
                path: "/health",
                action: RouteAction::Health,
            },
            Route {
                method: Method::GET,
                path: "/",
                action: RouteAction::Status,
            },
            Route {
                method: Method::POST,
                path: "/v1/check",
                action: RouteAction::Invoke(check),
            },
            Route {
                method: Method::POST,
                path: "/v1/identify-duplicates",
                action: RouteAction::Invoke(identify_duplicates),
            },
        ];

        Self {
            inner: Arc::new(RouterInner {
                routes,
                auth_token: config.auth_token.clone(),
                max_body_bytes: config.max_body_bytes,
            }),
        }
    }

    /// Routes one request to completion. Every path through here produces
    /// exactly one complete response; failures never escape the boundary.
    pub async fn dispatch<B>(&self, req: Request<B>) -> Response<GatewayBody>
    where
        B: hyper::body::Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let started = Instant::now();

        let response = match self.find_matching_route(&method, &path) {
            Some(action) => self.handle_action(action, req).await,
            None => {
                tracing::warn!(method = %method, path = %path, "No route matched");
                let status = if self.inner.routes.iter().any(|route| route.path == path) {
                    StatusCode::METHOD_NOT_ALLOWED
                } else {
                    StatusCode::NOT_FOUND
                };
                make_error_response(status)
            }
        };

        counter!(
            metrics_defs::REQUESTS,
            "route" => path.clone(),
            "status" => response.status().as_u16().to_string()
        )
        .increment(1);
        histogram!(metrics_defs::REQUEST_DURATION, "route" => path)
            .record(started.elapsed().as_secs_f64());

        response
    }

    fn find_matching_route(&self, method: &Method, path: &str) -> Option<&RouteAction> {
        self.inner
            .routes
            .iter()
            .find(|route| route.path == path && route.method == *method)
            .map(|route| &route.action)
    }

    async fn handle_action<B>(&self, action: &RouteAction, req: Request<B>) -> Response<GatewayBody>
    where
        B: hyper::body::Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        match action {
            RouteAction::Health => make_text_response(StatusCode::OK, "ok"),
            RouteAction::Status => make_text_response(StatusCode::OK, &self.status_line()),
            RouteAction::Invoke(handler) => {
                match self.invoke(handler.as_ref(), req).await {
                    Ok(response) => response,
                    Err(e) => {
                        if e.status().is_server_error() {
                            tracing::error!(handler = handler.name(), error = %e, "Request failed");
                        } else {
                            tracing::debug!(handler = handler.name(), error = %e, "Request rejected");
                        }
                        e.into_response()
                    }
                }
            }
        }
    }

    /// The request-boundary cycle: bounded read and parse, authenticate,
    /// normalize, invoke, respond. Order matters: malformed input is
    /// rejected before authentication, and nothing reaches the handler
    /// without passing both.
    async fn invoke<B>(
        &self,
        handler: &dyn EventHandler,
        req: Request<B>,
    ) -> Result<Response<GatewayBody>, GatewayError>
    where
        B: hyper::body::Body + Send + 'static,
        B::Data: Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();

        let bytes = Limited::new(body, self.inner.max_body_bytes)
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    GatewayError::BodyTooLarge
                } else {
                    GatewayError::RequestBodyError(e.to_string())
                }
            })?;

        let parsed: Value = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::MalformedBody(e.to_string()))?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        match authenticate(auth_header, self.inner.auth_token.as_deref()) {
            AuthOutcome::Authorized => {}
            AuthOutcome::MissingServerSecret => return Err(GatewayError::MissingServerSecret),
            AuthOutcome::Unauthorized => {
                counter!(metrics_defs::AUTH_FAILURES).increment(1);
                return Err(GatewayError::Unauthorized);
            }
        }

        let normalized = coerce_to_strings(parsed);

        let headers: IndexMap<String, String> = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let event = Envelope {
            body: serde_json::to_string(&normalized)
                .map_err(|e| GatewayError::Internal(e.to_string()))?,
            headers,
        };

        let result = handler
            .handle(event, Context::default())
            .await
            .map_err(|e| GatewayError::HandlerFailed(e.to_string()))?;

        let status = match result.status_code {
            Some(code) => StatusCode::from_u16(code).map_err(|_| {
                GatewayError::HandlerFailed(format!("handler returned invalid status code {code}"))
            })?,
            None => StatusCode::OK,
        };
        Ok(make_text_response(status, result.body.as_deref().unwrap_or("")))
    }

    fn status_line(&self) -> String {
        let mut line = String::from("turnstile gateway\nroutes:\n");
        for route in &self.inner.routes {
            line.push_str(&format!("  {} {}\n", route.method, route.path));
        }
        line
    }
}
