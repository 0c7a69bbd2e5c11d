use crate::errors::StartupError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

/// The normalized event passed to a handler.
///
/// Built once per request, immutable, and discarded after the handler
/// returns. `body` is the JSON serialization of the string-normalized
/// payload; `headers` carries the original inbound headers in arrival order.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub body: String,
    pub headers: IndexMap<String, String>,
}

/// Per-invocation context. Carries nothing today; the contract reserves the
/// slot so handlers keep a stable signature.
#[derive(Clone, Copy, Debug, Default)]
pub struct Context {}

/// What a handler hands back. Either field may be absent; the gateway
/// defaults the status to 200 and the body to empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl HandlerResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            body: Some(body.into()),
        }
    }
}

/// A failure raised by a handler. The message is surfaced to the caller in
/// the 500 response body.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct HandlerError(String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// An externally supplied computation invoked by the gateway.
///
/// Handlers are opaque: the gateway guarantees a normalized event in and
/// translates the status/body pair (or failure) out. No timeout is imposed
/// on `handle`; a hung handler occupies its request slot until it resolves.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(
        &self,
        event: Envelope,
        context: Context,
    ) -> Result<HandlerResponse, HandlerError>;
}

/// Adapts a plain async function to [`EventHandler`], so the composition
/// root can register closures without a dedicated type per route.
pub struct FnHandler<F> {
    name: &'static str,
    func: F,
}

impl<F, Fut> FnHandler<F>
where
    F: Fn(Envelope, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HandlerResponse, HandlerError>> + Send + 'static,
{
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Envelope, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HandlerResponse, HandlerError>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn handle(
        &self,
        event: Envelope,
        context: Context,
    ) -> Result<HandlerResponse, HandlerError> {
        (self.func)(event, context).await
    }
}

/// A module-like record exposing a handler under a member name. Legacy
/// integrations export their callable as `handler` or `default` instead of
/// handing it over directly.
#[derive(Default)]
pub struct HandlerModule {
    pub handler: Option<Arc<dyn EventHandler>>,
    pub default: Option<Arc<dyn EventHandler>>,
}

/// An externally supplied handler reference in any of its supported shapes.
pub enum HandlerExport {
    /// The handler itself.
    Callable(Arc<dyn EventHandler>),
    /// A record carrying the handler under `handler` or `default`.
    Module(HandlerModule),
}

impl HandlerExport {
    /// Resolves the export to a single callable, trying the bare reference,
    /// then the `handler` member, then the `default` member.
    ///
    /// Resolution happens once at startup and fails fast: a route must never
    /// reach the accept loop with nothing invocable behind it.
    pub fn resolve(self, route: &str) -> Result<Arc<dyn EventHandler>, StartupError> {
        match self {
            HandlerExport::Callable(handler) => Ok(handler),
            HandlerExport::Module(module) => module
                .handler
                .or(module.default)
                .ok_or_else(|| StartupError::UnresolvableHandler(route.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &'static str) -> Arc<dyn EventHandler> {
        Arc::new(FnHandler::new(name, |_event, _context| async {
            Ok(HandlerResponse::ok(""))
        }))
    }

    #[test]
    fn test_bare_callable_resolves_to_itself() {
        let resolved = HandlerExport::Callable(named("bare")).resolve("check").unwrap();
        assert_eq!(resolved.name(), "bare");
    }

    #[test]
    fn test_handler_member_wins_over_default() {
        let export = HandlerExport::Module(HandlerModule {
            handler: Some(named("named-member")),
            default: Some(named("default-member")),
        });
        let resolved = export.resolve("check").unwrap();
        assert_eq!(resolved.name(), "named-member");
    }

    #[test]
    fn test_default_member_is_the_fallback() {
        let export = HandlerExport::Module(HandlerModule {
            handler: None,
            default: Some(named("default-member")),
        });
        let resolved = export.resolve("check").unwrap();
        assert_eq!(resolved.name(), "default-member");
    }

    #[test]
    fn test_empty_module_fails_resolution() {
        let export = HandlerExport::Module(HandlerModule::default());
        let err = export.resolve("identify-duplicates").err().unwrap();
        assert!(matches!(
            err,
            StartupError::UnresolvableHandler(route) if route == "identify-duplicates"
        ));
    }

    #[tokio::test]
    async fn test_fn_handler_invokes_the_closure() {
        let handler = FnHandler::new("echo", |event: Envelope, _context| async move {
            Ok(HandlerResponse::with_status(207, event.body))
        });

        let event = Envelope {
            body: r#"{"a":"1"}"#.to_string(),
            headers: IndexMap::new(),
        };
        let response = handler.handle(event, Context::default()).await.unwrap();
        assert_eq!(response.status_code, Some(207));
        assert_eq!(response.body.as_deref(), Some(r#"{"a":"1"}"#));
    }

    #[test]
    fn test_response_serialization_matches_the_wire_contract() {
        let response = HandlerResponse::with_status(200, "done");
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"statusCode":200,"body":"done"}"#
        );

        // Both fields are optional on the way back in.
        let parsed: HandlerResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, HandlerResponse::default());
    }
}
