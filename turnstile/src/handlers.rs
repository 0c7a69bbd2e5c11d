//! Stand-in integrations for the two gateway computations.
//!
//! The real `check` and `identify-duplicates` computations are deployed as
//! separate artifacts and registered here at the composition root. Until
//! they are wired in, these stand-ins honor the same contract (normalized
//! event in, status/body out) so deploys can be smoke-tested end to end.

use async_trait::async_trait;
use gateway::{Context, Envelope, EventHandler, HandlerError, HandlerResponse};

pub struct CheckHandler;

#[async_trait]
impl EventHandler for CheckHandler {
    fn name(&self) -> &'static str {
        "check"
    }

    async fn handle(
        &self,
        event: Envelope,
        _context: Context,
    ) -> Result<HandlerResponse, HandlerError> {
        let payload: serde_json::Value =
            serde_json::from_str(&event.body).map_err(|e| HandlerError::new(e.to_string()))?;
        let records = match &payload {
            serde_json::Value::Array(items) => items.len(),
            _ => 1,
        };

        tracing::info!(records, "check invoked");
        Ok(HandlerResponse::ok(
            serde_json::json!({ "checked": records }).to_string(),
        ))
    }
}

pub struct IdentifyDuplicatesHandler;

#[async_trait]
impl EventHandler for IdentifyDuplicatesHandler {
    fn name(&self) -> &'static str {
        "identify-duplicates"
    }

    async fn handle(
        &self,
        event: Envelope,
        _context: Context,
    ) -> Result<HandlerResponse, HandlerError> {
        serde_json::from_str::<serde_json::Value>(&event.body)
            .map_err(|e| HandlerError::new(e.to_string()))?;

        tracing::info!("identify-duplicates invoked");
        Ok(HandlerResponse::ok(
            serde_json::json!({ "duplicates": [] }).to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn event(body: &str) -> Envelope {
        Envelope {
            body: body.to_string(),
            headers: IndexMap::new(),
        }
    }

    #[tokio::test]
    async fn test_check_counts_records() {
        let response = CheckHandler
            .handle(event(r#"[{"id":"1"},{"id":"2"}]"#), Context::default())
            .await
            .unwrap();
        assert_eq!(response.status_code, Some(200));
        assert_eq!(response.body.as_deref(), Some(r#"{"checked":2}"#));
    }

    #[tokio::test]
    async fn test_identify_duplicates_acks() {
        let response = IdentifyDuplicatesHandler
            .handle(event(r#"{"records":[]}"#), Context::default())
            .await
            .unwrap();
        assert_eq!(response.status_code, Some(200));
        assert_eq!(response.body.as_deref(), Some(r#"{"duplicates":[]}"#));
    }
}
