//! Request logging middleware for the Perigon client.

use std::time::Instant;

use axum::http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

/// Logs method, path, status and latency of every outbound call.
///
/// Query strings are left out of the log line; they carry user search text.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

#[async_trait::async_trait]
impl Middleware for RequestLogger {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let method = req.method().clone();
        let path = req.url().path().to_string();
        let started = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed_ms = started.elapsed().as_millis();

        match &result {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    tracing::debug!(%method, %path, status, elapsed_ms, "Perigon API call");
                } else {
                    tracing::warn!(%method, %path, status, elapsed_ms, "Perigon API call failed");
                }
            }
            Err(err) => {
                tracing::warn!(%method, %path, elapsed_ms, error = %err, "Perigon API unreachable");
            }
        }

        result
    }
}
