//! JSON pass-through methods for [`ThingsBoardClient`].
//!
//! Payloads are opaque `serde_json::Value`s; entity queries, alarms and
//! telemetry are not modelled here.
//!
//! # What this module handles:
//! - GET / POST / DELETE against any `/api/...` path
//! - Turning 404 into `None` / `false` at this boundary
//!
//! # What this module does NOT handle:
//! - Credentials (attached per attempt by the interceptor in `session.rs`)
//! - Rate-limit retries (in [`crate::endpoints::send_with_retry`])

use reqwest::Method;
use serde_json::Value;

use crate::client::ThingsBoardClient;
use crate::endpoints::{RequestLabels, send_with_retry};
use crate::error::{ClientError, Result};

impl ThingsBoardClient {
    fn url_for(&self, path: &str) -> Result<String> {
        if !path.starts_with('/') {
            return Err(ClientError::InvalidUrl(format!(
                "path must start with '/': {}",
                path
            )));
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    async fn send_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url_for(path)?;
        let mut builder = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let labels = RequestLabels {
            endpoint: path,
            method: method.as_str(),
        };
        let response = send_with_retry(
            builder,
            self.retry,
            labels,
            self.metrics.as_ref(),
            |attempt| self.authorize(attempt),
        )
        .await?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            ClientError::InvalidResponse(format!("{} returned invalid JSON: {}", path, e))
        })
    }

    /// GET `path` and return the JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] on 404; see [`get_optional`](Self::get_optional).
    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send_json(Method::GET, path, query, None).await
    }

    /// GET `path`, mapping 404 to `None`.
    pub async fn get_optional(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
        match self.get_json(path, query).await {
            Ok(value) => Ok(Some(value)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POST `body` to `path` and return the JSON response (`Null` if empty).
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.send_json(Method::POST, path, &[], Some(body)).await
    }

    /// DELETE `path`. Returns `false` if the resource did not exist.
    pub async fn delete(&self, path: &str) -> Result<bool> {
        match self.send_json(Method::DELETE, path, &[], None).await {
            Ok(_) => Ok(true),
            Err(ClientError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
