//! HTTP transport to the workflow server.
//!
//! [`StationApi`] is the seam between the page controller and the network:
//! `HttpStationClient` talks to the real server, tests substitute a stub.
//! Requests are never retried; failures are logged and returned.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::order::OrderPayload;
use crate::protocol::catalog::parse_catalog;
use crate::protocol::{
    CatalogKind, CompletionEnvelope, CompletionRequest, LogRequest, LogResponse, Station,
    SubmitEnvelope,
};
use crate::station_config::ServerSettings;

/// Abstraction over the workflow server for testability.
/// Real implementation: `HttpStationClient`.
#[async_trait]
pub trait StationApi: Send + Sync {
    async fn log_sequence(
        &self,
        station: Station,
        request: &LogRequest,
    ) -> Result<LogResponse, ClientError>;

    async fn complete_task(
        &self,
        station: Station,
        request: &CompletionRequest,
    ) -> Result<CompletionEnvelope, ClientError>;

    async fn catalog(&self, kind: CatalogKind) -> Result<Vec<String>, ClientError>;

    async fn submit_order(&self, order: &OrderPayload) -> Result<SubmitEnvelope, ClientError>;
}

/// `reqwest`-backed client for one server.
#[derive(Debug, Clone)]
pub struct HttpStationClient {
    http: reqwest::Client,
    base_url: String,
    order_path: String,
    chat_id: Option<String>,
}

impl HttpStationClient {
    pub fn new(settings: &ServerSettings) -> Result<Self, ClientError> {
        reqwest::Url::parse(&settings.base_url).map_err(|e| ClientError::InvalidUrl {
            url: settings.base_url.clone(),
            message: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|source| ClientError::Transport {
                path: settings.base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            order_path: settings.order_path.clone(),
            chat_id: settings.chat_id.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// POST a JSON body and return the status and raw body text.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        query: &[(&str, &str)],
    ) -> Result<(reqwest::StatusCode, String), ClientError> {
        let resp = self
            .http
            .post(self.url(path))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|source| transport(path, source))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|source| transport(path, source))?;
        Ok((status, text))
    }
}

fn transport(path: &str, source: reqwest::Error) -> ClientError {
    warn!(path, error = %source, "request failed");
    ClientError::Transport {
        path: path.to_string(),
        source,
    }
}

fn decode<T>(path: &str, text: &str) -> Result<T, ClientError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(text).map_err(|e| {
        warn!(path, error = %e, "undecodable response");
        ClientError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        }
    })
}

fn status_error(path: &str, status: reqwest::StatusCode, body: String) -> ClientError {
    warn!(path, status = status.as_u16(), "server returned error status");
    ClientError::Status {
        path: path.to_string(),
        status: status.as_u16(),
        body,
    }
}

#[async_trait]
impl StationApi for HttpStationClient {
    async fn log_sequence(
        &self,
        station: Station,
        request: &LogRequest,
    ) -> Result<LogResponse, ClientError> {
        let path = station.log_path();
        debug!(%station, ?request, "submitting capture");
        let (status, text) = self.post_json(path, request, &[]).await?;
        if !status.is_success() {
            return Err(status_error(path, status, text));
        }
        let response: LogResponse = decode(path, &text)?;
        debug!(%station, ?response, "capture response");
        Ok(response)
    }

    async fn complete_task(
        &self,
        station: Station,
        request: &CompletionRequest,
    ) -> Result<CompletionEnvelope, ClientError> {
        let path = station.complete_path();
        debug!(%station, employee = %request.employee_sequence, "completing task");
        let (status, text) = self.post_json(path, request, &[]).await?;

        // Error statuses still carry a JSON body explaining the failure.
        match decode::<CompletionEnvelope>(path, &text) {
            Ok(mut envelope) => {
                envelope.ok &= status.is_success();
                Ok(envelope)
            }
            Err(_) if !status.is_success() => Err(status_error(path, status, text)),
            Err(e) => Err(e),
        }
    }

    async fn catalog(&self, kind: CatalogKind) -> Result<Vec<String>, ClientError> {
        let path = kind.path();
        let resp = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(|source| transport(&path, source))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|source| transport(&path, source))?;
        if !status.is_success() {
            return Err(status_error(&path, status, text));
        }
        let value: serde_json::Value = decode(&path, &text)?;
        let items = parse_catalog(value)?;
        debug!(catalog = %kind, count = items.len(), "catalog loaded");
        Ok(items)
    }

    async fn submit_order(&self, order: &OrderPayload) -> Result<SubmitEnvelope, ClientError> {
        let path = self.order_path.clone();
        let query: Vec<(&str, &str)> = self
            .chat_id
            .as_deref()
            .map(|id| vec![("chat_id", id)])
            .unwrap_or_default();
        debug!(
            mattresses = order.mattresses.len(),
            additional = order.additional_items.len(),
            "submitting order"
        );
        let (status, text) = self.post_json(&path, order, &query).await?;
        Ok(SubmitEnvelope::from_body(status.is_success(), &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(base_url: &str) -> ServerSettings {
        ServerSettings {
            base_url: base_url.to_string(),
            ..ServerSettings::default()
        }
    }

    #[test]
    fn test_url_joining() {
        let client = HttpStationClient::new(&settings("http://factory.local:8000/")).unwrap();
        assert_eq!(client.base_url(), "http://factory.local:8000");
        assert_eq!(
            client.url("/log_sequence_gluing"),
            "http://factory.local:8000/log_sequence_gluing"
        );
        assert_eq!(client.url("api/fabrics"), "http://factory.local:8000/api/fabrics");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpStationClient::new(&settings("not a url")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let client = HttpStationClient::new(&ServerSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ServerSettings::default()
        })
        .unwrap();
        let err = client
            .log_sequence(Station::Gluing, &LogRequest::sequence("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
