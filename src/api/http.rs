use crate::api::{ApiRequest, ApiResponse, Method, Transport, TransportError};
use crate::config::ClientConfig;
use crate::error::{KanbanError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// `reqwest`-backed transport against the configured API base URL
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| KanbanError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Request(err.to_string())
    } else {
        TransportError::Unreachable(err.to_string())
    }
}

fn parse_body(text: String) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);
        debug!(method = %request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let body = match response.text().await {
            Ok(text) => parse_body(text),
            // The status line arrived, so an error status is still a rejection
            Err(e) if !status.is_success() => {
                debug!(status = status.as_u16(), %url, "unreadable error body: {}", e);
                None
            }
            Err(e) => return Err(classify(e)),
        };

        debug!(status = status.as_u16(), %url, "received response");

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(api_url: &str) -> HttpTransport {
        let config = ClientConfig {
            api_url: api_url.to_string(),
            ..ClientConfig::default()
        };
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let t = transport("http://localhost:8000/");
        assert_eq!(
            t.url("/api/kanban/boards/"),
            "http://localhost:8000/api/kanban/boards/"
        );
        assert_eq!(t.url("api/token/"), "http://localhost:8000/api/token/");
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(String::new()), None);
        assert_eq!(
            parse_body(r#"{"a":1}"#.to_string()),
            Some(serde_json::json!({ "a": 1 }))
        );
        assert_eq!(
            parse_body("Bad Gateway".to_string()),
            Some(Value::String("Bad Gateway".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Port 9 (discard) on localhost refuses connections in test environments
        let t = transport("http://127.0.0.1:9");
        let err = t
            .send(ApiRequest::get("/api/kanban/boards/"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Unreachable(_)));
    }

    /// Serves one response with a truncated body and closes the connection
    async fn truncated_server(status_line: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("{}\r\nContent-Length: 100\r\n\r\n{{\"det", status_line);
            let _ = socket.write_all(response.as_bytes()).await;
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_still_rejected() {
        let t = transport(&truncated_server("HTTP/1.1 500 Internal Server Error").await);
        let err = t
            .send(ApiRequest::get("/api/kanban/boards/"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TransportError::Rejected {
                status: 500,
                body: None
            }
        );
    }

    #[tokio::test]
    async fn test_unreadable_success_body_is_unreachable() {
        let t = transport(&truncated_server("HTTP/1.1 200 OK").await);
        let err = t
            .send(ApiRequest::get("/api/kanban/boards/"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_malformed_url_is_request_error() {
        let t = transport("not a url");
        let err = t
            .send(ApiRequest::get("/api/kanban/boards/"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
    }
}
