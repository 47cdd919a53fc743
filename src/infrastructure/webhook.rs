//! HTTP webhook invoker
//!
//! One bodyless POST per call, no retries. Every failure (connect error, timeout,
//! non-2xx status) is logged and returned as `WebhookOutcome::Failed`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::domain::traits::WebhookInvoker;
use crate::domain::types::WebhookOutcome;
use crate::strings::logs;

pub struct HttpWebhookInvoker {
    client: Client,
}

impl HttpWebhookInvoker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookInvoker for HttpWebhookInvoker {
    async fn invoke(&self, url: &str) -> WebhookOutcome {
        let response = match self.client.post(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("{}", logs::webhook_fail(url, &e.to_string()));
                return WebhookOutcome::Failed(e.to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::info!("Webhook {} answered {}", url, status);
            WebhookOutcome::Delivered(status.as_u16())
        } else {
            let reason = format!("HTTP status {status}");
            tracing::warn!("{}", logs::webhook_fail(url, &reason));
            WebhookOutcome::Failed(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single request with the given status line and returns the request head.
    async fn one_shot_server(status: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let response =
                format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });
        (url, handle)
    }

    fn invoker() -> HttpWebhookInvoker {
        HttpWebhookInvoker::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_success_is_delivered() {
        let (url, server) = one_shot_server("204 No Content").await;

        let outcome = invoker().invoke(&url).await;
        assert_eq!(outcome, WebhookOutcome::Delivered(204));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /hook HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_server_error_is_failure() {
        let (url, server) = one_shot_server("500 Internal Server Error").await;

        let outcome = invoker().invoke(&url).await;
        assert!(matches!(outcome, WebhookOutcome::Failed(ref r) if r.contains("500")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_failure() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = invoker().invoke(&format!("http://{addr}/hook")).await;
        assert!(matches!(outcome, WebhookOutcome::Failed(_)));
    }
}
