//! # HTTP JSON-RPC transport
//!
//! JSON-RPC 2.0 client for a factomd node. Every call is a `POST` to
//! `<url>/v2` through a shared [`reqwest::Client`].
//!
//! Failures below the JSON-RPC layer (connect, HTTP, bad JSON) are reported
//! as [`RpcError`]s with the standard internal/parse codes, so callers see a
//! single error type.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use factom_protocol::network::rpc::{RpcError, RpcMethod, RpcRequest, RpcResponse, RpcTransport};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC client for a single factomd node.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// `url` is the node's base URL, e.g. `http://localhost:8088`.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RpcError::internal_error(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: rpc_endpoint(url)?,
            next_id: AtomicU64::new(1),
        })
    }
}

/// `<base>/v2`, keeping any path prefix on the base URL.
fn rpc_endpoint(url: &str) -> Result<Url, RpcError> {
    let mut base = Url::parse(url)
        .map_err(|e| RpcError::internal_error(format!("invalid URL '{}': {}", url, e)))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(RpcError::internal_error(format!(
            "unsupported URL scheme '{}'",
            base.scheme()
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("v2")
        .map_err(|e| RpcError::internal_error(format!("invalid URL '{}': {}", url, e)))
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        method: RpcMethod,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);

        debug!(id, %method, endpoint = %self.endpoint, "rpc request");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::internal_error(format!("{}: {}", self.endpoint, e)))?;

        // factomd answers JSON-RPC errors with non-2xx codes and a JSON body,
        // so the status alone is not checked.
        let status = response.status();
        let response: RpcResponse = response.json().await.map_err(|e| {
            RpcError::parse_error(format!("decode {} response (HTTP {}): {}", method, status, e))
        })?;
        debug!(id, %method, ok = response.error.is_none(), "rpc response");
        response.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn endpoint_building() {
        assert_eq!(
            rpc_endpoint("http://localhost:8088").unwrap().as_str(),
            "http://localhost:8088/v2"
        );
        assert_eq!(
            rpc_endpoint("http://node.example/api/").unwrap().as_str(),
            "http://node.example/api/v2"
        );
        assert_eq!(
            rpc_endpoint("http://node.example/api").unwrap().as_str(),
            "http://node.example/api/v2"
        );
        assert_eq!(
            rpc_endpoint("https://node.example").unwrap().as_str(),
            "https://node.example/v2"
        );
        assert!(rpc_endpoint("ftp://node.example").is_err());
        assert!(rpc_endpoint("http://host:notaport").is_err());
        assert!(rpc_endpoint("node.example").is_err());
    }

    #[test]
    fn ipv6_hosts_are_supported() {
        let endpoint = rpc_endpoint("http://[::1]:8088").unwrap();
        assert_eq!(endpoint.host_str(), Some("[::1]"));
        assert_eq!(endpoint.port(), Some(8088));
        assert_eq!(endpoint.path(), "/v2");
    }

    /// Serve one JSON body over HTTP and return the request the client sent.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some((head, body)) = text.split_once("\r\n\r\n") {
                    let len: usize = head
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if body.len() >= len {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(request).unwrap()
        });
        (url, handle)
    }

    #[tokio::test]
    async fn round_trip_against_local_server() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"jsonrpc":"2.0","id":1,"result":{"rate":1000}}"#,
        )
        .await;
        let transport = HttpTransport::new(&url).unwrap();
        let result = transport
            .call(RpcMethod::EntryCreditRate, serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(result["rate"], 1000);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v2 HTTP/1.1\r\n"));
        assert!(request.contains("\"method\":\"entry-credit-rate\""));
        assert!(request.contains("\"id\":1"));
    }

    #[tokio::test]
    async fn node_error_object_is_preserved() {
        let (url, _server) = serve_once(
            "400 Bad Request",
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32011,"message":"Repeated Commit"}}"#,
        )
        .await;
        let transport = HttpTransport::new(&url).unwrap();
        let err = transport
            .call(RpcMethod::CommitEntry, serde_json::json!({ "message": "00" }))
            .await
            .unwrap_err();
        assert!(err.is_repeated_commit());
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_error() {
        let (url, _server) = serve_once("502 Bad Gateway", "upstream down").await;
        let transport = HttpTransport::new(&url).unwrap();
        let err = transport
            .call(RpcMethod::EntryCreditRate, serde_json::Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.code, -32700);
    }

    #[tokio::test]
    async fn unreachable_node_is_an_internal_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        let transport = HttpTransport::new(&url).unwrap();
        let err = transport
            .call(RpcMethod::EntryCreditRate, serde_json::Value::Null)
            .await
            .unwrap_err();
        assert_eq!(err.code, -32603);
    }

    #[test]
    fn request_ids_increase_per_instance() {
        let a = HttpTransport::new("http://localhost:1").unwrap();
        let b = HttpTransport::new("http://localhost:1").unwrap();
        assert_eq!(a.next_id.fetch_add(1, Ordering::Relaxed), 1);
        assert_eq!(a.next_id.fetch_add(1, Ordering::Relaxed), 2);
        assert_eq!(b.next_id.fetch_add(1, Ordering::Relaxed), 1);
    }
}
