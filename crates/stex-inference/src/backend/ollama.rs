//! Ollama chat backend speaking HTTP to a local server.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::InferenceError;
use crate::message::{ChatMessage, ChatRequest};
use crate::{ChatBackend, Result};

/// Port an Ollama server listens on by default.
pub const DEFAULT_PORT: u16 = 11434;

/// Backend posting chat requests to an Ollama server's `/api/chat` endpoint.
///
/// Responses are always requested non-streaming; the assistant content
/// arrives in one piece under `message.content`.
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Request body as `/api/chat` expects it.
#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a Value>,
    stream: bool,
}

fn wire_body(request: &ChatRequest) -> ApiRequest<'_> {
    ApiRequest {
        model: &request.model,
        messages: &request.messages,
        format: request.format.as_ref(),
        stream: false,
    }
}

impl OllamaBackend {
    /// Create a backend for the server at `host:port`.
    ///
    /// The timeout bounds the whole request, which for large statements on
    /// small hardware can legitimately run minutes.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Unexpected(e.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("http://{host}:{port}"),
        })
    }

    /// Endpoint chat requests are posted to.
    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

#[async_trait]
impl ChatBackend for OllamaBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let url = self.chat_url();
        debug!("Posting chat request for model '{}' to {}", request.model, url);

        let response = self
            .client
            .post(&url)
            .json(&wire_body(request))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Ollama returned HTTP {status}: {detail}");
            return Err(InferenceError::Unexpected(format!(
                "Ollama returned HTTP {status}"
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout
            } else {
                InferenceError::Unexpected(format!("failed to decode chat response: {e}"))
            }
        })?;

        content_from_body(&body)
    }
}

/// Map a transport-level failure onto the error taxonomy.
fn classify_transport(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else if err.is_connect() {
        InferenceError::Connection(err.to_string())
    } else {
        InferenceError::Unexpected(err.to_string())
    }
}

/// Pull `message.content` out of a chat response body.
fn content_from_body(body: &Value) -> Result<String> {
    body.get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| InferenceError::MalformedResponse("missing message.content".to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    #[test]
    fn wire_body_matches_chat_contract() {
        let request = ChatRequest::new(
            "phi4",
            vec![ChatMessage::system("rules"), ChatMessage::user("text")],
        )
        .with_format(json!({"type": "object"}));

        let value = serde_json::to_value(wire_body(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "phi4",
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": "text"},
                ],
                "format": {"type": "object"},
                "stream": false,
            })
        );
    }

    #[test]
    fn wire_body_omits_absent_format() {
        let request = ChatRequest::new("phi4", vec![ChatMessage::user("text")]);
        let value = serde_json::to_value(wire_body(&request)).unwrap();
        assert!(value.get("format").is_none());
        assert_eq!(value["stream"], json!(false));
    }

    #[test]
    fn content_is_read_from_message() {
        let body = json!({"message": {"role": "assistant", "content": "hello"}, "done": true});
        assert_eq!(content_from_body(&body).unwrap(), "hello");
    }

    #[test]
    fn non_string_content_is_malformed() {
        let body = json!({"message": {"role": "assistant", "content": 42}});
        let err = content_from_body(&body).unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(_)));
    }

    /// Reads one HTTP request off the socket, headers and body.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_lowercase();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let body_len = text
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + body_len {
                    return;
                }
            }
        }
    }

    /// Serves exactly one request with a canned response, returning the port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        port
    }

    fn sample_request() -> ChatRequest {
        ChatRequest::new("phi4", vec![ChatMessage::user("statement text")])
    }

    #[tokio::test]
    async fn chat_returns_assistant_content() {
        let port = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"model":"phi4","message":{"role":"assistant","content":"{\"transactions\":[]}"},"done":true}"#,
        )
        .await;
        let backend = OllamaBackend::new("127.0.0.1", port, Duration::from_secs(5)).unwrap();

        let content = backend.chat(&sample_request()).await.unwrap();
        assert_eq!(content, r#"{"transactions":[]}"#);
    }

    #[tokio::test]
    async fn http_error_status_is_unexpected() {
        let port = serve_once("HTTP/1.1 500 Internal Server Error", "{}").await;
        let backend = OllamaBackend::new("127.0.0.1", port, Duration::from_secs(5)).unwrap();

        let err = backend.chat(&sample_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Unexpected(_)));
    }

    #[tokio::test]
    async fn missing_message_is_malformed() {
        let port = serve_once("HTTP/1.1 200 OK", r#"{"done":true}"#).await;
        let backend = OllamaBackend::new("127.0.0.1", port, Duration::from_secs(5)).unwrap();

        let err = backend.chat(&sample_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn undecodable_body_is_unexpected() {
        let port = serve_once("HTTP/1.1 200 OK", "not json at all").await;
        let backend = OllamaBackend::new("127.0.0.1", port, Duration::from_secs(5)).unwrap();

        let err = backend.chat(&sample_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Unexpected(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_classified() {
        // Bind then drop to get a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let backend = OllamaBackend::new("127.0.0.1", port, Duration::from_secs(2)).unwrap();
        let err = backend.chat(&sample_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Connection(_)));
    }

    #[tokio::test]
    async fn stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let backend = OllamaBackend::new("127.0.0.1", port, Duration::from_millis(250)).unwrap();
        let err = backend.chat(&sample_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Timeout));
    }
}
