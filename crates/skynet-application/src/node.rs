use std::time::Duration;

use serde_json::Value;

use crate::constants::{self, http_header};
use crate::error::NodeError;
use crate::transport::{HttpRequest, NodeTransport};

/// Per-request timeout when talking to the node.
pub const NODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the local node's HTTP API.
pub struct Node {
    transport: Box<dyn NodeTransport>,
    app_id: String,
}

impl Node {
    pub fn new(transport: impl NodeTransport + 'static, app_id: impl Into<String>) -> Self {
        Self {
            transport: Box::new(transport),
            app_id: app_id.into(),
        }
    }

    /// Node at the standard socket, identified by `SKYNET_APPLICATION_ID`.
    ///
    /// # Errors
    /// Fails when the HTTP client cannot be initialised.
    #[cfg(unix)]
    pub fn from_env() -> Result<Self, NodeError> {
        let transport = crate::transport::UnixSocketTransport::new(
            constants::node_socket_path(),
            constants::NODE_HOST,
            NODE_TIMEOUT,
        )?;
        Ok(Self::new(transport, constants::app_id()))
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// POSTs `payload` (or `{}`) to `http://node/<resource>` and returns the
    /// decoded JSON reply, `Value::Null` for an empty body.
    ///
    /// # Errors
    /// Fails when the node is unreachable or answers with anything but 200;
    /// the error carries the reply's `message` field when it has one.
    pub fn call(&self, resource: &str, payload: Option<&Value>) -> Result<Value, NodeError> {
        let path = format!("/{}", resource.trim_start_matches('/'));
        let body = match payload {
            Some(payload) => serde_json::to_vec(payload)?,
            None => b"{}".to_vec(),
        };
        let request = HttpRequest::post_json(path, body)
            .header(http_header("application-id"), self.app_id.clone());
        tracing::debug!(url = %format!("http://{}{}", constants::NODE_HOST, request.path), "POST");

        let response = self.transport.send(&request)?;
        if response.status != 200 {
            let message = error_message(&response.body);
            return Err(NodeError::Status {
                status: response.status,
                message,
            });
        }
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").map(message_text))
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
