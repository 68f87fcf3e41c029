use reqwest::Method;

use crate::error::NodeError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Origin-form target, e.g. `/service/expose`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn post_json(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// How requests reach the node.
pub trait NodeTransport: Send + Sync {
    /// Sends `request` and returns whatever the node answered, whatever its
    /// status.
    ///
    /// # Errors
    /// Returns an error when the node cannot be reached or the exchange
    /// fails midway.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, NodeError>;
}

#[cfg(unix)]
pub use unix::UnixSocketTransport;

#[cfg(unix)]
mod unix {
    use std::error::Error as _;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use reqwest::blocking::Client;

    use super::{HttpRequest, HttpResponse, NodeTransport};
    use crate::error::NodeError;

    /// HTTP/1.1 to the node through its Unix domain socket.
    #[derive(Clone, Debug)]
    pub struct UnixSocketTransport {
        socket: PathBuf,
        host: String,
        client: Client,
    }

    impl UnixSocketTransport {
        /// # Errors
        /// Fails when the HTTP client cannot be initialised.
        pub fn new(
            socket: impl Into<PathBuf>,
            host: impl Into<String>,
            timeout: Duration,
        ) -> Result<Self, NodeError> {
            let socket = socket.into();
            let client = Client::builder()
                .unix_socket(socket.clone())
                .timeout(timeout)
                .build()?;
            Ok(Self {
                socket,
                host: host.into(),
                client,
            })
        }

        pub fn socket(&self) -> &Path {
            &self.socket
        }

        fn url(&self, path: &str) -> String {
            format!("http://{}/{}", self.host, path.trim_start_matches('/'))
        }
    }

    impl NodeTransport for UnixSocketTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, NodeError> {
            let mut builder = self
                .client
                .request(request.method.clone(), self.url(&request.path))
                .body(request.body.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder.send().map_err(|err| {
                if is_connect_failure(&err) {
                    NodeError::Connect {
                        path: self.socket.clone(),
                        source: Box::new(err),
                    }
                } else {
                    NodeError::Http(err)
                }
            })?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            let body = response.bytes()?.to_vec();
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    /// Nobody listening: the socket file is missing or refuses connections.
    fn is_connect_failure(err: &reqwest::Error) -> bool {
        if err.is_connect() {
            return true;
        }
        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io) = cause.downcast_ref::<io::Error>() {
                return matches!(
                    io.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::ConnectionRefused
                );
            }
            source = cause.source();
        }
        false
    }

}
