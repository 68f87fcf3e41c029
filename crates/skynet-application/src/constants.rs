use std::path::PathBuf;
use std::sync::OnceLock;

pub const APP_ID_ENV: &str = "SKYNET_APPLICATION_ID";
pub const UNKNOWN_APP_ID: &str = "__unknown__";

pub const SOCKETS_DIR: &str = "/tmp/skynet/sockets";
pub const NODE_SOCKET_NAME: &str = "node.sock";
/// Host name used in request URLs; the socket path decides where they go.
pub const NODE_HOST: &str = "node";

static APP_ID: OnceLock<String> = OnceLock::new();

/// Identifier of this application, read once from `SKYNET_APPLICATION_ID`.
///
/// Falls back to `__unknown__` (developer mode) with a warning when unset.
pub fn app_id() -> &'static str {
    APP_ID.get_or_init(|| resolve_app_id(std::env::var(APP_ID_ENV).ok()))
}

pub(crate) fn resolve_app_id(raw: Option<String>) -> String {
    match raw {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            tracing::warn!(
                "the environment variable '{APP_ID_ENV}' is not set; assuming developer mode"
            );
            UNKNOWN_APP_ID.to_string()
        }
    }
}

#[must_use]
pub fn node_socket_path() -> PathBuf {
    PathBuf::from(SOCKETS_DIR).join(NODE_SOCKET_NAME)
}

/// Name of a skynet HTTP header, e.g. `x-skynet-application-id`.
#[must_use]
pub fn http_header(name: &str) -> String {
    format!("x-skynet-{name}")
}
