//! Client library for applications running under a skynet node.
//!
//! Applications declare publisher and subscriber services, expose them to the
//! local node over its Unix socket, and consume subscriber data one value at a
//! time or joined across several services with a [`Synchronizer`].

#![deny(clippy::all)]

mod application;
mod buffer;
mod constants;
mod error;
mod logging;
mod misc;
mod node;
mod service;
mod sync;
mod transport;
mod types;

pub use application::Application;
pub use buffer::Buffer;
pub use constants::{
    app_id, http_header, node_socket_path, APP_ID_ENV, NODE_HOST, NODE_SOCKET_NAME,
    SOCKETS_DIR, UNKNOWN_APP_ID,
};
pub use error::{ApplicationError, NodeError};
pub use logging::init_logging;
pub use misc::{make_id, pretty};
pub use node::{Node, NODE_TIMEOUT};
pub use service::{PubService, Service, SubService};
pub use sync::{join, join_messages, Messages, Synchronizer, Values};
pub use transport::{HttpRequest, HttpResponse, NodeTransport};
#[cfg(unix)]
pub use transport::UnixSocketTransport;
pub use types::{DataType, Message, ServiceDescriptor, ServiceType};
