use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::error::ApplicationError;
use crate::node::Node;
use crate::service::{PubService, Service, SubService};
use crate::types::{DataType, ServiceDescriptor};

const EXPOSE_RESOURCE: &str = "service/expose";

/// Registry of the services this application has exposed to its node.
pub struct Application {
    node: Node,
    services: Mutex<BTreeMap<String, ServiceDescriptor>>,
}

impl Application {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            services: Mutex::new(BTreeMap::new()),
        }
    }

    /// # Errors
    /// Fails when the node client cannot be initialised.
    #[cfg(unix)]
    pub fn from_env() -> Result<Self, crate::NodeError> {
        Ok(Self::new(Node::from_env()?))
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Records `service` and announces it to the node.
    ///
    /// The node being down is logged, not returned: the service still counts
    /// as exposed locally.
    ///
    /// # Errors
    /// Returns [`ApplicationError::AlreadyExposed`] when a service with the
    /// same name was exposed before.
    pub fn expose(&self, service: &dyn Service) -> Result<(), ApplicationError> {
        let descriptor = service.descriptor().clone();
        {
            let mut services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
            if services.contains_key(&descriptor.name) {
                return Err(ApplicationError::AlreadyExposed(descriptor.name));
            }
            services.insert(descriptor.name.clone(), descriptor.clone());
        }

        let payload = match serde_json::to_value(&descriptor) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(service = %descriptor.name, %err, "unable to encode service");
                return Ok(());
            }
        };
        match self.node.call(EXPOSE_RESOURCE, Some(&payload)) {
            Ok(_) => tracing::debug!(service = %descriptor.name, "service exposed"),
            Err(err) if err.is_unreachable() => {
                tracing::warn!(service = %descriptor.name, %err, "node unreachable");
            }
            Err(err) => tracing::error!(service = %descriptor.name, %err, "node rejected service"),
        }
        Ok(())
    }

    /// Creates and exposes a publisher.
    ///
    /// # Errors
    /// Same as [`Application::expose`].
    pub fn publisher<T>(
        &self,
        name: impl Into<String>,
        data: DataType,
    ) -> Result<PubService<T>, ApplicationError> {
        let service = PubService::new(name, data);
        self.expose(&service)?;
        Ok(service)
    }

    /// Creates and exposes a subscriber.
    ///
    /// # Errors
    /// Same as [`Application::expose`].
    pub fn subscriber<T: Clone>(
        &self,
        name: impl Into<String>,
        data: DataType,
    ) -> Result<SubService<T>, ApplicationError> {
        let service = SubService::new(name, data);
        self.expose(&service)?;
        Ok(service)
    }

    pub fn services(&self) -> Vec<ServiceDescriptor> {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn is_exposed(&self, name: &str) -> bool {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Raw access to the node API for resources this crate does not wrap.
    ///
    /// # Errors
    /// See [`Node::call`].
    pub fn call(&self, resource: &str, payload: Option<&Value>) -> Result<Value, crate::NodeError> {
        self.node.call(resource, payload)
    }
}
