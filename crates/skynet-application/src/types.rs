use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Pub,
    Sub,
    Req,
    Rep,
}

/// Name and shape of the values a service carries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataType {
    pub name: String,
    #[serde(default)]
    pub dimensions: Vec<u32>,
}

impl DataType {
    pub fn new(name: impl Into<String>, dimensions: impl Into<Vec<u32>>) -> Self {
        Self {
            name: name.into(),
            dimensions: dimensions.into(),
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// What the node is told about a service when it is exposed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ServiceType,
    pub data: DataType,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, kind: ServiceType, data: DataType) -> Self {
        Self {
            name: name.into(),
            kind,
            data,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message<T> {
    pub data: T,
    pub sequence: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

impl<T> Message<T> {
    /// Wraps `data`, stamping it with the current time.
    pub fn new(data: T, sequence: u64) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |elapsed| elapsed.as_secs_f64());
        Self {
            data,
            sequence,
            timestamp,
        }
    }
}
