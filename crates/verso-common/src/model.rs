//! Domain model shared by the store and the transport

use serde::{Deserialize, Serialize};

use crate::codec::{ConfigData, Fragment};
use crate::error::{Result, VersoError};

/// One stored configuration version of a service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServiceConfig {
    /// Surrogate key of the configuration family, internal to the store
    pub id: i32,
    pub service: String,
    pub version: u32,
    pub data: ConfigData,
}

/// Result of a successful delete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletedConfig {
    pub id: i32,
    pub service: String,
    /// `None` when the whole configuration was torn down
    pub version: Option<u32>,
}

/// A client submission for create or update.
///
/// Wire form: `{"service": "billing", "data": [{"host": "db"}, {"port": "5432"}]}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigSubmission {
    pub service: String,
    pub data: ConfigData,
}

#[derive(Deserialize)]
struct RawSubmission {
    service: String,
    #[serde(default)]
    data: Vec<Fragment>,
}

impl ConfigSubmission {
    pub fn new(service: impl Into<String>, data: ConfigData) -> Self {
        Self {
            service: service.into(),
            data,
        }
    }

    pub fn from_json(payload: &[u8]) -> Result<Self> {
        let raw: RawSubmission = serde_json::from_slice(payload)
            .map_err(|e| VersoError::InvalidPayload(e.to_string()))?;
        if raw.service.trim().is_empty() {
            return Err(VersoError::InvalidPayload(
                "service name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            service: raw.service,
            data: ConfigData::from_fragments(raw.data)?,
        })
    }
}

/// Map the wire sentinel `0` to "no version requested".
pub fn requested_version(version: u32) -> Option<u32> {
    (version != 0).then_some(version)
}
