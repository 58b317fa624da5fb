//! HTTP client configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings for [`ReqwestClient`](crate::ReqwestClient).
///
/// Loaded from the checkout's optional client config file and overlaid with
/// command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Extra headers sent with every request (e.g. `Authorization`).
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            user_agent: concat!("restbulk/", env!("CARGO_PKG_VERSION")).to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Add a header given as `Name: value`.
    pub fn add_header(&mut self, raw: &str) -> Result<()> {
        let (name, value) = raw.split_once(':').ok_or_else(|| Error::InvalidHeader {
            name: raw.to_string(),
            message: "expected NAME:VALUE".to_string(),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeader {
                name: raw.to_string(),
                message: "header name is empty".to_string(),
            });
        }
        self.headers.insert(name.to_string(), value.trim().to_string());
        Ok(())
    }
}
