use async_trait::async_trait;
use serde_json::Value;

use crate::types::PanelError;

/// One request against the telemetry endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub url: String,
    pub route: String,
    pub query: Vec<(&'static str, String)>,
}

impl Request {
    pub fn get(url: String, route: &str) -> Self {
        Self {
            url,
            route: route.to_string(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &'static str, value: String) -> Self {
        self.query.push((key, value));
        self
    }
}

/// Issues requests and hands back the decoded JSON body.
///
/// Implementations must report non-2xx statuses as
/// [`PanelError::Status`], and bodies that are not JSON as
/// [`PanelError::Parse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, request: &Request) -> Result<Value, PanelError>;
}
