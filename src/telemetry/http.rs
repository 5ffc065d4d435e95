use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::types::PanelError;

use super::transport::{Request, Transport};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// reqwest-backed [`Transport`] talking plain HTTP to the panel flows.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, PanelError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(PanelError::Http)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get_json(&self, request: &Request) -> Result<Value, PanelError> {
        let response = self
            .http
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(PanelError::Http)?;

        if !response.status().is_success() {
            return Err(PanelError::Status {
                route: request.route.clone(),
                status: response.status().as_u16(),
            });
        }

        // Read raw bytes so a bad body surfaces as a parse error, not a transport one.
        let body = response.bytes().await.map_err(PanelError::Http)?;
        Ok(serde_json::from_slice(&body)?)
    }
}
