//! Scripted transport shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::types::PanelError;

use super::transport::{Request, Transport};

#[derive(Debug, Clone)]
pub enum Scripted {
    Json(Value),
    Status(u16),
    Malformed,
}

#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<Request>>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, request: &Request) -> Result<Value, PanelError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Json(value)) => Ok(value),
            Some(Scripted::Status(status)) => Err(PanelError::Status {
                route: request.route.clone(),
                status,
            }),
            Some(Scripted::Malformed) => {
                Err(serde_json::from_str::<Value>("<html>oops</html>").unwrap_err().into())
            }
            None => Err(PanelError::Status {
                route: request.route.clone(),
                status: 503,
            }),
        }
    }
}
