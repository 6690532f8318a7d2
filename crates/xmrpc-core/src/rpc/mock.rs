use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::CoreError;

use super::types::RawResponse;
use super::Transport;

type ErrorFactory = Box<dyn Fn() -> CoreError + Send + Sync>;

/// A mock transport for testing. Answers every request with the same canned
/// body (or error) and records what was sent.
pub struct MockTransport {
    body: Vec<u8>,
    error: Option<ErrorFactory>,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            body: br#"{"result":null}"#.to_vec(),
            error: None,
        }
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().expect("mock lock poisoned").len()
    }

    /// Every request body sent so far, decoded as JSON.
    pub fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent
            .lock()
            .expect("mock lock poisoned")
            .iter()
            .map(|body| serde_json::from_slice(body).expect("sent body must be JSON"))
            .collect()
    }
}

pub struct MockTransportBuilder {
    body: Vec<u8>,
    error: Option<ErrorFactory>,
}

impl MockTransportBuilder {
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self
    }

    pub fn with_error(mut self, error: impl Fn() -> CoreError + Send + Sync + 'static) -> Self {
        self.error = Some(Box::new(error));
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            body: self.body,
            error: self.error,
            sent: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, body: Vec<u8>) -> Result<RawResponse, CoreError> {
        self.sent.lock().expect("mock lock poisoned").push(body);
        if let Some(error) = &self.error {
            return Err(error());
        }
        Ok(RawResponse {
            status: StatusCode::OK,
            body: self.body.clone(),
        })
    }
}
