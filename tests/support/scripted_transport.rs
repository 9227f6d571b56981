//! In-memory [`Transport`] serving canned responses keyed by exact URL.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use hean_core::{RawResponse, RequestPurpose, Transport, TransportError};
use serde_json::Value;

/// Transport that answers from a URL → response table and records every
/// request. Unknown URLs fail like an unreachable host. Responses added for
/// the same URL are served in order and the last one repeats.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<String, VecDeque<RawResponse>>>,
    requests: Mutex<Vec<(String, RequestPurpose)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` as JSON with status 200 for `url`.
    #[must_use]
    pub fn with_json(self, url: &str, body: Value) -> Self {
        self.with_response(url, 200, body.to_string())
    }

    /// Queues an arbitrary status and body for `url`.
    #[must_use]
    pub fn with_response(self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(RawResponse::new(status, body));
        self
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Requests issued so far with their purposes.
    pub fn requests(&self) -> Vec<(String, RequestPurpose)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(
        &self,
        url: &str,
        purpose: RequestPurpose,
    ) -> Result<RawResponse, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), purpose));
        let mut responses = self.responses.lock().unwrap();
        let queue = responses
            .get_mut(url)
            .ok_or_else(|| TransportError::request_failed(url, "no scripted response"))?;
        if queue.len() > 1 {
            return Ok(queue.pop_front().unwrap());
        }
        Ok(queue.front().cloned().unwrap())
    }
}
