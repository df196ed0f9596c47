//! Shared fake transport for tests that bypass the network.

#![allow(dead_code)]

use std::sync::Mutex;

use smsguard_core::{
    Client, ClientConfig, HttpRequest, HttpResponse, Transport, TransportError,
};

pub const BASE_URL: &str = "http://localhost:3000/v1";

/// Answers every request with one canned outcome and records what it saw.
pub struct ReplayTransport {
    outcome: Result<HttpResponse, TransportError>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl ReplayTransport {
    pub fn new(outcome: Result<HttpResponse, TransportError>) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn responding(status: u16, body: impl Into<String>) -> Self {
        Self::new(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.into(),
        }))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ReplayTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }
}

/// Client over a borrowed transport so the test keeps access to it.
pub fn client(transport: &ReplayTransport) -> Client<&ReplayTransport> {
    let config = ClientConfig::new("sk_test_vectors")
        .unwrap()
        .with_base_url(BASE_URL)
        .unwrap();
    Client::with_transport(config, transport)
}
