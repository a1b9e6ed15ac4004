#![allow(dead_code)]

use phenoml_demo::{ApiClient, AuthScheme, Config, Error, HttpRequest, HttpResponse, Result, Transport};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

pub const BASE_URL: &str = "https://api.test.local";

/// Replays canned responses in order and records every request sent.
#[derive(Default)]
pub struct MockTransport {
    replies: RefCell<VecDeque<Result<HttpResponse>>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: Value) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body.to_string())));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .borrow_mut()
            .push_back(Err(Error::Transport(message.to_string())));
        self
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.sent.borrow().last().cloned().expect("no request sent")
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.sent.borrow_mut().push(request.clone());
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("no reply queued".into())))
    }
}

pub fn config(scheme: AuthScheme) -> Config {
    Config::new(BASE_URL, "doc@example.org", "pw", scheme)
}

/// A client that already holds token `t-1`; the login reply is consumed.
pub fn authed_client(transport: MockTransport) -> ApiClient<MockTransport> {
    let mut replies: VecDeque<Result<HttpResponse>> = transport.replies.take();
    replies.push_front(Ok(HttpResponse::new(200, r#"{"token":"t-1"}"#)));
    transport.replies.replace(replies);

    let mut client = ApiClient::with_transport(config(AuthScheme::PasswordGrant), transport);
    assert!(client.authenticate());
    client
}

/// Requests sent after the login call.
pub fn calls(client: &ApiClient<MockTransport>) -> Vec<HttpRequest> {
    client.transport().sent().into_iter().skip(1).collect()
}
