//! In-memory [`ApiTransport`] for unit tests.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiTransport;

/// Canned reply for one route.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Bytes(Vec<u8>),
    Status(u16, &'static str),
    Offline,
    Expired,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Routes are keyed by `"METHOD /path"`. Replies queued for one route are
/// served in order; the last one repeats. Unknown routes answer 404.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<String, Vec<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, method: Method, path: &str, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(format!("{} {}", method, path))
            .or_default()
            .push(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|call| call.path == path).count()
    }

    pub fn last_body(&self, path: &str) -> Option<Value> {
        self.calls()
            .into_iter()
            .rev()
            .find(|call| call.path == path)
            .and_then(|call| call.body)
    }

    fn respond(&self, method: Method, path: &str, body: Option<&Value>) -> ClientResult<Reply> {
        self.calls.lock().unwrap().push(Call {
            method: method.clone(),
            path: path.to_string(),
            body: body.cloned(),
        });

        let key = format!("{} {}", method, path);
        let reply = match self.routes.lock().unwrap().get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) => queue[0].clone(),
            None => Reply::Status(404, "no route"),
        };

        match reply {
            Reply::Status(status, message) => Err(ClientError::Http {
                status,
                message: message.to_string(),
            }),
            Reply::Offline => Err(ClientError::Network("connection refused".into())),
            Reply::Expired => Err(ClientError::SessionExpired {
                redirect: "http://localhost:8080/login?error=session_expired".into(),
            }),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn get_json(&self, path: &str) -> ClientResult<Value> {
        match self.respond(Method::GET, path, None)? {
            Reply::Json(value) => Ok(value),
            _ => Err(ClientError::InvalidResponse("expected JSON".into())),
        }
    }

    async fn send_json(&self, method: Method, path: &str, body: &Value) -> ClientResult<Value> {
        match self.respond(method, path, Some(body))? {
            Reply::Json(value) => Ok(value),
            _ => Err(ClientError::InvalidResponse("expected JSON".into())),
        }
    }

    async fn get_bytes(&self, path: &str) -> ClientResult<Vec<u8>> {
        match self.respond(Method::GET, path, None)? {
            Reply::Bytes(bytes) => Ok(bytes),
            Reply::Json(value) => Ok(serde_json::to_vec(&value)?),
            _ => Err(ClientError::InvalidResponse("expected bytes".into())),
        }
    }
}
