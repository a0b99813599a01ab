//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::client::ApiClient;
use crate::config::ServiceConfig;
use crate::error::TransportError;
use crate::store::MemoryTokenStore;
use crate::transport::{HttpRequest, HttpResponse, Transport};

pub(crate) const AUTH_ROOT: &str = "http://auth.test";
pub(crate) const CONTENT_ROOT: &str = "http://content.test";

/// Replays queued responses in order and records every request it sees.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    stalls: Mutex<Vec<(String, usize)>>,
}

impl MockTransport {
    pub(crate) fn reply(&self, status: u16, body: Value) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(HttpResponse { status, body: body.to_string() }));
        self
    }

    pub(crate) fn reply_raw(&self, status: u16, body: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse { status, body: body.to_owned() }));
        self
    }

    pub(crate) fn fail(&self, message: &str) -> &Self {
        self.replies.lock().unwrap().push_back(Err(TransportError::new(message)));
        self
    }

    /// Hold back the reply to any request whose body mentions `marker` for
    /// `yields` scheduler turns. The reply itself is taken in arrival order.
    pub(crate) fn stall_on(&self, marker: &str, yields: usize) -> &Self {
        self.stalls.lock().unwrap().push((marker.to_owned(), yields));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> HttpRequest {
        self.requests().pop().expect("no request was sent")
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = request.body.as_ref().map(Value::to_string).unwrap_or_default();
        let yields = self
            .stalls
            .lock()
            .unwrap()
            .iter()
            .filter(|(marker, _)| body.contains(marker.as_str()))
            .map(|(_, n)| *n)
            .sum::<usize>();
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted reply")));
        for _ in 0..yields {
            tokio::task::yield_now().await;
        }
        reply
    }
}

pub(crate) type TestClient = ApiClient<Arc<MockTransport>, Arc<MemoryTokenStore>>;

/// Client wired to a fresh mock transport and the given store.
pub(crate) fn client_with(store: MemoryTokenStore) -> (Arc<TestClient>, Arc<MockTransport>, Arc<MemoryTokenStore>) {
    let transport = Arc::new(MockTransport::default());
    let store = Arc::new(store);
    let config = ServiceConfig::new(AUTH_ROOT, CONTENT_ROOT).unwrap();
    let client = Arc::new(ApiClient::new(config, Arc::clone(&transport), Arc::clone(&store)));
    (client, transport, store)
}
