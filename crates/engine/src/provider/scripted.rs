//! Canned-reply transport.
//!
//! Routes are matched by substring against the full request URL; the first
//! registered route that matches and still has replies left wins. Every
//! request is recorded so callers can assert on what was sent.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use atlas_api::{HttpReply, HttpTransport};
use atlas_types::{AtlasError, ProviderId};
use url::Url;

/// What a route answers with.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Reply(HttpReply),
    /// Connection-level failure: no status is produced.
    NetworkFailure(String),
    /// Wait before answering. Uses tokio's clock, so paused-time tests stay deterministic.
    Delayed(Duration, Box<ScriptedReply>),
}

impl ScriptedReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self::Reply(HttpReply::new(status, body.to_string()))
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub provider: ProviderId,
    pub url: String,
}

#[derive(Debug)]
struct Route {
    needle: String,
    reply: ScriptedReply,
    remaining: Option<usize>,
}

#[derive(Debug, Default)]
struct ScriptState {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    state: Mutex<ScriptState>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request whose URL contains `needle`.
    pub fn respond(&self, needle: &str, reply: ScriptedReply) {
        self.push_route(needle, reply, None);
    }

    /// Answer only the next request whose URL contains `needle`.
    pub fn respond_once(&self, needle: &str, reply: ScriptedReply) {
        self.push_route(needle, reply, Some(1));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of recorded requests whose URL contains `needle`.
    pub fn requests_matching(&self, needle: &str) -> usize {
        self.lock().requests.iter().filter(|request| request.url.contains(needle)).count()
    }

    fn push_route(&self, needle: &str, reply: ScriptedReply, remaining: Option<usize>) {
        self.lock().routes.push(Route {
            needle: needle.to_string(),
            reply,
            remaining,
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_reply(&self, provider: ProviderId, url: &str) -> Option<ScriptedReply> {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            provider,
            url: url.to_string(),
        });
        let route = state
            .routes
            .iter_mut()
            .find(|route| url.contains(&route.needle) && route.remaining != Some(0))?;
        if let Some(remaining) = route.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(route.reply.clone())
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, provider: ProviderId, url: Url) -> Result<HttpReply, AtlasError> {
        let mut reply = self
            .next_reply(provider, url.as_str())
            .ok_or_else(|| AtlasError::network(provider, format!("no scripted reply for {url}")))?;
        loop {
            match reply {
                ScriptedReply::Reply(reply) => return Ok(reply),
                ScriptedReply::NetworkFailure(message) => return Err(AtlasError::network(provider, message)),
                ScriptedReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}
