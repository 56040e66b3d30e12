// src/testing.rs
// =============================================================================
// Test helpers: an in-memory Transport with scripted replies.
//
// Replies are queued per route. A route is the URL path without the base,
// plus "?page=N" when the request carries a page parameter. The last queued
// reply for a route is sticky and answers every later call. Unknown routes
// answer 404.
// =============================================================================

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{ApiConfig, RetryPolicy};
use crate::error::RequestError;
use crate::github::{GithubClient, RawResponse, Transport};

pub const BASE_URL: &str = "https://api.test";

#[derive(Default)]
struct State {
    routes: HashMap<String, VecDeque<RawResponse>>,
    calls: Vec<(String, Vec<(String, String)>)>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Inner>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request sleeps this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock().unwrap() = Some(latency);
    }

    pub fn reply(&self, path: &str, status: u16, body: &str) {
        self.push(path.to_string(), RawResponse { status, link: None, body: body.to_string() });
    }

    pub fn reply_json(&self, path: &str, body: &Value) {
        self.reply(path, 200, &body.to_string());
    }

    pub fn reply_page(&self, path: &str, page: u32, body: &Value, link: Option<&str>) {
        self.push(
            format!("{}?page={}", path, page),
            RawResponse { status: 200, link: link.map(str::to_string), body: body.to_string() },
        );
    }

    fn push(&self, key: String, response: RawResponse) {
        let mut state = self.inner.state.lock().unwrap();
        state.routes.entry(key).or_default().push_back(response);
    }

    /// Number of requests made to `path`, any page.
    pub fn calls_to(&self, path: &str) -> usize {
        let state = self.inner.state.lock().unwrap();
        state.calls.iter().filter(|(p, _)| p == path).count()
    }

    pub fn total_calls(&self) -> usize {
        self.inner.state.lock().unwrap().calls.len()
    }

    pub fn last_query(&self, path: &str) -> Option<Vec<(String, String)>> {
        let state = self.inner.state.lock().unwrap();
        state
            .calls
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
    }

    /// Highest number of requests that were in flight at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    fn answer(&self, path: &str, query: &[(String, String)]) -> RawResponse {
        let key = match query.iter().find(|(k, _)| k == "page") {
            Some((_, page)) => format!("{}?page={}", path, page),
            None => path.to_string(),
        };

        let mut state = self.inner.state.lock().unwrap();
        state.calls.push((path.to_string(), query.to_vec()));
        match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => RawResponse { status: 404, link: None, body: String::new() },
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        _token: &str,
    ) -> Result<RawResponse, RequestError> {
        let path = url.strip_prefix(BASE_URL).unwrap_or(url).to_string();

        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = *self.inner.latency.lock().unwrap();
        match latency {
            Some(d) => tokio::time::sleep(d).await,
            None => tokio::task::yield_now().await,
        }

        let response = self.answer(&path, query);
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(response)
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        base_url: BASE_URL.to_string(),
        token: Some("test-token".to_string()),
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        },
        ..ApiConfig::default()
    }
}

pub fn client_for(mock: &MockTransport) -> GithubClient {
    GithubClient::new(Arc::new(mock.clone()), &test_config())
}

pub fn repo_json(full_name: &str) -> Value {
    let name = full_name.split('/').nth(1).unwrap_or(full_name);
    json!({
        "id": 4242,
        "name": name,
        "full_name": full_name,
        "description": "test repository",
        "default_branch": "main",
        "created_at": "2020-01-01T00:00:00Z",
        "updated_at": "2024-06-01T12:30:00Z",
        "language": "Rust",
        "fork": false,
        "size": 120,
        "stargazers_count": 5,
        "watchers_count": 5,
        "forks_count": 1,
        "open_issues_count": 0,
        "html_url": format!("https://github.com/{}", full_name),
    })
}

pub fn file_entry(path: &str, size: u64) -> Value {
    json!({
        "name": path.rsplit('/').next().unwrap_or(path),
        "path": path,
        "type": "file",
        "size": size,
        "sha": format!("sha-{}", path),
        "html_url": format!("https://github.com/x/blob/main/{}", path),
    })
}

pub fn dir_entry(path: &str) -> Value {
    json!({
        "name": path.rsplit('/').next().unwrap_or(path),
        "path": path,
        "type": "dir",
        "size": 0,
        "sha": format!("sha-{}", path),
        "html_url": format!("https://github.com/x/tree/main/{}", path),
    })
}

/// Contents-API body for a file, base64 encoded with line wrapping like
/// the real API.
pub fn file_body(path: &str, content: &[u8]) -> Value {
    let encoded = base64::engine::general_purpose::STANDARD.encode(content);
    let wrapped: Vec<String> = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    json!({
        "path": path,
        "sha": format!("sha-{}", path),
        "size": content.len(),
        "encoding": "base64",
        "content": wrapped.join("\n"),
        "html_url": format!("https://github.com/x/blob/main/{}", path),
    })
}
