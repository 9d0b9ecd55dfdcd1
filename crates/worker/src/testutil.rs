//! Shared test doubles for the worker crate.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use atomsw_core::{AppConfig, CacheDb, Error, Request, Response};

use crate::engine::SwEngine;
use crate::fetch::Network;

#[derive(Debug, Clone)]
enum MockOutcome {
    Respond(Response),
    Fail,
}

/// Scripted network: each URL carries a queue of outcomes. Queued outcomes
/// are consumed in order and the last one repeats; a URL with no script
/// fails like a refused connection.
pub(crate) struct MockNetwork {
    outcomes: Mutex<HashMap<String, VecDeque<MockOutcome>>>,
    calls: Mutex<Vec<String>>,
}

impl MockNetwork {
    pub(crate) fn new() -> Self {
        Self { outcomes: Mutex::new(HashMap::new()), calls: Mutex::new(Vec::new()) }
    }

    pub(crate) fn respond(&self, url: &str, response: Response) {
        self.outcomes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(MockOutcome::Respond(response));
    }

    pub(crate) fn fail(&self, url: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(MockOutcome::Fail);
    }

    pub(crate) fn clear(&self, url: &str) {
        self.outcomes.lock().unwrap().remove(url);
    }

    pub(crate) fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());

        let mut outcomes = self.outcomes.lock().unwrap();
        let outcome = match outcomes.get_mut(&url) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match outcome {
            Some(MockOutcome::Respond(response)) => Ok(response),
            Some(MockOutcome::Fail) | None => {
                Err(Error::Network(format!("connection refused: {url}")))
            }
        }
    }
}

/// Let spawned background writes land before asserting on cache contents.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

/// An engine over an in-memory database with the test origin as scope.
pub(crate) async fn test_engine(network: Arc<MockNetwork>) -> SwEngine {
    let caches = CacheDb::open_in_memory().await.unwrap();
    let config = AppConfig { scope: "https://example.com/".into(), ..Default::default() };
    SwEngine::new(caches, network, &config).unwrap()
}
