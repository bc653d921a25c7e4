//! Deterministic oracles for tests and offline runs
//!
//! None of these touch the network. They cover the three behaviours a caller
//! has to handle: a usable answer, a canned answer (e.g. a rejection sentinel)
//! and a failure (error or timeout).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::{CompletionOracle, CompletionRequest, OracleError};

/// Always answers with the same text
pub struct StaticOracle {
    response: String,
    calls: AtomicUsize,
}

impl StaticOracle {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionOracle for StaticOracle {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Pass-through oracle: answers with whatever follows `marker` in the prompt.
///
/// With the clause refiner's prompt marker this returns the candidate text
/// unchanged, which is what an ideal oracle does for a clean clause.
pub struct EchoOracle {
    marker: String,
}

impl EchoOracle {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

#[async_trait]
impl CompletionOracle for EchoOracle {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        let echoed = match request.prompt.rfind(&self.marker) {
            Some(pos) => &request.prompt[pos + self.marker.len()..],
            None => request.prompt.as_str(),
        };
        Ok(echoed.to_string())
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Always fails with the given error
pub struct FailingOracle {
    error: OracleError,
}

impl FailingOracle {
    pub fn new(error: OracleError) -> Self {
        Self { error }
    }

    /// Simulates an unreachable service
    pub fn unreachable() -> Self {
        Self::new(OracleError::Network("connection refused".to_string()))
    }
}

#[async_trait]
impl CompletionOracle for FailingOracle {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, OracleError> {
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Answers only after `delay`; pair with a shorter caller timeout to simulate a hang
pub struct SlowOracle {
    delay: Duration,
    response: String,
}

impl SlowOracle {
    pub fn new(delay: Duration, response: impl Into<String>) -> Self {
        Self {
            delay,
            response: response.into(),
        }
    }
}

#[async_trait]
impl CompletionOracle for SlowOracle {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, OracleError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

type Script = dyn Fn(&CompletionRequest) -> Result<String, OracleError> + Send + Sync;

/// Answers through a closure, counting calls
pub struct ScriptedOracle {
    script: Box<Script>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String, OracleError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionOracle for ScriptedOracle {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(request)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
