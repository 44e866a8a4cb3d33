//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::api::{Credential, DataError, DataSource, GqlRequest, User};
use crate::core::config::ResolvedConfig;
use crate::tui::screen::{Effect, ScreenContext};

#[derive(Clone)]
struct Script {
    outcome: Result<Value, DataError>,
    delay: Duration,
}

/// A data source that answers each operation name with a canned response,
/// optionally after a delay on the tokio clock, and records every call.
///
/// Operations without a script fail with a 404 `Server` error.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: Mutex<HashMap<&'static str, Script>>,
    calls: Mutex<Vec<GqlRequest>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| p.into_inner())
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, operation: &'static str, data: Value) -> &Self {
        self.script(operation, Ok(data), Duration::ZERO)
    }

    pub fn fail(&self, operation: &'static str, error: DataError) -> &Self {
        self.script(operation, Err(error), Duration::ZERO)
    }

    pub fn respond_after(&self, operation: &'static str, delay: Duration, data: Value) -> &Self {
        self.script(operation, Ok(data), delay)
    }

    fn script(
        &self,
        operation: &'static str,
        outcome: Result<Value, DataError>,
        delay: Duration,
    ) -> &Self {
        lock(&self.scripts).insert(operation, Script { outcome, delay });
        self
    }

    pub fn calls(&self) -> Vec<GqlRequest> {
        lock(&self.calls).clone()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<GqlRequest> {
        self.calls()
            .into_iter()
            .filter(|r| r.operation == operation)
            .collect()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn query(&self, _credential: &Credential, request: &GqlRequest) -> Result<Value, DataError> {
        lock(&self.calls).push(request.clone());
        let script = lock(&self.scripts).get(request.operation).cloned();
        match script {
            Some(script) => {
                if !script.delay.is_zero() {
                    tokio::time::sleep(script.delay).await;
                }
                script.outcome
            }
            None => Err(DataError::Server {
                status: 404,
                message: format!("no script for {}", request.operation),
            }),
        }
    }
}

pub fn test_user() -> User {
    User {
        id: 7,
        username: "reader".into(),
        name: Some("Avid Reader".into()),
        pro: false,
        books_count: 3,
    }
}

pub fn me_response() -> Value {
    json!({ "me": [{ "id": 7, "username": "reader", "name": "Avid Reader", "pro": false, "books_count": 3 }] })
}

pub fn test_context(source: Arc<ScriptedSource>) -> ScreenContext {
    ScreenContext {
        source,
        credential: Credential::new("test-token"),
        user: test_user(),
        config: Arc::new(ResolvedConfig::default()),
    }
}

/// Names of the commands among `effects`, in order.
pub fn command_kinds(effects: &[Effect]) -> Vec<crate::core::scheduler::CommandKind> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Command(c) => Some(c.kind),
            _ => None,
        })
        .collect()
}
