//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use sleepwalk::common::ClusterState;
use sleepwalk::error::GatewayError;
use sleepwalk::gateway::SettingsGateway;

/// A cluster whose settings document is a single string.
///
/// A push replaces the whole document, like the real endpoint, unless the
/// gateway is frozen.
pub struct MemoryGateway {
    state: Mutex<String>,
    pushes: Mutex<Vec<String>>,
    fetches: AtomicUsize,
    frozen: bool,
    fail_fetch: AtomicBool,
    fail_push: AtomicBool,
}

impl MemoryGateway {
    pub fn with_state(state: &str) -> Self {
        Self {
            state: Mutex::new(state.to_string()),
            pushes: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            frozen: false,
            fail_fetch: AtomicBool::new(false),
            fail_push: AtomicBool::new(false),
        }
    }

    /// Accepts pushes but never changes its state.
    pub fn frozen(state: &str) -> Self {
        Self {
            frozen: true,
            ..Self::with_state(state)
        }
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pushes(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> String {
        self.state.lock().unwrap().clone()
    }
}

impl SettingsGateway for MemoryGateway {
    fn fetch(&self) -> impl Future<Output = Result<ClusterState, GatewayError>> + Send {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail_fetch.load(Ordering::SeqCst) {
            Err(GatewayError::Unavailable("fetch refused".to_string()))
        } else {
            Ok(ClusterState::new(self.state()))
        };
        async move { result }
    }

    fn push(&self, value: &str) -> impl Future<Output = Result<String, GatewayError>> + Send {
        self.pushes.lock().unwrap().push(value.to_string());
        let result = if self.fail_push.load(Ordering::SeqCst) {
            Err(GatewayError::Unavailable("push refused".to_string()))
        } else {
            if !self.frozen {
                *self.state.lock().unwrap() = value.to_string();
            }
            Ok(r#"{"acknowledged":true}"#.to_string())
        };
        async move { result }
    }
}

/// 2026-05-04 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, hour, minute, 0).unwrap()
}

pub fn write_template(dir: &Path, name: &str, source: &str) {
    std::fs::write(dir.join(name), source).unwrap();
}
