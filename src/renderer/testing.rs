//! Engine test doubles
//!
//! A scriptable in-memory engine used across the conversion and route tests.
//! Behavior is driven by markers embedded in the job HTML:
//!
//! - `<!--hang-->` or blank input: the load never completes (the caller's
//!   timeout fires first)
//! - `<!--delay:N-->`: the load sleeps N milliseconds before succeeding
//! - `<!--fail-load-->`: the load fails with a render error
//! - `<!--engine-timeout-->`: the load fails with a context-level timeout
//! - `<!--fail-pdf-->`: the print step fails
//!
//! Successful prints return `%PDF-1.4\n<html>` so tests can attribute each
//! output to its input.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::engine::{EngineError, EngineFactory, RenderContext, RenderEngine, Result};
use crate::convert::options::RenderOptions;

const HANG: Duration = Duration::from_secs(3600);

/// Counting factory producing [`MockEngine`] instances.
#[derive(Clone)]
pub struct MockFactory {
    attempts: Arc<AtomicUsize>,
    fail: bool,
    create_delay: Duration,
    engines: Arc<Mutex<Vec<Arc<MockEngine>>>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
            fail: false,
            create_delay: Duration::ZERO,
            engines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A factory whose launches always fail.
    pub fn failing() -> Self {
        Self { fail: true, ..Self::new() }
    }

    /// Stretch out creation so concurrent callers overlap with it.
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// Number of creation attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of engines actually created.
    pub fn creations(&self) -> usize {
        self.engines.lock().len()
    }

    pub fn last_engine(&self) -> Option<Arc<MockEngine>> {
        self.engines.lock().last().cloned()
    }
}

#[async_trait]
impl EngineFactory for MockFactory {
    async fn create(&self) -> Result<Arc<dyn RenderEngine>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        if self.fail {
            return Err(EngineError::Unavailable("mock launch failure".to_string()));
        }
        let engine = Arc::new(MockEngine::new());
        self.engines.lock().push(Arc::clone(&engine));
        Ok(engine)
    }
}

/// In-memory engine with inspectable lifecycle counters.
pub struct MockEngine {
    connected: AtomicBool,
    closed: AtomicBool,
    contexts_opened: Arc<AtomicUsize>,
    contexts_closed: Arc<AtomicUsize>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            contexts_opened: Arc::new(AtomicUsize::new(0)),
            contexts_closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate the engine process dying underneath us.
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn contexts_opened(&self) -> usize {
        self.contexts_opened.load(Ordering::SeqCst)
    }

    pub fn contexts_closed(&self) -> usize {
        self.contexts_closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderEngine for MockEngine {
    async fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst) && !self.closed.load(Ordering::SeqCst)
    }

    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        self.contexts_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockContext {
            loaded: Mutex::new(None),
            closed_counter: Arc::clone(&self.contexts_closed),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MockContext {
    loaded: Mutex<Option<String>>,
    closed_counter: Arc<AtomicUsize>,
}

fn delay_marker(html: &str) -> Option<Duration> {
    let start = html.find("<!--delay:")?;
    let rest = &html[start + "<!--delay:".len()..];
    let end = rest.find("-->")?;
    rest[..end].parse().ok().map(Duration::from_millis)
}

#[async_trait]
impl RenderContext for MockContext {
    async fn load_html(&self, html: &str) -> Result<()> {
        if html.trim().is_empty() || html.contains("<!--hang-->") {
            tokio::time::sleep(HANG).await;
        }
        if let Some(delay) = delay_marker(html) {
            tokio::time::sleep(delay).await;
        }
        if html.contains("<!--fail-load-->") {
            return Err(EngineError::Render("mock load failure".to_string()));
        }
        if html.contains("<!--engine-timeout-->") {
            return Err(EngineError::Timeout("mock navigation timeout".to_string()));
        }
        *self.loaded.lock() = Some(html.to_string());
        Ok(())
    }

    async fn print_to_pdf(&self, _options: &RenderOptions) -> Result<Vec<u8>> {
        let loaded = self.loaded.lock().clone();
        let html = loaded.ok_or_else(|| EngineError::Render("no document loaded".to_string()))?;
        if html.contains("<!--fail-pdf-->") {
            return Err(EngineError::Render("mock print failure".to_string()));
        }
        Ok(format!("%PDF-1.4\n{}", html).into_bytes())
    }

    async fn close(&self) -> Result<()> {
        self.closed_counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
