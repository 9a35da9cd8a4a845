//! Shared renderer handle
//!
//! Process-wide singleton wrapper around the live engine connection.
//! Creation (and re-creation after a disconnect) is serialized behind a
//! creation lock with a double-checked liveness probe, so concurrent callers
//! on a cold start produce exactly one engine instance. The lock is never
//! held during rendering.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::engine::{EngineError, EngineFactory, RenderEngine, Result};

pub struct RendererHandle {
    factory: Box<dyn EngineFactory>,
    engine: RwLock<Option<Arc<dyn RenderEngine>>>,
    create_lock: Mutex<()>,
}

impl RendererHandle {
    pub fn new(factory: Box<dyn EngineFactory>) -> Self {
        Self {
            factory,
            engine: RwLock::new(None),
            create_lock: Mutex::new(()),
        }
    }

    /// Get the live engine, creating one if none exists or the cached one
    /// has disconnected.
    ///
    /// The optimistic probe keeps the common path off the creation lock;
    /// the second probe under the lock stops callers that queued behind a
    /// creation from launching their own instance.
    pub async fn acquire(&self) -> Result<Arc<dyn RenderEngine>> {
        if let Some(engine) = self.live_engine().await {
            return Ok(engine);
        }

        let _guard = self.create_lock.lock().await;
        if let Some(engine) = self.live_engine().await {
            return Ok(engine);
        }

        tracing::info!("Creating new renderer engine instance");
        let engine = match self.factory.create().await {
            Ok(engine) => engine,
            // A failed start is always EngineUnavailable, whatever the factory reported.
            Err(EngineError::Unavailable(msg)) => return Err(EngineError::Unavailable(msg)),
            Err(other) => return Err(EngineError::Unavailable(other.to_string())),
        };
        *self.engine.write().await = Some(Arc::clone(&engine));
        tracing::info!("Renderer engine created successfully");
        Ok(engine)
    }

    async fn live_engine(&self) -> Option<Arc<dyn RenderEngine>> {
        let engine = self.engine.read().await.clone()?;
        if engine.is_connected().await {
            Some(engine)
        } else {
            None
        }
    }

    /// Close the cached engine and clear the slot.
    ///
    /// Close errors are logged and swallowed; shutdown never fails.
    pub async fn shutdown(&self) {
        let engine = self.engine.write().await.take();
        if let Some(engine) = engine {
            if let Err(e) = engine.close().await {
                tracing::warn!("Error closing renderer engine: {}", e);
            }
        }
        tracing::info!("Renderer engine closed");
    }
}
