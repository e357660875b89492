//! Lazily-initialized, process-wide render engine handle.
//!
//! The first call to [`EngineLoader::ensure_loaded`] runs the engine factory
//! once. Its outcome is final: either a shared engine handle, or a permanent
//! "absent" state in which every preview uses the fallback frame.

use crate::error::Result;
use crate::pdf::{EngineConfig, PdfiumEngine, RenderEngine};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

pub type EngineHandle = Arc<dyn RenderEngine>;

type EngineFactory = Arc<dyn Fn() -> Result<EngineHandle> + Send + Sync>;

pub struct EngineLoader {
    handle: OnceCell<Option<EngineHandle>>,
    factory: EngineFactory,
}

impl fmt::Debug for EngineLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.handle.get() {
            None => "pending",
            Some(None) => "absent",
            Some(Some(_)) => "loaded",
        };
        f.debug_struct("EngineLoader").field("state", &state).finish()
    }
}

impl EngineLoader {
    /// Loader that runs `factory` on first use.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<EngineHandle> + Send + Sync + 'static,
    {
        Self {
            handle: OnceCell::new(),
            factory: Arc::new(factory),
        }
    }

    /// Loader that binds PDFium using `config`.
    pub fn pdfium(config: EngineConfig) -> Self {
        Self::new(move || Ok(Arc::new(PdfiumEngine::load(&config)?) as EngineHandle))
    }

    /// Loader already settled in the absent state.
    pub fn absent() -> Self {
        Self {
            handle: OnceCell::new_with(Some(None)),
            factory: Arc::new(|| {
                Err(crate::error::PreviewError::EngineLoad(
                    "engine disabled".to_string(),
                ))
            }),
        }
    }

    /// Make sure the load attempt has happened, then return the handle.
    ///
    /// Concurrent first callers all wait on the same attempt. A failed load
    /// is logged and never retried.
    pub async fn ensure_loaded(&self) -> Option<EngineHandle> {
        self.handle
            .get_or_init(|| async {
                let factory = Arc::clone(&self.factory);
                match tokio::task::spawn_blocking(move || factory()).await {
                    Ok(Ok(engine)) => {
                        info!(engine = engine.name(), "render engine loaded");
                        Some(engine)
                    }
                    Ok(Err(e)) => {
                        warn!(error = %e, "render engine failed to load, will use frame fallback");
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "render engine loader panicked, will use frame fallback");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Whether the load attempt has completed (successfully or not).
    pub fn is_settled(&self) -> bool {
        self.handle.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreviewError;
    use crate::pdf::Thumbnail;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullEngine;

    impl RenderEngine for NullEngine {
        fn name(&self) -> &str {
            "null"
        }

        fn rasterize(&self, _: &[u8], _: u16, _: f32) -> Result<Thumbnail> {
            Err(PreviewError::Render("null engine".into()))
        }
    }

    #[tokio::test]
    async fn test_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = EngineLoader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NullEngine) as EngineHandle)
        });

        assert!(!loader.is_settled());
        assert!(loader.ensure_loaded().await.is_some());
        assert!(loader.ensure_loaded().await.is_some());
        assert!(loader.is_settled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_permanent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = EngineLoader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(PreviewError::EngineLoad("no library".into()))
        });

        assert!(loader.ensure_loaded().await.is_none());
        assert!(loader.ensure_loaded().await.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(format!("{:?}", loader), "EngineLoader { state: \"absent\" }");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = Arc::new(EngineLoader::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(Arc::new(NullEngine) as EngineHandle)
        }));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move { loader.ensure_loaded().await.is_some() })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_absent_loader_never_calls_factory() {
        let loader = EngineLoader::absent();
        assert!(loader.is_settled());
        assert!(loader.ensure_loaded().await.is_none());
    }
}
