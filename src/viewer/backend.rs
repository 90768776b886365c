//! Render backend capability
//!
//! The engine never decodes documents itself. A [`RenderBackend`] opens a
//! locator into a [`PageSource`], which reports page geometry and paints pages
//! at a requested scale. Swapping the backend is the only thing that changes
//! between PDF files and image directories.

use std::sync::Arc;

use image::RgbaImage;

use super::error::BackendFault;
use super::types::PageSize;

/// Opens documents. Shared between the controller and the render worker.
pub trait RenderBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// First readiness phase: bring the engine itself up.
    ///
    /// Called before the first `open` and again after a failed attempt when
    /// the session is reloaded.
    fn initialize(&self) -> Result<(), BackendFault> {
        Ok(())
    }

    /// Second readiness phase: open one document
    fn open(&self, locator: &str) -> Result<Box<dyn PageSource>, BackendFault>;
}

/// An opened document. Owned by exactly one render worker.
///
/// Page numbers are 1-based.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Native page size, the size painted at scale 1.0
    fn native_size(&self, page: usize) -> Result<PageSize, BackendFault>;

    /// Paint `page` at `scale`. The image is sized to the scaled page.
    fn render(&self, page: usize, scale: f32) -> Result<RgbaImage, BackendFault>;
}

#[derive(Debug, Default)]
enum GateState {
    #[default]
    Uninitialized,
    Available,
    Unavailable(String),
}

/// Two-phase readiness gate in front of a backend.
///
/// Initialisation runs once; a failure is remembered so repeated opens do not
/// hammer a broken engine, until [`reset`](Self::reset) allows a retry.
pub struct BackendGate {
    backend: Arc<dyn RenderBackend>,
    state: GateState,
}

impl BackendGate {
    pub fn new(backend: Arc<dyn RenderBackend>) -> Self {
        Self {
            backend,
            state: GateState::Uninitialized,
        }
    }

    pub fn backend(&self) -> &Arc<dyn RenderBackend> {
        &self.backend
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, GateState::Available)
    }

    /// Initialise the backend if needed. Returns the cached failure otherwise.
    pub fn ensure_ready(&mut self) -> Result<(), String> {
        match &self.state {
            GateState::Available => Ok(()),
            GateState::Unavailable(err) => Err(err.clone()),
            GateState::Uninitialized => match self.backend.initialize() {
                Ok(()) => {
                    log::info!("Render backend '{}' ready", self.backend.name());
                    self.state = GateState::Available;
                    Ok(())
                }
                Err(err) => {
                    let msg = err.to_string();
                    log::error!(
                        "Render backend '{}' failed to initialise: {msg}",
                        self.backend.name()
                    );
                    self.state = GateState::Unavailable(msg.clone());
                    Err(msg)
                }
            },
        }
    }

    /// Forget a previous failure so the next `ensure_ready` retries
    pub fn reset(&mut self) {
        if matches!(self.state, GateState::Unavailable(_)) {
            self.state = GateState::Uninitialized;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct FlakyBackend {
        attempts: AtomicUsize,
        fail_first: usize,
    }

    impl RenderBackend for FlakyBackend {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn initialize(&self) -> Result<(), BackendFault> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.fail_first {
                Err(BackendFault::generic("engine missing"))
            } else {
                Ok(())
            }
        }

        fn open(&self, _locator: &str) -> Result<Box<dyn PageSource>, BackendFault> {
            Err(BackendFault::generic("unused"))
        }
    }

    #[test]
    fn failure_is_cached_until_reset() {
        let backend = Arc::new(FlakyBackend {
            attempts: AtomicUsize::new(0),
            fail_first: 1,
        });
        let mut gate = BackendGate::new(backend.clone());

        assert_eq!(gate.ensure_ready(), Err("engine missing".to_string()));
        assert_eq!(gate.ensure_ready(), Err("engine missing".to_string()));
        assert_eq!(backend.attempts.load(Ordering::SeqCst), 1);

        gate.reset();
        assert_eq!(gate.ensure_ready(), Ok(()));
        assert!(gate.is_available());
        assert_eq!(backend.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn initialises_once() {
        let backend = Arc::new(FlakyBackend {
            attempts: AtomicUsize::new(0),
            fail_first: 0,
        });
        let mut gate = BackendGate::new(backend.clone());
        for _ in 0..3 {
            assert!(gate.ensure_ready().is_ok());
        }
        gate.reset();
        assert!(gate.ensure_ready().is_ok());
        assert_eq!(backend.attempts.load(Ordering::SeqCst), 1);
    }
}
