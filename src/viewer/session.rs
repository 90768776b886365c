//! Document session lifecycle
//!
//! ```text
//! Idle ──open──▶ AwaitingBackend ──backend ready──▶ LoadingDocument ──opened──▶ Ready
//!                      │                                  │
//!                      └──────────── failure ─────────────┴──▶ Failed ──reload──▶ AwaitingBackend
//! ```
//!
//! The session only tracks state; the worker does the actual opening. Every
//! transition driven by the worker must carry the token of the open request
//! currently in flight, older tokens are ignored.

use super::error::ViewerError;
use super::request::RequestId;

/// The opened document as seen by the controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentHandle {
    pub locator: String,
    pub page_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing opened yet
    Idle,
    /// Waiting for the backend to come up
    AwaitingBackend,
    /// Backend is up, waiting for the document
    LoadingDocument,
    Ready,
    Failed(ViewerError),
    Closed,
}

#[derive(Debug)]
pub struct DocumentSession {
    phase: SessionPhase,
    locator: Option<String>,
    handle: Option<DocumentHandle>,
    pending: Option<RequestId>,
}

impl Default for DocumentSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            locator: None,
            handle: None,
            pending: None,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn handle(&self) -> Option<&DocumentHandle> {
        self.handle.as_ref()
    }

    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.handle.as_ref().map_or(0, |h| h.page_count)
    }

    pub fn is_ready(&self) -> bool {
        self.phase == SessionPhase::Ready
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::AwaitingBackend | SessionPhase::LoadingDocument
        )
    }

    pub fn error(&self) -> Option<&ViewerError> {
        match &self.phase {
            SessionPhase::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Start opening `locator` under request `id`, dropping any current document
    pub fn begin_open(&mut self, locator: &str, id: RequestId) {
        log::info!("Opening {locator}");
        self.locator = Some(locator.to_string());
        self.handle = None;
        self.pending = Some(id);
        self.phase = SessionPhase::AwaitingBackend;
    }

    /// Locator a reload would re-open, if reloading is possible right now
    pub fn reload_target(&self) -> Option<&str> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Closed => None,
            _ => self.locator.as_deref(),
        }
    }

    /// Re-open the current locator under request `id`. Clears any error.
    pub fn begin_reload(&mut self, id: RequestId) -> bool {
        let Some(locator) = self.reload_target().map(str::to_string) else {
            return false;
        };
        log::info!("Reloading {locator}");
        self.handle = None;
        self.pending = Some(id);
        self.phase = SessionPhase::AwaitingBackend;
        true
    }

    pub fn on_backend_ready(&mut self, id: RequestId) -> bool {
        if !self.is_pending(id) || self.phase != SessionPhase::AwaitingBackend {
            return false;
        }
        self.phase = SessionPhase::LoadingDocument;
        true
    }

    pub fn on_opened(&mut self, id: RequestId, page_count: usize) -> bool {
        if !self.is_pending(id) {
            return false;
        }
        let Some(locator) = self.locator.clone() else {
            return false;
        };
        log::info!("Document {locator} ready with {page_count} pages");
        self.pending = None;
        self.handle = Some(DocumentHandle {
            locator,
            page_count,
        });
        self.phase = SessionPhase::Ready;
        true
    }

    pub fn on_failed(&mut self, id: RequestId, error: ViewerError) -> bool {
        if !self.is_pending(id) {
            return false;
        }
        log::error!("Session failed: {error}");
        self.pending = None;
        self.handle = None;
        self.phase = SessionPhase::Failed(error);
        true
    }

    pub fn close(&mut self) {
        if self.phase != SessionPhase::Closed {
            log::info!("Closing session");
        }
        self.pending = None;
        self.handle = None;
        self.phase = SessionPhase::Closed;
    }

    fn is_pending(&self, id: RequestId) -> bool {
        self.pending == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_walks_through_both_gates() {
        let mut session = DocumentSession::new();
        session.begin_open("a.pdf", RequestId::new(1));
        assert!(session.is_loading());
        assert_eq!(session.page_count(), 0);

        assert!(session.on_backend_ready(RequestId::new(1)));
        assert_eq!(session.phase(), &SessionPhase::LoadingDocument);
        assert!(session.on_opened(RequestId::new(1), 12));
        assert!(session.is_ready());
        assert_eq!(
            session.handle(),
            Some(&DocumentHandle {
                locator: "a.pdf".into(),
                page_count: 12
            })
        );
    }

    #[test]
    fn responses_for_an_older_open_are_ignored() {
        let mut session = DocumentSession::new();
        session.begin_open("a.pdf", RequestId::new(1));
        session.begin_open("b.pdf", RequestId::new(2));

        assert!(!session.on_opened(RequestId::new(1), 3));
        assert!(session.is_loading());
        assert!(session.on_opened(RequestId::new(2), 5));
        assert_eq!(session.handle().map(|h| h.locator.as_str()), Some("b.pdf"));
    }

    #[test]
    fn failure_exits_only_through_reload() {
        let mut session = DocumentSession::new();
        session.begin_open("a.pdf", RequestId::new(1));
        let error = ViewerError::DocumentOpenFailed {
            locator: "a.pdf".into(),
            reason: "404".into(),
        };
        assert!(session.on_failed(RequestId::new(1), error.clone()));
        assert_eq!(session.error(), Some(&error));

        // A late success for the failed request changes nothing
        assert!(!session.on_opened(RequestId::new(1), 4));
        assert!(session.error().is_some());

        assert!(session.begin_reload(RequestId::new(2)));
        assert!(session.error().is_none());
        assert!(session.on_backend_ready(RequestId::new(2)));
        assert!(session.on_opened(RequestId::new(2), 4));
        assert!(session.is_ready());
    }

    #[test]
    fn reload_needs_a_locator_and_an_open_session() {
        let mut session = DocumentSession::new();
        assert!(!session.begin_reload(RequestId::new(1)));

        session.begin_open("a.pdf", RequestId::new(2));
        session.close();
        assert!(!session.begin_reload(RequestId::new(3)));
        assert_eq!(session.phase(), &SessionPhase::Closed);
    }
}
