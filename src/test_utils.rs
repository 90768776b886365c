//! Deterministic fakes for exercising the viewer without real documents

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{Rgba, RgbaImage};

use crate::viewer::backend::{PageSource, RenderBackend};
use crate::viewer::error::BackendFault;
use crate::viewer::types::PageSize;

/// A4 in points
pub const DEFAULT_PAGE_SIZE: PageSize = PageSize::new(595.0, 842.0);

/// Solid colour a fake page is painted with, unique per page up to 255
pub fn page_color(page: usize) -> Rgba<u8> {
    let n = (page % 256) as u8;
    Rgba([n, 255 - n, n.wrapping_mul(37), 255])
}

#[derive(Default)]
struct Counters {
    init_attempts: AtomicUsize,
    opens: AtomicUsize,
    rendered: Mutex<Vec<usize>>,
}

/// In-memory backend with scriptable failures.
///
/// Every page is painted [`page_color`], so a test can tell which page ended
/// up in which slot.
#[derive(Clone)]
pub struct FakeBackend {
    page_count: usize,
    sizes: HashMap<usize, PageSize>,
    failing_pages: HashSet<usize>,
    open_error: Option<String>,
    init_failures: usize,
    open_delay: Duration,
    render_delay: Duration,
    counters: Arc<Counters>,
}

impl FakeBackend {
    pub fn new(page_count: usize) -> Self {
        Self {
            page_count,
            sizes: HashMap::new(),
            failing_pages: HashSet::new(),
            open_error: None,
            init_failures: 0,
            open_delay: Duration::ZERO,
            render_delay: Duration::ZERO,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn with_page_size(mut self, page: usize, size: PageSize) -> Self {
        self.sizes.insert(page, size);
        self
    }

    /// Painting `page` fails; its native size is still reported
    pub fn failing_page(mut self, page: usize) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn failing_open(mut self, reason: &str) -> Self {
        self.open_error = Some(reason.to_string());
        self
    }

    /// The first `attempts` initialisations fail
    pub fn failing_init(mut self, attempts: usize) -> Self {
        self.init_failures = attempts;
        self
    }

    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    pub fn init_attempts(&self) -> usize {
        self.counters.init_attempts.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    /// Pages painted so far, in order
    pub fn rendered_pages(&self) -> Vec<usize> {
        self.counters
            .rendered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl RenderBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn initialize(&self) -> Result<(), BackendFault> {
        let attempt = self.counters.init_attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.init_failures {
            Err(BackendFault::generic("fake engine failed to load"))
        } else {
            Ok(())
        }
    }

    fn open(&self, _locator: &str) -> Result<Box<dyn PageSource>, BackendFault> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        if !self.open_delay.is_zero() {
            std::thread::sleep(self.open_delay);
        }
        if let Some(reason) = &self.open_error {
            return Err(BackendFault::generic(reason.clone()));
        }
        Ok(Box::new(FakeDocument {
            backend: self.clone(),
        }))
    }
}

struct FakeDocument {
    backend: FakeBackend,
}

impl PageSource for FakeDocument {
    fn page_count(&self) -> usize {
        self.backend.page_count
    }

    fn native_size(&self, page: usize) -> Result<PageSize, BackendFault> {
        if page == 0 || page > self.backend.page_count {
            return Err(BackendFault::generic(format!("page {page} out of range")));
        }
        Ok(self
            .backend
            .sizes
            .get(&page)
            .copied()
            .unwrap_or(DEFAULT_PAGE_SIZE))
    }

    fn render(&self, page: usize, scale: f32) -> Result<RgbaImage, BackendFault> {
        if !self.backend.render_delay.is_zero() {
            std::thread::sleep(self.backend.render_delay);
        }
        if self.backend.failing_pages.contains(&page) {
            return Err(BackendFault::generic(format!("fake page {page} is corrupt")));
        }
        let size = self.native_size(page)?;
        let width = (size.width * scale).round().max(1.0) as u32;
        let height = (size.height * scale).round().max(1.0) as u32;

        self.backend
            .counters
            .rendered
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(page);
        Ok(RgbaImage::from_pixel(width, height, page_color(page)))
    }
}

pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, SimulatedEventSource};

    /// Builder for creating test scenarios with simulated user input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        /// Add a character key press
        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_right(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::key(KeyCode::Right));
            }
            self
        }

        pub fn press_left(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::key(KeyCode::Left));
            }
            self
        }

        /// Any non-character key, e.g. `Home` or `PageDown`
        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        pub fn press_esc(mut self) -> Self {
            self.events.push(SimulatedEventSource::key(KeyCode::Esc));
            self
        }

        /// Terminal resized to `columns` x `rows` cells
        pub fn resize(mut self, columns: u16, rows: u16) -> Self {
            self.events.push(Event::Resize(columns, rows));
            self
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }
}
