//! Page cursor for cover + spread browsing
//!
//! Page 1 is always the cover and is shown alone. Past the cover the cursor
//! sits on the left page of a spread: (2,3), (4,5), ... and moves by whole
//! spreads. With [`PageStep::Single`] it moves one page at a time instead.
//!
//! Invariants held after every transition:
//! - `mode == Cover` iff `current_page == 1`
//! - `1 <= current_page <= page_count` once `page_count > 0`

use super::types::{NavigationState, PageStep, ViewMode};

#[derive(Debug, Clone)]
pub struct Navigator {
    current_page: usize,
    page_count: usize,
    step: PageStep,
}

impl Navigator {
    #[must_use]
    pub fn new(step: PageStep) -> Self {
        Self {
            current_page: 1,
            page_count: 0,
            step,
        }
    }

    /// Reset for a freshly opened document, positioned on the cover
    pub fn reset(&mut self, page_count: usize) {
        self.page_count = page_count;
        self.current_page = 1;
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    #[must_use]
    pub fn step(&self) -> PageStep {
        self.step
    }

    #[must_use]
    pub fn mode(&self) -> ViewMode {
        if self.current_page == 1 {
            ViewMode::Cover
        } else {
            ViewMode::Spread
        }
    }

    #[must_use]
    pub fn state(&self) -> NavigationState {
        NavigationState {
            current_page: self.current_page,
            mode: self.mode(),
        }
    }

    /// Jump to `page`, clamped into `[1, page_count]`.
    ///
    /// No-op while no document is loaded. Returns true if the cursor moved.
    pub fn go_to(&mut self, page: usize) -> bool {
        if self.page_count == 0 {
            return false;
        }
        let clamped = page.clamp(1, self.page_count);
        if clamped == self.current_page {
            return false;
        }
        self.current_page = clamped;
        true
    }

    /// Advance one step. Stays put at the trailing boundary (no wrap).
    pub fn next(&mut self) -> bool {
        if self.page_count == 0 {
            return false;
        }
        if self.current_page == 1 {
            return self.go_to(2);
        }
        let target = self.current_page + self.step.pages();
        if target <= self.page_count {
            self.go_to(target)
        } else {
            false
        }
    }

    /// Go back one step. Page 2 returns to the cover; the cover stays put.
    pub fn prev(&mut self) -> bool {
        if self.page_count == 0 || self.current_page == 1 {
            return false;
        }
        if self.current_page == 2 {
            return self.go_to(1);
        }
        self.go_to(self.current_page.saturating_sub(self.step.pages()))
    }

    /// Switch between spread and single stepping. Ignored on the cover.
    pub fn toggle_step(&mut self) -> bool {
        if self.mode() == ViewMode::Cover {
            return false;
        }
        self.step = self.step.toggled();
        true
    }

    pub fn set_step(&mut self, step: PageStep) {
        self.step = step;
    }

    /// Pages actually on screen, in reading order.
    ///
    /// The right page of a spread is dropped when it would pass the end.
    #[must_use]
    pub fn displayed_pages(&self) -> Vec<usize> {
        if self.page_count == 0 {
            return Vec::new();
        }
        match (self.mode(), self.step) {
            (ViewMode::Cover, _) | (ViewMode::Spread, PageStep::Single) => {
                vec![self.current_page]
            }
            (ViewMode::Spread, PageStep::Spread) => {
                let right = self.current_page + 1;
                if right <= self.page_count {
                    vec![self.current_page, right]
                } else {
                    vec![self.current_page]
                }
            }
        }
    }

    /// Page slots to render for the current position.
    ///
    /// Unlike [`displayed_pages`](Self::displayed_pages), a spread always has
    /// two slots; a right slot past the end is painted as a blank placeholder.
    #[must_use]
    pub fn render_slots(&self) -> Vec<usize> {
        if self.page_count == 0 {
            return Vec::new();
        }
        match (self.mode(), self.step) {
            (ViewMode::Cover, _) | (ViewMode::Spread, PageStep::Single) => {
                vec![self.current_page]
            }
            (ViewMode::Spread, PageStep::Spread) => {
                vec![self.current_page, self.current_page + 1]
            }
        }
    }

    /// Short position label: `Cover`, `2-3 / 10` or `7 / 7`
    #[must_use]
    pub fn label(&self) -> String {
        if self.page_count == 0 {
            return "-".to_string();
        }
        if self.mode() == ViewMode::Cover {
            return "Cover".to_string();
        }
        match self.displayed_pages().as_slice() {
            [left, right] => format!("{left}-{right} / {}", self.page_count),
            [page] => format!("{page} / {}", self.page_count),
            _ => format!("{} / {}", self.current_page, self.page_count),
        }
    }
}
