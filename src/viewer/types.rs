//! Core value types shared by the viewer engine

use serde::{Deserialize, Serialize};

/// Which layout the viewer is showing.
///
/// `Cover` always shows page 1 alone. `Spread` shows a left/right pair
/// anchored at the current page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Cover,
    Spread,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Cover => "cover",
            ViewMode::Spread => "spread",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How far one next/prev step moves once past the cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageStep {
    /// Two pages per step, pages paired as (2,3), (4,5), ...
    #[default]
    Spread,
    /// One page per step, one page on screen
    Single,
}

impl PageStep {
    /// Number of pages one navigation step advances
    #[must_use]
    pub const fn pages(self) -> usize {
        match self {
            PageStep::Spread => 2,
            PageStep::Single => 1,
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            PageStep::Spread => PageStep::Single,
            PageStep::Single => PageStep::Spread,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageStep::Spread => "spread",
            PageStep::Single => "single",
        }
    }
}

impl std::fmt::Display for PageStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageStep {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spread" | "double" | "2" => Ok(PageStep::Spread),
            "single" | "1" => Ok(PageStep::Single),
            _ => Err("unknown page step"),
        }
    }
}

/// Externally supplied viewport: available pixels and fullscreen flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fullscreen: false,
        }
    }

    #[must_use]
    pub const fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

/// Target render surface in whole pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Native page dimensions as reported by the backend (points or pixels,
/// whatever unit the backend paints at scale 1.0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both sides finite and strictly positive
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Snapshot of the navigation cursor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationState {
    pub current_page: usize,
    pub mode: ViewMode,
}
