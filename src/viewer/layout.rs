//! Render-surface sizing
//!
//! Picks a target height as a fraction of the usable viewport height, caps it
//! at an absolute ceiling, then derives the width from the A4 aspect ratio:
//! portrait for the cover, landscape for spread pages. Fullscreen reserves no
//! chrome and uses larger fractions and ceilings.

use serde::{Deserialize, Serialize};

use super::types::{SurfaceSize, ViewMode, Viewport};

/// Width / height of a portrait A4 page
pub const PORTRAIT_RATIO: f32 = 210.0 / 297.0;
/// Width / height of a landscape A4 page
pub const LANDSCAPE_RATIO: f32 = 297.0 / 210.0;

/// Tunable sizing constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutPolicy {
    /// Pixels of toolbar chrome subtracted from the viewport height when windowed
    pub chrome_reserve: u32,
    pub cover_fraction: f32,
    pub cover_fraction_fullscreen: f32,
    pub cover_ceiling: f32,
    pub cover_ceiling_fullscreen: f32,
    pub spread_fraction: f32,
    pub spread_fraction_fullscreen: f32,
    pub spread_ceiling: f32,
    pub spread_ceiling_fullscreen: f32,
    /// Extra height given to the cover's render target
    pub cover_render_boost: f32,
    pub cover_render_boost_fullscreen: f32,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        Self {
            chrome_reserve: 140,
            cover_fraction: 0.9,
            cover_fraction_fullscreen: 0.95,
            cover_ceiling: 1000.0,
            cover_ceiling_fullscreen: 1200.0,
            spread_fraction: 0.85,
            spread_fraction_fullscreen: 0.9,
            spread_ceiling: 800.0,
            spread_ceiling_fullscreen: 1000.0,
            cover_render_boost: 1.4,
            cover_render_boost_fullscreen: 1.3,
        }
    }
}

impl LayoutPolicy {
    /// Surface geometry for one displayed page.
    ///
    /// Pure: the same inputs always produce the same size.
    #[must_use]
    pub fn surface_size(&self, viewport: &Viewport, mode: ViewMode, fullscreen: bool) -> SurfaceSize {
        let reserve = if fullscreen { 0 } else { self.chrome_reserve };
        let available = viewport.height.saturating_sub(reserve) as f32;

        let (fraction, ceiling, ratio) = match (mode, fullscreen) {
            (ViewMode::Cover, false) => (self.cover_fraction, self.cover_ceiling, PORTRAIT_RATIO),
            (ViewMode::Cover, true) => (
                self.cover_fraction_fullscreen,
                self.cover_ceiling_fullscreen,
                PORTRAIT_RATIO,
            ),
            (ViewMode::Spread, false) => {
                (self.spread_fraction, self.spread_ceiling, LANDSCAPE_RATIO)
            }
            (ViewMode::Spread, true) => (
                self.spread_fraction_fullscreen,
                self.spread_ceiling_fullscreen,
                LANDSCAPE_RATIO,
            ),
        };

        let height = (available * fraction).min(ceiling).max(0.0);
        let width = height * ratio;

        SurfaceSize::new(width.floor() as u32, height.floor() as u32)
    }

    /// Surface the renderer should fit a page into.
    ///
    /// Identical to [`surface_size`](Self::surface_size) for spread pages; the
    /// cover gets a taller target so it renders larger than its frame.
    #[must_use]
    pub fn render_target(&self, viewport: &Viewport, mode: ViewMode, fullscreen: bool) -> SurfaceSize {
        let base = self.surface_size(viewport, mode, fullscreen);
        match mode {
            ViewMode::Spread => base,
            ViewMode::Cover => {
                let boost = if fullscreen {
                    self.cover_render_boost_fullscreen
                } else {
                    self.cover_render_boost
                };
                let height = (base.height as f32 * boost.max(0.0)).floor() as u32;
                SurfaceSize::new(base.width, height)
            }
        }
    }
}

/// Surface size under the default [`LayoutPolicy`]
#[must_use]
pub fn compute_surface_size(viewport: &Viewport, mode: ViewMode, fullscreen: bool) -> SurfaceSize {
    LayoutPolicy::default().surface_size(viewport, mode, fullscreen)
}
