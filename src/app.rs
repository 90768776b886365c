//! Input loop and frame export shared by the interactive and scripted drivers

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::event_source::{Event, EventSource};
use crate::viewer::commands::command_for_key;
use crate::viewer::controller::ViewerController;
use crate::viewer::frame::Slot;

/// Terminal cell dimensions in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: u16,
    pub height: u16,
}

impl CellSize {
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Pixel area covered by `columns` x `rows` cells
    #[must_use]
    pub fn viewport_pixels(&self, columns: u16, rows: u16) -> (u32, u32) {
        (
            u32::from(columns) * u32::from(self.width),
            u32::from(rows) * u32::from(self.height),
        )
    }
}

impl Default for CellSize {
    fn default() -> Self {
        Self::new(10, 20)
    }
}

/// Feed input events into `viewer` until it closes.
///
/// `on_frame` runs once up front and then after every event that led to a
/// settled frame.
pub fn run_with_event_source<E, F>(
    viewer: &mut ViewerController,
    events: &mut E,
    cell: CellSize,
    frame_timeout: Duration,
    mut on_frame: F,
) -> Result<()>
where
    E: EventSource + ?Sized,
    F: FnMut(&ViewerController) -> Result<()>,
{
    viewer.wait_until_idle(frame_timeout);
    on_frame(viewer)?;

    while !viewer.is_closed() {
        if !events.poll(Duration::from_millis(100))? {
            if viewer.pump() {
                on_frame(viewer)?;
            }
            continue;
        }

        match events.read()? {
            Event::Key(key) => {
                let Some(command) = command_for_key(&key, viewer.is_fullscreen()) else {
                    continue;
                };
                viewer.dispatch(command);
            }
            Event::Resize(columns, rows) => {
                let (width, height) = cell.viewport_pixels(columns, rows);
                debug!("Terminal resized to {columns}x{rows} cells ({width}x{height} px)");
                viewer.set_viewport(width, height);
            }
            _ => continue,
        }

        if viewer.is_closed() {
            break;
        }
        viewer.wait_until_idle(frame_timeout);
        on_frame(viewer)?;
    }
    Ok(())
}

/// Write every finished slot of the current frame as a PNG into `dir`.
///
/// Files are named `slot-<n>-page-<p>.png`; earlier slot files are removed
/// first so the directory always mirrors the screen.
pub fn export_frame(viewer: &ViewerController, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    clear_previous_slots(dir)?;

    let Some(frame) = viewer.frame() else {
        return Ok(Vec::new());
    };

    let mut written = Vec::new();
    for (index, slot) in frame.slots().iter().enumerate() {
        let Slot::Ready(result) = slot else {
            continue;
        };
        let path = dir.join(format!("slot-{index}-page-{}.png", result.page()));
        result
            .image()
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if let Some(label) = result.label() {
            info!("Slot {index}: placeholder \"{label}\"");
        }
        written.push(path);
    }
    Ok(written)
}

fn clear_previous_slots(dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_slot_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("slot-") && name.ends_with(".png"));
        if is_slot_file {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_convert_to_pixels() {
        let cell = CellSize::new(9, 18);
        assert_eq!(cell.viewport_pixels(160, 50), (1440, 900));
        assert_eq!(CellSize::default().viewport_pixels(0, 0), (0, 0));
    }
}
