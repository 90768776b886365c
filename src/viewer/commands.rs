//! Command surface
//!
//! Maps keyboard input and script tokens onto controller operations, without
//! knowing anything about rendering or the display.

use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// One user-level viewer operation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewerCommand {
    Next,
    Prev,
    GoTo(usize),
    /// Jump to the final page
    Last,
    ZoomIn,
    ZoomOut,
    /// Multiply the zoom factor
    Zoom(f32),
    ResetZoom,
    ToggleFullscreen,
    ExitFullscreen,
    TogglePageStep,
    Reload,
    Close,
}

/// Resolve a key press. `fullscreen` decides what Esc does.
pub fn command_for_key(key: &KeyEvent, fullscreen: bool) -> Option<ViewerCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    let command = match key.code {
        KeyCode::Right | KeyCode::PageDown => ViewerCommand::Next,
        KeyCode::Left | KeyCode::PageUp => ViewerCommand::Prev,
        KeyCode::Home => ViewerCommand::GoTo(1),
        KeyCode::End => ViewerCommand::Last,
        KeyCode::Esc if fullscreen => ViewerCommand::ExitFullscreen,
        KeyCode::Esc => ViewerCommand::Close,
        KeyCode::Char(c) => match c {
            '+' | '=' => ViewerCommand::ZoomIn,
            '-' => ViewerCommand::ZoomOut,
            '0' => ViewerCommand::ResetZoom,
            '1' => ViewerCommand::GoTo(1),
            'f' | 'F' => ViewerCommand::ToggleFullscreen,
            'd' | 'D' => ViewerCommand::TogglePageStep,
            'r' | 'R' => ViewerCommand::Reload,
            'h' | 'H' | 'q' | 'Q' => ViewerCommand::Close,
            _ => return None,
        },
        _ => return None,
    };
    Some(command)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown viewer command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for ViewerCommand {
    type Err = UnknownCommand;

    /// Script tokens: `next`, `prev`, `goto:N`, `last`, `zoom-in`, `zoom-out`,
    /// `zoom:F`, `reset-zoom`, `fullscreen`, `exit-fullscreen`, `toggle-step`,
    /// `reload`, `close`
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let unknown = || UnknownCommand(token.to_string());

        if let Some((name, arg)) = token.split_once(':') {
            return match name {
                "goto" => arg
                    .trim()
                    .parse::<usize>()
                    .map(ViewerCommand::GoTo)
                    .map_err(|_| unknown()),
                "zoom" => match arg.trim().parse::<f32>() {
                    Ok(factor) if factor.is_finite() && factor > 0.0 => {
                        Ok(ViewerCommand::Zoom(factor))
                    }
                    _ => Err(unknown()),
                },
                _ => Err(unknown()),
            };
        }

        match token {
            "next" => Ok(ViewerCommand::Next),
            "prev" => Ok(ViewerCommand::Prev),
            "last" => Ok(ViewerCommand::Last),
            "zoom-in" => Ok(ViewerCommand::ZoomIn),
            "zoom-out" => Ok(ViewerCommand::ZoomOut),
            "reset-zoom" => Ok(ViewerCommand::ResetZoom),
            "fullscreen" => Ok(ViewerCommand::ToggleFullscreen),
            "exit-fullscreen" => Ok(ViewerCommand::ExitFullscreen),
            "toggle-step" => Ok(ViewerCommand::TogglePageStep),
            "reload" => Ok(ViewerCommand::Reload),
            "close" => Ok(ViewerCommand::Close),
            _ => Err(unknown()),
        }
    }
}

/// Parse a comma or whitespace separated command list
pub fn parse_script(script: &str) -> Result<Vec<ViewerCommand>, UnknownCommand> {
    script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::parse)
        .collect()
}
