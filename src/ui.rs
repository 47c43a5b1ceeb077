use anyhow::Result;
use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal,
};
use std::io::{self, Write};

/// Per-frame status sink: timestamp, probed height and pressure level.
/// Keeps the render loop presentation-agnostic.
pub trait StatusReporter {
    fn report(&mut self, timestamp: &str, value_m: f32, level_mb: f32) -> Result<()>;
}

/// Writes a styled one-line status on the terminal's bottom row, leaving
/// the cursor where it was.
pub struct TerminalStatus {
    out: io::Stdout,
}

impl TerminalStatus {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for TerminalStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for TerminalStatus {
    fn report(&mut self, timestamp: &str, value_m: f32, level_mb: f32) -> Result<()> {
        let (_cols, rows) = terminal::size()?;
        queue!(
            self.out,
            cursor::SavePosition,
            cursor::MoveTo(0, rows.saturating_sub(1)),
            SetForegroundColor(Color::Rgb { r: 255, g: 255, b: 255 }),
            SetBackgroundColor(Color::Rgb { r: 25, g: 25, b: 0 }),
            Print(format!(
                "{timestamp} Geopotential Height: {value_m:.0}m Level: {level_mb:.0}mb    "
            )),
            ResetColor,
            cursor::RestorePosition,
        )?;
        self.out.flush()?;
        Ok(())
    }
}
