//! Terminal rendering of a [`Board`].
//!
//! Two interchangeable renderers share one [`RenderConfig`]. The front end picks
//! one at startup through [`renderer_for`]; the engine never calls into here.

use std::path::Path;

use crossterm::style::{Color, Stylize};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::board::{BOARD_SIZE, Board, is_valid_move};
use crate::types::{Cell, Player};

/// Plain ASCII or ANSI-colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    Plain,
    #[default]
    Color,
}

/// Named terminal colors accepted in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Grey,
}

impl From<PaletteColor> for Color {
    fn from(color: PaletteColor) -> Self {
        match color {
            PaletteColor::Black => Color::Black,
            PaletteColor::Red => Color::Red,
            PaletteColor::Green => Color::Green,
            PaletteColor::Yellow => Color::Yellow,
            PaletteColor::Blue => Color::Blue,
            PaletteColor::Magenta => Color::Magenta,
            PaletteColor::Cyan => Color::Cyan,
            PaletteColor::White => Color::White,
            PaletteColor::Grey => Color::Grey,
        }
    }
}

/// Display settings handed to a renderer at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub style: RenderStyle,
    /// Mark the legal cells of the player to move.
    pub show_moves: bool,
    /// Column letters above the grid, row numbers on the left.
    pub show_coordinates: bool,
    pub player1_color: PaletteColor,
    pub player2_color: PaletteColor,
    pub highlight_color: PaletteColor,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style: RenderStyle::Color,
            show_moves: false,
            show_coordinates: true,
            player1_color: PaletteColor::Red,
            player2_color: PaletteColor::Cyan,
            highlight_color: PaletteColor::Yellow,
        }
    }
}

impl RenderConfig {
    /// Loads a config from a TOML file. Missing keys take their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("loading render config");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("failed to read config file: {e}")))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("failed to parse config: {e}")))
    }
}

/// Config loading failure.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("config error: {message}")]
pub struct ConfigError {
    pub message: String,
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns a board into printable text.
pub trait Renderer {
    /// `highlights` is the legal set to mark; it is ignored unless the config
    /// asks for it.
    fn render(&self, board: &Board, highlights: &[usize]) -> String;
}

/// `X` / `O` / `.` grid, `*` on highlighted cells.
#[derive(Debug, Clone)]
pub struct PlainRenderer {
    config: RenderConfig,
}

impl PlainRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl Renderer for PlainRenderer {
    fn render(&self, board: &Board, highlights: &[usize]) -> String {
        draw(&self.config, board, highlights, |cell, highlighted| {
            match cell {
                Cell::Occupied(Player::One) => "X",
                Cell::Occupied(Player::Two) => "O",
                Cell::Empty if highlighted => "*",
                Cell::Empty => ".",
            }
            .to_string()
        })
    }
}

/// Colored discs via ANSI escapes.
#[derive(Debug, Clone)]
pub struct ColorRenderer {
    config: RenderConfig,
}

impl ColorRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl Renderer for ColorRenderer {
    fn render(&self, board: &Board, highlights: &[usize]) -> String {
        let config = &self.config;
        draw(config, board, highlights, |cell, highlighted| match cell {
            Cell::Occupied(Player::One) => "●".with(config.player1_color.into()).to_string(),
            Cell::Occupied(Player::Two) => "●".with(config.player2_color.into()).to_string(),
            Cell::Empty if highlighted => "*".with(config.highlight_color.into()).to_string(),
            Cell::Empty => "·".dark_grey().to_string(),
        })
    }
}

/// Picks the renderer named by `config.style`.
pub fn renderer_for(config: RenderConfig) -> Box<dyn Renderer> {
    match config.style {
        RenderStyle::Plain => Box::new(PlainRenderer::new(config)),
        RenderStyle::Color => Box::new(ColorRenderer::new(config)),
    }
}

fn draw(
    config: &RenderConfig,
    board: &Board,
    highlights: &[usize],
    glyph: impl Fn(Cell, bool) -> String,
) -> String {
    let mut out = String::new();
    if config.show_coordinates {
        out.push_str("  ");
        for col in 0..BOARD_SIZE {
            out.push(char::from(b'a' + col as u8));
            out.push(' ');
        }
        out.push('\n');
    }

    for (row, cells) in board.cells().chunks(BOARD_SIZE).enumerate() {
        if config.show_coordinates {
            out.push_str(&format!("{} ", row + 1));
        }
        for (col, &cell) in cells.iter().enumerate() {
            let pos = row * BOARD_SIZE + col;
            let highlighted = config.show_moves && is_valid_move(pos, highlights);
            out.push_str(&glyph(cell, highlighted));
            out.push(' ');
        }
        out.push('\n');
    }
    out
}
