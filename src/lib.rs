//! Reversi board engine.
//!
//! - [`board`] - grid state, legal-move search, placement and capture, scoring
//! - [`game`] - turn loop driven by an external [`game::MoveSource`]
//! - [`render`] - plain and colored text rendering for terminals
//! - [`prompt`] - line-based move source for human players
//! - [`wasm`] - JavaScript bindings
//!
//! ```
//! use reversi_engine::board::Board;
//!
//! let mut board = Board::new();
//! assert_eq!(board.compute_available_moves(), vec![27, 28, 35, 36]);
//! board.apply_move_checked(27).unwrap();
//! assert_eq!(board.score().player1, 1);
//! ```

use wasm_bindgen::prelude::*;

pub mod board;
pub mod error;
pub mod game;
pub mod prompt;
#[cfg(not(target_arch = "wasm32"))]
pub mod render;
pub mod types;
pub mod wasm;

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
