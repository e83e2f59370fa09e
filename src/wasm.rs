//! JavaScript-facing wrapper around [`Game`].

use wasm_bindgen::prelude::*;

use crate::game::Game;

/// One game instance owned by the JS side.
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { inner: Game::new() }
    }

    /// Legal cells for the player to move (may repeat). Empty once the game is over.
    #[wasm_bindgen(js_name = computeAvailableMoves)]
    pub fn compute_available_moves(&mut self) -> Vec<u8> {
        self.inner
            .legal_moves()
            .into_iter()
            .map(|pos| pos as u8)
            .collect()
    }

    #[wasm_bindgen(js_name = isValidMove)]
    pub fn is_valid_move(&mut self, pos: u32) -> bool {
        self.inner.legal_moves().contains(&(pos as usize))
    }

    /// Applies a placement and returns the captured cells. Positions past the
    /// board are refused, not truncated.
    #[wasm_bindgen(js_name = makeMove)]
    pub fn make_move(&mut self, pos: u32) -> Result<Vec<u8>, JsValue> {
        let outcome = self
            .inner
            .submit(pos as usize)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(outcome.flipped.into_iter().map(|p| p as u8).collect())
    }

    /// Checks whether the player to move is stuck and ends the game if so.
    #[wasm_bindgen(js_name = isGameOver)]
    pub fn is_game_over(&mut self) -> bool {
        self.inner.check_terminal().is_some()
    }

    /// `[player1, player2]`.
    pub fn score(&self) -> Vec<u8> {
        let score = self.inner.board().score();
        vec![score.player1, score.player2]
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Full snapshot as a plain JS object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.to_snapshot()).map_err(JsValue::from)
    }

    /// Final result, or `undefined` while the game is running.
    pub fn result(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.to_game_result()).map_err(JsValue::from)
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
