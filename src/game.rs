use std::collections::VecDeque;

use tracing::{info, instrument, warn};

use crate::board::Board;
use crate::error::GameError;
use crate::types::{GameResult, GameSnapshot, MoveOutcome, Player, Score};

/// Consecutive rejected selections tolerated before a turn fails.
pub const DEFAULT_MAX_REJECTIONS: usize = 16;

/// Supplies the next placement for the player to move.
///
/// Contract:
/// - `legal` is non-empty and may contain duplicates.
/// - `None` means the source has nothing more to give (closed input, script
///   exhausted); the game stops with [`GameError::SourceExhausted`].
/// - A returned position is re-validated by the board, so a source is free to
///   pass along raw user input.
pub trait MoveSource {
    fn select_move(&mut self, board: &Board, player: Player, legal: &[usize]) -> Option<usize>;
}

/// Always plays the lowest-index legal cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSource;

impl MoveSource for FirstLegalMoveSource {
    fn select_move(&mut self, _board: &Board, _player: Player, legal: &[usize]) -> Option<usize> {
        legal.iter().copied().min()
    }
}

/// Plays a fixed sequence of positions, then reports exhaustion.
#[derive(Debug, Default, Clone)]
pub struct ScriptedSource {
    moves: VecDeque<usize>,
}

impl ScriptedSource {
    pub fn new(moves: impl IntoIterator<Item = usize>) -> Self {
        Self {
            moves: moves.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.moves.len()
    }
}

impl MoveSource for ScriptedSource {
    fn select_move(&mut self, _board: &Board, _player: Player, _legal: &[usize]) -> Option<usize> {
        self.moves.pop_front()
    }
}

/// Where the turn loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingMove,
    /// The player to move had no legal placement. Holds the final tally.
    Terminal(Score),
}

/// Result of a single [`Game::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    Moved(MoveOutcome),
    Finished(Score),
}

/// Drives one game: asks for a selection, applies it, repeats.
///
/// There is no pass. The game ends the moment the player to move has no legal
/// placement, whether or not the opponent could still move.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    phase: Phase,
    history: Vec<usize>,
    flipped: Vec<usize>,
    max_rejections: usize,
}

impl Game {
    pub fn new() -> Self {
        Self::with_max_rejections(DEFAULT_MAX_REJECTIONS)
    }

    pub fn with_max_rejections(max_rejections: usize) -> Self {
        Self {
            board: Board::new(),
            phase: Phase::AwaitingMove,
            history: Vec::new(),
            flipped: Vec::new(),
            max_rejections: max_rejections.max(1),
        }
    }

    /// Resumes from an arbitrary position, e.g. one built with
    /// [`Board::from_cells`]. `history` only records placements made from here on.
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            ..Self::new()
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    /// Placements made so far. Replaying them on an empty board rebuilds the game.
    pub fn history(&self) -> &[usize] {
        &self.history
    }

    /// Legal set for the player to move; empty once the game is over.
    pub fn legal_moves(&mut self) -> Vec<usize> {
        if self.is_over() {
            return Vec::new();
        }
        self.board.legal_moves().to_vec()
    }

    /// Enters `Terminal` if the player to move is stuck. Returns the final score
    /// once the game is over.
    pub fn check_terminal(&mut self) -> Option<Score> {
        if let Phase::Terminal(score) = self.phase {
            return Some(score);
        }
        if !self.board.legal_moves().is_empty() {
            return None;
        }

        let score = self.board.score();
        info!(
            player1 = score.player1,
            player2 = score.player2,
            turn = self.board.turn(),
            stuck = ?self.board.current_player(),
            "game over"
        );
        self.phase = Phase::Terminal(score);
        Some(score)
    }

    /// Applies one externally chosen placement through the checked path.
    #[instrument(skip(self))]
    pub fn submit(&mut self, pos: usize) -> Result<MoveOutcome, GameError> {
        if self.check_terminal().is_some() {
            return Err(GameError::GameOver);
        }
        let outcome = self.board.apply_move_checked(pos)?;
        self.history.push(pos);
        self.flipped.clone_from(&outcome.flipped);
        Ok(outcome)
    }

    /// Runs one turn: terminate, or obtain a selection and apply it.
    ///
    /// A rejected selection is logged and the source is asked again, up to the
    /// configured limit.
    pub fn step(&mut self, source: &mut dyn MoveSource) -> Result<Turn, GameError> {
        if let Some(score) = self.check_terminal() {
            return Ok(Turn::Finished(score));
        }

        let player = self.board.current_player();
        let legal = self.board.legal_moves().to_vec();
        for _ in 0..self.max_rejections {
            let selection = source
                .select_move(&self.board, player, &legal)
                .ok_or(GameError::SourceExhausted)?;
            match self.submit(selection) {
                Ok(outcome) => return Ok(Turn::Moved(outcome)),
                Err(GameError::Move(err)) => {
                    warn!(%err, position = err.position(), ?player, "selection rejected")
                }
                Err(err) => return Err(err),
            }
        }

        Err(GameError::TooManyRejections {
            attempts: self.max_rejections,
        })
    }

    /// Plays to the end. `before_move` sees the board and the legal set at the
    /// start of every turn that still has a move to make; a front end renders
    /// from there.
    pub fn play(
        &mut self,
        source: &mut dyn MoveSource,
        mut before_move: impl FnMut(&Board, &[usize]),
    ) -> Result<Score, GameError> {
        loop {
            let legal = self.legal_moves();
            if !legal.is_empty() {
                before_move(&self.board, &legal);
            }
            if let Turn::Finished(score) = self.step(source)? {
                return Ok(score);
            }
        }
    }

    /// Drops every placement and starts over from the empty board.
    pub fn reset(&mut self) {
        self.board.reset();
        self.phase = Phase::AwaitingMove;
        self.history.clear();
        self.flipped.clear();
    }

    pub fn to_snapshot(&self) -> GameSnapshot {
        let score = self.board.score();
        GameSnapshot {
            board: self.board.to_array().to_vec(),
            current_player: self.board.current_player().code(),
            turn: self.board.turn(),
            player1_count: score.player1,
            player2_count: score.player2,
            is_game_over: self.is_over(),
            flipped: self.flipped.iter().map(|&pos| pos as u8).collect(),
        }
    }

    /// `None` until the game is over.
    pub fn to_game_result(&self) -> Option<GameResult> {
        match self.phase {
            Phase::Terminal(score) => Some(score.into()),
            Phase::AwaitingMove => None,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
