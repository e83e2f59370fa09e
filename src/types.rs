use serde::{Deserialize, Serialize};

/// One of the two sides. `One` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Wire code: 1 for `One`, 2 for `Two`.
    pub fn code(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.code())
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Player),
}

impl Cell {
    /// 0 = empty, 1 = player one, 2 = player two.
    pub fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Occupied(player) => player.code(),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Tile tally per player. Derived from the grid, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub player1: u8,
    pub player2: u8,
}

impl Score {
    pub fn of(&self, player: Player) -> u8 {
        match player {
            Player::One => self.player1,
            Player::Two => self.player2,
        }
    }

    /// `None` on a tie.
    pub fn leader(&self) -> Option<Player> {
        match self.player1.cmp(&self.player2) {
            std::cmp::Ordering::Greater => Some(Player::One),
            std::cmp::Ordering::Less => Some(Player::Two),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// What a successful placement did to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub position: usize,
    pub player: Player,
    /// Captured cells, in ray order. Always empty during the opening phase.
    pub flipped: Vec<usize>,
}

/// Serializable view of a game handed to front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Row-major cell codes (see [`Cell::code`]).
    pub board: Vec<u8>,
    pub current_player: u8,
    pub turn: u8,
    pub player1_count: u8,
    pub player2_count: u8,
    pub is_game_over: bool,
    /// Contract:
    /// - Cells captured by the last placement (0..=63).
    /// - Empty before the first placement and after an opening-phase placement.
    pub flipped: Vec<u8>,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// 0 on a draw, otherwise the winner's code.
    pub winner: u8,
    pub player1_count: u8,
    pub player2_count: u8,
}

impl From<Score> for GameResult {
    fn from(score: Score) -> Self {
        Self {
            winner: score.leader().map_or(0, Player::code),
            player1_count: score.player1,
            player2_count: score.player2,
        }
    }
}
