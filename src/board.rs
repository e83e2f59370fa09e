use std::fmt;

use tracing::{debug, instrument, trace};

use crate::error::MoveError;
use crate::types::{Cell, MoveOutcome, Player, Score};

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
/// Placements 0..=3 form the opening phase.
pub const OPENING_TURNS: u8 = 4;

/// The four center cells, row-major: top-left, top-right, bottom-left, bottom-right.
pub const OPENING_POSITIONS: [usize; 4] = opening_positions();

/// Clockwise from north-west, as (row, col) deltas.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

const fn opening_positions() -> [usize; 4] {
    let upper = (NUM_SQUARES - BOARD_SIZE) / 2;
    let lower = (NUM_SQUARES + BOARD_SIZE) / 2;
    [upper - 1, upper, lower - 1, lower]
}

/// Reversi board state.
///
/// Starts empty with player one to move. The first four placements must fill
/// the center and never capture; afterwards a placement is legal only if it
/// closes a line of opponent tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Cell; NUM_SQUARES],
    current_player: Player,
    turn: u8,
    /// Occupied positions in placement order. Bounds the move search.
    active_tiles: Vec<usize>,
    /// Legal set cached for the current turn; cleared on every mutation.
    available: Option<Vec<usize>>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; NUM_SQUARES],
            current_player: Player::One,
            turn: 0,
            active_tiles: Vec::with_capacity(NUM_SQUARES),
            available: None,
        }
    }

    /// Builds a board from an explicit layout, e.g. to set up a mid-game position.
    /// Active tiles are taken in index order.
    ///
    /// Every placement fills exactly one cell, so `turn` is capped at the number
    /// of occupied cells. A sparse layout needs at least four tiles to count as
    /// past the opening.
    pub fn from_cells(cells: [Cell; NUM_SQUARES], current_player: Player, turn: u8) -> Self {
        let active_tiles: Vec<usize> = (0..NUM_SQUARES)
            .filter(|&pos| !cells[pos].is_empty())
            .collect();
        Self {
            turn: turn.min(active_tiles.len() as u8),
            cells,
            current_player,
            active_tiles,
            available: None,
        }
    }

    /// Replays placements from the empty board, validating each one.
    pub fn from_moves(moves: &[usize]) -> Result<Self, MoveError> {
        let mut board = Self::new();
        for &pos in moves {
            board.apply_move_checked(pos)?;
        }
        Ok(board)
    }

    /// Back to the empty starting state. Any legal set computed before is stale.
    #[instrument(skip(self), fields(turn = self.turn))]
    pub fn reset(&mut self) {
        debug!("resetting board");
        *self = Self::new();
    }

    pub fn cell(&self, pos: usize) -> Option<Cell> {
        self.cells.get(pos).copied()
    }

    pub fn cells(&self) -> &[Cell; NUM_SQUARES] {
        &self.cells
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn turn(&self) -> u8 {
        self.turn
    }

    pub fn active_tiles(&self) -> &[usize] {
        &self.active_tiles
    }

    pub fn is_opening(&self) -> bool {
        self.turn < OPENING_TURNS
    }

    /// Legal placements for the player to move. Pure; see [`Board::legal_moves`]
    /// for the cached variant.
    ///
    /// Contract:
    /// - Opening phase: the empty center cells, nothing else.
    /// - Afterwards: every empty cell reached by a ray that starts at one of the
    ///   mover's tiles and crosses at least one opponent tile.
    /// - The same cell may appear more than once.
    pub fn compute_available_moves(&self) -> Vec<usize> {
        if self.is_opening() {
            return OPENING_POSITIONS
                .into_iter()
                .filter(|&pos| self.cells[pos].is_empty())
                .collect();
        }

        let me = self.current_player;
        let mut moves = Vec::new();
        for &origin in &self.active_tiles {
            if self.cells[origin] != Cell::Occupied(me) {
                continue;
            }
            for dir in DIRECTIONS {
                if let Some(target) = self.scan_ray(origin, dir, me) {
                    trace!(origin, target, "candidate move");
                    moves.push(target);
                }
            }
        }
        moves
    }

    /// Legal set for this turn, computed once and reused until the next mutation.
    pub fn legal_moves(&mut self) -> &[usize] {
        if self.available.is_none() {
            self.available = Some(self.compute_available_moves());
        }
        self.available.as_deref().unwrap_or_default()
    }

    /// Membership test against this turn's legal set.
    pub fn is_valid_move(&mut self, pos: usize) -> bool {
        is_valid_move(pos, self.legal_moves())
    }

    /// Validates `pos` and applies it.
    ///
    /// Checks run in order: range, occupancy, legality for this turn. On error
    /// nothing changes.
    #[instrument(skip(self), fields(player = ?self.current_player, turn = self.turn))]
    pub fn apply_move_checked(&mut self, pos: usize) -> Result<MoveOutcome, MoveError> {
        if pos >= NUM_SQUARES {
            return Err(MoveError::OutOfRange { position: pos });
        }
        if !self.cells[pos].is_empty() {
            return Err(MoveError::OccupiedCell { position: pos });
        }
        let legal = match &self.available {
            Some(moves) => is_valid_move(pos, moves),
            None => is_valid_move(pos, &self.compute_available_moves()),
        };
        if !legal {
            return Err(MoveError::NotALegalMove { position: pos });
        }

        Ok(self.apply_move_unchecked(pos))
    }

    /// Places a tile and captures without validation.
    ///
    /// Caller contract: `pos` comes from a legal set computed for this turn.
    pub fn apply_move_unchecked(&mut self, pos: usize) -> MoveOutcome {
        let me = self.current_player;
        self.available = None;
        self.cells[pos] = Cell::Occupied(me);
        self.active_tiles.push(pos);

        let mut flipped = Vec::new();
        if !self.is_opening() {
            for dir in DIRECTIONS {
                flipped.extend(self.capture_ray(pos, dir, me));
            }
            for &captured in &flipped {
                self.cells[captured] = Cell::Occupied(me);
            }
        }

        debug!(pos, player = ?me, flips = flipped.len(), "placed tile");
        self.turn += 1;
        self.current_player = me.opponent();

        MoveOutcome {
            position: pos,
            player: me,
            flipped,
        }
    }

    pub fn score(&self) -> Score {
        self.cells
            .iter()
            .fold(Score::default(), |mut score, cell| {
                match cell {
                    Cell::Occupied(Player::One) => score.player1 += 1,
                    Cell::Occupied(Player::Two) => score.player2 += 1,
                    Cell::Empty => {}
                }
                score
            })
    }

    pub fn empty_count(&self) -> u8 {
        let score = self.score();
        NUM_SQUARES as u8 - score.player1 - score.player2
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=player one, 2=player two.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (code, cell) in board.iter_mut().zip(self.cells.iter()) {
            *code = cell.code();
        }
        board
    }

    /// `ACTIVE: 27 28 36 35` diagnostics line.
    pub fn active_line(&self) -> String {
        index_line("ACTIVE:", &self.active_tiles)
    }

    /// Walks from `origin` looking for the empty cell that closes a line of
    /// opponent tiles. Opponent tiles on the first or last column end the ray.
    fn scan_ray(&self, origin: usize, dir: (i32, i32), me: Player) -> Option<usize> {
        let opp = me.opponent();
        let mut crossed = false;
        let mut pos = origin;

        while let Some(next) = step(pos, dir) {
            pos = next;
            match self.cells[pos] {
                Cell::Empty => return crossed.then_some(pos),
                Cell::Occupied(owner) if owner == opp => {
                    if is_edge_column(pos) {
                        return None;
                    }
                    crossed = true;
                }
                Cell::Occupied(_) => return None,
            }
        }
        None
    }

    /// Opponent cells strictly between `origin` and the next own tile along `dir`.
    /// Empty when the ray leaves the board or meets an empty cell first.
    fn capture_ray(&self, origin: usize, dir: (i32, i32), me: Player) -> Vec<usize> {
        let mut line = Vec::new();
        let mut pos = origin;

        while let Some(next) = step(pos, dir) {
            pos = next;
            match self.cells[pos] {
                Cell::Empty => break,
                Cell::Occupied(owner) if owner == me => return line,
                Cell::Occupied(_) => line.push(pos),
            }
        }
        Vec::new()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw cell codes, one row per line.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(BOARD_SIZE) {
            for cell in row {
                write!(f, "{} ", cell.code())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn is_valid_move(pos: usize, moves: &[usize]) -> bool {
    moves.contains(&pos)
}

/// `MOVES: 19 26 37 44` diagnostics line.
pub fn moves_line(moves: &[usize]) -> String {
    index_line("MOVES:", moves)
}

/// Algebraic name of a cell: column letter `a`..`h`, row number `1`..`8` from the top.
pub fn str_coord(pos: usize) -> String {
    if pos >= NUM_SQUARES {
        return "--".into();
    }
    let (row, col) = pos_to_row_col(pos);
    format!("{}{}", (b'a' + col as u8) as char, row + 1)
}

/// Parses `d4`-style names (any case) or a raw index `0`..`63`.
pub fn parse_coord(s: &str) -> Option<usize> {
    let s = s.trim();
    if let Ok(index) = s.parse::<usize>() {
        return (index < NUM_SQUARES).then_some(index);
    }

    let bytes = s.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let col = bytes[0].to_ascii_lowercase().checked_sub(b'a')? as i32;
    let row = bytes[1].checked_sub(b'1')? as i32;
    in_bounds(row, col).then(|| row_col_to_pos(row, col))
}

/// One step along `dir`, or `None` if it would leave the board. Stepping off
/// the side of a row never wraps onto the neighbouring row.
fn step(pos: usize, (dr, dc): (i32, i32)) -> Option<usize> {
    let (row, col) = pos_to_row_col(pos);
    let (r, c) = (row + dr, col + dc);
    in_bounds(r, c).then(|| row_col_to_pos(r, c))
}

fn is_edge_column(pos: usize) -> bool {
    let col = pos % BOARD_SIZE;
    col == 0 || col == BOARD_SIZE - 1
}

fn index_line(label: &str, positions: &[usize]) -> String {
    let mut line = String::from(label);
    for pos in positions {
        line.push(' ');
        line.push_str(&pos.to_string());
    }
    line
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn row_col_to_pos(row: i32, col: i32) -> usize {
    row as usize * BOARD_SIZE + col as usize
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(row: usize, col: usize) -> usize {
        row * BOARD_SIZE + col
    }

    fn sorted(mut moves: Vec<usize>) -> Vec<usize> {
        moves.sort_unstable();
        moves.dedup();
        moves
    }

    fn layout(tiles: &[(usize, Player)]) -> [Cell; NUM_SQUARES] {
        let mut cells = [Cell::Empty; NUM_SQUARES];
        for &(pos, player) in tiles {
            cells[pos] = Cell::Occupied(player);
        }
        cells
    }

    /// Inert g8/h8 tiles that lift a sparse layout's turn count past the opening.
    const PADDING: [(usize, Player); 2] = [(62, Player::One), (63, Player::One)];

    /// Canonical start: player one on e4/d5, player two on d4/e5.
    fn standard_start() -> Board {
        Board::from_moves(&[28, 27, 35, 36]).unwrap()
    }

    #[test]
    fn opening_positions_are_the_center_cells() {
        assert_eq!(OPENING_POSITIONS, [idx(3, 3), idx(3, 4), idx(4, 3), idx(4, 4)]);
        assert_eq!(Board::new().compute_available_moves(), vec![27, 28, 35, 36]);
    }

    #[test]
    fn opening_moves_shrink_as_center_fills() {
        let mut board = Board::new();
        board.apply_move_checked(27).unwrap();

        assert_eq!(board.compute_available_moves(), vec![28, 35, 36]);
        assert_eq!(board.current_player(), Player::Two);
        assert_eq!(board.turn(), 1);
    }

    #[test]
    fn opening_placements_never_capture() {
        let board = Board::from_moves(&[27, 28, 36, 35]).unwrap();

        let score = board.score();
        assert_eq!((score.player1, score.player2), (2, 2));
        assert_eq!(board.cell(27), Some(Cell::Occupied(Player::One)));
        assert_eq!(board.cell(36), Some(Cell::Occupied(Player::One)));
        assert_eq!(board.cell(28), Some(Cell::Occupied(Player::Two)));
        assert_eq!(board.cell(35), Some(Cell::Occupied(Player::Two)));
        assert_eq!(board.turn(), 4);
        assert_eq!(board.active_tiles(), &[27, 28, 36, 35]);
    }

    #[test]
    fn standard_start_moves_for_player_one() {
        let board = standard_start();

        assert_eq!(board.current_player(), Player::One);
        assert_eq!(sorted(board.compute_available_moves()), vec![19, 26, 37, 44]);
    }

    #[test]
    fn capture_flips_only_the_sandwiched_tile() {
        let mut board = standard_start();

        let outcome = board.apply_move_checked(idx(3, 2)).unwrap();

        assert_eq!(outcome.flipped, vec![27]);
        assert_eq!(outcome.player, Player::One);
        assert_eq!(board.score(), Score { player1: 4, player2: 1 });
        assert_eq!(board.cell(36), Some(Cell::Occupied(Player::Two)));
    }

    #[test]
    fn capture_runs_in_several_directions_at_once() {
        // Three separate lines close on d4.
        let cells = layout(&[
            (idx(3, 1), Player::One),
            (idx(3, 2), Player::Two),
            (idx(1, 3), Player::One),
            (idx(2, 3), Player::Two),
            (idx(5, 5), Player::One),
            (idx(4, 4), Player::Two),
        ]);
        let mut board = Board::from_cells(cells, Player::One, 10);

        let outcome = board.apply_move_checked(idx(3, 3)).unwrap();

        let mut flipped = outcome.flipped.clone();
        flipped.sort_unstable();
        assert_eq!(flipped, vec![idx(2, 3), idx(3, 2), idx(4, 4)]);
        assert_eq!(board.score(), Score { player1: 7, player2: 0 });
    }

    #[test]
    fn longer_lines_flip_every_tile_between() {
        let cells = layout(&[
            (idx(2, 1), Player::One),
            (idx(2, 2), Player::Two),
            (idx(2, 3), Player::Two),
            (idx(2, 4), Player::Two),
        ]);
        let mut board = Board::from_cells(cells, Player::One, 4);

        assert_eq!(board.compute_available_moves(), vec![idx(2, 5)]);
        let outcome = board.apply_move_checked(idx(2, 5)).unwrap();
        assert_eq!(outcome.flipped, vec![idx(2, 4), idx(2, 3), idx(2, 2)]);
    }

    #[test]
    fn ray_does_not_wrap_onto_next_row() {
        // h3 (own) then a4 (opponent): index + 1 would reach a4 and then b4.
        let cells = layout(&[
            (idx(2, 7), Player::One),
            (idx(3, 0), Player::Two),
            PADDING[0],
            PADDING[1],
        ]);
        let mut board = Board::from_cells(cells, Player::One, 4);

        assert!(board.compute_available_moves().is_empty());
        assert_eq!(
            board.apply_move_checked(idx(3, 1)),
            Err(MoveError::NotALegalMove { position: idx(3, 1) })
        );
    }

    #[test]
    fn capture_does_not_wrap_onto_previous_row() {
        let cells = layout(&[
            (idx(2, 7), Player::One),
            (idx(3, 0), Player::Two),
            PADDING[0],
            PADDING[1],
        ]);
        let mut board = Board::from_cells(cells, Player::One, 4);
        assert!(!board.is_opening());

        let outcome = board.apply_move_unchecked(idx(3, 1));

        assert!(outcome.flipped.is_empty());
        assert_eq!(board.cell(idx(3, 0)), Some(Cell::Occupied(Player::Two)));
    }

    #[test]
    fn opponent_on_edge_column_ends_the_search() {
        // a1 own, a2 opponent, a3 empty: the vertical line runs along column 0.
        let cells = layout(&[
            (idx(0, 0), Player::One),
            (idx(1, 0), Player::Two),
            PADDING[0],
            PADDING[1],
        ]);
        let board = Board::from_cells(cells, Player::One, 4);

        assert!(board.compute_available_moves().is_empty());
    }

    #[test]
    fn duplicates_are_kept_when_two_rays_reach_one_cell() {
        // Both own tiles reach (2,2) through a different opponent tile.
        let cells = layout(&[
            (idx(2, 4), Player::One),
            (idx(2, 3), Player::Two),
            (idx(4, 2), Player::One),
            (idx(3, 2), Player::Two),
        ]);
        let board = Board::from_cells(cells, Player::One, 8);

        let moves = board.compute_available_moves();
        assert_eq!(moves.iter().filter(|&&m| m == idx(2, 2)).count(), 2);
    }

    #[test]
    fn turn_is_capped_by_the_occupied_cells() {
        let mut board = Board::from_cells(*standard_start().cells(), Player::One, 64);
        assert_eq!(board.turn(), 4);

        while let Some(pos) = board.legal_moves().first().copied() {
            board.apply_move_checked(pos).unwrap();
            assert_eq!(board.turn() as usize + board.empty_count() as usize, NUM_SQUARES);
        }
        assert!(board.turn() as usize <= NUM_SQUARES);
    }

    #[test]
    fn checked_move_rejects_bad_input_without_mutating() {
        let mut board = standard_start();
        let before = board.clone();

        assert_eq!(
            board.apply_move_checked(64),
            Err(MoveError::OutOfRange { position: 64 })
        );
        assert_eq!(
            board.apply_move_checked(27),
            Err(MoveError::OccupiedCell { position: 27 })
        );
        assert_eq!(
            board.apply_move_checked(0),
            Err(MoveError::NotALegalMove { position: 0 })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn cached_legal_set_is_dropped_after_a_move() {
        let mut board = standard_start();
        assert!(board.is_valid_move(19));

        board.apply_move_checked(19).unwrap();

        // Player two's moves, not player one's stale set.
        assert!(!board.is_valid_move(19));
        assert_eq!(board.legal_moves().to_vec(), board.compute_available_moves());
    }

    #[test]
    fn reset_restores_the_empty_board() {
        let mut board = standard_start();
        board.legal_moves();
        board.reset();

        assert_eq!(board, Board::new());
        assert!(board.active_tiles().is_empty());
        assert_eq!(board.empty_count(), 64);
    }

    #[test]
    fn display_dumps_cell_codes() {
        let board = Board::from_moves(&[27]).unwrap();
        let dump = board.to_string();
        let lines: Vec<&str> = dump.lines().collect();

        assert_eq!(lines.len(), BOARD_SIZE);
        assert_eq!(lines[3], "0 0 0 1 0 0 0 0 ");
        assert_eq!(board.active_line(), "ACTIVE: 27");
        assert_eq!(moves_line(&[28, 35]), "MOVES: 28 35");
    }

    #[test]
    fn coordinates_round_trip_through_names() {
        assert_eq!(str_coord(0), "a1");
        assert_eq!(str_coord(27), "d4");
        assert_eq!(str_coord(63), "h8");
        assert_eq!(parse_coord("D4"), Some(27));
        assert_eq!(parse_coord(" 36 "), Some(36));
        assert_eq!(parse_coord("64"), None);
        assert_eq!(parse_coord("i1"), None);
        assert_eq!(parse_coord("a9"), None);
        assert_eq!(parse_coord(""), None);
    }
}
