//! Line-oriented move source for human players.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::board::{Board, is_valid_move, parse_coord, str_coord};
use crate::game::MoveSource;
use crate::types::Player;

/// Reads one placement per line (`d3` or a raw index) and re-asks until the
/// answer is one of the legal cells. `quit` or end of input yields `None`.
pub struct LineSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, player: Player, legal: &[usize]) -> std::io::Result<Option<usize>> {
        let mut names: Vec<String> = legal.iter().map(|&pos| str_coord(pos)).collect();
        names.sort_unstable();
        names.dedup();

        loop {
            write!(self.output, "{player} to move [{}]: ", names.join(" "))?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("quit") {
                return Ok(None);
            }

            match parse_coord(answer) {
                Some(pos) if is_valid_move(pos, legal) => return Ok(Some(pos)),
                Some(pos) => writeln!(self.output, "{} is not a legal move", str_coord(pos))?,
                None => writeln!(self.output, "could not read {answer:?}, try e.g. d3")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> MoveSource for LineSource<R, W> {
    fn select_move(&mut self, _board: &Board, player: Player, legal: &[usize]) -> Option<usize> {
        match self.ask(player, legal) {
            Ok(selection) => selection,
            Err(err) => {
                debug!(%err, "input closed");
                None
            }
        }
    }
}
