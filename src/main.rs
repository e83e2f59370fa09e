//! Terminal front end for the Reversi engine.
//!
//! - `reversi` / `reversi play` - two humans at one keyboard
//! - `reversi replay d4 e4 e5 d5 c4` - play a fixed list of moves
//! - `reversi demo` - step through the opening with raw board dumps

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reversi_engine::board::{Board, moves_line, parse_coord};
use reversi_engine::game::{Game, MoveSource, ScriptedSource};
use reversi_engine::prompt::LineSource;
use reversi_engine::render::{RenderConfig, RenderStyle, Renderer, renderer_for};
use reversi_engine::types::Score;

/// Reversi on an 8x8 board
#[derive(Parser)]
#[command(name = "reversi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Render without colors
    #[arg(long, global = true)]
    plain: bool,

    /// Highlight the legal cells before each move
    #[arg(long, global = true)]
    show_moves: bool,

    /// TOML file with render settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively, reading moves from stdin
    Play,
    /// Play a fixed list of moves (`d3` or raw indices) and report the result
    Replay {
        #[arg(required = true)]
        moves: Vec<String>,
    },
    /// Walk through the four opening placements, dumping the board each time
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Play) | None => {
            let stdin = io::stdin();
            let mut source = LineSource::new(stdin.lock(), io::stdout());
            run_game(&config, &mut source, &mut io::stdout())
        }
        Some(Commands::Replay { moves }) => {
            let positions = moves
                .iter()
                .map(|mv| parse_coord(mv).with_context(|| format!("bad move {mv:?}")))
                .collect::<Result<Vec<_>>>()?;
            let mut source = ScriptedSource::new(positions);
            run_game(&config, &mut source, &mut io::stdout())
        }
        Some(Commands::Demo) => run_demo(),
    }
}

fn load_config(cli: &Cli) -> Result<RenderConfig> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RenderConfig::default(),
    };
    if cli.plain {
        config.style = RenderStyle::Plain;
    }
    if cli.show_moves {
        config.show_moves = true;
    }
    Ok(config)
}

/// Plays one game, drawing the board before every move. The first failed
/// write stops further drawing and is reported once the game is over.
fn run_game(
    config: &RenderConfig,
    source: &mut dyn MoveSource,
    out: &mut dyn Write,
) -> Result<()> {
    let renderer = renderer_for(config.clone());
    let mut game = Game::new();
    let mut render_err: Option<io::Error> = None;

    let score = game
        .play(source, |board, legal| {
            if render_err.is_none() {
                render_err = write!(out, "\n{}", renderer.render(board, legal)).err();
            }
        })
        .context("game aborted")?;
    if let Some(err) = render_err {
        return Err(err).context("failed to draw the board");
    }

    print_final(renderer.as_ref(), game.board(), score, out)?;
    info!(moves = game.history().len(), "finished");
    Ok(())
}

fn print_final(
    renderer: &dyn Renderer,
    board: &Board,
    score: Score,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(out, "\n{}", renderer.render(board, &[]))?;
    writeln!(
        out,
        "{} has no legal move. Final score: {} - {}",
        board.current_player(),
        score.player1,
        score.player2
    )?;
    match score.leader() {
        Some(player) => writeln!(out, "{player} wins")?,
        None => writeln!(out, "Draw")?,
    }
    Ok(())
}

fn run_demo() -> Result<()> {
    let mut stdout = io::stdout().lock();
    let mut board = Board::new();

    write!(stdout, "{board}")?;
    writeln!(stdout, "{}", moves_line(board.legal_moves()))?;

    for pos in [27, 28, 36, 35] {
        board.apply_move_checked(pos)?;
        writeln!(stdout)?;
        write!(stdout, "{board}")?;
        writeln!(stdout, "{}", moves_line(board.legal_moves()))?;
        writeln!(stdout, "{}", board.active_line())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reversi_engine::game::FirstLegalMoveSource;

    /// Refuses every write.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn plain() -> RenderConfig {
        RenderConfig {
            style: RenderStyle::Plain,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn full_game_prints_the_final_score() {
        let mut out = Vec::new();
        run_game(&plain(), &mut FirstLegalMoveSource, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("has no legal move. Final score:"));
        assert!(text.trim_end().ends_with("wins") || text.trim_end().ends_with("Draw"));
    }

    #[test]
    fn draw_failure_is_returned_after_the_game() {
        let err = run_game(&plain(), &mut FirstLegalMoveSource, &mut ClosedPipe).unwrap_err();

        assert_eq!(err.to_string(), "failed to draw the board");
        assert_eq!(
            err.downcast_ref::<io::Error>().map(io::Error::kind),
            Some(io::ErrorKind::BrokenPipe)
        );
    }

    #[test]
    fn game_errors_win_over_draw_errors() {
        let mut source = ScriptedSource::new(vec![28]);
        let err = run_game(&plain(), &mut source, &mut ClosedPipe).unwrap_err();

        assert_eq!(err.to_string(), "game aborted");
    }
}
