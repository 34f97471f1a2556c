//! PGN replay: walks the main line of a game on a single board and records
//! per-ply notation, positions, captures and check flags.

use std::ops::ControlFlow;
use std::sync::LazyLock;

use pgn_reader::{RawTag, Reader, SanPlus, Skip, Visitor};
use regex::Regex;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Piece, Position};

use crate::error::PgnError;
use crate::game_data::{GameMetadata, HalfMove, MoveRecord, ReplayedGame};

/// Replay the first game in `pgn` and pair its plies into move records.
///
/// Fails on empty input, unreadable PGN, a game without moves, or any move token
/// that is not SAN or is illegal in the position it is played from. Nothing partial is returned.
pub fn replay_pgn(pgn: &str) -> Result<ReplayedGame, PgnError> {
    if pgn.trim().is_empty() {
        return Err(PgnError::Empty);
    }

    let mut replayer = Replayer {
        unreadable: first_unreadable(pgn),
    };
    let mut reader = Reader::new(pgn.as_bytes());
    reader.read_game(&mut replayer)?.ok_or(PgnError::NoGame)?
}

/// A main-line token that is not SAN, and the ply it occupies.
#[derive(Debug)]
struct UnreadableToken {
    ply: usize,
    token: String,
}

impl UnreadableToken {
    fn into_error(self) -> PgnError {
        PgnError::IllegalMove {
            ply: self.ply,
            san: self.token,
            reason: "not a move in standard algebraic notation".to_string(),
        }
    }
}

/// Tags collected during header parsing.
#[derive(Default)]
struct Headers {
    metadata: GameMetadata,
    fen: Option<String>,
}

/// Board and records for the game being replayed.
struct Replay {
    board: Chess,
    metadata: GameMetadata,
    number: u32,
    ply: usize,
    pending_white: Option<HalfMove>,
    moves: Vec<MoveRecord>,
    unreadable: Option<UnreadableToken>,
}

impl Replay {
    fn new(board: Chess, metadata: GameMetadata, unreadable: Option<UnreadableToken>) -> Self {
        Self {
            board,
            metadata,
            number: 1,
            ply: 0,
            pending_white: None,
            moves: Vec::new(),
            unreadable,
        }
    }

    /// The reader never reports a token it cannot parse, so the move it hands us
    /// at that ply is really the one after it.
    fn check_readable(&mut self) -> Result<(), PgnError> {
        match self.unreadable.take() {
            Some(bad) if bad.ply == self.ply => Err(bad.into_error()),
            other => {
                self.unreadable = other;
                Ok(())
            }
        }
    }

    fn play(&mut self, san_plus: &SanPlus) -> Result<(), PgnError> {
        self.ply += 1;
        self.check_readable()?;

        let mv = san_plus
            .san
            .to_move(&self.board)
            .map_err(|e| PgnError::IllegalMove {
                ply: self.ply,
                san: san_plus.to_string(),
                reason: e.to_string(),
            })?;

        let mover = self.board.turn();
        let captured = mv.capture().map(|role| {
            Piece { color: !mover, role }.char().to_string()
        });
        let mut san = San::from_move(&self.board, mv.clone()).to_string();
        let uci = mv.to_uci(CastlingMode::Standard).to_string();

        self.board.play_unchecked(mv);

        let is_checkmate = self.board.is_checkmate();
        let is_check = self.board.is_check();
        if is_checkmate {
            san.push('#');
        } else if is_check {
            san.push('+');
        }

        let half = HalfMove {
            san,
            uci,
            fen: fen_of(&self.board),
            captured,
            is_check,
            is_checkmate,
        };

        match mover {
            Color::White => self.pending_white = Some(half),
            Color::Black => {
                let white = self.pending_white.take().ok_or_else(|| {
                    PgnError::InvalidSetup(format!(
                        "black moved at ply {} without a preceding white move",
                        self.ply
                    ))
                })?;
                self.moves.push(MoveRecord::new(self.number, white, Some(half)));
                self.number += 1;
            }
        }

        Ok(())
    }

    fn finish(mut self) -> Result<ReplayedGame, PgnError> {
        if let Some(bad) = self.unreadable.take() {
            return Err(bad.into_error());
        }

        if let Some(white) = self.pending_white.take() {
            self.moves.push(MoveRecord::new(self.number, white, None));
        }

        if self.moves.is_empty() {
            return Err(PgnError::NoMoves);
        }

        Ok(ReplayedGame {
            moves: self.moves,
            metadata: self.metadata,
        })
    }
}

/// Visitor for the first game; per-game state lives in [`Replay`].
struct Replayer {
    unreadable: Option<UnreadableToken>,
}

impl Visitor for Replayer {
    type Tags = Headers;
    type Movetext = Replay;
    type Output = Result<ReplayedGame, PgnError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Headers> {
        ControlFlow::Continue(Headers::default())
    }

    fn tag(
        &mut self,
        tags: &mut Headers,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let value = value.decode_utf8_lossy().trim().to_string();
        if value.is_empty() {
            return ControlFlow::Continue(());
        }

        let meta = &mut tags.metadata;
        match name {
            b"Opening" => meta.opening_name = Some(value),
            b"Result" => meta.result = Some(value),
            b"White" => meta.white_player = Some(value),
            b"Black" => meta.black_player = Some(value),
            b"Date" => meta.date = Some(value),
            b"FEN" => tags.fen = Some(value),
            _ => {}
        }
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Headers) -> ControlFlow<Self::Output, Replay> {
        let board = match tags.fen.as_deref().map(starting_position) {
            None => Chess::default(),
            Some(Ok(board)) => board,
            Some(Err(e)) => return ControlFlow::Break(Err(e)),
        };
        ControlFlow::Continue(Replay::new(board, tags.metadata, self.unreadable.take()))
    }

    fn begin_variation(&mut self, _replay: &mut Replay) -> ControlFlow<Self::Output, Skip> {
        // Main line only.
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, replay: &mut Replay, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        match replay.play(&san_plus) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn end_game(&mut self, replay: Replay) -> Self::Output {
        replay.finish()
    }
}

/// Board for a `[FEN "..."]` header. Records open with White, so the side to move must be White.
fn starting_position(fen: &str) -> Result<Chess, PgnError> {
    let parsed: Fen = fen
        .parse()
        .map_err(|e| PgnError::InvalidSetup(format!("invalid FEN '{fen}': {e}")))?;
    let board: Chess = parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| PgnError::InvalidSetup(format!("illegal FEN '{fen}': {e}")))?;

    if board.turn() == Color::Black {
        return Err(PgnError::InvalidSetup(
            "games starting with Black to move are not supported".to_string(),
        ));
    }
    Ok(board)
}

fn fen_of(board: &Chess) -> String {
    Fen::from_position(board, EnPassantMode::Legal).to_string()
}

/// First main-line token of the first game that does not parse as SAN.
fn first_unreadable(pgn: &str) -> Option<UnreadableToken> {
    main_line_tokens(pgn)
        .into_iter()
        .enumerate()
        .find(|(_, token)| SanPlus::from_ascii(token.as_bytes()).is_err())
        .map(|(idx, token)| UnreadableToken { ply: idx + 1, token })
}

/// Move tokens of the first game's main line, one per ply. Comments, variations,
/// move numbers, NAGs and annotation glyphs are dropped; the result token ends the game.
fn main_line_tokens(pgn: &str) -> Vec<String> {
    let movetext = pgn
        .lines()
        .skip_while(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('[') || line.starts_with('%')
        })
        .take_while(|line| !line.trim_start().starts_with('['))
        .filter(|line| !line.starts_with('%'))
        .collect::<Vec<_>>()
        .join("\n");

    let mut text = comment_regex().replace_all(&movetext, " ").into_owned();
    // Innermost variations first, until none are left.
    while variation_regex().is_match(&text) {
        text = variation_regex().replace_all(&text, " ").into_owned();
    }
    let text = noise_regex().replace_all(&text, " ");

    text.split_whitespace()
        .take_while(|token| !matches!(*token, "1-0" | "0-1" | "1/2-1/2" | "*"))
        .map(str::to_string)
        .collect()
}

fn comment_regex() -> &'static Regex {
    static COMMENT: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\{[^}]*\}|;[^\n]*").unwrap()
    });
    &COMMENT
}

fn variation_regex() -> &'static Regex {
    static VARIATION: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\([^()]*\)").unwrap()
    });
    &VARIATION
}

/// Move numbers (`12.`, `12...`), NAGs (`$1`), glyphs (`!?`) and stray parentheses.
fn noise_regex() -> &'static Regex {
    static NOISE: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b\d+\.+|\$\d+|[!?]+|[()]").unwrap()
    });
    &NOISE
}
