use serde::{Deserialize, Serialize};

/// Header fields surfaced alongside an analysis. Missing tags stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub opening_name: Option<String>,
    pub result: Option<String>, // "1-0", "0-1", "1/2-1/2", "*"
    pub white_player: Option<String>,
    pub black_player: Option<String>,
    pub date: Option<String>,
}

/// One side's ply, captured right after it was played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfMove {
    /// SAN including the `+`/`#` suffix.
    pub san: String,
    pub uci: String,
    /// Board serialization after this ply.
    pub fen: String,
    /// Piece letter of the captured piece (`"p"` for a black pawn, `"N"` for a white knight).
    pub captured: Option<String>,
    pub is_check: bool,
    pub is_checkmate: bool,
}

/// A white/black move pair. Black is absent only when the game ended on White's move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MoveRow", try_from = "MoveRow")]
pub struct MoveRecord {
    pub number: u32,
    pub white: HalfMove,
    pub black: Option<HalfMove>,
}

impl MoveRecord {
    pub fn new(number: u32, white: HalfMove, black: Option<HalfMove>) -> Self {
        Self { number, white, black }
    }

    /// Human-readable pair, e.g. `"12. Nf3 Nc6"` or `"40. Qh7#"`.
    pub fn full_move(&self) -> String {
        match &self.black {
            Some(black) => format!("{}. {} {}", self.number, self.white.san, black.san),
            None => format!("{}. {}", self.number, self.white.san),
        }
    }

    /// FEN after the last ply in this record.
    pub fn position_fen(&self) -> &str {
        self.black.as_ref().map_or(&self.white.fen, |b| &b.fen)
    }
}

/// Flat wire shape of a [`MoveRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MoveRow {
    number: u32,
    white: Option<String>,
    black: Option<String>,
    position_after_white: Option<String>,
    position_after_black: Option<String>,
    white_uci: Option<String>,
    black_uci: Option<String>,
    full_move: String,
    position_fen: String,
    captured_piece_white: Option<String>,
    captured_piece_black: Option<String>,
    #[serde(default)]
    is_check_white: bool,
    #[serde(default)]
    is_check_black: bool,
    #[serde(default)]
    is_checkmate_white: bool,
    #[serde(default)]
    is_checkmate_black: bool,
}

impl From<MoveRecord> for MoveRow {
    fn from(record: MoveRecord) -> Self {
        let full_move = record.full_move();
        let position_fen = record.position_fen().to_string();
        let MoveRecord { number, white, black } = record;
        let (black_is_check, black_is_checkmate) = black
            .as_ref()
            .map_or((false, false), |b| (b.is_check, b.is_checkmate));
        let (black_san, black_uci, black_fen, black_captured) = match black {
            Some(b) => (Some(b.san), Some(b.uci), Some(b.fen), b.captured),
            None => (None, None, None, None),
        };

        MoveRow {
            number,
            white: Some(white.san),
            black: black_san,
            position_after_white: Some(white.fen),
            position_after_black: black_fen,
            white_uci: Some(white.uci),
            black_uci,
            full_move,
            position_fen,
            captured_piece_white: white.captured,
            captured_piece_black: black_captured,
            is_check_white: white.is_check,
            is_check_black: black_is_check,
            is_checkmate_white: white.is_checkmate,
            is_checkmate_black: black_is_checkmate,
        }
    }
}

impl TryFrom<MoveRow> for MoveRecord {
    type Error = String;

    fn try_from(row: MoveRow) -> Result<Self, Self::Error> {
        let white = HalfMove {
            san: row
                .white
                .ok_or_else(|| format!("move {} has no white half-move", row.number))?,
            uci: row.white_uci.unwrap_or_default(),
            fen: row
                .position_after_white
                .unwrap_or_else(|| row.position_fen.clone()),
            captured: row.captured_piece_white,
            is_check: row.is_check_white,
            is_checkmate: row.is_checkmate_white,
        };

        let black = row.black.map(|san| HalfMove {
            san,
            uci: row.black_uci.unwrap_or_default(),
            fen: row.position_after_black.unwrap_or(row.position_fen),
            captured: row.captured_piece_black,
            is_check: row.is_check_black,
            is_checkmate: row.is_checkmate_black,
        });

        Ok(MoveRecord::new(row.number, white, black))
    }
}

/// Output of replaying one PGN game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayedGame {
    pub moves: Vec<MoveRecord>,
    pub metadata: GameMetadata,
}
