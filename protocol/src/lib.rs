use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PlayerId = Uuid;
pub type RoomId = Uuid;

/// Grid coordinates as they travel over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

/// Messages broadcast between the two boards of a head-to-head round.
///
/// Each side runs its own engine; only these summaries cross the wire,
/// never full grid state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PeerMessage {
    PlayerReady { ready: bool },
    GameStart { duration_secs: u32 },
    TileSwap { tile1: Cell, tile2: Cell },
    MatchMade { match_count: usize, combo_count: u32, score: u32, total_matches: u32 },
    // Absolute totals, so the newest update always wins on the receiving side.
    ScoreUpdate { score: u32, matches: u32 },
    GameOver { score: u32, result: GameResult },
    PlayerLeft,
}

/// A message keyed by its room, with a per-sender sequence number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub room: RoomId,
    pub sender: PlayerId,
    pub seq: u64,
    pub message: PeerMessage,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

impl GameResult {
    pub fn from_scores(own: u32, opponent: u32) -> Self {
        if own > opponent {
            GameResult::Win
        } else if own < opponent {
            GameResult::Loss
        } else {
            GameResult::Tie
        }
    }

    /// The same round seen from the other board.
    pub fn flipped(self) -> Self {
        match self {
            GameResult::Win => GameResult::Loss,
            GameResult::Loss => GameResult::Win,
            GameResult::Tie => GameResult::Tie,
        }
    }
}
