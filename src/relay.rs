//! Translation between engine events and the peer wire messages of a
//! head-to-head round. Transport is left to the caller.

use match3_protocol::{Envelope, GameResult, PeerMessage, PlayerId, RoomId};
use tracing::debug;

use crate::events::GameEvent;
use crate::tile::Position;

/// What this board knows about the other board, built only from messages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpponentView {
    pub player: Option<PlayerId>,
    pub ready: bool,
    pub score: u32,
    pub matches: u32,
    pub last_combo: u32,
    pub last_swap: Option<(Position, Position)>,
    pub finished: Option<u32>,
    pub left: bool,
    last_seq: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct PeerRelay {
    room: RoomId,
    player: PlayerId,
    seq: u64,
    pending_match: Option<(usize, u32)>,
    opponent: OpponentView,
}

impl PeerRelay {
    pub fn new(room: RoomId, player: PlayerId) -> Self {
        Self {
            room,
            player,
            seq: 0,
            pending_match: None,
            opponent: OpponentView::default(),
        }
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn opponent(&self) -> &OpponentView {
        &self.opponent
    }

    fn wrap(&mut self, message: PeerMessage) -> Envelope {
        self.seq += 1;
        Envelope {
            room: self.room,
            sender: self.player,
            seq: self.seq,
            message,
        }
    }

    pub fn ready(&mut self, ready: bool) -> Envelope {
        self.wrap(PeerMessage::PlayerReady { ready })
    }

    pub fn game_start(&mut self, duration_secs: u32) -> Envelope {
        self.wrap(PeerMessage::GameStart { duration_secs })
    }

    pub fn leave(&mut self) -> Envelope {
        self.wrap(PeerMessage::PlayerLeft)
    }

    /// Outbound messages for one engine event. Failed swaps, timer ticks and
    /// per-pass match events stay local.
    pub fn outbound(&mut self, event: &GameEvent) -> Vec<Envelope> {
        match event {
            GameEvent::Swap {
                success: true,
                tile_a,
                tile_b,
            } => vec![self.wrap(PeerMessage::TileSwap {
                tile1: (*tile_a).into(),
                tile2: (*tile_b).into(),
            })],
            GameEvent::CascadeResolved(result) => {
                self.pending_match = Some((result.matched_tiles.len(), result.combo_count));
                Vec::new()
            }
            GameEvent::ScoreUpdated(update) => {
                let mut out = Vec::with_capacity(2);
                if let Some((match_count, combo_count)) = self.pending_match.take() {
                    out.push(self.wrap(PeerMessage::MatchMade {
                        match_count,
                        combo_count,
                        score: update.total_score,
                        total_matches: update.total_matches,
                    }));
                }
                out.push(self.wrap(PeerMessage::ScoreUpdate {
                    score: update.total_score,
                    matches: update.total_matches,
                }));
                out
            }
            GameEvent::GameOver { final_score, .. } => {
                let result = self.result(*final_score);
                vec![self.wrap(PeerMessage::GameOver {
                    score: *final_score,
                    result,
                })]
            }
            _ => Vec::new(),
        }
    }

    /// Fold an inbound message into the opponent view. Messages for another
    /// room, our own echoes, and anything not newer than the last applied
    /// sequence number are dropped. Score updates carry absolute totals, so
    /// a lost update is repaired by the next one.
    pub fn receive(&mut self, envelope: &Envelope) -> bool {
        if envelope.room != self.room || envelope.sender == self.player {
            return false;
        }
        if self.opponent.player.is_some_and(|p| p != envelope.sender) {
            return false;
        }
        if self.opponent.last_seq.is_some_and(|seq| envelope.seq <= seq) {
            debug!(seq = envelope.seq, "dropping stale peer message");
            return false;
        }

        let view = &mut self.opponent;
        view.player = Some(envelope.sender);
        view.last_seq = Some(envelope.seq);

        match &envelope.message {
            PeerMessage::PlayerReady { ready } => view.ready = *ready,
            PeerMessage::GameStart { .. } => {
                view.score = 0;
                view.matches = 0;
                view.finished = None;
            }
            PeerMessage::TileSwap { tile1, tile2 } => {
                view.last_swap = Some(((*tile1).into(), (*tile2).into()));
            }
            PeerMessage::MatchMade {
                combo_count,
                score,
                total_matches,
                ..
            } => {
                view.last_combo = *combo_count;
                view.score = *score;
                view.matches = *total_matches;
            }
            PeerMessage::ScoreUpdate { score, matches } => {
                view.score = *score;
                view.matches = *matches;
            }
            PeerMessage::GameOver { score, .. } => {
                view.score = *score;
                view.finished = Some(*score);
            }
            PeerMessage::PlayerLeft => view.left = true,
        }
        true
    }

    /// Round outcome from this board's side. An opponent who left loses.
    pub fn result(&self, own_score: u32) -> GameResult {
        if self.opponent.left {
            return GameResult::Win;
        }
        GameResult::from_scores(own_score, self.opponent.score)
    }
}

pub fn encode(envelope: &Envelope) -> Result<String, serde_json::Error> {
    serde_json::to_string(envelope)
}

pub fn decode(text: &str) -> Result<Envelope, serde_json::Error> {
    serde_json::from_str(text)
}
