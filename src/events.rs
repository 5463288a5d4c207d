use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::cascade::CascadeResult;
use crate::score::ScoreUpdate;
use crate::tile::{MatchedTile, Position};
use crate::timer::TimerEvent;

/// Everything the engine tells presentation and network collaborators.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum GameEvent {
    Swap {
        success: bool,
        tile_a: Position,
        tile_b: Position,
    },
    /// One resolution pass consumed these tiles.
    TilesMatched { tiles: Vec<MatchedTile>, combo: u32 },
    CascadeResolved(CascadeResult),
    ScoreUpdated(ScoreUpdate),
    TimerTick {
        #[serde(rename = "remainingSeconds")]
        remaining_secs: u32,
    },
    TimerWarning {
        #[serde(rename = "remainingSeconds")]
        remaining_secs: u32,
    },
    TimerCompleted,
    GameOver {
        final_score: u32,
        high_score: u32,
        new_high_score: bool,
    },
}

impl From<TimerEvent> for GameEvent {
    fn from(event: TimerEvent) -> Self {
        match event {
            TimerEvent::Tick { remaining_secs } => GameEvent::TimerTick { remaining_secs },
            TimerEvent::Warning { remaining_secs } => GameEvent::TimerWarning { remaining_secs },
            TimerEvent::Completed => GameEvent::TimerCompleted,
        }
    }
}

pub type EventSender = UnboundedSender<GameEvent>;

#[cfg(test)]
mod tests {
    use serde_json::{json, to_value};

    use super::*;
    use crate::tile::GemType;

    #[test]
    fn wire_keys_are_camel_case() {
        let swap = GameEvent::Swap {
            success: true,
            tile_a: Position::new(0, 1),
            tile_b: Position::new(1, 1),
        };
        assert_eq!(
            to_value(&swap).unwrap(),
            json!({
                "type": "Swap",
                "success": true,
                "tileA": {"row": 0, "col": 1},
                "tileB": {"row": 1, "col": 1},
            })
        );

        let cascade = GameEvent::CascadeResolved(CascadeResult {
            matched_tiles: vec![MatchedTile {
                row: 2,
                col: 3,
                gem: GemType::Red,
            }],
            combo_count: 1,
        });
        let value = to_value(&cascade).unwrap();
        assert_eq!(value["type"], "CascadeResolved");
        assert_eq!(value["comboCount"], 1);
        assert_eq!(value["matchedTiles"][0]["row"], 2);
        assert_eq!(value["matchedTiles"][0]["col"], 3);
        assert!(value["matchedTiles"][0].get("type").is_some());

        let score = GameEvent::ScoreUpdated(ScoreUpdate {
            points_earned: 150,
            total_score: 450,
            combo_multiplier: 1.5,
            total_matches: 2,
        });
        assert_eq!(
            to_value(&score).unwrap(),
            json!({
                "type": "ScoreUpdated",
                "pointsEarned": 150,
                "totalScore": 450,
                "comboMultiplier": 1.5,
                "totalMatches": 2,
            })
        );

        let tick = GameEvent::from(TimerEvent::Tick { remaining_secs: 5 });
        assert_eq!(
            to_value(&tick).unwrap(),
            json!({"type": "TimerTick", "remainingSeconds": 5})
        );
        let warning = TimerEvent::Warning { remaining_secs: 30 };
        assert_eq!(
            to_value(warning).unwrap(),
            json!({"type": "Warning", "remainingSeconds": 30})
        );

        let over = GameEvent::GameOver {
            final_score: 900,
            high_score: 900,
            new_high_score: true,
        };
        let value = to_value(&over).unwrap();
        assert_eq!(value["finalScore"], 900);
        assert_eq!(value["newHighScore"], true);
    }
}
