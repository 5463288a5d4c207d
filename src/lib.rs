//! Rules engine for a match-3 tile game.
//!
//! The board resolves swap requests into matches, removals, gravity,
//! refills and cascades, and the session layers score, round timer and
//! persistence on top. Rendering, input devices and transport stay
//! outside; they consume [`GameEvent`]s and plain data.

pub mod board;
pub mod cascade;
pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod matcher;
pub mod persist;
pub mod relay;
pub mod score;
pub mod session;
pub mod swap;
pub mod tile;
pub mod timer;

pub use board::Board;
pub use cascade::{apply_gravity, resolve, Cascade, CascadePass, CascadeResult, TileMove};
pub use config::{BoardConfig, EngineConfig, ScoreConfig, TimerConfig};
pub use error::{ConfigError, StoreError, SwapRejection};
pub use events::{EventSender, GameEvent};
pub use grid::Grid;
pub use matcher::{find_matches, find_runs, MatchSet, Run};
pub use persist::{JsonFileStore, MemoryStore, Record, Settings, Store};
pub use relay::{OpponentView, PeerRelay};
pub use score::{ScoreEngine, ScoreUpdate};
pub use session::{GameSession, GameSummary, SessionPhase, SessionStats};
pub use swap::{SwapOutcome, SwapState, SwapValidator};
pub use tile::{GemType, MatchedTile, Position, Tile, TileId};
pub use timer::{spawn_countdown, Countdown, TimerEvent, TimerState};
