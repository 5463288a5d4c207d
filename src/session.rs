use tracing::{debug, info};

use crate::board::Board;
use crate::cascade::{CascadePass, CascadeResult};
use crate::config::EngineConfig;
use crate::error::{ConfigError, SwapRejection};
use crate::events::{EventSender, GameEvent};
use crate::persist::{self, Settings, Store};
use crate::score::ScoreEngine;
use crate::swap::{SwapOutcome, SwapValidator};
use crate::tile::Position;
use crate::timer::{Countdown, TimerEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Ready,
    Playing,
    Over,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub moves: u32,
    pub failed_swaps: u32,
    pub cascades: u32,
    pub largest_combo: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSummary {
    pub final_score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub total_matches: u32,
    pub stats: SessionStats,
}

/// One player's round: board, swap lockout, score, countdown and the
/// store backing the high score and settings.
pub struct GameSession<S: Store> {
    board: Board,
    swaps: SwapValidator,
    score: ScoreEngine,
    timer: Countdown,
    store: S,
    settings: Settings,
    events: EventSender,
    phase: SessionPhase,
    selected: Option<Position>,
    game_over_pending: bool,
    stats: SessionStats,
    last_cascade: Option<CascadeResult>,
    summary: Option<GameSummary>,
}

impl<S: Store> GameSession<S> {
    pub fn new(config: EngineConfig, store: S, events: EventSender) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::new(config.board.clone())?;
        Ok(Self::with_board(board, config, store, events))
    }

    /// Deterministic board generation, for replays and tests.
    pub fn with_seed(
        config: EngineConfig,
        seed: u64,
        store: S,
        events: EventSender,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let board = Board::with_seed(config.board.clone(), seed)?;
        Ok(Self::with_board(board, config, store, events))
    }

    pub fn with_board(board: Board, config: EngineConfig, store: S, events: EventSender) -> Self {
        let high_score = persist::load_high_score(&store);
        let settings = persist::load_settings(&store);

        Self {
            board,
            swaps: SwapValidator::new(),
            score: ScoreEngine::new(config.score, high_score),
            timer: Countdown::new(&config.timer),
            store,
            settings,
            events,
            phase: SessionPhase::Ready,
            selected: None,
            game_over_pending: false,
            stats: SessionStats::default(),
            last_cascade: None,
            summary: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> &ScoreEngine {
        &self.score
    }

    pub fn timer(&self) -> &Countdown {
        &self.timer
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_processing(&self) -> bool {
        self.swaps.is_processing()
    }

    pub fn accepts_input(&self) -> bool {
        self.phase == SessionPhase::Playing && !self.game_over_pending && !self.is_processing()
    }

    fn emit(&self, event: GameEvent) {
        let _ = self.events.send(event);
    }

    pub fn start(&mut self) {
        if self.phase != SessionPhase::Ready {
            return;
        }
        self.phase = SessionPhase::Playing;
        self.timer.start();
        info!(duration = self.timer.duration(), "round started");
    }

    /// Click handling: select, deselect, swap with an adjacent selection, or
    /// move the selection. Returns the swap outcome when a swap was tried.
    pub fn select(&mut self, pos: Position) -> Option<SwapOutcome> {
        if !self.accepts_input() || self.board.grid().at(pos).is_none() {
            return None;
        }

        match self.selected {
            None => {
                self.selected = Some(pos);
                None
            }
            Some(current) if current == pos => {
                self.selected = None;
                None
            }
            Some(current) if current.is_adjacent(pos) => {
                self.selected = None;
                Some(self.request_swap(current, pos))
            }
            Some(_) => {
                self.selected = Some(pos);
                None
            }
        }
    }

    pub fn request_swap(&mut self, a: Position, b: Position) -> SwapOutcome {
        if self.phase != SessionPhase::Playing || self.game_over_pending {
            return SwapOutcome::Rejected(SwapRejection::InputDisabled);
        }

        let outcome = self.swaps.attempt_swap(&mut self.board, a, b);
        match &outcome {
            SwapOutcome::Rejected(_) => {}
            SwapOutcome::Reverted { a, b } => {
                self.stats.failed_swaps += 1;
                self.score.reset_combo();
                self.emit(GameEvent::Swap {
                    success: false,
                    tile_a: *a,
                    tile_b: *b,
                });
            }
            SwapOutcome::Accepted { a, b, .. } => {
                self.stats.moves += 1;
                self.emit(GameEvent::Swap {
                    success: true,
                    tile_a: *a,
                    tile_b: *b,
                });
            }
        }
        outcome
    }

    /// Run one pass of the in-flight cascade, so a presentation layer can
    /// animate between passes.
    pub fn advance(&mut self) -> Option<CascadePass> {
        let pass = self.swaps.advance(&mut self.board)?;
        self.emit(GameEvent::TilesMatched {
            tiles: pass.removed.clone(),
            combo: pass.combo,
        });

        if let Some(result) = self.swaps.take_result() {
            self.finish_cascade(result);
        }
        Some(pass)
    }

    /// Resolve the in-flight cascade back to back. Returns its result, if any.
    pub fn settle(&mut self) -> Option<CascadeResult> {
        self.last_cascade = None;
        while self.advance().is_some() {}
        self.last_cascade.take()
    }

    fn finish_cascade(&mut self, result: CascadeResult) {
        self.score.add_score(&result.matched_tiles, result.combo_count);
        self.stats.cascades += 1;
        self.stats.largest_combo = self.stats.largest_combo.max(result.combo_count);

        self.emit(GameEvent::CascadeResolved(result.clone()));
        self.emit(GameEvent::ScoreUpdated(self.score.update()));
        self.last_cascade = Some(result);

        if self.game_over_pending {
            self.end_game();
        }
    }

    /// One second of round time.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        let events = self.timer.tick();
        self.forward_timer(&events);
        events
    }

    pub fn add_time(&mut self, secs: u32) {
        self.timer.add_time(secs);
    }

    pub fn subtract_time(&mut self, secs: u32) -> Vec<TimerEvent> {
        let events = self.timer.subtract_time(secs);
        self.forward_timer(&events);
        events
    }

    pub fn pause(&mut self) {
        self.timer.pause();
    }

    pub fn resume(&mut self) {
        self.timer.resume();
    }

    fn forward_timer(&mut self, events: &[TimerEvent]) {
        for event in events {
            self.emit(GameEvent::from(*event));
            if *event == TimerEvent::Completed {
                self.time_up();
            }
        }
    }

    // An in-flight cascade finishes before the round closes.
    fn time_up(&mut self) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        if self.is_processing() {
            debug!("time up during cascade, deferring game over");
            self.game_over_pending = true;
            self.selected = None;
            return;
        }
        self.end_game();
    }

    /// Close the round and persist the high score if it was beaten.
    /// Calling it again returns the same summary.
    pub fn end_game(&mut self) -> GameSummary {
        if let Some(summary) = self.summary {
            return summary;
        }
        if self.is_processing() {
            self.settle();
            if let Some(summary) = self.summary {
                return summary;
            }
        }

        self.timer.stop();
        self.phase = SessionPhase::Over;
        self.game_over_pending = false;
        self.selected = None;

        let new_high_score = self.score.commit_high_score();
        if new_high_score {
            persist::save_high_score(&mut self.store, self.score.high_score());
        }

        let summary = GameSummary {
            final_score: self.score.score(),
            high_score: self.score.high_score(),
            new_high_score,
            total_matches: self.score.total_matches(),
            stats: self.stats,
        };
        self.summary = Some(summary);

        info!(
            score = summary.final_score,
            high_score = summary.high_score,
            new_high_score,
            "game over"
        );
        self.emit(GameEvent::GameOver {
            final_score: summary.final_score,
            high_score: summary.high_score,
            new_high_score,
        });
        summary
    }

    /// New board, zeroed score and a rewound clock; back to `Ready`.
    pub fn restart(&mut self) {
        if self.is_processing() {
            self.settle();
        }
        self.board.initialize();
        self.score.reset();
        self.timer.reset(None);
        self.phase = SessionPhase::Ready;
        self.selected = None;
        self.game_over_pending = false;
        self.stats = SessionStats::default();
        self.last_cascade = None;
        self.summary = None;
    }

    pub fn update_settings(&mut self, settings: Settings) -> bool {
        self.settings = settings;
        persist::save_settings(&mut self.store, &self.settings)
    }
}
