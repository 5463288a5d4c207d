use tracing::debug;

use crate::board::Board;
use crate::cascade::{Cascade, CascadePass, CascadeResult};
use crate::error::SwapRejection;
use crate::matcher::{find_matches, MatchSet};
use crate::tile::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapState {
    Idle,
    Processing,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SwapOutcome {
    /// Dropped before touching the grid.
    Rejected(SwapRejection),
    /// Exchanged, found nothing, and exchanged back.
    Reverted { a: Position, b: Position },
    /// Kept; a cascade seeded with `matches` is now pending.
    Accepted {
        a: Position,
        b: Position,
        matches: MatchSet,
    },
}

impl SwapOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SwapOutcome::Accepted { .. })
    }
}

/// Validates player swaps and holds the input lockout while the resulting
/// cascade is worked through.
#[derive(Debug, Clone)]
pub struct SwapValidator {
    state: SwapState,
    pending: Option<Cascade>,
    completed: Option<CascadeResult>,
}

impl Default for SwapValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SwapValidator {
    pub fn new() -> Self {
        Self {
            state: SwapState::Idle,
            pending: None,
            completed: None,
        }
    }

    pub fn state(&self) -> SwapState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        self.state == SwapState::Processing
    }

    pub fn attempt_swap(&mut self, board: &mut Board, a: Position, b: Position) -> SwapOutcome {
        if let Err(reason) = self.check(board, a, b) {
            debug!(?a, ?b, %reason, "swap rejected");
            return SwapOutcome::Rejected(reason);
        }

        self.state = SwapState::Processing;
        board.grid_mut().swap(a, b);

        let matches = find_matches(board.grid());
        if matches.is_empty() {
            board.grid_mut().swap(a, b);
            self.state = SwapState::Idle;
            debug!(?a, ?b, "swap made no match, reverted");
            return SwapOutcome::Reverted { a, b };
        }

        debug!(?a, ?b, matched = matches.len(), "swap accepted");
        self.completed = None;
        self.pending = Some(Cascade::new(matches.clone()));
        SwapOutcome::Accepted { a, b, matches }
    }

    fn check(&self, board: &Board, a: Position, b: Position) -> Result<(), SwapRejection> {
        if self.is_processing() {
            return Err(SwapRejection::Busy);
        }
        if a == b {
            return Err(SwapRejection::SameTile);
        }
        if board.grid().at(a).is_none() || board.grid().at(b).is_none() {
            return Err(SwapRejection::NoTile);
        }
        if !a.is_adjacent(b) {
            return Err(SwapRejection::NotAdjacent);
        }
        Ok(())
    }

    /// Run the next pass of the pending cascade. The validator returns to
    /// idle on the pass that settles the board.
    pub fn advance(&mut self, board: &mut Board) -> Option<CascadePass> {
        let cascade = self.pending.as_mut()?;
        let pass = cascade.step(board);

        if cascade.is_settled() {
            self.completed = self.pending.take().map(Cascade::into_result);
            self.state = SwapState::Idle;
        }
        pass
    }

    /// Result of the most recently settled cascade, if not yet taken.
    pub fn take_result(&mut self) -> Option<CascadeResult> {
        self.completed.take()
    }

    /// Resolve whatever is pending without pausing between passes.
    pub fn run_to_completion(&mut self, board: &mut Board) -> Option<CascadeResult> {
        while self.advance(board).is_some() {}
        self.take_result()
    }
}
