use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::config::BoardConfig;
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::matcher::MIN_RUN;
use crate::tile::{GemType, Position, Tile};

/// The grid together with its gem generator.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    rng: StdRng,
    config: BoardConfig,
}

impl Board {
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: BoardConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: BoardConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut board = Self {
            grid: Grid::new(config.rows, config.cols),
            rng,
            config,
        };
        board.initialize();
        Ok(board)
    }

    /// Wrap a hand-built grid. Dimensions come from the grid; refills draw
    /// from `config.gem_types` kinds.
    pub fn from_grid(grid: Grid, mut config: BoardConfig, seed: u64) -> Self {
        config.rows = grid.rows();
        config.cols = grid.cols();
        Self {
            grid,
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Tile> {
        self.grid.get(row, col)
    }

    /// Refill the whole board with fresh tiles, avoiding ready-made matches.
    ///
    /// Each cell gets up to `spawn_retries` draws; if all of them would
    /// complete a run the last draw is kept, so this always terminates.
    /// Returns how many cells fell back to that last draw.
    pub fn initialize(&mut self) -> usize {
        self.grid.clear();
        let mut fallbacks = 0;

        for row in 0..self.config.rows {
            for col in 0..self.config.cols {
                let pos = Position::new(row, col);
                let mut gem = self.random_gem();
                let mut attempts = 1;

                while self.would_create_match(pos, gem) {
                    if attempts >= self.config.spawn_retries {
                        fallbacks += 1;
                        break;
                    }
                    gem = self.random_gem();
                    attempts += 1;
                }

                self.grid.spawn(pos, gem);
            }
        }

        info!(
            rows = self.config.rows,
            cols = self.config.cols,
            gem_types = self.config.gem_types,
            fallbacks,
            "board initialized"
        );
        fallbacks
    }

    /// Fill every empty cell with an independently drawn gem. Fresh gems
    /// may complete runs; the cascade picks those up on its next pass.
    pub fn refill(&mut self) -> Vec<Tile> {
        let mut spawned = Vec::new();

        for col in 0..self.config.cols {
            for row in 0..self.config.rows {
                let pos = Position::new(row, col);
                if self.grid.at(pos).is_some() {
                    continue;
                }

                let gem = self.random_gem();
                spawned.push(self.grid.spawn(pos, gem));
            }
        }

        debug!(count = spawned.len(), "refilled board");
        spawned
    }

    fn random_gem(&mut self) -> GemType {
        GemType::random(&mut self.rng, self.config.gem_types)
    }

    /// Whether placing `gem` at `pos` would complete a run with its neighbours.
    pub fn would_create_match(&self, pos: Position, gem: GemType) -> bool {
        let same = |row: usize, col: usize| self.grid.gem_at(row, col) == Some(gem);

        // Check horizontal
        let mut horizontal = 1;
        let mut c = pos.col;
        while c > 0 && same(pos.row, c - 1) {
            horizontal += 1;
            c -= 1;
        }
        let mut c = pos.col + 1;
        while same(pos.row, c) {
            horizontal += 1;
            c += 1;
        }
        if horizontal >= MIN_RUN {
            return true;
        }

        // Check vertical
        let mut vertical = 1;
        let mut r = pos.row;
        while r > 0 && same(r - 1, pos.col) {
            vertical += 1;
            r -= 1;
        }
        let mut r = pos.row + 1;
        while same(r, pos.col) {
            vertical += 1;
            r += 1;
        }
        vertical >= MIN_RUN
    }
}
