use serde::Serialize;
use tracing::debug;

use crate::config::ScoreConfig;
use crate::tile::MatchedTile;

/// Snapshot sent to collaborators after every award.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub points_earned: u32,
    pub total_score: u32,
    pub combo_multiplier: f64,
    pub total_matches: u32,
}

/// Step function of match size: fixed rewards for 3, 4 and 5 tiles, plus a
/// flat bonus per tile beyond five.
pub fn base_score(config: &ScoreConfig, match_size: usize) -> u32 {
    match match_size {
        0..=2 => 0,
        3 => config.base_match_3,
        4 => config.base_match_4,
        n => config.base_match_5 + (n as u32 - 5) * config.per_extra_tile,
    }
}

/// `min(1 + (combo - 1) * step, cap)`. A combo count of zero counts as one.
pub fn combo_multiplier(config: &ScoreConfig, combo_count: u32) -> f64 {
    let steps = combo_count.saturating_sub(1) as f64;
    (1.0 + steps * config.combo_step).min(config.max_combo_multiplier)
}

#[derive(Debug, Clone)]
pub struct ScoreEngine {
    config: ScoreConfig,
    score: u32,
    combo_multiplier: f64,
    total_matches: u32,
    high_score: u32,
    last_points: u32,
}

impl ScoreEngine {
    pub fn new(config: ScoreConfig, high_score: u32) -> Self {
        Self {
            config,
            score: 0,
            combo_multiplier: 1.0,
            total_matches: 0,
            high_score,
            last_points: 0,
        }
    }

    /// Award points for one resolved cascade. An empty list awards nothing
    /// and leaves every counter untouched.
    pub fn add_score(&mut self, matched: &[MatchedTile], combo_count: u32) -> u32 {
        if matched.is_empty() {
            return 0;
        }

        let base = base_score(&self.config, matched.len());
        self.combo_multiplier = combo_multiplier(&self.config, combo_count);

        let earned = (base as f64 * self.combo_multiplier).floor() as u32;
        self.score = self.score.saturating_add(earned);
        self.total_matches += 1;
        self.last_points = earned;

        debug!(
            tiles = matched.len(),
            combo_count,
            multiplier = self.combo_multiplier,
            earned,
            total = self.score,
            "score awarded"
        );
        earned
    }

    pub fn reset_combo(&mut self) {
        self.combo_multiplier = 1.0;
    }

    /// Clear the running round; the high score is kept.
    pub fn reset(&mut self) {
        self.score = 0;
        self.combo_multiplier = 1.0;
        self.total_matches = 0;
        self.last_points = 0;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn combo_multiplier(&self) -> f64 {
        self.combo_multiplier
    }

    pub fn total_matches(&self) -> u32 {
        self.total_matches
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_new_high_score(&self) -> bool {
        self.score > self.high_score
    }

    /// Raise the high score if the running score beat it. Returns whether it did.
    pub fn commit_high_score(&mut self) -> bool {
        if !self.is_new_high_score() {
            return false;
        }
        self.high_score = self.score;
        true
    }

    pub fn update(&self) -> ScoreUpdate {
        ScoreUpdate {
            points_earned: self.last_points,
            total_score: self.score,
            combo_multiplier: self.combo_multiplier,
            total_matches: self.total_matches,
        }
    }

    pub fn formatted_score(&self) -> String {
        format!("{:06}", self.score)
    }

    /// `x1.5` style label, empty when no combo bonus applies.
    pub fn formatted_combo(&self) -> String {
        if self.combo_multiplier <= 1.0 {
            return String::new();
        }
        format!("x{:.1}", self.combo_multiplier)
    }
}
