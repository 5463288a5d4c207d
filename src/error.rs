use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("board must be at least 3 cells long in one direction, got {rows}x{cols}")]
    BoardTooSmall { rows: usize, cols: usize },
    #[error("gem type count must be between 3 and {max}, got {got}")]
    GemTypes { got: u8, max: u8 },
    #[error("spawn retries must be at least 1")]
    NoSpawnRetries,
    #[error("cascade pass cap must be at least 1")]
    NoCascadePasses,
    #[error("round duration must be positive")]
    ZeroDuration,
    #[error("invalid combo settings: step {step}, cap {cap}")]
    Combo { step: f64, cap: f64 },
    #[error("invalid config json: {0}")]
    Json(String),
    #[error("invalid value for {key}: {value:?}")]
    Env { key: String, value: String },
}

/// Failures of the external key-value store. Callers in this crate treat
/// all of them as non-fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed store data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("value under {0} is not an integer")]
    NotAnInteger(String),
    #[error("value under {0} is not a record")]
    NotARecord(String),
}

/// Why a swap request was dropped without touching the grid.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SwapRejection {
    #[error("a previous swap is still being resolved")]
    Busy,
    #[error("cannot swap a tile with itself")]
    SameTile,
    #[error("tiles are not adjacent")]
    NotAdjacent,
    #[error("cell is off the board or empty")]
    NoTile,
    #[error("the session is not accepting input")]
    InputDisabled,
}
