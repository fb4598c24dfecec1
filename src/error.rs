//! Engine errors. Only programmer errors end up here; game outcomes are never errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("position ({row}, {col}) is outside a {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
    #[error("invalid board size {size}: must be at least {min}")]
    InvalidSize { size: usize, min: usize },
    #[error("board rows do not form a {0}x{0} square")]
    NotSquare(usize),
    #[error("invalid tile weights: {0}")]
    InvalidWeights(String),
    #[error("invalid rules: {0}")]
    InvalidRules(&'static str),
}

pub type Result<T> = std::result::Result<T, EngineError>;
