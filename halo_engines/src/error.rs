use thiserror::Error;

/// All kinds of errors produced by the engines.
#[derive(Debug, Error)]
pub enum Error {
    #[error("buffer of {len} cells does not fit a {rows}x{cols} grid")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },

    #[error("invalid process grid: {0}")]
    InvalidProcessGrid(String),

    #[error("cannot split a {rows}x{cols} grid over a {nx}x{ny} process grid")]
    InvalidDecomposition {
        rows: usize,
        cols: usize,
        nx: usize,
        ny: usize,
    },

    #[error("malformed decomposition table of {0} bytes")]
    MalformedTable(usize),

    #[error("rank {0} is no longer reachable")]
    Disconnected(usize),

    #[error("expected {expected} cells from rank {from_rank}, got {actual}")]
    UnexpectedLength {
        from_rank: usize,
        expected: usize,
        actual: usize,
    },

    #[error("no rank returned the gathered grid")]
    MissingResult,

    #[error("rank task failed: {0}")]
    Rank(#[from] tokio::task::JoinError),

    #[error("failed to start the rank runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
