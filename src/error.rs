use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cancelled")]
    Cancelled,

    #[error("line longer than the {limit} byte scan buffer near offset {offset}")]
    LineTooLong { limit: usize, offset: u64 },
}

pub type Result<T> = std::result::Result<T, CounterError>;
