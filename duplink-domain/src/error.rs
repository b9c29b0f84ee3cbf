use thiserror::Error;

// ---

#[derive(Debug, Error)]
pub enum DuplinkError {
    // ---
    #[error("broken pipe: peer read half closed")]
    BrokenPipe,

    #[error("invalid pipe configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ---

/// Map a [`DuplinkError`] onto the `std::io` error vocabulary so endpoint
/// `AsyncRead` / `AsyncWrite` implementations can surface it unchanged.
impl From<DuplinkError> for std::io::Error {
    fn from(err: DuplinkError) -> Self {
        // ---
        match err {
            DuplinkError::BrokenPipe => {
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "link closed by peer")
            }
            DuplinkError::InvalidConfig(msg) => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, msg)
            }
            DuplinkError::Io(e) => e,
        }
    }
}

// ---

pub type Result<T> = std::result::Result<T, DuplinkError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
