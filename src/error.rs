// Error types for the genesis pipeline

/// Errors raised while building or mining a genesis block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenesisError {
    /// An input is malformed (compact target, script length, public key, hex)
    InvalidParameter(String),
    /// Every nonce in the search range was tried without success
    ExhaustedSearchSpace {
        /// Number of nonces tried before giving up
        attempts: u64,
    },
    /// Config file could not be read or parsed
    Config(String),
    /// Writing output failed
    Io(String),
}

impl GenesisError {
    /// Shorthand for `InvalidParameter`
    pub fn invalid(msg: impl Into<String>) -> Self {
        GenesisError::InvalidParameter(msg.into())
    }
}

impl std::fmt::Display for GenesisError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GenesisError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            GenesisError::ExhaustedSearchSpace { attempts } => {
                write!(f, "No solution found in {} attempts", attempts)
            }
            GenesisError::Config(msg) => write!(f, "Config error: {}", msg),
            GenesisError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for GenesisError {}

impl From<std::io::Error> for GenesisError {
    fn from(e: std::io::Error) -> Self {
        GenesisError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for GenesisError {
    fn from(e: serde_json::Error) -> Self {
        GenesisError::Config(e.to_string())
    }
}

impl From<hex::FromHexError> for GenesisError {
    fn from(e: hex::FromHexError) -> Self {
        GenesisError::InvalidParameter(format!("Invalid hex string: {}", e))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, GenesisError>;
