pub mod password;

pub use password::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("PBKDF2 iteration count must be positive")]
    InvalidIterations,

    #[error("Malformed password hash")]
    MalformedHash,

    #[error("Unsupported password hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Invalid base64 in password hash: {0}")]
    Encoding(#[from] base64::DecodeError),
}
