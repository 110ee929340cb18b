use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Duplicate sprite name within one atlas: {0}")]
    DuplicateName(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Sprites do not fit within {limit}x{limit} (stopped at {width}x{height})")]
    OutOfSpace { width: u64, height: u64, limit: u32 },
    #[error("Manifest line {line}: {message}")]
    Manifest { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, PackerError>;
