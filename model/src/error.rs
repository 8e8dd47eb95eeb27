use thiserror::Error;

/// Errors related to model initialization and execution
#[derive(Debug, Error)]
pub enum ModelError {
    /// memory access beyond the configured depth
    #[error("address {addr:#x} outside memory of depth {depth}")]
    AddressOutOfRange { addr: u32, depth: usize },

    /// image length is not a multiple of the packing unit
    #[error("image length {len} is not a multiple of {unit} bytes")]
    MalformedImage { len: usize, unit: usize },

    /// image does not fit in the configured memory
    #[error("image of {len} cells does not fit a memory of depth {depth}")]
    ImageTooLarge { len: usize, depth: usize },

    /// Unknown test machine
    #[error("unknown machine {0}")]
    UnknownMachine(String),

    /// An error occurred reading file system
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Result type for model functions that can produce errors
pub type Result<T, E = ModelError> = std::result::Result<T, E>;
