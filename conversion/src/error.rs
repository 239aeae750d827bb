//! Error types for audio conversion.

/// Result type alias for audio conversion.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Error type for audio conversion operations.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The requested conversion is not something this converter can do.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A sample spec carries a value the engine cannot work with.
    #[error("bad value: {0}")]
    BadValue(String),

    /// Growing a working buffer failed.
    #[error("out of memory: cannot allocate {bytes} bytes")]
    OutOfMemory { bytes: usize },

    /// The conversion was used before a successful configure.
    #[error("conversion not initialized")]
    NoInit,

    /// The buffer provider returned no frames.
    #[error("not enough data from buffer provider")]
    NotEnoughData,

    /// The resample engine failed while processing.
    #[error("resample engine error: {0}")]
    Engine(String),

    /// The buffer provider failed.
    #[error("buffer provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ConversionError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ConversionError::InvalidOperation(msg.into())
    }

    pub(crate) fn bad_value(msg: impl Into<String>) -> Self {
        ConversionError::BadValue(msg.into())
    }
}

impl From<std::io::Error> for ConversionError {
    fn from(e: std::io::Error) -> Self {
        ConversionError::Provider(Box::new(e))
    }
}

impl From<rubato::ResamplerConstructionError> for ConversionError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        ConversionError::Engine(e.to_string())
    }
}

impl From<rubato::ResampleError> for ConversionError {
    fn from(e: rubato::ResampleError) -> Self {
        ConversionError::Engine(e.to_string())
    }
}
