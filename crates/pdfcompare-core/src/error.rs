use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Failed to extract text from {document}: {reason}")]
    ExtractionFailure { document: String, reason: String },

    #[error("Failed to rasterize page {page} of {document}: {reason}")]
    RasterizationFailure {
        document: String,
        page: u32,
        reason: String,
    },

    #[error("Invalid raster buffer: expected {expected} bytes for {width}x{height}, got {actual}")]
    InvalidRaster {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Comparison cancelled")]
    Cancelled,
}

impl CompareError {
    pub fn extraction(document: impl Into<String>, reason: impl ToString) -> Self {
        CompareError::ExtractionFailure {
            document: document.into(),
            reason: reason.to_string(),
        }
    }

    pub fn rasterization(document: impl Into<String>, page: u32, reason: impl ToString) -> Self {
        CompareError::RasterizationFailure {
            document: document.into(),
            page,
            reason: reason.to_string(),
        }
    }

    /// Whether the raster failure policy may substitute an empty page for this error
    pub fn is_page_failure(&self) -> bool {
        matches!(self, CompareError::RasterizationFailure { .. })
    }
}
