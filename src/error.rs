use thiserror::Error;

/// Errors raised by a key-value backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage quota exceeded: writing {attempted} bytes would exceed the {limit} byte limit")]
    QuotaExceeded { attempted: usize, limit: usize },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode store contents: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced by the document storage service
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write {key}: {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Failed to encode document collection: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage service operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors reported by a diagram widget
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Widget could not be constructed: {0}")]
    Construction(String),

    #[error("Failed to import diagram: {0}")]
    Import(String),

    #[error("Failed to export diagram: {0}")]
    Export(String),

    #[error("Widget has been destroyed")]
    Destroyed,
}

/// Errors that can occur while producing or delivering a download
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid SVG: {0}")]
    Svg(String),

    #[error("Rasterized image would be empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },

    #[error("Rasterized image would be {width}x{height}, larger than {max} pixels per side")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("Download failed: {0}")]
    Download(String),
}
