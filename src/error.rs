//! Error types for field extraction and rendering.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("No 2d raster context available: {0}")]
    Context(String),

    #[error("WebGL2 not supported: {0}")]
    Unsupported(String),

    #[error("Shader error: {0}")]
    Shader(String),

    #[error("Failed to encode PNG: {0}")]
    Encode(String),

    #[error("Invalid render parameters: {0}")]
    InvalidParams(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LogoError>;

impl From<image::ImageError> for LogoError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => LogoError::Encode(e.to_string()),
            image::ImageError::IoError(e) => LogoError::Io(e),
            other => LogoError::Decode(other.to_string()),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<LogoError> for wasm_bindgen::JsValue {
    fn from(err: LogoError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
