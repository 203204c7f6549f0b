use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// No 2D drawing context could be acquired. Fatal for the engine.
    #[error("no 2d drawing surface available")]
    SurfaceUnavailable,
    #[error("image could not be decoded: {0}")]
    ImageDecode(String),
    #[error("image failed to load: {0}")]
    ImageLoad(String),
    /// A DOM call needed to wire up the viewer was rejected.
    #[error("dom call failed: {0}")]
    Dom(String),
    #[error("bitmap has {actual} bytes, expected {expected}")]
    BitmapSize { expected: usize, actual: usize },
}
