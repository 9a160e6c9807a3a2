use thiserror::Error;

/// Construction-time failures. Nothing in the per-frame path returns these.
#[derive(Debug, Error, PartialEq)]
pub enum GalleryError {
    #[error("tile count must be at least 1 (got {0})")]
    EmptyGallery(usize),

    #[error("carousel radius must be a positive finite number (got {0})")]
    InvalidRadius(f32),
}
