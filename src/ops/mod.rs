//! Pixel operations built on surfaces.

/// Solid rectangle fill.
pub(crate) mod fill;
/// Nearest-neighbor stretch between same-format surfaces.
pub(crate) mod stretch;
