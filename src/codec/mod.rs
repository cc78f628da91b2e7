//! Container codecs.

/// Windows bitmap (BMP) load and save.
pub(crate) mod bmp;
