//! softblit is a CPU pixel compositing engine.
//!
//! It models packed and indexed pixel formats, converts and composites rectangles of pixels
//! between surfaces through a cached, per-source kernel dispatch, and reads and writes Windows
//! bitmaps. The public API is context-oriented:
//!
//! - Build an [`Engine`] (capabilities plus the shared format registry)
//! - Create, load or convert [`Surface`]s through it
//! - Blit, fill and stretch between surfaces
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod blit;
pub(crate) mod codec;
pub(crate) mod engine;
pub(crate) mod ops;
pub(crate) mod pixels;
pub(crate) mod surface;

pub use crate::foundation::core::{Color, Rect};
pub use crate::foundation::error::{SoftblitError, SoftblitResult, clear_error, last_error};

pub use crate::blit::{BlendMode, BlitFlags};
pub use crate::codec::bmp::{load_bmp, load_bmp_file, save_bmp, save_bmp_file};
pub use crate::engine::caps::CpuCaps;
pub use crate::engine::config::{CPU_CAPS_ENV, EngineConfig};
pub use crate::engine::context::Engine;
pub use crate::ops::stretch::soft_stretch;
pub use crate::pixels::format::{Channel, FormatId, FormatRef, Masks, PixelFormat};
pub use crate::pixels::palette::{Palette, PaletteRef};
pub use crate::pixels::registry::FormatRegistry;
pub use crate::surface::Surface;
