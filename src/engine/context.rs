use std::io::{Read, Seek};
use std::path::Path;
use std::rc::Rc;

use crate::codec::bmp;
use crate::engine::caps::CpuCaps;
use crate::engine::config::EngineConfig;
use crate::foundation::error::SoftblitResult;
use crate::pixels::format::{FormatId, FormatRef, Masks};
use crate::pixels::registry::FormatRegistry;
use crate::surface::Surface;

/// Owner of the format registry and the capability set shared by every surface it creates.
///
/// Engines are cheap to create; tests typically build one per case with a fixed capability set.
#[derive(Debug)]
pub struct Engine {
    formats: Rc<FormatRegistry>,
    caps: CpuCaps,
    rle_on_load: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_caps(CpuCaps::detect())
    }
}

impl Engine {
    /// Engine using the detected host capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine pinned to `caps`.
    pub fn with_caps(caps: CpuCaps) -> Self {
        Self {
            formats: Rc::new(FormatRegistry::new()),
            caps,
            rle_on_load: false,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> SoftblitResult<Self> {
        let caps = cfg.resolve_caps()?;
        tracing::debug!(?caps, rle_on_load = cfg.rle_on_load, "engine configured");
        Ok(Self {
            rle_on_load: cfg.rle_on_load,
            ..Self::with_caps(caps)
        })
    }

    pub fn caps(&self) -> CpuCaps {
        self.caps
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub(crate) fn rle_on_load(&self) -> bool {
        self.rle_on_load
    }

    /// Shared descriptor for `id`.
    pub fn acquire_format(&self, id: FormatId) -> SoftblitResult<FormatRef> {
        self.formats.acquire(id)
    }

    /// Zero-filled `width` x `height` surface in format `id`.
    pub fn create_surface(&self, width: u32, height: u32, id: FormatId) -> SoftblitResult<Surface<'static>> {
        let format = self.formats.acquire(id)?;
        self.create_with(width, height, format)
    }

    /// Zero-filled surface whose format is described by a depth and channel masks. All-zero
    /// masks pick the default layout for the depth; masks naming no packed layout at depths up
    /// to 8 produce an indexed surface with a ramp palette.
    pub fn create_surface_from_masks(
        &self,
        width: u32,
        height: u32,
        bits: u8,
        masks: Masks,
    ) -> SoftblitResult<Surface<'static>> {
        let format = self.formats.acquire_masks(bits, masks)?;
        self.create_with(width, height, format)
    }

    /// Zero-filled surface sharing an existing descriptor.
    pub fn create_with(&self, width: u32, height: u32, format: FormatRef) -> SoftblitResult<Surface<'static>> {
        Surface::with_format(Rc::clone(&self.formats), self.caps, width, height, format)
    }

    /// Surface over caller-owned memory. The buffer is never freed by the surface.
    pub fn create_surface_from<'a>(
        &self,
        pixels: &'a mut [u8],
        width: u32,
        height: u32,
        pitch: usize,
        id: FormatId,
    ) -> SoftblitResult<Surface<'a>> {
        let format = self.formats.acquire(id)?;
        Surface::from_buffer(
            Rc::clone(&self.formats),
            self.caps,
            pixels,
            width,
            height,
            pitch,
            format,
        )
    }

    /// Decode a BMP stream into a new surface.
    pub fn load_bmp<R: Read + Seek>(&self, reader: &mut R) -> SoftblitResult<Surface<'static>> {
        bmp::load_bmp(self, reader)
    }

    /// Decode a BMP file into a new surface.
    pub fn load_bmp_file(&self, path: impl AsRef<Path>) -> SoftblitResult<Surface<'static>> {
        bmp::load_bmp_file(self, path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/context.rs"]
mod tests;
