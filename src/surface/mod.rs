//! Surfaces: pixel storage plus format, clip rectangle, lock depth and the blit map used when
//! the surface is a blit source.

pub(crate) mod blit;
pub(crate) mod convert;

use std::rc::Rc;

use crate::blit::map::{BlitMap, SurfaceId};
use crate::blit::rle::RleRuns;
use crate::blit::{BlendMode, BlitFlags};
use crate::engine::caps::CpuCaps;
use crate::foundation::core::{Color, Rect, clamp_dim};
use crate::foundation::error::{SoftblitError, SoftblitResult, try_alloc_zeroed};
use crate::pixels::format::{
    FormatRef, PixelFormat, read_packed, read_pixel, write_packed, write_pixel,
};
use crate::pixels::palette::PaletteRef;
use crate::pixels::registry::FormatRegistry;

#[derive(Debug)]
enum PixelStorage<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
}

impl PixelStorage<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            PixelStorage::Owned(v) => v,
            PixelStorage::Borrowed(s) => s,
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            PixelStorage::Owned(v) => v,
            PixelStorage::Borrowed(s) => s,
        }
    }
}

/// A rectangular pixel buffer in some [`PixelFormat`].
///
/// Surfaces created by an [`crate::Engine`] own their zero-filled storage; surfaces created
/// over a caller buffer borrow it for `'a` and never free it. Dropping a surface releases its
/// format handle, its blit map and, for owned storage, the pixels.
#[derive(Debug)]
pub struct Surface<'a> {
    id: SurfaceId,
    width: u32,
    height: u32,
    pitch: usize,
    pixels: PixelStorage<'a>,
    format: FormatRef,
    registry: Rc<FormatRegistry>,
    caps: CpuCaps,
    map: BlitMap,
    clip: Rect,
    locked: u32,
    rle: Option<RleRuns>,
}

/// Bytes per row: whole pixels rounded up to bytes, then to a multiple of 4.
pub(crate) fn calculate_pitch(width: u32, fmt: &PixelFormat) -> Option<usize> {
    let unit = if fmt.bits_per_pixel() < 8 {
        usize::from(fmt.bits_per_pixel())
    } else {
        usize::from(fmt.bytes_per_pixel()) * 8
    };
    let bits = (width as usize).checked_mul(unit)?;
    bits.div_ceil(8).checked_add(3).map(|b| b & !3)
}

fn check_dims(width: u32, height: u32) -> SoftblitResult<()> {
    if clamp_dim(width) == i32::MAX || clamp_dim(height) == i32::MAX {
        return Err(SoftblitError::invalid_argument(format!(
            "surface dimensions {width}x{height} out of range"
        )));
    }
    Ok(())
}

impl Surface<'static> {
    /// Allocate a zero-filled surface.
    pub(crate) fn with_format(
        registry: Rc<FormatRegistry>,
        caps: CpuCaps,
        width: u32,
        height: u32,
        format: FormatRef,
    ) -> SoftblitResult<Self> {
        check_dims(width, height)?;
        let pitch = calculate_pitch(width, &format)
            .ok_or_else(|| SoftblitError::invalid_argument("surface width overflows pitch"))?;
        let len = pitch
            .checked_mul(height as usize)
            .ok_or_else(|| SoftblitError::invalid_argument("surface size overflows"))?;
        let pixels = try_alloc_zeroed(len, "surface pixels")?;
        Ok(Surface::assemble(
            registry,
            caps,
            width,
            height,
            pitch,
            PixelStorage::Owned(pixels),
            format,
        ))
    }
}

impl<'a> Surface<'a> {
    /// Wrap a caller buffer of at least `pitch * (height - 1)` plus one row of pixels.
    pub(crate) fn from_buffer(
        registry: Rc<FormatRegistry>,
        caps: CpuCaps,
        pixels: &'a mut [u8],
        width: u32,
        height: u32,
        pitch: usize,
        format: FormatRef,
    ) -> SoftblitResult<Self> {
        check_dims(width, height)?;
        let row = format.row_bytes(width as usize);
        if pitch < row {
            return Err(SoftblitError::invalid_argument(format!(
                "pitch {pitch} is shorter than a row of {row} bytes"
            )));
        }
        let needed = if height == 0 {
            0
        } else {
            pitch
                .checked_mul(height as usize - 1)
                .and_then(|b| b.checked_add(row))
                .ok_or_else(|| SoftblitError::invalid_argument("surface size overflows"))?
        };
        if pixels.len() < needed {
            return Err(SoftblitError::invalid_argument(format!(
                "buffer of {} bytes is smaller than the {needed} bytes described",
                pixels.len()
            )));
        }
        Ok(Surface::assemble(
            registry,
            caps,
            width,
            height,
            pitch,
            PixelStorage::Borrowed(pixels),
            format,
        ))
    }

    fn assemble(
        registry: Rc<FormatRegistry>,
        caps: CpuCaps,
        width: u32,
        height: u32,
        pitch: usize,
        pixels: PixelStorage<'a>,
        format: FormatRef,
    ) -> Self {
        let mut surface = Self {
            id: SurfaceId::next(),
            width,
            height,
            pitch,
            pixels,
            format,
            registry,
            caps,
            map: BlitMap::default(),
            clip: Rect::sized(width, height),
            locked: 0,
            rle: None,
        };
        if surface.format.has_alpha() {
            surface.set_blend_mode(BlendMode::Blend);
        }
        surface
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Byte stride between rows.
    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    /// Shared handle to the surface's format.
    pub fn format_ref(&self) -> FormatRef {
        Rc::clone(&self.format)
    }

    /// Whether the surface allocated its storage (as opposed to wrapping a caller buffer).
    pub fn owns_pixels(&self) -> bool {
        matches!(self.pixels, PixelStorage::Owned(_))
    }

    pub(crate) fn id(&self) -> SurfaceId {
        self.id
    }

    pub(crate) fn caps(&self) -> CpuCaps {
        self.caps
    }

    pub(crate) fn registry(&self) -> &Rc<FormatRegistry> {
        &self.registry
    }

    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width, self.height)
    }

    // ---- palette ----------------------------------------------------------------------------

    pub fn palette(&self) -> Option<PaletteRef> {
        self.format.palette()
    }

    /// Attach a palette to an indexed surface. The palette must hold `2^bits` colors.
    pub fn set_palette(&mut self, palette: PaletteRef) -> SoftblitResult<()> {
        self.format.set_palette(Some(palette))?;
        self.map.invalidate();
        Ok(())
    }

    /// Overwrite palette entries starting at `first`.
    pub fn set_palette_colors(&mut self, first: usize, colors: &[Color]) -> SoftblitResult<()> {
        let pal = self.palette().ok_or_else(|| {
            SoftblitError::invalid_argument(format!("{:?} surface has no palette", self.format.id()))
        })?;
        pal.borrow_mut().set_colors(first, colors)
    }

    // ---- compositing parameters -------------------------------------------------------------

    /// Current compositing flags.
    pub fn flags(&self) -> BlitFlags {
        self.map.info.flags
    }

    fn update_flags(&mut self, f: impl FnOnce(&mut BlitFlags)) {
        let before = self.map.info.flags;
        f(&mut self.map.info.flags);
        if self.map.info.flags != before {
            self.map.invalidate();
        }
    }

    /// Set (or clear) the pixel value skipped by blits from this surface.
    pub fn set_color_key(&mut self, key: Option<u32>) {
        let changed_key = key.is_some_and(|k| k != self.map.info.colorkey);
        if let Some(k) = key {
            self.map.info.colorkey = k;
        }
        self.update_flags(|f| f.set(BlitFlags::COLORKEY, key.is_some()));
        if changed_key {
            self.map.invalidate();
        }
        self.drop_rle();
    }

    pub fn color_key(&self) -> Option<u32> {
        self.flags()
            .contains(BlitFlags::COLORKEY)
            .then_some(self.map.info.colorkey)
    }

    /// Multiply source color by `(r, g, b) / 255` during blits.
    pub fn set_color_mod(&mut self, r: u8, g: u8, b: u8) {
        let info = &mut self.map.info;
        let changed = (info.r, info.g, info.b) != (r, g, b);
        (info.r, info.g, info.b) = (r, g, b);
        let on = (r, g, b) != (0xFF, 0xFF, 0xFF);
        self.update_flags(|f| f.set(BlitFlags::MODULATE_COLOR, on));
        if changed {
            self.map.invalidate();
        }
    }

    pub fn color_mod(&self) -> (u8, u8, u8) {
        (self.map.info.r, self.map.info.g, self.map.info.b)
    }

    /// Multiply source alpha by `a / 255` during blits.
    pub fn set_alpha_mod(&mut self, a: u8) {
        let changed = self.map.info.a != a;
        self.map.info.a = a;
        self.update_flags(|f| f.set(BlitFlags::MODULATE_ALPHA, a != 0xFF));
        if changed {
            self.map.invalidate();
        }
    }

    pub fn alpha_mod(&self) -> u8 {
        self.map.info.a
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.update_flags(|f| {
            f.remove(BlitFlags::BLEND_MASK);
            f.insert(mode.flag());
        });
    }

    pub fn blend_mode(&self) -> BlendMode {
        BlendMode::from_flags(self.flags())
    }

    /// Request run-length acceleration for colorkeyed blits from this surface. Such a surface
    /// must be locked before direct pixel writes.
    pub fn set_rle(&mut self, enabled: bool) {
        self.update_flags(|f| f.set(BlitFlags::RLE_DESIRED, enabled));
        if !enabled {
            self.drop_rle();
        }
    }

    /// Whether direct pixel access requires [`Surface::lock`].
    pub fn must_lock(&self) -> bool {
        self.flags().contains(BlitFlags::RLE_DESIRED)
    }

    /// Whether colorkey runs are currently built.
    pub fn is_rle_active(&self) -> bool {
        self.rle.is_some()
    }

    pub(crate) fn drop_rle(&mut self) {
        if self.rle.take().is_some() {
            self.map.info.flags.remove(BlitFlags::RLE_COLORKEY);
        }
    }

    /// Build colorkey runs when the current resolution allows them, drop them when it does not.
    pub(crate) fn ensure_rle(&mut self) {
        if !self.rle_eligible() {
            self.drop_rle();
            return;
        }
        if self.rle.is_some() || self.locked > 0 {
            return;
        }
        let w = self.width as usize;
        let h = self.height as usize;
        match RleRuns::encode(
            self.pixels.bytes(),
            self.pitch,
            w,
            h,
            &self.format,
            self.map.info.colorkey,
        ) {
            Ok(runs) => {
                self.rle = Some(runs);
                self.map.info.flags.insert(BlitFlags::RLE_COLORKEY);
            }
            Err(err) => tracing::debug!(%err, "colorkey runs not built"),
        }
    }

    fn rle_eligible(&self) -> bool {
        let flags = self.flags();
        flags.contains(BlitFlags::RLE_DESIRED)
            && flags - BlitFlags::RLE_MASK == BlitFlags::COLORKEY
            && self.format.bits_per_pixel() >= 8
            && self.map.resolved().is_some_and(|r| r.identity)
    }

    // ---- clipping -----------------------------------------------------------------------------

    /// Set the clip rectangle, intersected with the surface bounds. `None` resets it to the
    /// full surface. Returns whether the resulting clip rectangle is non-empty.
    pub fn set_clip_rect(&mut self, rect: Option<Rect>) -> bool {
        let full = self.bounds();
        match rect {
            None => {
                self.clip = full;
                true
            }
            Some(r) => match r.intersect(&full) {
                Some(c) => {
                    self.clip = c;
                    true
                }
                None => {
                    self.clip = Rect::default();
                    false
                }
            },
        }
    }

    pub fn clip_rect(&self) -> Rect {
        self.clip
    }

    // ---- locking ------------------------------------------------------------------------------

    /// Enter direct pixel access. Locks nest; the first lock drops colorkey runs.
    pub fn lock(&mut self) {
        self.locked = self.locked.saturating_add(1);
        if self.locked == 1 {
            self.drop_rle();
        }
    }

    /// Leave direct pixel access. Unlocking the last level rebuilds colorkey runs when the
    /// surface's last resolved blit used them.
    pub fn unlock(&mut self) {
        if self.locked == 0 {
            return;
        }
        self.locked -= 1;
        if self.locked == 0 {
            self.ensure_rle();
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked > 0
    }

    // ---- pixel access ---------------------------------------------------------------------------

    pub fn pixels(&self) -> &[u8] {
        self.pixels.bytes()
    }

    /// Writable pixels. Surfaces that [`must_lock`](Surface::must_lock) have to be locked.
    pub fn pixels_mut(&mut self) -> SoftblitResult<&mut [u8]> {
        self.check_writable()?;
        self.drop_rle();
        Ok(self.pixels.bytes_mut())
    }

    pub(crate) fn check_writable(&self) -> SoftblitResult<()> {
        if self.must_lock() && self.locked == 0 {
            return Err(SoftblitError::state(
                "surface must be locked for direct pixel access",
            ));
        }
        Ok(())
    }

    /// Mutable pixels for engine-internal writers (blits, fill, stretch), which keep their own
    /// access rules.
    pub(crate) fn pixels_for_write(&mut self) -> &mut [u8] {
        self.drop_rle();
        self.pixels.bytes_mut()
    }

    fn check_point(&self, x: u32, y: u32) -> SoftblitResult<()> {
        if x >= self.width || y >= self.height {
            return Err(SoftblitError::invalid_argument(format!(
                "pixel ({x}, {y}) outside {}x{} surface",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Raw pixel value at `(x, y)`.
    pub fn get_pixel(&self, x: u32, y: u32) -> SoftblitResult<u32> {
        self.check_point(x, y)?;
        let row = &self.pixels.bytes()[y as usize * self.pitch..];
        let bits = self.format.bits_per_pixel();
        if bits < 8 {
            return Ok(read_packed(row, x as usize, bits, self.format.msb_first()));
        }
        let bpp = usize::from(self.format.bytes_per_pixel());
        Ok(read_pixel(&row[x as usize * bpp..], bpp))
    }

    /// Decoded color at `(x, y)`.
    pub fn get_color(&self, x: u32, y: u32) -> SoftblitResult<Color> {
        Ok(self.format.get_rgba(self.get_pixel(x, y)?))
    }

    /// Store a raw pixel value at `(x, y)`.
    pub fn put_pixel(&mut self, x: u32, y: u32, value: u32) -> SoftblitResult<()> {
        self.check_point(x, y)?;
        self.check_writable()?;
        let pitch = self.pitch;
        let bits = self.format.bits_per_pixel();
        let msb = self.format.msb_first();
        let bpp = usize::from(self.format.bytes_per_pixel());
        let row = &mut self.pixels_for_write()[y as usize * pitch..];
        if bits < 8 {
            write_packed(row, x as usize, bits, msb, value);
        } else {
            write_pixel(&mut row[x as usize * bpp..], bpp, value);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/lifecycle.rs"]
mod tests;
