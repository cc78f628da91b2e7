use std::rc::Rc;

use crate::blit::{BlendMode, BlitFlags, CopyParams};
use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::pixels::format::{FormatId, PixelFormat, read_pixel, write_pixel};
use crate::surface::Surface;

impl Surface<'_> {
    /// Copy this surface into a new surface of `format`.
    ///
    /// The copy is a raw full-surface blit with compositing switched off; the new surface then
    /// inherits this surface's modulation, blend mode, clip rectangle and run-length preference.
    /// A colorkey is re-expressed in the new format, and on 4-byte formats with alpha it is
    /// turned into transparent pixels instead.
    #[tracing::instrument(skip_all, fields(src = ?self.format.id(), dst = ?format.id()))]
    pub fn convert(&mut self, format: &PixelFormat) -> SoftblitResult<Surface<'static>> {
        if let Some(pal) = format.palette()
            && pal.borrow().is_unpopulated()
        {
            return Err(SoftblitError::invalid_argument("empty destination palette"));
        }
        let registry = Rc::clone(self.registry());
        let out_format = registry.acquire_like(format)?;
        let mut out = Surface::with_format(
            Rc::clone(&registry),
            self.caps(),
            self.width,
            self.height,
            out_format,
        )?;
        // The new surface is only a destination here.
        out.map.info.flags = BlitFlags::empty();
        out.map.invalidate();

        let saved = self.map.info;
        self.map.info = CopyParams {
            colorkey: saved.colorkey,
            ..CopyParams::default()
        };
        self.map.invalidate();
        let bounds = self.bounds();
        let copied = self.lower_blit(bounds, &mut out, bounds);
        self.map.info = CopyParams {
            flags: saved.flags - BlitFlags::RLE_COLORKEY,
            ..saved
        };
        self.map.invalidate();
        copied?;

        out.map.info = CopyParams {
            flags: saved.flags
                - BlitFlags::COLORKEY
                - BlitFlags::NEAREST
                - BlitFlags::RLE_COLORKEY
                - BlitFlags::RLE_ALPHAKEY,
            colorkey: 0,
            ..saved
        };
        out.map.invalidate();

        if (self.format.has_alpha() && out.format.has_alpha())
            || saved.flags.contains(BlitFlags::MODULATE_ALPHA)
        {
            out.set_blend_mode(BlendMode::Blend);
        }
        if saved.flags.contains(BlitFlags::COLORKEY) {
            let key = self.format.get_rgba(saved.colorkey);
            out.set_color_key(Some(out.format.map_color(key)));
            out.colorkey_to_alpha();
        }
        out.clip = self.clip;
        Ok(out)
    }

    /// [`Surface::convert`] to the registry's format for `id`.
    pub fn convert_to(&mut self, id: FormatId) -> SoftblitResult<Surface<'static>> {
        let format = self.registry().acquire(id)?;
        self.convert(&format)
    }

    /// Replace the colorkey of a 4-byte alpha surface by zero alpha on the matching pixels.
    fn colorkey_to_alpha(&mut self) {
        let Some(key) = self.color_key() else {
            return;
        };
        if self.format.bytes_per_pixel() != 4 || !self.format.has_alpha() {
            return;
        }
        let rgbmask = !self.format.alpha().mask;
        let ckey = key & rgbmask;
        let (w, pitch) = (self.width as usize, self.pitch);
        for row in self.pixels.bytes_mut().chunks_mut(pitch) {
            for px in row.chunks_exact_mut(4).take(w) {
                let p = read_pixel(px, 4);
                if p & rgbmask == ckey {
                    write_pixel(px, 4, p & rgbmask);
                }
            }
        }
        self.set_color_key(None);
        self.set_blend_mode(BlendMode::Blend);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/convert.rs"]
mod tests;
