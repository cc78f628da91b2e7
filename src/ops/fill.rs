use crate::engine::caps::CpuCaps;
use crate::foundation::core::Rect;
use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::surface::Surface;

impl Surface<'_> {
    /// Fill `rect` (the whole surface when `None`), clipped to the clip rectangle, with a raw
    /// pixel value. Only depths of 8 bits and more can be filled.
    pub fn fill_rect(&mut self, rect: Option<Rect>, color: u32) -> SoftblitResult<()> {
        let rect = rect.unwrap_or_else(|| self.bounds());
        self.fill_rects(&[rect], color)
    }

    /// Fill every rectangle in `rects` with one raw pixel value.
    pub fn fill_rects(&mut self, rects: &[Rect], color: u32) -> SoftblitResult<()> {
        if self.format().bits_per_pixel() < 8 {
            return Err(SoftblitError::unsupported_format(format!(
                "fill on {:?} surface",
                self.format().id()
            )));
        }
        self.check_writable()?;
        let clip = self.clip_rect();
        let bpp = usize::from(self.format().bytes_per_pixel());
        let pitch = self.pitch();
        let caps = self.caps();
        let pixels = self.pixels_for_write();
        for r in rects.iter().filter_map(|r| r.intersect(&clip)) {
            let (x, w) = (r.x as usize * bpp, r.w as usize * bpp);
            for y in r.y as usize..r.bottom() as usize {
                let start = y * pitch + x;
                fill_row(&mut pixels[start..start + w], bpp, color, caps);
            }
        }
        Ok(())
    }
}

/// Store `color` into every pixel of `row`.
pub(crate) fn fill_row(row: &mut [u8], bpp: usize, color: u32, caps: CpuCaps) {
    let bytes = color.to_le_bytes();
    match bpp {
        1 => row.fill(bytes[0]),
        3 => {
            for px in row.chunks_exact_mut(3) {
                px.copy_from_slice(&bytes[..3]);
            }
        }
        _ => {
            let mut pattern = [0u8; 32];
            for (i, b) in pattern.iter_mut().enumerate() {
                *b = bytes[i % bpp];
            }
            let width = caps.store_width();
            let mut chunks = row.chunks_exact_mut(width);
            for chunk in &mut chunks {
                chunk.copy_from_slice(&pattern[..width]);
            }
            let tail = chunks.into_remainder();
            let n = tail.len();
            tail.copy_from_slice(&pattern[..n]);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/fill.rs"]
mod tests;
