use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::pixels::format::{PixelFormat, read_pixel};

/// One span of opaque pixels: `skip` transparent pixels after the previous span, then `len`
/// pixels to copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Run {
    pub(crate) skip: u32,
    pub(crate) len: u32,
}

/// Colorkey run-length encoding of a whole surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RleRuns {
    rows: Vec<Vec<Run>>,
}

impl RleRuns {
    /// Encode the pixels that differ from `colorkey` (alpha bits ignored).
    pub(crate) fn encode(
        pixels: &[u8],
        pitch: usize,
        w: usize,
        h: usize,
        fmt: &PixelFormat,
        colorkey: u32,
    ) -> SoftblitResult<Self> {
        let bpp = usize::from(fmt.bytes_per_pixel());
        let rgbmask = !fmt.alpha().mask;
        let ckey = colorkey & rgbmask;
        let mut rows = Vec::new();
        rows.try_reserve_exact(h)
            .map_err(|_| SoftblitError::out_of_memory("run-length rows"))?;
        for y in 0..h {
            let row = &pixels[y * pitch..y * pitch + w * bpp];
            let opaque = |x: usize| read_pixel(&row[x * bpp..], bpp) & rgbmask != ckey;
            let mut runs = Vec::new();
            let mut x = 0;
            let mut last_end = 0;
            while x < w {
                while x < w && !opaque(x) {
                    x += 1;
                }
                let start = x;
                while x < w && opaque(x) {
                    x += 1;
                }
                if x > start {
                    runs.push(Run {
                        skip: (start - last_end) as u32,
                        len: (x - start) as u32,
                    });
                    last_end = x;
                }
            }
            rows.push(runs);
        }
        let spans: usize = rows.iter().map(Vec::len).sum();
        tracing::trace!(w, h, spans, "built colorkey runs");
        Ok(Self { rows })
    }

    #[cfg(test)]
    pub(crate) fn rows(&self) -> &[Vec<Run>] {
        &self.rows
    }

    /// Copy the runs covering source rectangle `(sx, sy, w, h)` to the destination, whose
    /// slice starts at the first destination row.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn blit(
        &self,
        src: &[u8],
        src_pitch: usize,
        (sx, sy, w, h): (usize, usize, usize, usize),
        dst: &mut [u8],
        dst_pitch: usize,
        dst_x: usize,
        bpp: usize,
    ) {
        for (dy, runs) in self.rows.iter().skip(sy).take(h).enumerate() {
            let srow = &src[(sy + dy) * src_pitch..];
            let drow = &mut dst[dy * dst_pitch..];
            let mut x = 0usize;
            for run in runs {
                let start = x + run.skip as usize;
                let end = start + run.len as usize;
                x = end;
                let lo = start.max(sx);
                let hi = end.min(sx + w);
                if lo >= hi {
                    continue;
                }
                let d = (dst_x + lo - sx) * bpp;
                drow[d..d + (hi - lo) * bpp].copy_from_slice(&srow[lo * bpp..hi * bpp]);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blit/rle.rs"]
mod tests;
