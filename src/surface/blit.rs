use crate::blit::copy::move_within;
use crate::blit::dispatch::Kernel;
use crate::blit::map::MapKey;
use crate::blit::{BlitFlags, BlitJob};
use crate::foundation::core::Rect;
use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::ops::stretch;
use crate::surface::Surface;

const COMPLEX_FLAGS: BlitFlags = BlitFlags::MODULATE_COLOR
    .union(BlitFlags::MODULATE_ALPHA)
    .union(BlitFlags::BLEND_MASK)
    .union(BlitFlags::COLORKEY);

fn check_inside(rect: &Rect, bounds: &Rect, what: &str) -> SoftblitResult<()> {
    if rect.w < 0 || rect.h < 0 || (!rect.is_empty() && !bounds.contains_rect(rect)) {
        return Err(SoftblitError::invalid_argument(format!(
            "{what} rectangle {rect:?} outside {bounds:?}"
        )));
    }
    Ok(())
}

fn narrow(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Clip a source rectangle and a destination position in lock-step, first against the source
/// bounds, then against the destination clip rectangle. Works in `i64` so any caller
/// rectangle clips without overflow.
fn clip_pair(src_rect: Rect, src_bounds: Rect, dst_x: i32, dst_y: i32, clip: Rect) -> (Rect, Rect) {
    let (mut sx, mut sy) = (i64::from(src_rect.x), i64::from(src_rect.y));
    let (mut w, mut h) = (i64::from(src_rect.w), i64::from(src_rect.h));
    let (mut dx, mut dy) = (i64::from(dst_x), i64::from(dst_y));

    if sx < 0 {
        w += sx;
        dx -= sx;
        sx = 0;
    }
    w = w.min(i64::from(src_bounds.w) - sx);
    if sy < 0 {
        h += sy;
        dy -= sy;
        sy = 0;
    }
    h = h.min(i64::from(src_bounds.h) - sy);

    let (cx, cy) = (i64::from(clip.x), i64::from(clip.y));
    let lead = cx - dx;
    if lead > 0 {
        sx += lead;
        w -= lead;
        dx += lead;
    }
    w = w.min(cx + i64::from(clip.w) - dx);
    let lead = cy - dy;
    if lead > 0 {
        sy += lead;
        h -= lead;
        dy += lead;
    }
    h = h.min(cy + i64::from(clip.h) - dy);

    if w <= 0 || h <= 0 {
        return (Rect::default(), Rect::new(narrow(dx), narrow(dy), 0, 0));
    }
    (
        Rect::new(narrow(sx), narrow(sy), narrow(w), narrow(h)),
        Rect::new(narrow(dx), narrow(dy), narrow(w), narrow(h)),
    )
}

impl Surface<'_> {
    /// Clipped blit of `src_rect` (whole surface when `None`) onto `dst` at `dst_pos` (origin
    /// when `None`; its size is ignored).
    ///
    /// Both rectangles are trimmed together against the source bounds and the destination clip
    /// rectangle. Returns the destination rectangle actually written; an empty result is not an
    /// error.
    pub fn blit(
        &mut self,
        src_rect: Option<Rect>,
        dst: &mut Surface<'_>,
        dst_pos: Option<Rect>,
    ) -> SoftblitResult<Rect> {
        if self.is_locked() || dst.is_locked() {
            return Err(SoftblitError::state("surfaces must not be locked during blit"));
        }
        let src_rect = src_rect.unwrap_or_else(|| self.bounds());
        let pos = dst_pos.unwrap_or_default();
        let (s, d) = clip_pair(src_rect, self.bounds(), pos.x, pos.y, dst.clip_rect());
        if d.is_empty() {
            return Ok(d);
        }
        self.lower_blit(s, dst, d)?;
        Ok(d)
    }

    /// Unclipped blit. Both rectangles must lie inside their surfaces and share a size.
    pub fn lower_blit(
        &mut self,
        src_rect: Rect,
        dst: &mut Surface<'_>,
        dst_rect: Rect,
    ) -> SoftblitResult<()> {
        check_inside(&src_rect, &self.bounds(), "source")?;
        check_inside(&dst_rect, &dst.bounds(), "destination")?;
        if (src_rect.w, src_rect.h) != (dst_rect.w, dst_rect.h) {
            return Err(SoftblitError::invalid_argument(format!(
                "unscaled blit from {src_rect:?} to {dst_rect:?}"
            )));
        }
        if self.map.info.flags.contains(BlitFlags::NEAREST) {
            self.map.info.flags.remove(BlitFlags::NEAREST);
            self.map.invalidate();
        }
        if src_rect.is_empty() {
            return Ok(());
        }
        let kernel = self.resolve_for(dst)?;
        self.ensure_rle();
        self.run_kernel(kernel, src_rect, dst, dst_rect)
    }

    /// Clipped nearest-neighbor blit of `src_rect` onto `dst_rect` (whole surfaces when
    /// `None`). Clipping trims the source proportionally. Returns the destination rectangle
    /// written.
    pub fn blit_scaled(
        &mut self,
        src_rect: Option<Rect>,
        dst: &mut Surface<'_>,
        dst_rect: Option<Rect>,
    ) -> SoftblitResult<Rect> {
        if self.is_locked() || dst.is_locked() {
            return Err(SoftblitError::state("surfaces must not be locked during blit"));
        }
        let s = src_rect.unwrap_or_else(|| self.bounds());
        let d = dst_rect.unwrap_or_else(|| dst.bounds());
        if s.is_empty() || d.is_empty() {
            return Ok(Rect::new(d.x, d.y, 0, 0));
        }
        if (s.w, s.h) == (d.w, d.h) {
            return self.blit(Some(s), dst, Some(d));
        }

        let scale_x = f64::from(d.w) / f64::from(s.w);
        let scale_y = f64::from(d.h) / f64::from(s.h);
        let src_bounds = self.bounds();
        let clip = dst.clip_rect();
        let (sx0, sx1, dx0, dx1) = clip_axis(
            (s.x, s.right()),
            (d.x, d.right()),
            (0, src_bounds.w),
            (clip.x, clip.right()),
            scale_x,
        );
        let (sy0, sy1, dy0, dy1) = clip_axis(
            (s.y, s.bottom()),
            (d.y, d.bottom()),
            (0, src_bounds.h),
            (clip.y, clip.bottom()),
            scale_y,
        );

        let (sw, sh) = (i64::from(src_bounds.w), i64::from(src_bounds.h));
        let sx = (sx0.round() as i64).clamp(0, sw);
        let sy = (sy0.round() as i64).clamp(0, sh);
        let s = Rect::new(
            narrow(sx),
            narrow(sy),
            narrow((sx1.round() as i64).min(sw) - sx),
            narrow((sy1.round() as i64).min(sh) - sy),
        );
        let dx = dx0.round() as i64;
        let dy = dy0.round() as i64;
        let d = Rect::new(
            narrow(dx),
            narrow(dy),
            narrow(dx1.round() as i64 - dx),
            narrow(dy1.round() as i64 - dy),
        );
        if s.w <= 0 || s.h <= 0 || d.w <= 0 || d.h <= 0 {
            return Ok(Rect::new(d.x, d.y, 0, 0));
        }
        self.lower_blit_scaled(s, dst, d)?;
        Ok(d)
    }

    /// Unclipped nearest-neighbor blit between rectangles of any size.
    pub fn lower_blit_scaled(
        &mut self,
        src_rect: Rect,
        dst: &mut Surface<'_>,
        dst_rect: Rect,
    ) -> SoftblitResult<()> {
        check_inside(&src_rect, &self.bounds(), "source")?;
        check_inside(&dst_rect, &dst.bounds(), "destination")?;
        if dst_rect.is_empty() {
            return Ok(());
        }
        if src_rect.is_empty() {
            return Err(SoftblitError::invalid_argument(
                "cannot scale an empty source onto a non-empty destination",
            ));
        }

        let plain = !self.flags().intersects(COMPLEX_FLAGS);
        if plain && !self.format.is_indexed() && self.format.same_layout(&dst.format) {
            return stretch::soft_stretch(self, Some(src_rect), dst, Some(dst_rect));
        }

        self.drop_rle();
        if !self.map.info.flags.contains(BlitFlags::NEAREST) {
            self.map.info.flags.insert(BlitFlags::NEAREST);
            self.map.invalidate();
        }
        let kernel = self.resolve_for(dst)?;
        let same_size = (src_rect.w, src_rect.h) == (dst_rect.w, dst_rect.h);
        if !same_size && !kernel.scales() {
            return Err(SoftblitError::unsupported_combination(format!(
                "scaled blit {:?} -> {:?} with {:?}",
                self.format.id(),
                dst.format.id(),
                self.flags()
            )));
        }
        self.run_kernel(kernel, src_rect, dst, dst_rect)
    }

    /// Clipped blit of a region of this surface onto another position of itself.
    ///
    /// Overlapping regions are handled: a raw copy moves rows in an order that never reads an
    /// already written row, and every other kernel reads from a snapshot of the source region.
    pub fn blit_within(&mut self, src_rect: Option<Rect>, dst_pos: Option<Rect>) -> SoftblitResult<Rect> {
        if self.is_locked() {
            return Err(SoftblitError::state("surfaces must not be locked during blit"));
        }
        let src_rect = src_rect.unwrap_or_else(|| self.bounds());
        let pos = dst_pos.unwrap_or_default();
        let (s, d) = clip_pair(src_rect, self.bounds(), pos.x, pos.y, self.clip_rect());
        if d.is_empty() {
            return Ok(d);
        }
        if self.map.info.flags.contains(BlitFlags::NEAREST) {
            self.map.info.flags.remove(BlitFlags::NEAREST);
            self.map.invalidate();
        }
        self.drop_rle();

        let key = MapKey {
            dst: self.id,
            src_palette: self.format.palette_stamp(),
            dst_palette: self.format.palette_stamp(),
        };
        let caps = self.caps;
        let kernel = self
            .map
            .resolve(&self.format, &self.format, key, caps)?
            .kernel
            .ok_or_else(|| SoftblitError::unsupported_combination("self blit"))?;

        let pitch = self.pitch;
        let bits = self.format.bits_per_pixel();
        if kernel == Kernel::Copy && bits >= 8 {
            let bpp = usize::from(self.format.bytes_per_pixel());
            let off = |r: &Rect| r.y as usize * pitch + r.x as usize * bpp;
            move_within(
                self.pixels.bytes_mut(),
                pitch,
                off(&s),
                off(&d),
                s.w as usize * bpp,
                s.h as usize,
            );
            return Ok(d);
        }

        // Snapshot whole source rows so sub-byte columns keep their positions.
        let start = s.y as usize * pitch;
        let len = (s.h as usize - 1) * pitch + self.format.row_bytes(self.width as usize);
        let scratch = self.pixels.bytes()[start..start + len].to_vec();
        let table = self.map.resolved().and_then(|r| r.table.as_ref());
        let mut job = BlitJob {
            src: &scratch,
            src_pitch: pitch,
            src_x: s.x as usize,
            src_w: s.w as usize,
            src_h: s.h as usize,
            dst: &mut self.pixels.bytes_mut()[d.y as usize * pitch..],
            dst_pitch: pitch,
            dst_x: d.x as usize,
            dst_w: d.w as usize,
            dst_h: d.h as usize,
            src_fmt: &self.format,
            dst_fmt: &self.format,
            table,
            params: self.map.info,
        };
        kernel.run(&mut job);
        Ok(d)
    }

    fn resolve_for(&mut self, dst: &Surface<'_>) -> SoftblitResult<Kernel> {
        let key = MapKey {
            dst: dst.id(),
            src_palette: self.format.palette_stamp(),
            dst_palette: dst.format.palette_stamp(),
        };
        let caps = self.caps;
        self.map
            .resolve(&self.format, &dst.format, key, caps)?
            .kernel
            .ok_or_else(|| SoftblitError::unsupported_combination("unresolved blit map"))
    }

    /// Run a resolved kernel over validated, non-empty rectangles.
    fn run_kernel(
        &mut self,
        kernel: Kernel,
        s: Rect,
        dst: &mut Surface<'_>,
        d: Rect,
    ) -> SoftblitResult<()> {
        dst.drop_rle();
        let dst_pitch = dst.pitch;
        let dst_rows = &mut dst.pixels.bytes_mut()[d.y as usize * dst_pitch..];

        let unscaled = (s.w, s.h) == (d.w, d.h);
        if let (true, Some(runs)) = (unscaled, &self.rle) {
            runs.blit(
                self.pixels.bytes(),
                self.pitch,
                (s.x as usize, s.y as usize, s.w as usize, s.h as usize),
                dst_rows,
                dst_pitch,
                d.x as usize,
                usize::from(self.format.bytes_per_pixel()),
            );
            return Ok(());
        }

        let table = self.map.resolved().and_then(|r| r.table.as_ref());
        let mut job = BlitJob {
            src: &self.pixels.bytes()[s.y as usize * self.pitch..],
            src_pitch: self.pitch,
            src_x: s.x as usize,
            src_w: s.w as usize,
            src_h: s.h as usize,
            dst: dst_rows,
            dst_pitch,
            dst_x: d.x as usize,
            dst_w: d.w as usize,
            dst_h: d.h as usize,
            src_fmt: &self.format,
            dst_fmt: &dst.format,
            table,
            params: self.map.info,
        };
        kernel.run(&mut job);
        Ok(())
    }
}

/// Clip one axis of a scaled blit. Spans are half-open `(start, end)`; `scale` is destination
/// units per source unit. Returns `(src_start, src_end, dst_start, dst_end)`.
fn clip_axis(
    src: (i32, i32),
    dst: (i32, i32),
    src_limit: (i32, i32),
    clip: (i32, i32),
    scale: f64,
) -> (f64, f64, f64, f64) {
    let (mut s0, mut s1) = (f64::from(src.0), f64::from(src.1));
    let (mut d0, mut d1) = (f64::from(dst.0), f64::from(dst.1));
    let (lo, hi) = (f64::from(src_limit.0), f64::from(src_limit.1));
    if s0 < lo {
        d0 += (lo - s0) * scale;
        s0 = lo;
    }
    if s1 > hi {
        d1 -= (s1 - hi) * scale;
        s1 = hi;
    }
    let (lo, hi) = (f64::from(clip.0), f64::from(clip.1));
    if d0 < lo {
        s0 += (lo - d0) / scale;
        d0 = lo;
    }
    if d1 > hi {
        s1 -= (d1 - hi) / scale;
        d1 = hi;
    }
    (s0, s1, d0, d1)
}

#[cfg(test)]
#[path = "../../tests/unit/surface/blit.rs"]
mod tests;
