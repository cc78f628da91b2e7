use crate::foundation::core::Rect;
use crate::foundation::error::{SoftblitError, SoftblitResult};
use crate::foundation::math::NearestSteps;
use crate::surface::Surface;

fn area(rect: Option<Rect>, s: &Surface<'_>, what: &str) -> SoftblitResult<Rect> {
    let bounds = s.bounds();
    let r = rect.unwrap_or(bounds);
    if r.w < 0 || r.h < 0 || (!r.is_empty() && !bounds.contains_rect(&r)) {
        return Err(SoftblitError::invalid_argument(format!(
            "{what} rectangle {r:?} outside {bounds:?}"
        )));
    }
    Ok(r)
}

/// Nearest-neighbor copy of `src_rect` onto `dst_rect` (whole surfaces when `None`).
///
/// Both surfaces must share a pixel layout of at least 8 bits; convert first otherwise. The
/// rectangles are not clipped and must lie inside their surfaces. Equal widths copy whole rows.
pub fn soft_stretch(
    src: &Surface<'_>,
    src_rect: Option<Rect>,
    dst: &mut Surface<'_>,
    dst_rect: Option<Rect>,
) -> SoftblitResult<()> {
    if !src.format().same_layout(dst.format()) || src.format().bits_per_pixel() < 8 {
        return Err(SoftblitError::unsupported_format(format!(
            "stretch from {:?} to {:?}",
            src.format().id(),
            dst.format().id()
        )));
    }
    let s = area(src_rect, src, "source")?;
    let d = area(dst_rect, dst, "destination")?;
    if d.is_empty() {
        return Ok(());
    }
    if s.is_empty() {
        return Err(SoftblitError::invalid_argument(
            "cannot stretch an empty source onto a non-empty destination",
        ));
    }

    let bpp = usize::from(src.format().bytes_per_pixel());
    let (sw, dw) = (s.w as usize, d.w as usize);
    let cols: Vec<usize> = NearestSteps::new(sw, dw).collect();
    let (src_pitch, dst_pitch) = (src.pitch(), dst.pitch());
    let src_pixels = src.pixels();
    let dst_pixels = dst.pixels_for_write();
    for (y, sy) in NearestSteps::new(s.h as usize, d.h as usize).enumerate() {
        let so = (s.y as usize + sy) * src_pitch + s.x as usize * bpp;
        let srow = &src_pixels[so..so + sw * bpp];
        let doff = (d.y as usize + y) * dst_pitch + d.x as usize * bpp;
        let drow = &mut dst_pixels[doff..doff + dw * bpp];
        if sw == dw {
            drow.copy_from_slice(srow);
            continue;
        }
        for (px, &sx) in drow.chunks_exact_mut(bpp).zip(&cols) {
            px.copy_from_slice(&srow[sx * bpp..sx * bpp + bpp]);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/ops/stretch.rs"]
mod tests;
