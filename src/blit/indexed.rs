use crate::blit::slow::blend_over;
use crate::blit::{BlitFlags, BlitJob};
use crate::foundation::core::Color;
use crate::foundation::math::mul_div255;
use crate::pixels::format::{PixelFormat, read_pixel, write_pixel};

/// Operation of a palette-sourced (1-bit or 8-bit indexed) kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum PaletteOp {
    /// Store the looked-up value.
    Plain,
    /// Skip source indices equal to the colorkey.
    Key,
    /// Interpolate the palette color over the destination by the surface alpha.
    Alpha,
    /// `Alpha` with colorkey skipping.
    AlphaKey,
}

/// Operation for a palette-sourced blit, `None` when the family has no kernel for it.
///
/// Destination byte width 0 stands for a sub-byte destination, which no kernel writes.
/// Direct destinations get modulation baked into the lookup table, and since palette sources
/// are opaque, blending without alpha modulation reduces to a plain store.
pub(crate) fn select_op(flags: BlitFlags, dst: &PixelFormat) -> Option<PaletteOp> {
    let width = if dst.bits_per_pixel() < 8 {
        0
    } else {
        dst.bytes_per_pixel()
    };
    let mut f = flags - BlitFlags::RLE_MASK;
    if !dst.is_indexed() {
        f.remove(BlitFlags::MODULATE_COLOR);
        if !f.contains(BlitFlags::BLEND) {
            f.remove(BlitFlags::MODULATE_ALPHA);
        } else if !f.contains(BlitFlags::MODULATE_ALPHA) {
            f.remove(BlitFlags::BLEND);
        }
    }
    let alpha = BlitFlags::MODULATE_ALPHA | BlitFlags::BLEND;
    let op = if f.is_empty() {
        PaletteOp::Plain
    } else if f == BlitFlags::COLORKEY {
        PaletteOp::Key
    } else if f == alpha {
        PaletteOp::Alpha
    } else if f == alpha | BlitFlags::COLORKEY {
        PaletteOp::AlphaKey
    } else {
        return None;
    };
    let min_width = match op {
        PaletteOp::Plain | PaletteOp::Key => 1,
        PaletteOp::Alpha | PaletteOp::AlphaKey => 2,
    };
    (width >= min_width).then_some(op)
}

/// 8-bit indexed source.
pub(crate) fn blit_indexed(job: &mut BlitJob<'_>, op: PaletteOp) {
    let x0 = job.src_x;
    blit_palette_rows(job, op, |row, i| usize::from(row[x0 + i]));
}

/// Shared row walk of the palette-sourced kernels. `index_at(row, i)` reads the palette index
/// of blit column `i` from a source row.
pub(crate) fn blit_palette_rows(
    job: &mut BlitJob<'_>,
    op: PaletteOp,
    index_at: impl Fn(&[u8], usize) -> usize,
) {
    let dst_fmt = job.dst_fmt;
    let dbpp = usize::from(dst_fmt.bytes_per_pixel());
    let key = job.params.colorkey as usize;
    let table = job.table;
    let colors = match op {
        PaletteOp::Alpha | PaletteOp::AlphaKey => modulated_colors(job),
        PaletteOp::Plain | PaletteOp::Key => Vec::new(),
    };
    let alpha = u32::from(job.params.a);

    for y in 0..job.dst_h {
        let s = &job.src[y * job.src_pitch..];
        let d = &mut job.dst[y * job.dst_pitch + job.dst_x * dbpp..];
        for (i, px) in d.chunks_exact_mut(dbpp).take(job.dst_w).enumerate() {
            let idx = index_at(s, i);
            if matches!(op, PaletteOp::Key | PaletteOp::AlphaKey) && idx == key {
                continue;
            }
            match op {
                PaletteOp::Plain | PaletteOp::Key => {
                    let v = table.map_or(idx as u32, |t| t.get(idx));
                    write_pixel(px, dbpp, v);
                }
                PaletteOp::Alpha | PaletteOp::AlphaKey => {
                    let c = colors.get(idx).copied().unwrap_or(Color::BLACK);
                    let dp = dst_fmt.unpack(read_pixel(px, dbpp));
                    let out =
                        blend_over([u32::from(c.r), u32::from(c.g), u32::from(c.b)], alpha, dp);
                    write_pixel(px, dbpp, dst_fmt.pack(out));
                }
            }
        }
    }
}

fn modulated_colors(job: &BlitJob<'_>) -> Vec<Color> {
    let Some(pal) = job.src_fmt.palette() else {
        return Vec::new();
    };
    let pal = pal.borrow();
    let p = job.params;
    if !p.flags.contains(BlitFlags::MODULATE_COLOR) {
        return pal.colors().to_vec();
    }
    pal.colors()
        .iter()
        .map(|c| {
            Color::rgba(
                mul_div255(u32::from(c.r), u32::from(p.r)) as u8,
                mul_div255(u32::from(c.g), u32::from(p.g)) as u8,
                mul_div255(u32::from(c.b), u32::from(p.b)) as u8,
                c.a,
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/blit/indexed.rs"]
mod tests;
