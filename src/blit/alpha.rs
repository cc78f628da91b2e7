use crate::blit::direct::index_332;
use crate::blit::slow::blend_over;
use crate::blit::{BlitFlags, BlitJob};
use crate::pixels::format::{PixelFormat, read_pixel, write_pixel};

/// Source-over kernels for direct-color sources, all compositing through [`blend_over`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum AlphaKernel {
    PixelAlphaTo1,
    PixelAlpha,
    /// `PixelAlpha` between 32-bit layouts sharing 8-bit RGB masks.
    Rgb32PixelAlpha,
    SurfaceAlphaTo1,
    SurfaceAlpha,
    Rgb32SurfaceAlpha,
    SurfaceAlphaKeyTo1,
    SurfaceAlphaKey,
}

fn rgb32_pair(src: &PixelFormat, dst: &PixelFormat) -> bool {
    let eight = |f: &PixelFormat| [f.red(), f.green(), f.blue()].iter().all(|c| c.loss == 0);
    let (sm, dm) = (src.masks(), dst.masks());
    src.bytes_per_pixel() == 4
        && dst.bytes_per_pixel() == 4
        && (sm.r, sm.g, sm.b) == (dm.r, dm.g, dm.b)
        && eight(src)
}

/// Kernel for a blended direct-color source, `None` for combinations this family leaves to
/// the generated table and the slow path (additive, multiplicative, modulated color).
pub(crate) fn select(src: &PixelFormat, dst: &PixelFormat, flags: BlitFlags) -> Option<AlphaKernel> {
    let f = flags - BlitFlags::RLE_MASK;
    let to1 = dst.bytes_per_pixel() == 1;
    let surface = BlitFlags::MODULATE_ALPHA | BlitFlags::BLEND;
    if f == BlitFlags::BLEND {
        return Some(if to1 {
            AlphaKernel::PixelAlphaTo1
        } else if rgb32_pair(src, dst) {
            AlphaKernel::Rgb32PixelAlpha
        } else {
            AlphaKernel::PixelAlpha
        });
    }
    if src.has_alpha() {
        return None;
    }
    if f == surface {
        return Some(if to1 {
            AlphaKernel::SurfaceAlphaTo1
        } else if rgb32_pair(src, dst) {
            AlphaKernel::Rgb32SurfaceAlpha
        } else {
            AlphaKernel::SurfaceAlpha
        });
    }
    if f == surface | BlitFlags::COLORKEY {
        return Some(if to1 {
            AlphaKernel::SurfaceAlphaKeyTo1
        } else {
            AlphaKernel::SurfaceAlphaKey
        });
    }
    None
}

pub(crate) fn run(kernel: AlphaKernel, job: &mut BlitJob<'_>) {
    let sf = job.src_fmt;
    let df = job.dst_fmt;
    let sbpp = usize::from(sf.bytes_per_pixel());
    let dbpp = usize::from(df.bytes_per_pixel());
    let surface_alpha = u32::from(job.params.a);
    let rgbmask = !sf.alpha().mask;
    let ckey = job.params.colorkey & rgbmask;
    let table = job.table;
    let dst_colors = df
        .palette()
        .map(|p| p.borrow().colors().to_vec())
        .unwrap_or_default();

    match kernel {
        AlphaKernel::Rgb32PixelAlpha | AlphaKernel::Rgb32SurfaceAlpha => {
            let shifts = [
                u32::from(sf.red().shift),
                u32::from(sf.green().shift),
                u32::from(sf.blue().shift),
            ];
            let keep = df.alpha().mask;
            let dashift = u32::from(df.alpha().shift);
            let ashift = u32::from(sf.alpha().shift);
            let per_pixel = kernel == AlphaKernel::Rgb32PixelAlpha && sf.has_alpha();
            job.rows(|s, d| {
                for (sp, dp) in s.chunks_exact(4).zip(d.chunks_exact_mut(4)) {
                    let p = u32::from_le_bytes([sp[0], sp[1], sp[2], sp[3]]);
                    let a = if per_pixel {
                        (p >> ashift) & 0xFF
                    } else if kernel == AlphaKernel::Rgb32SurfaceAlpha {
                        surface_alpha
                    } else {
                        0xFF
                    };
                    let q = u32::from_le_bytes([dp[0], dp[1], dp[2], dp[3]]);
                    let da = if keep == 0 { 0xFF } else { (q & keep) >> dashift };
                    let out = blend_over(
                        shifts.map(|sh| (p >> sh) & 0xFF),
                        a,
                        [
                            (q >> shifts[0]) & 0xFF,
                            (q >> shifts[1]) & 0xFF,
                            (q >> shifts[2]) & 0xFF,
                            da,
                        ],
                    );
                    let mut v = (out[0] << shifts[0]) | (out[1] << shifts[1]) | (out[2] << shifts[2]);
                    v |= (out[3] << dashift) & keep;
                    dp.copy_from_slice(&v.to_le_bytes());
                }
            });
        }
        _ => {
            let to1 = matches!(
                kernel,
                AlphaKernel::PixelAlphaTo1
                    | AlphaKernel::SurfaceAlphaTo1
                    | AlphaKernel::SurfaceAlphaKeyTo1
            );
            let keyed = matches!(
                kernel,
                AlphaKernel::SurfaceAlphaKey | AlphaKernel::SurfaceAlphaKeyTo1
            );
            let per_pixel = matches!(kernel, AlphaKernel::PixelAlpha | AlphaKernel::PixelAlphaTo1);
            job.rows(|s, d| {
                for (sp, dp) in s.chunks_exact(sbpp).zip(d.chunks_exact_mut(dbpp)) {
                    let p = read_pixel(sp, sbpp);
                    if keyed && p & rgbmask == ckey {
                        continue;
                    }
                    let sc = sf.unpack(p);
                    let a = if per_pixel { sc[3] } else { surface_alpha };
                    // a transparent source leaves palette pixels as they are
                    if to1 && a == 0 {
                        continue;
                    }
                    let q = read_pixel(dp, dbpp);
                    let dc = if to1 && df.is_indexed() {
                        dst_colors.get(q as usize).map_or([0, 0, 0, 0xFF], |c| {
                            [u32::from(c.r), u32::from(c.g), u32::from(c.b), 0xFF]
                        })
                    } else {
                        df.unpack(q)
                    };
                    let out = blend_over([sc[0], sc[1], sc[2]], a, dc);
                    let v = if to1 {
                        let idx = index_332(out);
                        table.map_or(idx as u32, |t| t.get(idx))
                    } else {
                        df.pack(out)
                    };
                    write_pixel(dp, dbpp, v);
                }
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blit/alpha.rs"]
mod tests;
