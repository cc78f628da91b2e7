use crate::blit::{BlitFlags, BlitJob, CopyParams};
use crate::foundation::math::mul_div255;
use crate::pixels::format::{read_pixel, write_pixel};

/// Source-over: color premultiplied by `sa` (when translucent) plus the destination scaled by
/// `255 - sa`. Alpha accumulates the same way. Every blending kernel composites through here.
#[inline]
pub(crate) fn blend_over(s: [u32; 3], sa: u32, d: [u32; 4]) -> [u32; 4] {
    let [mut sr, mut sg, mut sb] = s;
    if sa < 255 {
        sr = mul_div255(sr, sa);
        sg = mul_div255(sg, sa);
        sb = mul_div255(sb, sa);
    }
    let inv = 255 - sa;
    [
        sr + mul_div255(inv, d[0]),
        sg + mul_div255(inv, d[1]),
        sb + mul_div255(inv, d[2]),
        sa + mul_div255(inv, d[3]),
    ]
}

/// Composite one source color onto one destination color.
///
/// Modulation first, then premultiplication by source alpha for blend and add, then the
/// blend function. All arithmetic truncates.
#[inline]
pub(crate) fn composite(s: [u32; 4], d: [u32; 4], flags: BlitFlags, p: &CopyParams) -> [u32; 4] {
    let [mut sr, mut sg, mut sb, mut sa] = s;
    let [dr, dg, db, da] = d;
    if flags.contains(BlitFlags::MODULATE_COLOR) {
        sr = mul_div255(sr, u32::from(p.r));
        sg = mul_div255(sg, u32::from(p.g));
        sb = mul_div255(sb, u32::from(p.b));
    }
    if flags.contains(BlitFlags::MODULATE_ALPHA) {
        sa = mul_div255(sa, u32::from(p.a));
    }
    if flags.contains(BlitFlags::BLEND) {
        return blend_over([sr, sg, sb], sa, d);
    }
    if flags.contains(BlitFlags::ADD) {
        if sa < 255 {
            sr = mul_div255(sr, sa);
            sg = mul_div255(sg, sa);
            sb = mul_div255(sb, sa);
        }
        [(sr + dr).min(255), (sg + dg).min(255), (sb + db).min(255), da]
    } else if flags.contains(BlitFlags::MOD) {
        [mul_div255(sr, dr), mul_div255(sg, dg), mul_div255(sb, db), da]
    } else {
        [sr, sg, sb, sa]
    }
}

/// Generic kernel for any two direct-color formats, scaled or not.
pub(crate) fn blit_slow(job: &mut BlitJob<'_>) {
    let sf = job.src_fmt;
    let df = job.dst_fmt;
    let sbpp = usize::from(sf.bytes_per_pixel());
    let dbpp = usize::from(df.bytes_per_pixel());
    let params = job.params;
    let flags = params.flags;
    let keyed = flags.contains(BlitFlags::COLORKEY);
    job.scaled_rows(|s, cols, d| {
        for (&sx, dp) in cols.iter().zip(d.chunks_exact_mut(dbpp)) {
            let raw = read_pixel(&s[sx * sbpp..], sbpp);
            let sc = sf.unpack(raw);
            if keyed {
                let key = if sbpp == 3 {
                    sf.red().encode(sc[0] as u8)
                        | sf.green().encode(sc[1] as u8)
                        | sf.blue().encode(sc[2] as u8)
                } else {
                    raw
                };
                if key == params.colorkey {
                    continue;
                }
            }
            let dc = df.unpack(read_pixel(dp, dbpp));
            write_pixel(dp, dbpp, df.pack(composite(sc, dc, flags, &params)));
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/blit/slow.rs"]
mod tests;
