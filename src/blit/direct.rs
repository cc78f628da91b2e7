use crate::blit::{BlitFlags, BlitJob};
use crate::engine::caps::CpuCaps;
use crate::pixels::format::{PixelFormat, read_pixel, write_pixel};

/// Direct-color kernels without blending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum DirectKernel {
    /// Any source onto a one-byte destination through a 3-3-2 quantization.
    Nto1,
    Rgb888ToRgb565,
    Rgb888ToRgb555,
    /// `Swizzle32` four pixels per step.
    Swizzle32Wide,
    /// Channel reorder between 32-bit layouts with 8-bit channels.
    Swizzle32,
    /// Same RGB layout, destination alpha forced opaque.
    Blit4to4MaskAlpha,
    /// Generic disassemble/reassemble carrying source alpha.
    CopyAlpha,
    /// Generic disassemble/reassemble with opaque destination alpha.
    NtoN,
    Key2to2,
    Nto1Key,
    NtoNKeyCopyAlpha,
    NtoNKey,
}

const NO_ALPHA: u8 = 1;
const SET_ALPHA: u8 = 2;
const COPY_ALPHA: u8 = 4;

/// Row of the ordered table consulted for unflagged blits. `None` fields match anything.
struct NormalEntry {
    src_rgb: Option<[u32; 3]>,
    dst_bytes: Option<u8>,
    dst_rgb: Option<[u32; 3]>,
    wide_channels: bool,
    same_rgb: bool,
    alpha: u8,
    caps: CpuCaps,
    kernel: DirectKernel,
}

const RGB888: [u32; 3] = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF];

const NORMAL: &[NormalEntry] = &[
    NormalEntry {
        src_rgb: Some(RGB888),
        dst_bytes: Some(2),
        dst_rgb: Some([0xF800, 0x07E0, 0x001F]),
        wide_channels: false,
        same_rgb: false,
        alpha: NO_ALPHA,
        caps: CpuCaps::empty(),
        kernel: DirectKernel::Rgb888ToRgb565,
    },
    NormalEntry {
        src_rgb: Some(RGB888),
        dst_bytes: Some(2),
        dst_rgb: Some([0x7C00, 0x03E0, 0x001F]),
        wide_channels: false,
        same_rgb: false,
        alpha: NO_ALPHA,
        caps: CpuCaps::empty(),
        kernel: DirectKernel::Rgb888ToRgb555,
    },
    NormalEntry {
        src_rgb: None,
        dst_bytes: Some(4),
        dst_rgb: None,
        wide_channels: false,
        same_rgb: true,
        alpha: SET_ALPHA,
        caps: CpuCaps::empty(),
        kernel: DirectKernel::Blit4to4MaskAlpha,
    },
    NormalEntry {
        src_rgb: None,
        dst_bytes: Some(4),
        dst_rgb: None,
        wide_channels: true,
        same_rgb: false,
        alpha: NO_ALPHA | SET_ALPHA | COPY_ALPHA,
        caps: CpuCaps::SIMD128,
        kernel: DirectKernel::Swizzle32Wide,
    },
    NormalEntry {
        src_rgb: None,
        dst_bytes: Some(4),
        dst_rgb: None,
        wide_channels: true,
        same_rgb: false,
        alpha: NO_ALPHA | SET_ALPHA | COPY_ALPHA,
        caps: CpuCaps::empty(),
        kernel: DirectKernel::Swizzle32,
    },
    NormalEntry {
        src_rgb: None,
        dst_bytes: None,
        dst_rgb: None,
        wide_channels: false,
        same_rgb: false,
        alpha: COPY_ALPHA,
        caps: CpuCaps::empty(),
        kernel: DirectKernel::CopyAlpha,
    },
    NormalEntry {
        src_rgb: None,
        dst_bytes: None,
        dst_rgb: None,
        wide_channels: false,
        same_rgb: false,
        alpha: NO_ALPHA | SET_ALPHA,
        caps: CpuCaps::empty(),
        kernel: DirectKernel::NtoN,
    },
];

fn rgb_masks(fmt: &PixelFormat) -> [u32; 3] {
    let m = fmt.masks();
    [m.r, m.g, m.b]
}

fn eight_bit_channels(fmt: &PixelFormat) -> bool {
    [fmt.red(), fmt.green(), fmt.blue()]
        .iter()
        .all(|c| c.loss == 0)
        && (fmt.alpha().mask == 0 || fmt.alpha().loss == 0)
}

impl NormalEntry {
    fn matches(&self, src: &PixelFormat, dst: &PixelFormat, alpha: u8, caps: CpuCaps) -> bool {
        self.alpha & alpha != 0
            && caps.contains(self.caps)
            && self.src_rgb.is_none_or(|m| m == rgb_masks(src))
            && self.dst_bytes.is_none_or(|b| b == dst.bytes_per_pixel())
            && self.dst_rgb.is_none_or(|m| m == rgb_masks(dst))
            && (!self.same_rgb
                || (src.bytes_per_pixel() == 4 && rgb_masks(src) == rgb_masks(dst)))
            && (!self.wide_channels
                || (src.bytes_per_pixel() == 4 && eight_bit_channels(src) && eight_bit_channels(dst)))
    }
}

/// Kernel for an unflagged or colorkeyed direct-color blit.
pub(crate) fn select(
    src: &PixelFormat,
    dst: &PixelFormat,
    identity: bool,
    flags: BlitFlags,
    caps: CpuCaps,
) -> Option<DirectKernel> {
    let f = flags - BlitFlags::RLE_MASK;
    let one_byte_dst = dst.bytes_per_pixel() == 1;
    if f.is_empty() {
        if one_byte_dst {
            return Some(DirectKernel::Nto1);
        }
        let alpha = match (src.has_alpha(), dst.has_alpha()) {
            (_, false) => NO_ALPHA,
            (false, true) => SET_ALPHA,
            (true, true) => COPY_ALPHA,
        };
        return NORMAL
            .iter()
            .find(|e| e.matches(src, dst, alpha, caps))
            .map(|e| e.kernel);
    }
    if f == BlitFlags::COLORKEY {
        let kernel = if one_byte_dst {
            DirectKernel::Nto1Key
        } else if identity && src.bytes_per_pixel() == 2 {
            DirectKernel::Key2to2
        } else if src.has_alpha() && dst.has_alpha() {
            DirectKernel::NtoNKeyCopyAlpha
        } else {
            DirectKernel::NtoNKey
        };
        return Some(kernel);
    }
    None
}

/// 3-3-2 quantization index of an 8-bit color.
#[inline]
pub(crate) fn index_332(c: [u32; 4]) -> usize {
    (((c[0] >> 5) << 5) | ((c[1] >> 5) << 2) | (c[2] >> 6)) as usize
}

pub(crate) fn run(kernel: DirectKernel, job: &mut BlitJob<'_>) {
    let sf = job.src_fmt;
    let df = job.dst_fmt;
    let sbpp = usize::from(sf.bytes_per_pixel());
    let dbpp = usize::from(df.bytes_per_pixel());
    let rgbmask = !sf.alpha().mask;
    let ckey = job.params.colorkey & rgbmask;
    let table = job.table;
    let quantize = |p: u32| {
        let idx = index_332(sf.unpack(p));
        table.map_or(idx as u32, |t| t.get(idx))
    };
    // per-pixel conversion; `None` leaves the destination untouched
    let convert = |p: u32| -> Option<u32> {
        match kernel {
            DirectKernel::Nto1 => Some(quantize(p)),
            DirectKernel::Rgb888ToRgb565 => {
                Some(((p >> 8) & 0xF800) | ((p >> 5) & 0x07E0) | ((p >> 3) & 0x001F))
            }
            DirectKernel::Rgb888ToRgb555 => {
                Some(((p >> 9) & 0x7C00) | ((p >> 6) & 0x03E0) | ((p >> 3) & 0x001F))
            }
            DirectKernel::Blit4to4MaskAlpha => Some((p & !sf.alpha().mask) | df.alpha().mask),
            DirectKernel::CopyAlpha => Some(df.pack(sf.unpack(p))),
            DirectKernel::NtoN => {
                let c = sf.unpack(p);
                Some(df.pack_opaque([c[0], c[1], c[2]]))
            }
            DirectKernel::Key2to2 => (p & rgbmask != ckey).then_some(p),
            DirectKernel::Nto1Key => (p & rgbmask != ckey).then(|| quantize(p)),
            DirectKernel::NtoNKeyCopyAlpha => {
                (p & rgbmask != ckey).then(|| df.pack(sf.unpack(p)))
            }
            DirectKernel::NtoNKey => (p & rgbmask != ckey).then(|| {
                let c = sf.unpack(p);
                df.pack_opaque([c[0], c[1], c[2]])
            }),
            DirectKernel::Swizzle32 | DirectKernel::Swizzle32Wide => None,
        }
    };
    match kernel {
        DirectKernel::Swizzle32 => {
            let swz = Swizzle::new(sf, df);
            job.rows(|s, d| {
                for (sp, dp) in s.chunks_exact(4).zip(d.chunks_exact_mut(4)) {
                    swz.pixel(sp, dp);
                }
            });
        }
        DirectKernel::Swizzle32Wide => {
            let swz = Swizzle::new(sf, df);
            job.rows(|s, d| {
                let mut sq = s.chunks_exact(16);
                let mut dq = d.chunks_exact_mut(16);
                for (s4, d4) in (&mut sq).zip(&mut dq) {
                    swz.quad(s4, d4);
                }
                let tail = sq.remainder().chunks_exact(4);
                for (sp, dp) in tail.zip(dq.into_remainder().chunks_exact_mut(4)) {
                    swz.pixel(sp, dp);
                }
            });
        }
        _ => job.rows(|s, d| {
            for (sp, dp) in s.chunks_exact(sbpp).zip(d.chunks_exact_mut(dbpp)) {
                if let Some(v) = convert(read_pixel(sp, sbpp)) {
                    write_pixel(dp, dbpp, v);
                }
            }
        }),
    }
}

/// Shift plan for 32-bit to 32-bit channel reordering.
struct Swizzle {
    src: [u32; 4],
    dst: [u32; 4],
    src_alpha: bool,
    dst_alpha: bool,
    dst_amask: u32,
}

impl Swizzle {
    fn new(sf: &PixelFormat, df: &PixelFormat) -> Self {
        let shifts = |f: &PixelFormat| {
            [
                u32::from(f.red().shift),
                u32::from(f.green().shift),
                u32::from(f.blue().shift),
                u32::from(f.alpha().shift),
            ]
        };
        Self {
            src: shifts(sf),
            dst: shifts(df),
            src_alpha: sf.has_alpha(),
            dst_alpha: df.has_alpha(),
            dst_amask: df.alpha().mask,
        }
    }

    #[inline]
    fn convert(&self, p: u32) -> u32 {
        let ch = |i: usize| ((p >> self.src[i]) & 0xFF) << self.dst[i];
        let a = match (self.src_alpha, self.dst_alpha) {
            (_, false) => 0,
            (false, true) => self.dst_amask,
            (true, true) => ch(3),
        };
        ch(0) | ch(1) | ch(2) | a
    }

    #[inline]
    fn pixel(&self, s: &[u8], d: &mut [u8]) {
        let p = u32::from_le_bytes([s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&self.convert(p).to_le_bytes());
    }

    #[inline]
    fn quad(&self, s: &[u8], d: &mut [u8]) {
        let mut px = [0u32; 4];
        for (v, c) in px.iter_mut().zip(s.chunks_exact(4)) {
            *v = self.convert(u32::from_le_bytes([c[0], c[1], c[2], c[3]]));
        }
        for (v, c) in px.iter().zip(d.chunks_exact_mut(4)) {
            c.copy_from_slice(&v.to_le_bytes());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blit/direct.rs"]
mod tests;
