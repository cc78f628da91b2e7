use crate::blit::alpha::{self, AlphaKernel};
use crate::blit::direct::{self, DirectKernel};
use crate::blit::indexed::{self, PaletteOp};
use crate::blit::{BlitFlags, BlitJob, bitmap, copy, generated, slow};
use crate::engine::caps::CpuCaps;
use crate::pixels::format::PixelFormat;

/// Kernel chosen for a (source, destination, flags) combination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Kernel {
    Copy,
    Bitmap(PaletteOp),
    Indexed(PaletteOp),
    Alpha(AlphaKernel),
    Direct(DirectKernel),
    Generated(u16),
    Slow,
}

impl Kernel {
    pub(crate) fn run(self, job: &mut BlitJob<'_>) {
        match self {
            Kernel::Copy => copy::blit_copy(job),
            Kernel::Bitmap(op) => bitmap::blit_bitmap(job, op),
            Kernel::Indexed(op) => indexed::blit_indexed(job, op),
            Kernel::Alpha(k) => alpha::run(k, job),
            Kernel::Direct(k) => direct::run(k, job),
            Kernel::Generated(i) => generated::run(i, job),
            Kernel::Slow => slow::blit_slow(job),
        }
    }

    /// Whether the kernel honors distinct source and destination sizes.
    pub(crate) fn scales(self) -> bool {
        match self {
            Kernel::Slow => true,
            Kernel::Generated(i) => generated::entry_flags(i).contains(BlitFlags::NEAREST),
            _ => false,
        }
    }
}

/// Pick the kernel for a blit.
///
/// Order: raw copy for identical layouts without compositing; the bitmap family for 1-bit
/// sources; the indexed family for 8-bit indexed sources; the alpha family when blending;
/// the direct family otherwise. Sub-byte destinations are only written by the raw copy.
/// Whatever the family leaves unserved goes to the generated table and finally to the slow
/// path, which accepts any pair of direct formats.
pub(crate) fn select_kernel(
    src: &PixelFormat,
    dst: &PixelFormat,
    identity: bool,
    flags: BlitFlags,
    caps: CpuCaps,
) -> Option<Kernel> {
    if identity && (flags - BlitFlags::RLE_MASK).is_empty() {
        return Some(Kernel::Copy);
    }
    if dst.bits_per_pixel() < 8 {
        return None;
    }
    let family = if src.bits_per_pixel() < 8 {
        if src.bits_per_pixel() == 1 {
            indexed::select_op(flags, dst).map(Kernel::Bitmap)
        } else {
            None
        }
    } else if src.is_indexed() {
        indexed::select_op(flags, dst).map(Kernel::Indexed)
    } else if flags.intersects(BlitFlags::BLEND_MASK) {
        alpha::select(src, dst, flags).map(Kernel::Alpha)
    } else {
        direct::select(src, dst, identity, flags, caps).map(Kernel::Direct)
    };
    family
        .or_else(|| generated::find(src.id(), dst.id(), flags, caps).map(Kernel::Generated))
        .or_else(|| {
            let direct_pair = !src.is_indexed()
                && !dst.is_indexed()
                && src.bits_per_pixel() >= 8
                && dst.bits_per_pixel() >= 8;
            direct_pair.then_some(Kernel::Slow)
        })
}

#[cfg(test)]
#[path = "../../tests/unit/blit/dispatch.rs"]
mod tests;
